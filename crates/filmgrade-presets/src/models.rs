use std::path::PathBuf;

use serde::Deserialize;

/// Name of the preset that is always available and never touches disk.
pub const IDENTITY_PRESET: &str = "identity";

/// File name of the optional manifest inside a preset directory.
pub const MANIFEST_FILE: &str = "presets.json";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PresetSource {
    /// The 32³ identity cube.
    Identity,
    /// A `.cube` file on disk.
    File(PathBuf),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Preset {
    pub name: String,
    pub label: String,
    pub description: Option<String>,
    pub source: PresetSource,
}

impl Preset {
    pub fn identity() -> Self {
        Self {
            name: IDENTITY_PRESET.to_string(),
            label: "None".to_string(),
            description: Some("No color grade".to_string()),
            source: PresetSource::Identity,
        }
    }
}

/// One entry of `presets.json`.
#[derive(Clone, Debug, Deserialize)]
pub struct ManifestEntry {
    pub name: String,
    pub file: PathBuf,
    pub label: Option<String>,
    pub description: Option<String>,
}
