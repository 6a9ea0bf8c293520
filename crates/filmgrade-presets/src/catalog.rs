use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::{debug, info, warn};

use filmgrade_core::Lut;
use filmgrade_core::lut::read_cube_file;

use crate::models::{IDENTITY_PRESET, MANIFEST_FILE, ManifestEntry, Preset, PresetSource};

#[derive(Debug, Error)]
pub enum PresetError {
    #[error("unknown preset: {0}")]
    UnknownPreset(String),
}

/// Presets available in a directory of `.cube` files.
///
/// Resolved LUTs are cached by name, so a preset is parsed once no matter
/// how often it is reselected.
pub struct PresetCatalog {
    dir: Option<PathBuf>,
    presets: Vec<Preset>,
    cache: Mutex<HashMap<String, Arc<Lut>>>,
}

impl PresetCatalog {
    /// Catalog containing only the built-in identity preset.
    pub fn builtin() -> Self {
        Self {
            dir: None,
            presets: vec![Preset::identity()],
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Scan `dir` for presets.
    ///
    /// Entries from `presets.json` come first, in manifest order, followed
    /// by any other `.cube` files sorted by name. A missing directory gives
    /// the built-in catalog.
    pub fn open(dir: &Path) -> Result<Self> {
        let mut catalog = Self::builtin();
        if !dir.is_dir() {
            warn!(?dir, "preset directory not found");
            return Ok(catalog);
        }
        catalog.dir = Some(dir.to_path_buf());

        let manifest_path = dir.join(MANIFEST_FILE);
        if manifest_path.is_file() {
            let text = fs::read_to_string(&manifest_path)
                .with_context(|| format!("read manifest: {}", manifest_path.display()))?;
            let entries: Vec<ManifestEntry> = serde_json::from_str(&text)
                .with_context(|| format!("parse manifest: {}", manifest_path.display()))?;
            for entry in entries {
                catalog.push(Preset {
                    label: entry.label.unwrap_or_else(|| entry.name.clone()),
                    name: entry.name,
                    description: entry.description,
                    source: PresetSource::File(dir.join(entry.file)),
                });
            }
        }

        let mut cubes = Vec::new();
        for entry in
            fs::read_dir(dir).with_context(|| format!("read preset dir: {}", dir.display()))?
        {
            let path = entry?.path();
            let is_cube = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("cube"));
            if is_cube && path.is_file() {
                cubes.push(path);
            }
        }
        cubes.sort();

        for path in cubes {
            let listed = catalog
                .presets
                .iter()
                .any(|p| p.source == PresetSource::File(path.clone()));
            if listed {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            catalog.push(Preset {
                name: stem.to_string(),
                label: stem.to_string(),
                description: None,
                source: PresetSource::File(path.clone()),
            });
        }

        info!(?dir, count = catalog.presets.len(), "preset catalog opened");
        Ok(catalog)
    }

    fn push(&mut self, preset: Preset) {
        if self.get(&preset.name).is_some() {
            warn!(name = %preset.name, "duplicate preset name, keeping the first");
            return;
        }
        self.presets.push(preset);
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    pub fn get(&self, name: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.name == name)
    }

    /// Resolve a preset to its LUT.
    ///
    /// Only an unknown name is an error. A preset whose file is missing or
    /// malformed resolves to the identity cube; the loader logs why.
    ///
    /// The cache lock is not held during the file read. Concurrent loads of
    /// one preset all get the first LUT inserted.
    pub fn load_lut(&self, name: &str) -> Result<Arc<Lut>, PresetError> {
        let preset = self
            .get(name)
            .ok_or_else(|| PresetError::UnknownPreset(name.to_string()))?;

        if let Some(lut) = self.cached(name) {
            debug!(name, "preset LUT cache hit");
            return Ok(lut);
        }

        let lut = match &preset.source {
            PresetSource::Identity => Lut::fallback(),
            PresetSource::File(path) => {
                let load = read_cube_file(path);
                if load.is_fallback() {
                    debug!(name, ?path, "preset resolved to identity");
                }
                load.into_lut()
            }
        };

        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        let lut = Arc::clone(
            cache
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(lut)),
        );
        info!(name, size = lut.size(), "preset LUT loaded");
        Ok(lut)
    }

    fn cached(&self, name: &str) -> Option<Arc<Lut>> {
        let cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.get(name).map(Arc::clone)
    }

    /// Drop the cached LUT for `name` so the next load rereads the file.
    pub fn invalidate(&self, name: &str) {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.remove(name);
    }

    pub fn clear_cache(&self) {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.clear();
    }
}
