use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// User configuration, read from `config.json`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory scanned for `.cube` presets.
    pub presets_dir: PathBuf,
    /// Longest edge of interactive previews.
    pub preview_max_edge: u32,
    /// `tracing` filter used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            presets_dir: dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("filmgrade")
                .join("presets"),
            preview_max_edge: 1024,
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("filmgrade").join("config.json"))
    }

    /// Load `explicit` if given (it must exist), otherwise the default
    /// config file if present, otherwise built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::read(path),
            None => match Self::default_path() {
                Some(path) if path.is_file() => Self::read(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read config: {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("parse config: {}", path.display()))?;
        debug!(?path, ?config, "config loaded");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.preview_max_edge, 1024);
        assert_eq!(config.log_filter, "info");
        assert!(config.presets_dir.ends_with("filmgrade/presets"));
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "preview_max_edge": 512 }"#).unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.preview_max_edge, 512);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        assert!(Config::load(Some(Path::new("/nonexistent/filmgrade/config.json"))).is_err());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "preview_max_edge = 512").unwrap();
        assert!(Config::load(Some(&path)).is_err());
    }
}
