use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::results::{is_valid_target, TARGET_CHOICES};

/// Preferences that survive restarts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Last selected target duration, in seconds
    pub target_secs: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_secs: TARGET_CHOICES[0],
        }
    }
}

impl Config {
    /// Index of the configured target in the picker, falling back to the
    /// first choice when the stored value is no longer a valid target
    pub fn target_index(&self) -> usize {
        if !is_valid_target(self.target_secs) {
            return 0;
        }
        TARGET_CHOICES
            .iter()
            .position(|&t| t == self.target_secs)
            .unwrap_or(0)
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path =
            AppDirs::config_path().unwrap_or_else(|| PathBuf::from("chronosense_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(cfg) = serde_json::from_slice::<Config>(&bytes) {
                return cfg;
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config { target_secs: 45 };
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn missing_or_corrupt_config_falls_back_to_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);

        assert_eq!(store.load(), Config::default());

        std::fs::write(&path, b"{broken").unwrap();
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn target_index_maps_into_the_picker() {
        assert_eq!(Config { target_secs: 5 }.target_index(), 0);
        assert_eq!(Config { target_secs: 30 }.target_index(), 5);
        assert_eq!(Config { target_secs: 90 }.target_index(), 17);
        // stale value from an older build falls back to the first choice
        assert_eq!(Config { target_secs: 7 }.target_index(), 0);
    }
}
