use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// Path of the persisted results blob
    pub fn results_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("results.json"))
    }

    /// Path of the persisted app configuration
    pub fn config_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("config.json"))
    }

    fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("chronosense");
            Some(state_dir)
        } else {
            ProjectDirs::from("", "", "chronosense")
                .map(|proj_dirs| proj_dirs.data_local_dir().to_path_buf())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn results_and_config_share_a_directory() {
        // Both paths resolve (HOME is set in test environments) and live
        // side by side in the same state directory.
        let results = AppDirs::results_path();
        let config = AppDirs::config_path();

        if let (Some(results), Some(config)) = (results, config) {
            assert_eq!(results.parent(), config.parent());
            assert_eq!(results.file_name().unwrap(), "results.json");
            assert_eq!(config.file_name().unwrap(), "config.json");
        }
    }
}
