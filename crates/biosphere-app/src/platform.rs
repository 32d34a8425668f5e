//! Where the app keeps its files.

use std::path::{Path, PathBuf};

use biosphere_config::ConfigError;

const APP_NAME: &str = "biosphere";

/// Config and log directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDirs {
    /// Holds `config.ron`.
    pub config_dir: PathBuf,
    /// Holds `biosphere.log` in debug builds.
    pub log_dir: PathBuf,
}

impl AppDirs {
    /// Platform locations, or everything under `override_dir` when given.
    ///
    /// Logs go to the platform cache directory when there is one, otherwise
    /// next to the config.
    pub fn resolve(override_dir: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(root) = override_dir {
            return Ok(Self::with_root(root));
        }
        let config_dir = biosphere_config::default_config_dir()?;
        let log_dir = dirs::cache_dir()
            .map(|cache| cache.join(APP_NAME).join("logs"))
            .unwrap_or_else(|| config_dir.join("logs"));
        Ok(Self {
            config_dir,
            log_dir,
        })
    }

    /// Both directories under `root`. Nothing is created on disk.
    pub fn with_root(root: &Path) -> Self {
        Self {
            config_dir: root.to_path_buf(),
            log_dir: root.join("logs"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins() {
        let dirs = AppDirs::resolve(Some(Path::new("/tmp/planets"))).unwrap();
        assert_eq!(dirs.config_dir, PathBuf::from("/tmp/planets"));
        assert_eq!(dirs.log_dir, PathBuf::from("/tmp/planets/logs"));
    }

    #[test]
    fn test_with_root_touches_nothing() {
        let root = tempfile::tempdir().unwrap();
        let dirs = AppDirs::with_root(root.path());
        assert!(!dirs.log_dir.exists());
        assert!(dirs.log_dir.starts_with(&dirs.config_dir));
    }
}
