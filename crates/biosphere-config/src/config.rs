//! Configuration sections with defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name of the persisted configuration inside the config directory.
pub const CONFIG_FILE: &str = "config.ron";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// What to generate.
    pub generation: GenerationConfig,
    /// Worker thread and failure handling.
    pub worker: WorkerConfig,
    /// Logging.
    pub debug: DebugConfig,
    /// What to do with the finished mesh.
    pub output: OutputConfig,
}

/// Parameters of the generated planet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerationConfig {
    /// `"sphere"` or `"plane"`.
    pub shape: String,
    /// Subdivision level.
    pub detail: u32,
    /// Biome preset name (forest, desert, tropical, arctic, barren).
    pub preset: String,
    /// Reseeds the biome when set.
    pub seed: Option<u64>,
    /// Maximum per-axis vertex jitter.
    pub scatter_amount: f64,
    /// Decimal digits used to match shared vertices.
    pub vertex_precision: u32,
    /// Backfill threshold per vegetation rule (0 disables backfill).
    pub minimum_vegetation_per_rule: usize,
}

/// Worker thread settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorkerConfig {
    /// Requests above this detail fail and fall back.
    pub max_detail: u32,
    /// Detail of the fallback sphere.
    pub fallback_detail: u32,
    /// Send results as JSON instead of moving them.
    pub serialized_transfer: bool,
    /// How long the CLI waits for a result before giving up.
    pub timeout_seconds: u64,
}

/// Debug/development settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log filter (e.g. "debug", "info,biosphere_mesh=trace").
    pub log_level: String,
}

/// Result export settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Write the finished mesh as JSON to this file.
    pub path: Option<PathBuf>,
    /// Indent the JSON output.
    pub pretty: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            shape: "sphere".to_string(),
            detail: 10,
            preset: "forest".to_string(),
            seed: None,
            scatter_amount: 0.003,
            vertex_precision: 5,
            minimum_vegetation_per_rule: 3,
        }
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_detail: 64,
            fallback_detail: 2,
            serialized_transfer: false,
            timeout_seconds: 120,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// `<platform config dir>/biosphere`, if the platform has one.
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("biosphere"))
        .ok_or(ConfigError::NoConfigDir)
}

impl Config {
    /// Load `config.ron` from `config_dir`, writing a default one if it is missing.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = config_dir.join(CONFIG_FILE);

        if path.exists() {
            let config = Self::read(&path)?;
            log::info!("Loaded config from {}", path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", path.display());
            Ok(config)
        }
    }

    /// Save as `config.ron` in `config_dir`, creating the directory if needed.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        let path = config_dir.join(CONFIG_FILE);
        std::fs::create_dir_all(config_dir).map_err(|source| ConfigError::Write {
            path: config_dir.to_path_buf(),
            source,
        })?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(2)
            .enumerate_arrays(false);
        let serialized = ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::Serialize)?;

        std::fs::write(&path, serialized).map_err(|source| ConfigError::Write { path, source })
    }

    /// Re-read `config.ron`. Returns `Some` only when the contents differ from `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let fresh = Self::read(&config_dir.join(CONFIG_FILE))?;
        if &fresh == self {
            Ok(None)
        } else {
            log::info!("Config reloaded with changes");
            Ok(Some(fresh))
        }
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
