//! Configuration for the biosphere tools.
//!
//! Settings persist to disk as `config.ron`, accept CLI overrides via clap, and
//! tolerate missing or unknown fields so older and newer files both load.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    CONFIG_FILE, Config, DebugConfig, GenerationConfig, OutputConfig, WorkerConfig,
    default_config_dir,
};
pub use error::ConfigError;
