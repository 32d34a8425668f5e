//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Generate a procedural planet mesh.
///
/// Every flag is optional and overrides the matching `config.ron` setting.
#[derive(Parser, Debug, Default)]
#[command(name = "biosphere", about = "Procedural planet mesh generator")]
pub struct CliArgs {
    /// Surface shape: sphere or plane.
    #[arg(long)]
    pub shape: Option<String>,

    /// Subdivision level.
    #[arg(long)]
    pub detail: Option<u32>,

    /// Biome preset (forest, desert, tropical, arctic, barren).
    #[arg(long)]
    pub preset: Option<String>,

    /// Seed for every noise field and vegetation roll.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Maximum per-axis vertex jitter.
    #[arg(long)]
    pub scatter: Option<f64>,

    /// Backfill threshold per vegetation rule.
    #[arg(long)]
    pub min_vegetation: Option<usize>,

    /// Reject requests above this detail.
    #[arg(long)]
    pub max_detail: Option<u32>,

    /// Detail of the sphere returned when generation fails.
    #[arg(long)]
    pub fallback_detail: Option<u32>,

    /// Send results across the thread boundary as JSON.
    #[arg(long)]
    pub serialized: Option<bool>,

    /// Seconds to wait for the mesh before giving up.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Write the finished mesh as JSON to this file.
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Overwrite every setting the command line specified.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        let generation = &mut self.generation;
        if let Some(shape) = &args.shape {
            generation.shape = shape.clone();
        }
        if let Some(detail) = args.detail {
            generation.detail = detail;
        }
        if let Some(preset) = &args.preset {
            generation.preset = preset.clone();
        }
        if args.seed.is_some() {
            generation.seed = args.seed;
        }
        if let Some(scatter) = args.scatter {
            generation.scatter_amount = scatter;
        }
        if let Some(min) = args.min_vegetation {
            generation.minimum_vegetation_per_rule = min;
        }

        let worker = &mut self.worker;
        if let Some(max) = args.max_detail {
            worker.max_detail = max;
        }
        if let Some(detail) = args.fallback_detail {
            worker.fallback_detail = detail;
        }
        if let Some(serialized) = args.serialized {
            worker.serialized_transfer = serialized;
        }
        if let Some(secs) = args.timeout {
            worker.timeout_seconds = secs;
        }

        if args.output.is_some() {
            self.output.path = args.output.clone();
        }
        if let Some(level) = &args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs::parse_from([
            "biosphere",
            "--shape",
            "plane",
            "--detail",
            "24",
            "--seed",
            "42",
            "--serialized",
            "true",
            "-o",
            "planet.json",
        ]);
        config.apply_cli_overrides(&args);

        assert_eq!(config.generation.shape, "plane");
        assert_eq!(config.generation.detail, 24);
        assert_eq!(config.generation.seed, Some(42));
        assert!(config.worker.serialized_transfer);
        assert_eq!(config.output.path, Some(PathBuf::from("planet.json")));
        assert_eq!(config.generation.preset, "forest");
        assert_eq!(config.worker.max_detail, 64);
    }

    #[test]
    fn test_cli_no_override() {
        let mut config = Config::default();
        config.generation.seed = Some(5);
        let original = config.clone();
        config.apply_cli_overrides(&CliArgs::parse_from(["biosphere"]));
        assert_eq!(config, original);
    }

    #[test]
    fn test_config_dir_flag_is_not_a_setting() {
        let args = CliArgs::parse_from(["biosphere", "--config", "/tmp/elsewhere"]);
        let mut config = Config::default();
        config.apply_cli_overrides(&args);
        assert_eq!(config, Config::default());
        assert_eq!(args.config, Some(PathBuf::from("/tmp/elsewhere")));
    }
}
