//! The `biosphere` binary.

use std::process::ExitCode;

use biosphere_app::{AppDirs, AppError};
use biosphere_config::{CliArgs, Config};
use clap::Parser;
use tracing::{error, info};

fn main() -> ExitCode {
    let args = CliArgs::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "biosphere failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &CliArgs) -> Result<(), AppError> {
    let dirs = AppDirs::resolve(args.config.as_deref())?;
    let mut config = Config::load_or_create(&dirs.config_dir)?;
    config.apply_cli_overrides(args);

    biosphere_log::init_logging(Some(&dirs.log_dir), cfg!(debug_assertions), Some(&config));
    info!(config_dir = %dirs.config_dir.display(), "configuration loaded");

    let mesh = biosphere_app::generate(&config)?;
    biosphere_app::log_summary(&mesh);

    if let Some(path) = &config.output.path {
        biosphere_app::write_mesh(&mesh, path, config.output.pretty)?;
        info!(path = %path.display(), "mesh written");
    }
    Ok(())
}
