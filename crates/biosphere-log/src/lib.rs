//! Structured logging for the biosphere tools.
//!
//! Installs a `tracing` subscriber with human-readable console output and, in
//! debug builds, a JSON log file. The filter comes from `RUST_LOG` when set,
//! otherwise from the configured log level.

use std::fs::File;
use std::path::Path;

use biosphere_config::Config;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor the config names one.
pub const DEFAULT_FILTER: &str = "info";

/// File written inside `log_dir` in debug builds.
pub const LOG_FILE: &str = "biosphere.log";

/// Install the global subscriber. Call once, early in `main`.
///
/// `log_dir` is only used when `debug_build` is set. If the file cannot be
/// created, logging continues on the console alone.
///
/// ```no_run
/// use biosphere_config::Config;
/// use biosphere_log::init_logging;
///
/// let config = Config::default();
/// init_logging(Some(std::path::Path::new("./logs")), true, Some(&config));
/// ```
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&Config>) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| config_filter(config));

    // The worker thread is named, so thread names tell request and worker logs apart.
    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if debug_build
        && let Some(log_dir) = log_dir
        && let Some(log_file) = open_log_file(log_dir)
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_names(true)
            .with_timer(fmt::time::uptime())
            .json();

        subscriber.with(file_layer).init();
        return;
    }

    subscriber.init();
}

/// The filter built from [`DEFAULT_FILTER`].
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}

/// The configured `debug.log_level`, or [`default_env_filter`] when it is blank.
fn config_filter(config: Option<&Config>) -> EnvFilter {
    match config {
        Some(config) if !config.debug.log_level.trim().is_empty() => {
            EnvFilter::new(&config.debug.log_level)
        }
        _ => default_env_filter(),
    }
}

/// Create `log_dir` and a fresh [`LOG_FILE`] inside it. `None` if either fails.
fn open_log_file(log_dir: &Path) -> Option<File> {
    std::fs::create_dir_all(log_dir).ok()?;
    File::create(log_dir.join(LOG_FILE)).ok()
}
