//! The `biosphere` command: turns a [`Config`] into a generated planet.
//!
//! [`run`] maps the config onto a [`GenerationRequest`], hands it to a
//! [`PlanetMesher`], waits for the callback, and optionally writes the mesh out
//! as JSON.

mod platform;

use std::path::Path;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use biosphere_biome::{BiomeOptions, Preset, UnknownPreset};
use biosphere_config::{Config, ConfigError, GenerationConfig};
use biosphere_mesh::{GenerationRequest, Shape, UnknownShape};
use biosphere_worker::{PlanetMesh, PlanetMesher, TransferMode, WorkerError};
use tracing::{info, warn};

pub use platform::AppDirs;

/// How often the wait loop wakes up to check the deadline.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Shape(#[from] UnknownShape),

    #[error("{0} (known: forest, desert, tropical, arctic, barren)")]
    Preset(#[from] UnknownPreset),

    #[error("failed to start worker: {0}")]
    Worker(#[from] WorkerError),

    #[error("no mesh after {0:?}")]
    Timeout(Duration),

    #[error("failed to write {}: {source}", path.display())]
    Output {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode mesh: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Translate the generation section into a request, rejecting unknown names.
pub fn build_request(generation: &GenerationConfig) -> Result<GenerationRequest, AppError> {
    let shape: Shape = generation.shape.parse()?;
    let preset: Preset = generation.preset.parse()?;
    Ok(GenerationRequest {
        shape,
        detail: generation.detail,
        scatter_amount: generation.scatter_amount,
        biome: BiomeOptions {
            seed: generation.seed,
            ..BiomeOptions::preset(preset.name())
        },
        vertex_precision: generation.vertex_precision,
        minimum_vegetation_per_rule: generation.minimum_vegetation_per_rule,
    })
}

/// The worker settings named by `config`.
pub fn worker_config(config: &Config) -> biosphere_worker::WorkerConfig {
    biosphere_worker::WorkerConfig {
        max_detail: config.worker.max_detail,
        fallback_detail: config.worker.fallback_detail,
        transfer: if config.worker.serialized_transfer {
            TransferMode::Serialized
        } else {
            TransferMode::Owned
        },
        ..Default::default()
    }
}

/// Generate one planet on a worker thread and wait for it.
pub fn generate(config: &Config) -> Result<PlanetMesh, AppError> {
    let request = build_request(&config.generation)?;
    let mut mesher = PlanetMesher::new(worker_config(config))?;
    let timeout = Duration::from_secs(config.worker.timeout_seconds);

    let (tx, rx) = mpsc::channel();
    let request_id = mesher.request_mesh(request, move |mesh| {
        // The receiver only goes away after a timeout.
        let _ = tx.send(mesh);
    });
    info!(
        request_id,
        shape = %config.generation.shape,
        detail = config.generation.detail,
        preset = %config.generation.preset,
        "generating planet"
    );

    let deadline = Instant::now() + timeout;
    while mesher.pending_count() > 0 && Instant::now() < deadline {
        mesher.poll_timeout(POLL_INTERVAL);
    }
    rx.try_recv().map_err(|_| AppError::Timeout(timeout))
}

/// Write `mesh` as JSON to `path`.
pub fn write_mesh(mesh: &PlanetMesh, path: &Path, pretty: bool) -> Result<(), AppError> {
    let json = if pretty {
        serde_json::to_string_pretty(mesh)?
    } else {
        serde_json::to_string(mesh)?
    };
    std::fs::write(path, json).map_err(|source| AppError::Output {
        path: path.to_path_buf(),
        source,
    })
}

/// Log what was generated.
pub fn log_summary(mesh: &PlanetMesh) {
    if mesh.fallback {
        warn!(
            request_id = mesh.request_id,
            detail = mesh.detail,
            "generation failed, result is a fallback sphere"
        );
    }
    info!(
        shape = %mesh.shape,
        detail = mesh.detail,
        faces = mesh.stats.faces,
        vertices = mesh.stats.vertices,
        cached_vertices = mesh.stats.cached_vertices,
        placements = mesh.stats.placements,
        backfilled = mesh.stats.backfilled,
        "planet ready"
    );
    for (rule, placements) in &mesh.vegetation {
        info!(rule = %rule, count = placements.len(), "vegetation");
    }
}
