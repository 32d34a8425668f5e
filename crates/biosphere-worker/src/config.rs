//! Worker configuration.

use biosphere_mesh::DEFAULT_MAX_DETAIL;
use serde::{Deserialize, Serialize};

use crate::protocol::TransferMode;

/// Settings for one [`crate::PlanetMesher`] and its worker thread.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Requests above this detail fail and fall back.
    pub max_detail: u32,
    /// Detail of the fallback sphere, further capped at one below the failed request.
    pub fallback_detail: u32,
    pub transfer: TransferMode,
    /// Name given to the worker thread.
    pub thread_name: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_detail: DEFAULT_MAX_DETAIL,
            fallback_detail: 2,
            transfer: TransferMode::Owned,
            thread_name: "planet-mesher".to_string(),
        }
    }
}
