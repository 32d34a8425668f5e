//! Messages exchanged between the control thread and the worker thread.
//!
//! Both directions serialize as JSON objects tagged by `type`:
//! `generate` requests, and `result` or `error` responses.

use std::collections::BTreeMap;

use biosphere_mesh::{
    GenerationRequest, GenerationResult, GenerationStats, MeshBuffers, OceanBuffers,
    VegetationPlacement,
};
use serde::{Deserialize, Serialize};

/// Identifies one generation request. Monotonic per [`crate::PlanetMesher`].
pub type RequestId = u64;

/// Control thread to worker.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WorkerRequest {
    Generate {
        request_id: RequestId,
        options: GenerationRequest,
    },
}

/// Terrain and ocean buffers as they appear under `buffers` in a result message.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultBuffers {
    pub terrain: MeshBuffers,
    pub ocean: OceanBuffers,
}

/// Worker to control thread.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WorkerResponse {
    Result {
        request_id: RequestId,
        buffers: ResultBuffers,
        vegetation: BTreeMap<String, Vec<VegetationPlacement>>,
        stats: GenerationStats,
    },
    Error {
        request_id: RequestId,
        message: String,
    },
}

impl WorkerResponse {
    pub fn from_result(request_id: RequestId, result: GenerationResult) -> Self {
        WorkerResponse::Result {
            request_id,
            buffers: ResultBuffers {
                terrain: result.terrain,
                ocean: result.ocean,
            },
            vegetation: result.vegetation,
            stats: result.stats,
        }
    }

    pub fn request_id(&self) -> RequestId {
        match self {
            WorkerResponse::Result { request_id, .. } | WorkerResponse::Error { request_id, .. } => {
                *request_id
            }
        }
    }

    /// The generated result, or the worker's error message.
    pub fn into_outcome(self) -> Result<GenerationResult, String> {
        match self {
            WorkerResponse::Result {
                buffers,
                vegetation,
                stats,
                ..
            } => Ok(GenerationResult {
                terrain: buffers.terrain,
                ocean: buffers.ocean,
                vegetation,
                stats,
            }),
            WorkerResponse::Error { message, .. } => Err(message),
        }
    }
}

/// How responses cross the channel back to the control thread.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferMode {
    /// Move the buffers by ownership; no copy.
    #[default]
    Owned,
    /// Encode every response as JSON text and decode it on the control thread.
    Serialized,
}

/// A response in transit.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    /// The response moved as-is.
    Transferred(WorkerResponse),
    /// JSON text of a [`WorkerResponse`]. The id travels outside the text so a
    /// payload that fails to decode can still be matched to its caller.
    Serialized { request_id: RequestId, json: String },
}

impl Payload {
    pub fn request_id(&self) -> RequestId {
        match self {
            Payload::Transferred(response) => response.request_id(),
            Payload::Serialized { request_id, .. } => *request_id,
        }
    }
}
