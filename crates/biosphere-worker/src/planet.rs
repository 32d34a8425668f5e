//! The finished mesh descriptor handed to callers.

use std::collections::BTreeMap;

use biosphere_mesh::{
    GenerationRequest, GenerationResult, GenerationStats, MeshBuffers, OceanBuffers, Shape,
    VegetationPlacement,
};
use serde::{Deserialize, Serialize};

use crate::protocol::RequestId;

/// A generated planet: terrain, ocean shell, and vegetation placements.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanetMesh {
    pub request_id: RequestId,
    pub shape: Shape,
    pub detail: u32,
    pub terrain: MeshBuffers,
    pub ocean: OceanBuffers,
    pub vegetation: BTreeMap<String, Vec<VegetationPlacement>>,
    pub stats: GenerationStats,
    /// `true` when this is a substitute for a request that failed.
    pub fallback: bool,
}

impl PlanetMesh {
    pub fn from_result(
        request_id: RequestId,
        request: &GenerationRequest,
        result: GenerationResult,
        fallback: bool,
    ) -> Self {
        Self {
            request_id,
            shape: request.shape,
            detail: request.detail,
            terrain: result.terrain,
            ocean: result.ocean,
            vegetation: result.vegetation,
            stats: result.stats,
            fallback,
        }
    }

    pub fn face_count(&self) -> usize {
        self.terrain.face_count()
    }

    /// Total placements across all rules.
    pub fn placement_count(&self) -> usize {
        self.vegetation.values().map(Vec::len).sum()
    }
}
