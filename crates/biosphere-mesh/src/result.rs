//! Generation output: buffers, vegetation placements, and statistics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::buffers::{MeshBuffers, OceanBuffers};

/// One placed vegetation instance.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VegetationPlacement {
    /// The point the spacing constraints were checked against: the face
    /// midpoint before displacement.
    pub position: [f32; 3],
    /// Centroid of the final (displaced) terrain face, where a model stands.
    pub surface: [f32; 3],
    /// Local up direction at the placement.
    pub normal: [f32; 3],
    /// Chosen color variant.
    pub color: [f32; 3],
    /// Index of the terrain face the instance stands on.
    pub face: usize,
}

/// Counters describing a finished generation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub faces: usize,
    pub vertices: usize,
    /// Distinct vertices after deduplication.
    pub cached_vertices: usize,
    pub placements: usize,
    /// Placements added by backfill rather than stochastic acceptance.
    pub backfilled: usize,
}

/// Terrain and ocean buffers plus vegetation keyed by rule name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub terrain: MeshBuffers,
    pub ocean: OceanBuffers,
    pub vegetation: BTreeMap<String, Vec<VegetationPlacement>>,
    pub stats: GenerationStats,
}

impl GenerationResult {
    pub fn face_count(&self) -> usize {
        self.terrain.face_count()
    }

    /// Whether every buffer holds `3 × faces` vertices with matching array lengths.
    pub fn is_consistent(&self) -> bool {
        self.terrain.is_consistent()
            && self.ocean.is_consistent()
            && self.ocean.surface.positions.len() == self.terrain.positions.len()
            && self.stats.vertices == self.terrain.vertex_count()
    }
}
