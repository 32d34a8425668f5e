//! Generation request parameters.

use biosphere_biome::BiomeOptions;
use serde::{Deserialize, Serialize};

use crate::shape::Shape;

/// Subdivision level used when a request does not specify one.
pub const DEFAULT_DETAIL: u32 = 10;

/// Everything needed to generate one planet mesh.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationRequest {
    pub shape: Shape,
    /// Subdivision level. Face count grows with `(detail + 1)²`.
    pub detail: u32,
    /// Maximum per-axis vertex jitter, in mesh units.
    pub scatter_amount: f64,
    pub biome: BiomeOptions,
    /// Decimal digits kept when matching shared vertices.
    pub vertex_precision: u32,
    /// Rules with fewer placements than this are backfilled. `0` disables backfill.
    pub minimum_vegetation_per_rule: usize,
}

impl Default for GenerationRequest {
    fn default() -> Self {
        Self {
            shape: Shape::Sphere,
            detail: DEFAULT_DETAIL,
            scatter_amount: 0.003,
            biome: BiomeOptions::default(),
            vertex_precision: 5,
            minimum_vegetation_per_rule: 3,
        }
    }
}

impl GenerationRequest {
    /// A sphere at `detail` using the named biome preset.
    pub fn sphere(detail: u32, preset: &str) -> Self {
        Self {
            shape: Shape::Sphere,
            detail,
            biome: BiomeOptions::preset(preset),
            ..Default::default()
        }
    }

    /// A flat grid at `detail` using the named biome preset.
    pub fn plane(detail: u32, preset: &str) -> Self {
        Self {
            shape: Shape::Plane,
            ..Self::sphere(detail, preset)
        }
    }
}
