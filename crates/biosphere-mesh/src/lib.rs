//! Planet mesh generation: tessellation, displacement, shading, and vegetation.
//!
//! [`MeshGenerator::generate`] runs two passes over the faces of a base [`Shape`].
//! Pass 1 displaces every vertex by the biome's height and scatter fields (memoized
//! in a [`VertexCache`] so shared corners match exactly), shades each face, and
//! places vegetation stochastically. After backfilling sparse rules, pass 2 applies
//! the ground footprints of placed vegetation to the terrain.

mod buffers;
mod cache;
mod error;
mod generator;
mod request;
mod result;
mod shape;

pub use buffers::{COMPONENTS, FACE_STRIDE, MeshBuffers, OceanBuffers};
pub use cache::{MAX_PRECISION, VertexCache, VertexKey, VertexRecord};
pub use error::GenerationError;
pub use generator::{DEFAULT_MAX_DETAIL, MeshGenerator};
pub use request::{DEFAULT_DETAIL, GenerationRequest};
pub use result::{GenerationResult, GenerationStats, VegetationPlacement};
pub use shape::{Shape, Triangle, UnknownShape};
