//! Deterministic 3D noise fields: fractal Brownian motion over simplex noise with
//! domain warping, spatially varying gain, and power shaping.
//!
//! A [`NoiseField`] is a pure function of its [`NoiseConfig`] and the sample point,
//! so identical seeds always produce bit-identical values.

mod config;
mod field;

pub use config::{Gain, NoiseConfig};
pub use field::NoiseField;
