//! Biomes: the noise, color, and vegetation configuration that gives a planet its theme.
//!
//! A [`Biome`] is built from a [`BiomeConfig`] once per generation request. It answers
//! height, color, and vegetation-placement queries for the mesh generator and keeps
//! a spatial index of everything it has placed so far.

mod biome;
mod config;
mod gradient;
mod preset;
mod vegetation;

pub use biome::Biome;
pub use config::{BiomeConfig, BiomeOptions};
pub use gradient::{Color, ColorGradient, ColorStop, blend_colors, soft_light};
pub use preset::{Preset, UnknownPreset};
pub use vegetation::{GroundFootprint, VegetationKind, VegetationRule};
