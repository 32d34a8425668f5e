//! Built-in biome presets.

use std::str::FromStr;

use biosphere_noise::{Gain, NoiseConfig};

use crate::config::BiomeConfig;
use crate::gradient::{ColorStop, hex_to_rgb};
use crate::vegetation::{GroundFootprint, VegetationRule};

/// A named, ready-to-use biome configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Preset {
    /// Temperate hills with pines, oaks, and scattered boulders.
    #[default]
    Forest,
    /// Dunes and mesas with cacti and dry shrubs.
    Desert,
    /// Low islands with palms ringed by sand, and ferns.
    Tropical,
    /// Snowfields with sparse spruce and ice boulders.
    Arctic,
    /// Bare rock with occasional boulders.
    Barren,
}

/// Error returned when a preset name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown biome preset: {0}")]
pub struct UnknownPreset(pub String);

impl Preset {
    /// Every preset, in declaration order.
    pub const ALL: [Preset; 5] = [
        Preset::Forest,
        Preset::Desert,
        Preset::Tropical,
        Preset::Arctic,
        Preset::Barren,
    ];

    /// Canonical lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Preset::Forest => "forest",
            Preset::Desert => "desert",
            Preset::Tropical => "tropical",
            Preset::Arctic => "arctic",
            Preset::Barren => "barren",
        }
    }

    /// Build the full configuration for this preset.
    pub fn config(self) -> BiomeConfig {
        match self {
            Preset::Forest => forest(),
            Preset::Desert => desert(),
            Preset::Tropical => tropical(),
            Preset::Arctic => arctic(),
            Preset::Barren => barren(),
        }
    }
}

impl FromStr for Preset {
    type Err = UnknownPreset;

    /// Case-insensitive; a trailing `-preset` is accepted (`"forest-preset"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let name = lower.strip_suffix("-preset").unwrap_or(&lower);
        Preset::ALL
            .into_iter()
            .find(|p| p.name() == name)
            .ok_or_else(|| UnknownPreset(s.to_string()))
    }
}

fn base(name: &str) -> BiomeConfig {
    BiomeConfig {
        name: name.to_string(),
        seed: 0,
        height: NoiseConfig::terrain_height(),
        sea_height: NoiseConfig::sea_height(),
        scatter: NoiseConfig::scatter(),
        land_colors: Vec::new(),
        sea_colors: vec![
            ColorStop::hex(-1.0, 0x0B1E4A),
            ColorStop::hex(-0.3, 0x1A4F8B),
            ColorStop::hex(0.0, 0x3FA7C9),
            ColorStop::hex(1.0, 0x7FD4E0),
        ],
        tint: None,
        vegetation: Vec::new(),
    }
}

fn forest() -> BiomeConfig {
    BiomeConfig {
        land_colors: vec![
            ColorStop::hex(-1.0, 0x4A4332),
            ColorStop::hex(-0.05, 0xC2B280),
            ColorStop::hex(0.04, 0xD8C99B),
            ColorStop::hex(0.1, 0x5E8C31),
            ColorStop::hex(0.5, 0x2F5A1E),
            ColorStop::hex(0.8, 0x6B6660),
            ColorStop::hex(1.0, 0xF2F4F7),
        ],
        tint: Some(hex_to_rgb(0x5A4A3A)),
        vegetation: vec![
            VegetationRule {
                minimum_height: Some(0.15),
                maximum_height: Some(0.75),
                maximum_slope: Some(0.6),
                minimum_distance: Some(0.05),
                colors: vec![hex_to_rgb(0x1F4D2B), hex_to_rgb(0x2A5E34), hex_to_rgb(0x183D22)],
                ground: Some(GroundFootprint {
                    raise: 0.002,
                    color: hex_to_rgb(0x3B2F1E),
                    radius: 0.04,
                }),
                ..VegetationRule::plant("pine", 1.4)
            },
            VegetationRule {
                minimum_height: Some(0.08),
                maximum_height: Some(0.45),
                maximum_slope: Some(0.45),
                minimum_distance: Some(0.07),
                colors: vec![hex_to_rgb(0x4C7A2A), hex_to_rgb(0x6A8F2F)],
                ..VegetationRule::plant("oak", 0.9)
            },
            VegetationRule {
                minimum_height: Some(-0.1),
                minimum_distance: Some(0.1),
                colors: vec![hex_to_rgb(0x7A7570), hex_to_rgb(0x8E8A84)],
                ..VegetationRule::rock("rock", 0.5)
            },
        ],
        ..base("forest")
    }
}

fn desert() -> BiomeConfig {
    BiomeConfig {
        height: NoiseConfig {
            min: -0.03,
            max: 0.08,
            octaves: 5,
            gain: Gain::Varying {
                min: 0.3,
                max: 0.6,
                scale: 2.0,
            },
            warp: 0.6,
            power: 2.0,
            ..NoiseConfig::terrain_height()
        },
        land_colors: vec![
            ColorStop::hex(-1.0, 0x8A6F47),
            ColorStop::hex(0.0, 0xE3C28A),
            ColorStop::hex(0.4, 0xD9A25F),
            ColorStop::hex(0.8, 0xB5653A),
            ColorStop::hex(1.0, 0x8C4A2F),
        ],
        tint: Some(hex_to_rgb(0xA0522D)),
        vegetation: vec![
            VegetationRule {
                minimum_height: Some(0.05),
                maximum_slope: Some(0.35),
                minimum_distance: Some(0.12),
                colors: vec![hex_to_rgb(0x4F7942), hex_to_rgb(0x5B8A4A)],
                ..VegetationRule::plant("cactus", 0.5)
            },
            VegetationRule {
                minimum_height: Some(0.02),
                minimum_distance: Some(0.05),
                maximum_distance: Some(0.3),
                colors: vec![hex_to_rgb(0x9C8A5A)],
                ..VegetationRule::plant("dry-bush", 0.7)
            },
            VegetationRule {
                minimum_slope: Some(0.1),
                minimum_distance: Some(0.08),
                colors: vec![hex_to_rgb(0xA0522D), hex_to_rgb(0x8B4513)],
                ..VegetationRule::rock("rock", 0.6)
            },
        ],
        ..base("desert")
    }
}

fn tropical() -> BiomeConfig {
    BiomeConfig {
        height: NoiseConfig {
            min: -0.08,
            max: 0.06,
            ..NoiseConfig::terrain_height()
        },
        land_colors: vec![
            ColorStop::hex(-1.0, 0x6B5B3E),
            ColorStop::hex(0.0, 0xF4E1A8),
            ColorStop::hex(0.15, 0xE8D08A),
            ColorStop::hex(0.3, 0x3D9A3D),
            ColorStop::hex(1.0, 0x1E6B2E),
        ],
        sea_colors: vec![
            ColorStop::hex(-1.0, 0x05386B),
            ColorStop::hex(-0.2, 0x0F7FA8),
            ColorStop::hex(0.0, 0x40E0D0),
            ColorStop::hex(1.0, 0x9FF3E8),
        ],
        vegetation: vec![
            VegetationRule {
                minimum_height: Some(0.02),
                maximum_height: Some(0.6),
                maximum_slope: Some(0.5),
                minimum_distance: Some(0.06),
                colors: vec![hex_to_rgb(0x2E8B57), hex_to_rgb(0x3CB371)],
                ground: Some(GroundFootprint {
                    raise: 0.003,
                    color: hex_to_rgb(0xF4E1A8),
                    radius: 0.06,
                }),
                ..VegetationRule::plant("palm", 1.2)
            },
            VegetationRule {
                minimum_height: Some(0.2),
                minimum_distance: Some(0.03),
                maximum_distance: Some(0.2),
                colors: vec![hex_to_rgb(0x228B22)],
                ..VegetationRule::plant("fern", 1.0)
            },
        ],
        ..base("tropical")
    }
}

fn arctic() -> BiomeConfig {
    BiomeConfig {
        height: NoiseConfig {
            min: -0.05,
            max: 0.12,
            octaves: 6,
            power: 1.2,
            ..NoiseConfig::terrain_height()
        },
        land_colors: vec![
            ColorStop::hex(-1.0, 0x50606E),
            ColorStop::hex(0.0, 0xBFD3E0),
            ColorStop::hex(0.3, 0xE8F0F5),
            ColorStop::hex(1.0, 0xFFFFFF),
        ],
        sea_colors: vec![
            ColorStop::hex(-1.0, 0x0A1A2F),
            ColorStop::hex(0.0, 0x3C6E8F),
            ColorStop::hex(1.0, 0xA8C8DC),
        ],
        tint: Some(hex_to_rgb(0x4A5A6A)),
        vegetation: vec![
            VegetationRule {
                minimum_height: Some(0.05),
                maximum_height: Some(0.4),
                maximum_slope: Some(0.5),
                minimum_distance: Some(0.08),
                colors: vec![hex_to_rgb(0x2F4F3F), hex_to_rgb(0x3A5F4A)],
                ground: Some(GroundFootprint {
                    raise: 0.0,
                    color: hex_to_rgb(0xDDE6EC),
                    radius: 0.03,
                }),
                ..VegetationRule::plant("spruce", 0.6)
            },
            VegetationRule {
                minimum_distance: Some(0.1),
                colors: vec![hex_to_rgb(0xCFE3F0), hex_to_rgb(0xB0C8D8)],
                ..VegetationRule::rock("ice-rock", 0.4)
            },
        ],
        ..base("arctic")
    }
}

fn barren() -> BiomeConfig {
    BiomeConfig {
        height: NoiseConfig {
            min: -0.02,
            max: 0.09,
            octaves: 5,
            warp: 0.8,
            power: 1.0,
            ..NoiseConfig::terrain_height()
        },
        land_colors: vec![
            ColorStop::hex(-1.0, 0x3A3633),
            ColorStop::hex(0.0, 0x6E6760),
            ColorStop::hex(1.0, 0xA59D94),
        ],
        tint: Some(hex_to_rgb(0x2A2624)),
        vegetation: vec![VegetationRule {
            minimum_distance: Some(0.15),
            colors: vec![hex_to_rgb(0x595350)],
            ..VegetationRule::rock("boulder", 0.3)
        }],
        ..base("barren")
    }
}
