//! Declarative biome configuration: full configs and preset-plus-override options.

use biosphere_noise::NoiseConfig;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::gradient::ColorStop;
use crate::preset::Preset;
use crate::vegetation::VegetationRule;

/// Seed salts keeping the biome's noise fields decorrelated when reseeded together.
const HEIGHT_SALT: u64 = 0x01;
const SEA_SALT: u64 = 0x02;
const SCATTER_SALT: u64 = 0x03;

/// Complete description of a biome. Every field has a default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiomeConfig {
    /// Human-readable biome name (e.g. `"forest"`).
    pub name: String,
    /// Seed for stochastic vegetation acceptance.
    pub seed: u64,
    /// Terrain height field. Its `min`/`max` also define normalized height.
    pub height: NoiseConfig,
    /// Ocean surface height field.
    pub sea_height: NoiseConfig,
    /// Per-vertex positional jitter field.
    pub scatter: NoiseConfig,
    /// Land colors keyed by normalized height.
    pub land_colors: Vec<ColorStop>,
    /// Ocean colors keyed by the normalized height of the terrain below.
    pub sea_colors: Vec<ColorStop>,
    /// Optional tint soft-lit onto steep land faces.
    pub tint: Option<[f32; 3]>,
    /// Vegetation rules, evaluated in order.
    pub vegetation: Vec<VegetationRule>,
}

impl Default for BiomeConfig {
    fn default() -> Self {
        Preset::Forest.config()
    }
}

/// A preset name plus optional overrides of any [`BiomeConfig`] field.
///
/// Fields left as `None` keep the preset's value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiomeOptions {
    /// Preset to start from. `None` means the default preset.
    pub preset: Option<String>,
    /// Reseeds every noise field and the vegetation RNG.
    pub seed: Option<u64>,
    /// Replaces the terrain height field.
    pub height: Option<NoiseConfig>,
    /// Replaces the ocean surface field.
    pub sea_height: Option<NoiseConfig>,
    /// Replaces the scatter field.
    pub scatter: Option<NoiseConfig>,
    /// Replaces the land gradient.
    pub land_colors: Option<Vec<ColorStop>>,
    /// Replaces the sea gradient.
    pub sea_colors: Option<Vec<ColorStop>>,
    /// Replaces the tint.
    pub tint: Option<[f32; 3]>,
    /// Replaces the vegetation rule set.
    pub vegetation: Option<Vec<VegetationRule>>,
}

impl BiomeOptions {
    /// Options selecting a preset by name with no overrides.
    pub fn preset(name: impl Into<String>) -> Self {
        Self {
            preset: Some(name.into()),
            ..Default::default()
        }
    }

    /// Resolve into a full configuration.
    ///
    /// Unknown preset names fall back to the default preset with a warning.
    pub fn resolve(&self) -> BiomeConfig {
        let preset = match self.preset.as_deref() {
            None => Preset::default(),
            Some(name) => name.parse::<Preset>().unwrap_or_else(|err| {
                warn!(%err, fallback = Preset::default().name(), "falling back to default preset");
                Preset::default()
            }),
        };

        let mut config = preset.config();
        if let Some(height) = &self.height {
            config.height = height.clone();
        }
        if let Some(sea_height) = &self.sea_height {
            config.sea_height = sea_height.clone();
        }
        if let Some(scatter) = &self.scatter {
            config.scatter = scatter.clone();
        }
        if let Some(land_colors) = &self.land_colors {
            config.land_colors = land_colors.clone();
        }
        if let Some(sea_colors) = &self.sea_colors {
            config.sea_colors = sea_colors.clone();
        }
        if let Some(tint) = self.tint {
            config.tint = Some(tint);
        }
        if let Some(vegetation) = &self.vegetation {
            config.vegetation = vegetation.clone();
        }
        if let Some(seed) = self.seed {
            config = config.reseeded(seed);
        }
        config
    }
}

impl BiomeConfig {
    /// Return a copy with every noise field and the vegetation RNG derived from `seed`.
    pub fn reseeded(mut self, seed: u64) -> Self {
        self.seed = seed;
        self.height = NoiseConfig {
            seed,
            ..self.height
        }
        .reseeded(HEIGHT_SALT);
        self.sea_height = NoiseConfig {
            seed,
            ..self.sea_height
        }
        .reseeded(SEA_SALT);
        self.scatter = NoiseConfig {
            seed,
            ..self.scatter
        }
        .reseeded(SCATTER_SALT);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_options_resolve_to_default_preset() {
        assert_eq!(BiomeOptions::default().resolve(), Preset::default().config());
    }

    #[test]
    fn test_preset_by_name() {
        let config = BiomeOptions::preset("desert").resolve();
        assert_eq!(config.name, "desert");
    }

    #[test]
    fn test_unknown_preset_falls_back() {
        let config = BiomeOptions::preset("volcanic-moon").resolve();
        assert_eq!(config, Preset::default().config());
    }

    #[test]
    fn test_overrides_replace_preset_fields() {
        let options = BiomeOptions {
            preset: Some("tropical".into()),
            tint: Some([0.9, 0.1, 0.1]),
            vegetation: Some(vec![VegetationRule::plant("moss", 2.0)]),
            height: Some(NoiseConfig {
                octaves: 2,
                ..NoiseConfig::terrain_height()
            }),
            ..Default::default()
        };
        let config = options.resolve();
        assert_eq!(config.name, "tropical");
        assert_eq!(config.tint, Some([0.9, 0.1, 0.1]));
        assert_eq!(config.vegetation.len(), 1);
        assert_eq!(config.vegetation[0].name, "moss");
        assert_eq!(config.height.octaves, 2);
        assert_eq!(config.sea_colors, Preset::Tropical.config().sea_colors);
    }

    #[test]
    fn test_seed_override_reseeds_all_fields() {
        let base = BiomeOptions::preset("forest").resolve();
        let a = BiomeOptions {
            seed: Some(11),
            ..BiomeOptions::preset("forest")
        }
        .resolve();
        let b = BiomeOptions {
            seed: Some(12),
            ..BiomeOptions::preset("forest")
        }
        .resolve();

        assert_eq!(a.seed, 11);
        assert_ne!(a.height.seed, b.height.seed);
        assert_ne!(a.height.seed, a.sea_height.seed);
        assert_ne!(a.sea_height.seed, a.scatter.seed);
        assert_eq!(a.height.octaves, base.height.octaves);
    }

    #[test]
    fn test_options_deserialize_from_ron() {
        let options: BiomeOptions =
            ron::from_str(r#"(preset: Some("arctic"), seed: Some(3))"#).unwrap();
        assert_eq!(options.preset.as_deref(), Some("arctic"));
        assert_eq!(options.resolve().seed, 3);
    }
}
