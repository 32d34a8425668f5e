//! Noise configuration with serde defaults and range sanitization.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Upper bound on octave count. Beyond this, octaves fall below `f64` resolution
/// for any sensible lacunarity.
const MAX_OCTAVES: u32 = 16;

/// Amplitude multiplier between successive octaves.
///
/// Either a constant, or a range sampled from a secondary noise field so that
/// roughness varies across the surface.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Gain {
    /// The same gain everywhere.
    Constant(f64),
    /// Gain remapped from a secondary noise field into `[min, max]`.
    Varying {
        /// Gain where the secondary field is at its minimum.
        min: f64,
        /// Gain where the secondary field is at its maximum.
        max: f64,
        /// Spatial scale of the secondary field.
        scale: f64,
    },
}

impl Default for Gain {
    fn default() -> Self {
        Gain::Constant(0.5)
    }
}

/// Configuration for a [`crate::NoiseField`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    /// Output value when the underlying noise is at -1.
    pub min: f64,
    /// Output value when the underlying noise is at +1.
    pub max: f64,
    /// Number of fBm octaves. At least 1.
    pub octaves: u32,
    /// Frequency multiplier between successive octaves.
    pub lacunarity: f64,
    /// Amplitude multiplier between successive octaves.
    pub gain: Gain,
    /// Domain warp strength. Zero disables warping.
    pub warp: f64,
    /// Input coordinate multiplier applied before any other step.
    pub scale: f64,
    /// Shaping exponent applied to the normalized value, sign preserved.
    pub power: f64,
    /// Seed for the underlying simplex permutation table.
    pub seed: u64,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            min: -1.0,
            max: 1.0,
            octaves: 1,
            lacunarity: 2.0,
            gain: Gain::default(),
            warp: 0.0,
            scale: 1.0,
            power: 1.0,
            seed: 0,
        }
    }
}

impl NoiseConfig {
    /// Defaults for terrain height: four warped octaves sharpened by `power = 1.5`.
    pub fn terrain_height() -> Self {
        Self {
            min: -0.06,
            max: 0.1,
            octaves: 4,
            lacunarity: 2.0,
            gain: Gain::Constant(0.5),
            warp: 0.3,
            scale: 1.5,
            power: 1.5,
            seed: 0,
        }
    }

    /// Defaults for the ocean surface: a gentle, single octave swell.
    pub fn sea_height() -> Self {
        Self {
            min: -0.004,
            max: 0.004,
            octaves: 1,
            scale: 6.0,
            seed: 1,
            ..Default::default()
        }
    }

    /// Defaults for the per-vertex scatter field.
    pub fn scatter() -> Self {
        Self {
            octaves: 1,
            scale: 40.0,
            seed: 2,
            ..Default::default()
        }
    }

    /// Return a copy with every field forced into its valid range.
    ///
    /// Out-of-range values are replaced by the nearest valid value (or the
    /// default when no sensible neighbour exists) and a warning is logged.
    pub fn sanitized(&self) -> Self {
        let mut cfg = self.clone();

        if !cfg.min.is_finite() || !cfg.max.is_finite() {
            warn!(min = cfg.min, max = cfg.max, "non-finite noise range, using [-1, 1]");
            cfg.min = -1.0;
            cfg.max = 1.0;
        }
        if cfg.min > cfg.max {
            warn!(min = cfg.min, max = cfg.max, "noise range inverted, swapping");
            std::mem::swap(&mut cfg.min, &mut cfg.max);
        }
        if cfg.octaves == 0 || cfg.octaves > MAX_OCTAVES {
            let clamped = cfg.octaves.clamp(1, MAX_OCTAVES);
            warn!(octaves = cfg.octaves, clamped, "noise octaves out of range");
            cfg.octaves = clamped;
        }
        if !(cfg.lacunarity.is_finite() && cfg.lacunarity > 0.0) {
            warn!(lacunarity = cfg.lacunarity, "invalid lacunarity, using 2.0");
            cfg.lacunarity = 2.0;
        }
        if !(cfg.warp.is_finite() && cfg.warp >= 0.0) {
            warn!(warp = cfg.warp, "invalid warp, disabling");
            cfg.warp = 0.0;
        }
        if !(cfg.scale.is_finite() && cfg.scale > 0.0) {
            warn!(scale = cfg.scale, "invalid scale, using 1.0");
            cfg.scale = 1.0;
        }
        if !(cfg.power.is_finite() && cfg.power > 0.0) {
            warn!(power = cfg.power, "invalid power, using 1.0");
            cfg.power = 1.0;
        }
        cfg.gain = match cfg.gain {
            Gain::Constant(g) if !(g.is_finite() && g >= 0.0) => {
                warn!(gain = g, "invalid gain, using 0.5");
                Gain::Constant(0.5)
            }
            Gain::Varying { min, max, scale } => {
                let (mut lo, mut hi) = if min.is_finite() && max.is_finite() {
                    (min, max)
                } else {
                    warn!(min, max, "non-finite gain range, using [0.5, 0.5]");
                    (0.5, 0.5)
                };
                if lo > hi {
                    std::mem::swap(&mut lo, &mut hi);
                }
                let scale = if scale.is_finite() && scale > 0.0 {
                    scale
                } else {
                    warn!(scale, "invalid gain scale, using 1.0");
                    1.0
                };
                Gain::Varying {
                    min: lo.max(0.0),
                    max: hi.max(0.0),
                    scale,
                }
            }
            other => other,
        };

        cfg
    }

    /// Return a copy whose seed is mixed with `salt`, for deriving decorrelated fields.
    pub fn reseeded(&self, salt: u64) -> Self {
        Self {
            seed: self.seed.wrapping_mul(0x9E37_79B9_7F4A_7C15).wrapping_add(salt),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_already_sane() {
        for cfg in [
            NoiseConfig::default(),
            NoiseConfig::terrain_height(),
            NoiseConfig::sea_height(),
            NoiseConfig::scatter(),
        ] {
            assert_eq!(cfg.sanitized(), cfg);
        }
    }

    #[test]
    fn test_terrain_height_documented_defaults() {
        let cfg = NoiseConfig::terrain_height();
        assert_eq!(cfg.octaves, 4);
        assert_eq!(cfg.lacunarity, 2.0);
        assert_eq!(cfg.warp, 0.3);
        assert_eq!(cfg.power, 1.5);
    }

    #[test]
    fn test_sanitize_clamps_out_of_range_fields() {
        let cfg = NoiseConfig {
            min: 2.0,
            max: -2.0,
            octaves: 0,
            lacunarity: -1.0,
            gain: Gain::Constant(f64::NAN),
            warp: -0.5,
            scale: 0.0,
            power: -3.0,
            seed: 9,
        }
        .sanitized();

        assert_eq!(cfg.min, -2.0);
        assert_eq!(cfg.max, 2.0);
        assert_eq!(cfg.octaves, 1);
        assert_eq!(cfg.lacunarity, 2.0);
        assert_eq!(cfg.gain, Gain::Constant(0.5));
        assert_eq!(cfg.warp, 0.0);
        assert_eq!(cfg.scale, 1.0);
        assert_eq!(cfg.power, 1.0);
        assert_eq!(cfg.seed, 9);
    }

    #[test]
    fn test_sanitize_orders_varying_gain() {
        let cfg = NoiseConfig {
            gain: Gain::Varying {
                min: 0.7,
                max: 0.2,
                scale: -1.0,
            },
            ..Default::default()
        }
        .sanitized();
        assert_eq!(
            cfg.gain,
            Gain::Varying {
                min: 0.2,
                max: 0.7,
                scale: 1.0
            }
        );
    }

    #[test]
    fn test_gain_deserializes_from_scalar_or_range() {
        let constant: Gain = serde_json::from_str("0.4").unwrap();
        assert_eq!(constant, Gain::Constant(0.4));

        let varying: Gain = serde_json::from_str(r#"{"min":0.3,"max":0.6,"scale":2.0}"#).unwrap();
        assert_eq!(
            varying,
            Gain::Varying {
                min: 0.3,
                max: 0.6,
                scale: 2.0
            }
        );
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let cfg: NoiseConfig = serde_json::from_str(r#"{"octaves":3,"seed":5}"#).unwrap();
        assert_eq!(cfg.octaves, 3);
        assert_eq!(cfg.seed, 5);
        assert_eq!(cfg.lacunarity, 2.0);
        assert_eq!(cfg.scale, 1.0);
    }

    #[test]
    fn test_reseeded_changes_only_seed() {
        let base = NoiseConfig::terrain_height();
        let derived = base.reseeded(7);
        assert_ne!(derived.seed, base.seed);
        assert_eq!(NoiseConfig { seed: base.seed, ..derived }, base);
    }
}
