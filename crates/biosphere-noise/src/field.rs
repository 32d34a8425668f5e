//! Multi-octave fractal Brownian motion (fBm) noise field over simplex noise.

use glam::DVec3;
use noise::{NoiseFn, Simplex};

use crate::config::{Gain, NoiseConfig};

/// Per-axis translations for the domain-warp samples. Large and irrational-looking
/// so that the three warp components are decorrelated from each other and from the
/// main sample.
const WARP_OFFSETS: [DVec3; 3] = [
    DVec3::new(31.416, 0.0, 0.0),
    DVec3::new(0.0, 47.853, 0.0),
    DVec3::new(0.0, 0.0, 63.291),
];

/// Salt mixed into the seed of the secondary gain field.
const GAIN_SEED_SALT: u64 = 0xDEAD_BEEF;

/// A deterministic scalar field over 3D space with output in `[min, max]`.
///
/// Evaluation order: scale, domain warp, fBm accumulation (normalized by total
/// amplitude), power shaping, then linear remap from `[-1, 1]` to `[min, max]`.
pub struct NoiseField {
    noise: Simplex,
    config: NoiseConfig,
    gain_field: Option<Box<NoiseField>>,
}

impl NoiseField {
    /// Build a field from `config`. The config is sanitized first, so this never fails.
    pub fn new(config: NoiseConfig) -> Self {
        let config = config.sanitized();
        let noise = Simplex::new(simplex_seed(config.seed));

        let gain_field = match config.gain {
            Gain::Constant(_) => None,
            Gain::Varying { min, max, scale } => Some(Box::new(NoiseField::new(NoiseConfig {
                min,
                max,
                octaves: 1,
                gain: Gain::Constant(0.5),
                warp: 0.0,
                scale,
                power: 1.0,
                seed: config.seed.wrapping_add(GAIN_SEED_SALT),
                ..NoiseConfig::default()
            }))),
        };

        Self {
            noise,
            config,
            gain_field,
        }
    }

    /// Sample the field at `point`. Always in `[min, max]`.
    pub fn sample(&self, point: DVec3) -> f64 {
        let cfg = &self.config;
        let normalized = self.sample_normalized(point);
        let t = (normalized + 1.0) * 0.5;
        cfg.min + t * (cfg.max - cfg.min)
    }

    /// Sample the field before the final remap, in `[-1, 1]`.
    pub fn sample_normalized(&self, point: DVec3) -> f64 {
        let cfg = &self.config;
        let mut p = point * cfg.scale;

        if cfg.warp > 0.0 {
            let warp = DVec3::new(
                self.base(p + WARP_OFFSETS[0]),
                self.base(p + WARP_OFFSETS[1]),
                self.base(p + WARP_OFFSETS[2]),
            );
            p += warp * cfg.warp;
        }

        let mut value = if cfg.octaves > 1 {
            let gain = match &self.gain_field {
                Some(field) => field.sample(point),
                None => match cfg.gain {
                    Gain::Constant(g) => g,
                    Gain::Varying { min, max, .. } => (min + max) * 0.5,
                },
            };
            self.fbm(p, gain)
        } else {
            self.base(p)
        };

        if cfg.power != 1.0 {
            value = value.signum() * value.abs().powf(cfg.power);
        }

        value.clamp(-1.0, 1.0)
    }

    /// The configuration in effect after sanitization.
    pub fn config(&self) -> &NoiseConfig {
        &self.config
    }

    fn base(&self, p: DVec3) -> f64 {
        self.noise.get([p.x, p.y, p.z])
    }

    fn fbm(&self, p: DVec3, gain: f64) -> f64 {
        let mut total = 0.0;
        let mut norm = 0.0;
        let mut frequency = 1.0;
        let mut amplitude = 1.0;

        for _ in 0..self.config.octaves {
            total += self.base(p * frequency) * amplitude;
            norm += amplitude;
            frequency *= self.config.lacunarity;
            amplitude *= gain;
        }

        if norm > 0.0 { total / norm } else { 0.0 }
    }
}

impl NoiseFn<f64, 3> for NoiseField {
    fn get(&self, point: [f64; 3]) -> f64 {
        self.sample(DVec3::from_array(point))
    }
}

/// `Simplex` takes a 32-bit seed; fold the high half in so every bit of the
/// 64-bit seed matters.
fn simplex_seed(seed: u64) -> u32 {
    (seed ^ (seed >> 32)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_points() -> impl Iterator<Item = DVec3> {
        (0..200).map(|i| {
            let t = i as f64 * 0.37;
            DVec3::new(t.sin(), (t * 1.3).cos(), (t * 0.7).sin() * 0.5).normalize()
        })
    }

    #[test]
    fn test_determinism_same_seed_same_point() {
        let a = NoiseField::new(NoiseConfig::terrain_height());
        let b = NoiseField::new(NoiseConfig::terrain_height());
        for p in sample_points() {
            assert_eq!(a.sample(p).to_bits(), b.sample(p).to_bits());
            assert_eq!(a.sample(p).to_bits(), a.sample(p).to_bits());
        }
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = NoiseField::new(NoiseConfig {
            seed: 1,
            ..NoiseConfig::terrain_height()
        });
        let b = NoiseField::new(NoiseConfig {
            seed: 999,
            ..NoiseConfig::terrain_height()
        });
        let differing = sample_points()
            .filter(|p| (a.sample(*p) - b.sample(*p)).abs() > 1e-12)
            .count();
        assert!(differing > 100, "only {differing} points differ between seeds");
    }

    #[test]
    fn test_high_seed_bits_matter() {
        let low = 42_u64;
        let high = low | (7 << 40);
        assert_ne!(simplex_seed(low), simplex_seed(high));

        let a = NoiseField::new(NoiseConfig {
            seed: low,
            ..NoiseConfig::terrain_height()
        });
        let b = NoiseField::new(NoiseConfig {
            seed: high,
            ..NoiseConfig::terrain_height()
        });
        assert!(sample_points().any(|p| a.sample(p) != b.sample(p)));
    }

    #[test]
    fn test_output_within_range() {
        let cfg = NoiseConfig {
            min: -3.0,
            max: 5.0,
            octaves: 6,
            warp: 0.8,
            power: 0.5,
            gain: Gain::Varying {
                min: 0.2,
                max: 0.9,
                scale: 3.0,
            },
            ..Default::default()
        };
        let field = NoiseField::new(cfg);
        for p in sample_points() {
            let v = field.sample(p * 10.0);
            assert!((-3.0..=5.0).contains(&v), "sample {v} out of range");
        }
    }

    #[test]
    fn test_degenerate_range_is_constant() {
        let field = NoiseField::new(NoiseConfig {
            min: 0.25,
            max: 0.25,
            octaves: 3,
            ..Default::default()
        });
        for p in sample_points() {
            assert_eq!(field.sample(p), 0.25);
        }
    }

    #[test]
    fn test_warp_changes_output() {
        let plain = NoiseField::new(NoiseConfig {
            octaves: 2,
            ..Default::default()
        });
        let warped = NoiseField::new(NoiseConfig {
            octaves: 2,
            warp: 0.5,
            ..Default::default()
        });
        let differing = sample_points()
            .filter(|p| (plain.sample(*p) - warped.sample(*p)).abs() > 1e-9)
            .count();
        assert!(differing > 100);
    }

    #[test]
    fn test_power_preserves_sign() {
        let linear = NoiseField::new(NoiseConfig::default());
        let shaped = NoiseField::new(NoiseConfig {
            power: 2.0,
            ..Default::default()
        });
        for p in sample_points() {
            let a = linear.sample_normalized(p);
            let b = shaped.sample_normalized(p);
            assert!(a * b >= 0.0, "power shaping flipped sign: {a} vs {b}");
            assert!(b.abs() <= a.abs() + 1e-12, "power > 1 must flatten: {a} vs {b}");
        }
    }

    #[test]
    fn test_more_octaves_adds_detail() {
        let step = 0.01;
        let one = NoiseField::new(NoiseConfig {
            seed: 7,
            ..Default::default()
        });
        let many = NoiseField::new(NoiseConfig {
            seed: 7,
            octaves: 8,
            gain: Gain::Constant(0.7),
            ..Default::default()
        });

        let roughness = |field: &NoiseField| {
            (0..2000)
                .map(|i| {
                    let x = i as f64 * step;
                    let a = field.sample_normalized(DVec3::new(x, 0.3, 0.1));
                    let b = field.sample_normalized(DVec3::new(x + step, 0.3, 0.1));
                    (b - a).abs()
                })
                .sum::<f64>()
        };

        assert!(roughness(&many) > roughness(&one));
    }

    #[test]
    fn test_noise_fn_matches_sample() {
        let field = NoiseField::new(NoiseConfig::terrain_height());
        let p = DVec3::new(0.2, -0.4, 0.9);
        assert_eq!(field.get([p.x, p.y, p.z]), field.sample(p));
    }

    #[test]
    fn test_invalid_config_is_sanitized_not_fatal() {
        let field = NoiseField::new(NoiseConfig {
            octaves: 0,
            scale: -1.0,
            ..Default::default()
        });
        assert_eq!(field.config().octaves, 1);
        assert_eq!(field.config().scale, 1.0);
        assert!(field.sample(DVec3::ONE).is_finite());
    }
}
