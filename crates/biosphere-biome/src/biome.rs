//! Runtime biome: noise fields, gradients, and the vegetation placement state for one pass.

use std::f64::consts::{FRAC_PI_2, PI};

use biosphere_noise::NoiseField;
use biosphere_spatial::SpatialIndex;
use glam::{DVec3, Vec3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::config::BiomeConfig;
use crate::gradient::{Color, ColorGradient, blend_colors, soft_light};
use crate::vegetation::{VegetationKind, VegetationRule};

/// Converts `density · face_area` into a per-face acceptance probability.
const PLACEMENT_SCALE: f64 = 12.0;

/// Rocks are slightly rarer than plants at equal density.
const ROCK_PROBABILITY_FACTOR: f64 = 0.9;

/// Search radius for distance checks when a rule sets neither distance bound.
const DEFAULT_SEARCH_RADIUS: f64 = 1.0;

/// Grid cell size of the placement index, in mesh units.
const INDEX_CELL_SIZE: f64 = 0.1;

/// Offsets giving the three scatter axes independent samples of one field.
const SCATTER_OFFSETS: [DVec3; 3] = [
    DVec3::new(1000.0, 0.0, 0.0),
    DVec3::new(0.0, 2000.0, 0.0),
    DVec3::new(0.0, 0.0, 3000.0),
];

/// Offset of the tide morph target sample relative to the resting ocean sample.
const SEA_MORPH_OFFSET: DVec3 = DVec3::new(157.0, -91.0, 43.0);

/// A biome instantiated for one generation request.
///
/// Holds the noise fields and gradients derived from a [`BiomeConfig`] plus the
/// mutable placement state (spatial index, per-rule counts, RNG) of the current
/// vegetation pass. Build a fresh one per request.
pub struct Biome {
    name: String,
    height: NoiseField,
    sea_height: NoiseField,
    scatter: NoiseField,
    land_colors: ColorGradient,
    sea_colors: ColorGradient,
    tint: Option<Color>,
    rules: Vec<VegetationRule>,
    placements: SpatialIndex<usize>,
    counts: Vec<usize>,
    rng: ChaCha8Rng,
    max_ground_radius: f64,
}

impl Biome {
    pub fn new(config: &BiomeConfig) -> Self {
        let rules: Vec<VegetationRule> = config.vegetation.iter().map(|r| r.sanitized()).collect();
        let max_ground_radius = rules
            .iter()
            .filter_map(|r| r.ground.map(|g| g.radius))
            .fold(0.0, f64::max);

        debug!(
            biome = %config.name,
            seed = config.seed,
            rules = rules.len(),
            "building biome"
        );

        Self {
            name: config.name.clone(),
            height: NoiseField::new(config.height.clone()),
            sea_height: NoiseField::new(config.sea_height.clone()),
            scatter: NoiseField::new(config.scatter.clone()),
            land_colors: ColorGradient::new(&config.land_colors),
            sea_colors: ColorGradient::new(&config.sea_colors),
            tint: config
                .tint
                .map(|t| Vec3::from_array(t).clamp(Vec3::ZERO, Vec3::ONE)),
            counts: vec![0; rules.len()],
            rules,
            placements: SpatialIndex::new(INDEX_CELL_SIZE),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            max_ground_radius,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The sanitized vegetation rules, in evaluation order.
    pub fn rules(&self) -> &[VegetationRule] {
        &self.rules
    }

    /// Number of placements recorded so far for `rule_index`.
    pub fn placement_count(&self, rule_index: usize) -> usize {
        self.counts.get(rule_index).copied().unwrap_or(0)
    }

    /// The `(min, max)` raw range of the terrain height field.
    pub fn height_range(&self) -> (f64, f64) {
        let cfg = self.height.config();
        (cfg.min, cfg.max)
    }

    /// Raw terrain height at `point`.
    pub fn height_at(&self, point: DVec3) -> f64 {
        self.height.sample(point)
    }

    /// Resting ocean surface height at `point`.
    pub fn sea_height_at(&self, point: DVec3) -> f64 {
        self.sea_height.sample(point)
    }

    /// Ocean surface height of the tide morph target at `point`.
    pub fn sea_morph_height_at(&self, point: DVec3) -> f64 {
        self.sea_height.sample(point + SEA_MORPH_OFFSET)
    }

    /// Positional jitter at `point`, each axis in `[-amount, amount]` for the
    /// default scatter range.
    pub fn scatter_at(&self, point: DVec3, amount: f64) -> DVec3 {
        DVec3::new(
            self.scatter.sample(point + SCATTER_OFFSETS[0]),
            self.scatter.sample(point + SCATTER_OFFSETS[1]),
            self.scatter.sample(point + SCATTER_OFFSETS[2]),
        ) * amount
    }

    /// Map a raw height to `[-1, 1]`: 0 at sea level, ±1 at the field's extremes.
    pub fn normalized_height(&self, raw: f64) -> f64 {
        let (min, max) = self.height_range();
        let n = if raw > 0.0 {
            if max > 0.0 { raw / max } else { 1.0 }
        } else if raw < 0.0 {
            if min < 0.0 { raw / -min } else { -1.0 }
        } else {
            0.0
        };
        if n.is_nan() { 0.0 } else { n.clamp(-1.0, 1.0) }
    }

    /// Land color for a face. Steep faces blend toward the soft-lit tint.
    pub fn color_at(&self, normalized_height: f64, steepness: f64) -> Color {
        let color = self.land_colors.get(normalized_height as f32);
        match self.tint {
            Some(tint) => {
                let weight = (steepness / FRAC_PI_2).clamp(0.0, 1.0) as f32;
                blend_colors(color, soft_light(color, tint), weight)
            }
            None => color,
        }
    }

    /// Ocean color above terrain of the given normalized height.
    pub fn sea_color_at(&self, normalized_height: f64) -> Color {
        self.sea_colors.get(normalized_height as f32)
    }

    /// Stochastically place an instance of rule `rule_index` at `point`.
    ///
    /// `point` is the un-elevated surface point. Returns the chosen color variant
    /// when the placement is accepted and recorded.
    pub fn try_place_vegetation(
        &mut self,
        rule_index: usize,
        point: DVec3,
        normalized_height: f64,
        steepness: f64,
        face_area: f64,
    ) -> Option<Color> {
        let rule = self.rules.get(rule_index)?;
        if rule.density <= 0.0 {
            return None;
        }

        let mut probability = rule.density * face_area * PLACEMENT_SCALE;
        if rule.kind == VegetationKind::Rock {
            probability *= ROCK_PROBABILITY_FACTOR;
        }
        if self.rng.random::<f64>() > probability {
            return None;
        }

        if !rule.accepts_terrain(normalized_height, steepness) {
            return None;
        }
        if !self.distance_allows(rule_index, point) {
            return None;
        }

        Some(self.place_unchecked(rule_index, point))
    }

    /// Whether `point` satisfies the height, slope, and minimum-distance bounds of
    /// rule `rule_index`. Consumes no randomness.
    pub fn satisfies_constraints(
        &self,
        rule_index: usize,
        point: DVec3,
        normalized_height: f64,
        steepness: f64,
    ) -> bool {
        let Some(rule) = self.rules.get(rule_index) else {
            return false;
        };
        if !rule.accepts_terrain(normalized_height, steepness) {
            return false;
        }
        match rule.minimum_distance {
            Some(min) => self
                .closest_rule_distance(rule_index, point, min)
                .is_none_or(|d| d >= min),
            None => true,
        }
    }

    /// Record a placement without any checks and return its color variant.
    pub fn place_unchecked(&mut self, rule_index: usize, point: DVec3) -> Color {
        let color = match self.rules.get(rule_index) {
            Some(rule) if !rule.colors.is_empty() => {
                let pick = self.rng.random_range(0..rule.colors.len());
                Vec3::from_array(rule.colors[pick])
            }
            _ => Vec3::ONE,
        };
        self.placements.insert(point, rule_index);
        if let Some(count) = self.counts.get_mut(rule_index) {
            *count += 1;
        }
        color
    }

    /// Distance from `point` to the closest placement of any rule within `search_radius`.
    pub fn closest_vegetation_distance(&self, point: DVec3, search_radius: f64) -> Option<f64> {
        self.placements
            .nearest(point, search_radius, |_| true)
            .map(|(_, d)| d)
    }

    /// Distance from `point` to the closest placement of rule `rule_index` within
    /// `search_radius`.
    pub fn closest_rule_distance(
        &self,
        rule_index: usize,
        point: DVec3,
        search_radius: f64,
    ) -> Option<f64> {
        self.placements
            .nearest(point, search_radius, |r| *r == rule_index)
            .map(|(_, d)| d)
    }

    /// Height added at `point` by the ground footprints of nearby placements.
    pub fn ground_raise(&self, point: DVec3) -> f64 {
        if self.max_ground_radius <= 0.0 {
            return 0.0;
        }
        self.placements
            .query_radius(point, self.max_ground_radius)
            .into_iter()
            .filter_map(|entry| {
                let ground = self.rules.get(entry.payload)?.ground?;
                let d = entry.position.distance(point);
                (d < ground.radius).then(|| ground.raise * ((PI * d / ground.radius).cos() + 1.0) * 0.5)
            })
            .sum()
    }

    /// `color` blended toward the footprint colors of nearby placements, each with
    /// weight falling linearly from 1 at the placement to 0 at its radius.
    pub fn ground_color(&self, point: DVec3, color: Color) -> Color {
        if self.max_ground_radius <= 0.0 {
            return color;
        }
        self.placements
            .query_radius(point, self.max_ground_radius)
            .into_iter()
            .fold(color, |acc, entry| {
                let Some(ground) = self.rules.get(entry.payload).and_then(|r| r.ground) else {
                    return acc;
                };
                let d = entry.position.distance(point);
                if d >= ground.radius {
                    return acc;
                }
                let weight = (1.0 - d / ground.radius) as f32;
                blend_colors(acc, Vec3::from_array(ground.color), weight)
            })
    }

    fn distance_allows(&self, rule_index: usize, point: DVec3) -> bool {
        let Some(rule) = self.rules.get(rule_index) else {
            return false;
        };
        if !rule.has_distance_bounds() {
            return true;
        }

        let closest = self.closest_rule_distance(rule_index, point, search_radius(rule));

        if let (Some(d), Some(min)) = (closest, rule.minimum_distance) {
            if d < min {
                return false;
            }
        }
        if rule.maximum_distance.is_some() && self.placement_count(rule_index) > 0 {
            return closest.is_some_and(|d| rule.maximum_distance.is_some_and(|max| d <= max));
        }
        true
    }
}

/// How far a distance check has to look. Without a maximum only neighbors
/// closer than the minimum can reject, so the search stops there.
fn search_radius(rule: &VegetationRule) -> f64 {
    match (rule.maximum_distance, rule.minimum_distance) {
        (Some(max), min) => max.max(min.unwrap_or(0.0)),
        (None, Some(min)) => min,
        (None, None) => DEFAULT_SEARCH_RADIUS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BiomeConfig;
    use crate::gradient::ColorStop;
    use crate::vegetation::GroundFootprint;
    use biosphere_noise::NoiseConfig;

    fn config_with_rules(rules: Vec<VegetationRule>) -> BiomeConfig {
        BiomeConfig {
            vegetation: rules,
            seed: 42,
            ..BiomeConfig::default()
        }
    }

    /// Deterministic points spread over the unit sphere (Fibonacci lattice).
    fn sphere_points(n: usize) -> Vec<DVec3> {
        let golden = PI * (3.0 - 5.0_f64.sqrt());
        (0..n)
            .map(|i| {
                let y = 1.0 - 2.0 * (i as f64 + 0.5) / n as f64;
                let r = (1.0 - y * y).sqrt();
                let theta = golden * i as f64;
                DVec3::new(r * theta.cos(), y, r * theta.sin())
            })
            .collect()
    }

    #[test]
    fn test_heights_within_configured_range() {
        let biome = Biome::new(&BiomeConfig::default());
        let (min, max) = biome.height_range();
        for p in sphere_points(500) {
            let h = biome.height_at(p);
            assert!(h >= min - 1e-12 && h <= max + 1e-12, "{h} outside [{min}, {max}]");
            let n = biome.normalized_height(h);
            assert!((-1.0..=1.0).contains(&n));
        }
    }

    #[test]
    fn test_normalized_height_mapping() {
        let biome = Biome::new(&BiomeConfig {
            height: NoiseConfig {
                min: -0.05,
                max: 0.1,
                ..NoiseConfig::terrain_height()
            },
            ..BiomeConfig::default()
        });
        assert_eq!(biome.normalized_height(0.0), 0.0);
        assert!((biome.normalized_height(0.05) - 0.5).abs() < 1e-12);
        assert!((biome.normalized_height(-0.025) + 0.5).abs() < 1e-12);
        assert_eq!(biome.normalized_height(1.0), 1.0);
        assert_eq!(biome.normalized_height(f64::NAN), 0.0);
    }

    #[test]
    fn test_sea_morph_differs_from_rest() {
        let biome = Biome::new(&BiomeConfig::default());
        let differs = sphere_points(50)
            .into_iter()
            .any(|p| biome.sea_height_at(p) != biome.sea_morph_height_at(p));
        assert!(differs);
    }

    #[test]
    fn test_scatter_scales_with_amount() {
        let biome = Biome::new(&BiomeConfig::default());
        let p = DVec3::new(0.3, 0.8, -0.5).normalize();
        assert_eq!(biome.scatter_at(p, 0.0), DVec3::ZERO);
        let s = biome.scatter_at(p, 0.01);
        assert!(s.abs().max_element() <= 0.01);
    }

    #[test]
    fn test_tint_applies_on_steep_faces_only() {
        let biome = Biome::new(&BiomeConfig {
            land_colors: vec![ColorStop::new(0.0, [0.6, 0.6, 0.6])],
            tint: Some([0.0, 0.0, 0.0]),
            ..BiomeConfig::default()
        });
        let flat = biome.color_at(0.2, 0.0);
        let steep = biome.color_at(0.2, FRAC_PI_2);
        assert!((flat - Vec3::splat(0.6)).abs().max_element() < 1e-6);
        assert!(steep.x < flat.x);
    }

    #[test]
    fn test_zero_density_never_places() {
        let mut biome = Biome::new(&config_with_rules(vec![VegetationRule::plant("none", 0.0)]));
        for p in sphere_points(200) {
            assert!(biome.try_place_vegetation(0, p, 0.5, 0.0, 1.0).is_none());
        }
        assert_eq!(biome.placement_count(0), 0);
    }

    #[test]
    fn test_minimum_height_respected() {
        let rule = VegetationRule {
            minimum_height: Some(0.5),
            ..VegetationRule::plant("alpine", 100.0)
        };
        let mut biome = Biome::new(&config_with_rules(vec![rule]));
        let mut accepted = 0;
        for (i, p) in sphere_points(400).into_iter().enumerate() {
            let h = -1.0 + 2.0 * (i as f64 / 399.0);
            if biome.try_place_vegetation(0, p, h, 0.0, 1.0).is_some() {
                assert!(h >= 0.5, "accepted at normalized height {h}");
                accepted += 1;
            }
        }
        assert!(accepted > 0);
    }

    #[test]
    fn test_minimum_distance_respected() {
        let rule = VegetationRule {
            minimum_distance: Some(0.2),
            ..VegetationRule::plant("spaced", 100.0)
        };
        let mut biome = Biome::new(&config_with_rules(vec![rule]));
        let mut placed = Vec::new();
        for p in sphere_points(2000) {
            if biome.try_place_vegetation(0, p, 0.0, 0.0, 1.0).is_some() {
                placed.push(p);
            }
        }
        assert!(placed.len() > 10);
        for (i, a) in placed.iter().enumerate() {
            for b in &placed[i + 1..] {
                assert!(a.distance(*b) >= 0.2, "{a} and {b} are too close");
            }
        }
    }

    #[test]
    fn test_search_radius_follows_bounds() {
        let rule = |min, max| VegetationRule {
            minimum_distance: min,
            maximum_distance: max,
            ..VegetationRule::plant("r", 1.0)
        };
        assert_eq!(search_radius(&rule(Some(0.05), None)), 0.05);
        assert_eq!(search_radius(&rule(Some(0.05), Some(0.3))), 0.3);
        assert_eq!(search_radius(&rule(Some(0.5), Some(0.3))), 0.5);
        assert_eq!(search_radius(&rule(None, None)), DEFAULT_SEARCH_RADIUS);
    }

    #[test]
    fn test_minimum_only_rejects_up_to_the_minimum() {
        let rule = VegetationRule {
            minimum_distance: Some(0.05),
            ..VegetationRule::plant("tight", 100.0)
        };
        let mut biome = Biome::new(&config_with_rules(vec![rule]));
        let p = DVec3::new(0.0, 1.0, 0.0);
        assert!(biome.try_place_vegetation(0, p, 0.0, 0.0, 1.0).is_some());
        let near = p + DVec3::new(0.04, 0.0, 0.0);
        let far = p + DVec3::new(0.06, 0.0, 0.0);
        assert!(biome.try_place_vegetation(0, near, 0.0, 0.0, 1.0).is_none());
        assert!(biome.try_place_vegetation(0, far, 0.0, 0.0, 1.0).is_some());
    }

    #[test]
    fn test_maximum_distance_rejects_isolated_points() {
        let rule = VegetationRule {
            maximum_distance: Some(0.1),
            ..VegetationRule::plant("clustered", 100.0)
        };
        let mut biome = Biome::new(&config_with_rules(vec![rule]));
        let origin = DVec3::new(0.0, 1.0, 0.0);
        assert!(biome.try_place_vegetation(0, origin, 0.0, 0.0, 1.0).is_some());
        assert!(
            biome
                .try_place_vegetation(0, DVec3::new(0.0, -1.0, 0.0), 0.0, 0.0, 1.0)
                .is_none()
        );
        assert!(
            biome
                .try_place_vegetation(0, origin + DVec3::new(0.05, 0.0, 0.0), 0.0, 0.0, 1.0)
                .is_some()
        );
    }

    #[test]
    fn test_distance_checks_are_per_rule() {
        let spaced = |name: &str| VegetationRule {
            minimum_distance: Some(0.5),
            ..VegetationRule::plant(name, 100.0)
        };
        let mut biome = Biome::new(&config_with_rules(vec![spaced("a"), spaced("b")]));
        let p = DVec3::new(1.0, 0.0, 0.0);
        assert!(biome.try_place_vegetation(0, p, 0.0, 0.0, 1.0).is_some());
        assert!(biome.try_place_vegetation(1, p, 0.0, 0.0, 1.0).is_some());
        assert!(biome.try_place_vegetation(0, p, 0.0, 0.0, 1.0).is_none());
        assert_eq!(biome.closest_vegetation_distance(p, 0.1), Some(0.0));
    }

    #[test]
    fn test_satisfies_constraints_is_side_effect_free() {
        let rule = VegetationRule {
            maximum_slope: Some(0.3),
            minimum_distance: Some(0.2),
            ..VegetationRule::plant("flat", 1.0)
        };
        let mut biome = Biome::new(&config_with_rules(vec![rule]));
        let p = DVec3::X;
        assert!(biome.satisfies_constraints(0, p, 0.0, 0.1));
        assert!(!biome.satisfies_constraints(0, p, 0.0, 0.5));
        biome.place_unchecked(0, p);
        assert!(!biome.satisfies_constraints(0, p + DVec3::new(0.0, 0.1, 0.0), 0.0, 0.1));
        assert!(!biome.satisfies_constraints(7, p, 0.0, 0.0));
        assert_eq!(biome.placement_count(0), 1);
    }

    #[test]
    fn test_ground_footprint_falloff() {
        let rule = VegetationRule {
            colors: vec![[0.0, 1.0, 0.0]],
            ground: Some(GroundFootprint {
                raise: 0.01,
                color: [1.0, 0.0, 0.0],
                radius: 0.1,
            }),
            ..VegetationRule::plant("mound", 1.0)
        };
        let mut biome = Biome::new(&config_with_rules(vec![rule]));
        let p = DVec3::Y;
        assert_eq!(biome.place_unchecked(0, p), Vec3::new(0.0, 1.0, 0.0));

        assert!((biome.ground_raise(p) - 0.01).abs() < 1e-12);
        let half = biome.ground_raise(p + DVec3::new(0.05, 0.0, 0.0));
        assert!((half - 0.005).abs() < 1e-9);
        assert_eq!(biome.ground_raise(p + DVec3::new(0.2, 0.0, 0.0)), 0.0);

        let base = Vec3::new(0.0, 0.0, 1.0);
        assert_eq!(biome.ground_color(p, base), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(biome.ground_color(p + DVec3::new(0.2, 0.0, 0.0), base), base);
    }

    #[test]
    fn test_same_seed_same_placements() {
        let run = || {
            let mut biome = Biome::new(&config_with_rules(vec![VegetationRule::plant("p", 0.05)]));
            sphere_points(300)
                .into_iter()
                .map(|p| biome.try_place_vegetation(0, p, 0.0, 0.0, 1.0).is_some())
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }
}
