//! Vegetation rule definitions: where a kind of plant or rock may appear.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Broad category of a vegetation rule. Rocks are placed slightly less often.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VegetationKind {
    /// Trees, bushes, grasses.
    #[default]
    Plant,
    /// Boulders and stones.
    Rock,
}

/// Local terrain modification around each placed instance: a mound and a color halo.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroundFootprint {
    /// Height added directly under the instance, falling off to zero at `radius`.
    pub raise: f64,
    /// Ground color blended in near the instance.
    pub color: [f32; 3],
    /// Distance at which the footprint fades out entirely.
    pub radius: f64,
}

/// Placement rule for one kind of vegetation.
///
/// Heights are normalized heights (0 at sea level, ±1 at the noise extremes), slopes
/// are angles in radians between the face normal and local up, and distances are
/// measured between un-elevated surface points.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VegetationRule {
    /// Name used as the key of the output placement map.
    pub name: String,
    /// Plant or rock.
    pub kind: VegetationKind,
    /// Relative placement probability per unit surface area. Zero disables the rule.
    pub density: f64,
    /// Lowest normalized height allowed.
    pub minimum_height: Option<f64>,
    /// Highest normalized height allowed.
    pub maximum_height: Option<f64>,
    /// Flattest slope allowed, in radians.
    pub minimum_slope: Option<f64>,
    /// Steepest slope allowed, in radians.
    pub maximum_slope: Option<f64>,
    /// Minimum spacing to other instances of the same rule.
    pub minimum_distance: Option<f64>,
    /// Maximum spacing to the nearest instance of the same rule, once one exists.
    pub maximum_distance: Option<f64>,
    /// Color variants; one is picked per placed instance.
    pub colors: Vec<[f32; 3]>,
    /// Optional mound and color halo around each instance.
    pub ground: Option<GroundFootprint>,
}

impl Default for VegetationRule {
    fn default() -> Self {
        Self {
            name: String::from("vegetation"),
            kind: VegetationKind::Plant,
            density: 0.0,
            minimum_height: None,
            maximum_height: None,
            minimum_slope: None,
            maximum_slope: None,
            minimum_distance: None,
            maximum_distance: None,
            colors: Vec::new(),
            ground: None,
        }
    }
}

impl VegetationRule {
    /// A plant rule with the given name and density and no constraints.
    pub fn plant(name: impl Into<String>, density: f64) -> Self {
        Self {
            name: name.into(),
            density,
            ..Default::default()
        }
    }

    /// A rock rule with the given name and density and no constraints.
    pub fn rock(name: impl Into<String>, density: f64) -> Self {
        Self {
            name: name.into(),
            kind: VegetationKind::Rock,
            density,
            ..Default::default()
        }
    }

    /// Whether any distance constraint is configured.
    pub fn has_distance_bounds(&self) -> bool {
        self.minimum_distance.is_some() || self.maximum_distance.is_some()
    }

    /// Whether `normalized_height` and `steepness` fall inside the configured bounds.
    pub fn accepts_terrain(&self, normalized_height: f64, steepness: f64) -> bool {
        within(normalized_height, self.minimum_height, self.maximum_height)
            && within(steepness, self.minimum_slope, self.maximum_slope)
    }

    /// Return a copy with invalid values replaced, logging what was changed.
    pub fn sanitized(&self) -> Self {
        let mut rule = self.clone();

        if !(rule.density.is_finite() && rule.density >= 0.0) {
            warn!(rule = %rule.name, density = rule.density, "invalid density, disabling rule");
            rule.density = 0.0;
        }

        let finite = |v: Option<f64>| v.filter(|x| x.is_finite());
        rule.minimum_height = finite(rule.minimum_height);
        rule.maximum_height = finite(rule.maximum_height);
        rule.minimum_slope = finite(rule.minimum_slope);
        rule.maximum_slope = finite(rule.maximum_slope);

        let non_negative = |v: Option<f64>| v.filter(|x| x.is_finite() && *x >= 0.0);
        if rule.minimum_distance != non_negative(rule.minimum_distance)
            || rule.maximum_distance != non_negative(rule.maximum_distance)
        {
            warn!(rule = %rule.name, "dropping negative or non-finite distance bound");
        }
        rule.minimum_distance = non_negative(rule.minimum_distance);
        rule.maximum_distance = non_negative(rule.maximum_distance);

        order(&mut rule.minimum_height, &mut rule.maximum_height);
        order(&mut rule.minimum_slope, &mut rule.maximum_slope);
        order(&mut rule.minimum_distance, &mut rule.maximum_distance);

        for color in &mut rule.colors {
            for channel in color.iter_mut() {
                *channel = if channel.is_finite() { channel.clamp(0.0, 1.0) } else { 0.0 };
            }
        }

        if let Some(ground) = rule.ground {
            if !(ground.radius.is_finite() && ground.radius > 0.0 && ground.raise.is_finite()) {
                warn!(rule = %rule.name, radius = ground.radius, "invalid ground footprint, dropping it");
                rule.ground = None;
            }
        }

        rule
    }
}

fn within(value: f64, min: Option<f64>, max: Option<f64>) -> bool {
    min.is_none_or(|m| value >= m) && max.is_none_or(|m| value <= m)
}

fn order(min: &mut Option<f64>, max: &mut Option<f64>) {
    if let (Some(lo), Some(hi)) = (*min, *max) {
        if lo > hi {
            *min = Some(hi);
            *max = Some(lo);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbounded_rule_accepts_everything() {
        let rule = VegetationRule::plant("grass", 1.0);
        assert!(rule.accepts_terrain(-1.0, 0.0));
        assert!(rule.accepts_terrain(1.0, 1.5));
        assert!(!rule.has_distance_bounds());
    }

    #[test]
    fn test_height_and_slope_bounds() {
        let rule = VegetationRule {
            minimum_height: Some(0.1),
            maximum_height: Some(0.6),
            maximum_slope: Some(0.5),
            ..VegetationRule::plant("pine", 1.0)
        };
        assert!(rule.accepts_terrain(0.3, 0.2));
        assert!(!rule.accepts_terrain(0.05, 0.2));
        assert!(!rule.accepts_terrain(0.7, 0.2));
        assert!(!rule.accepts_terrain(0.3, 0.6));
    }

    #[test]
    fn test_sanitize_fixes_invalid_values() {
        let rule = VegetationRule {
            density: -2.0,
            minimum_height: Some(0.8),
            maximum_height: Some(0.2),
            minimum_distance: Some(-1.0),
            maximum_slope: Some(f64::NAN),
            colors: vec![[1.5, -0.2, f32::NAN]],
            ground: Some(GroundFootprint {
                raise: 0.01,
                color: [0.5, 0.5, 0.5],
                radius: 0.0,
            }),
            ..VegetationRule::plant("broken", 1.0)
        }
        .sanitized();

        assert_eq!(rule.density, 0.0);
        assert_eq!(rule.minimum_height, Some(0.2));
        assert_eq!(rule.maximum_height, Some(0.8));
        assert_eq!(rule.minimum_distance, None);
        assert_eq!(rule.maximum_slope, None);
        assert_eq!(rule.colors, vec![[1.0, 0.0, 0.0]]);
        assert!(rule.ground.is_none());
    }

    #[test]
    fn test_rule_deserializes_with_defaults() {
        let rule: VegetationRule = ron::from_str(
            r#"(name: "palm", kind: rock, density: 0.5, minimum_distance: Some(0.1))"#,
        )
        .unwrap();
        assert_eq!(rule.name, "palm");
        assert_eq!(rule.kind, VegetationKind::Rock);
        assert_eq!(rule.minimum_distance, Some(0.1));
        assert!(rule.maximum_distance.is_none());
        assert!(rule.colors.is_empty());
    }
}
