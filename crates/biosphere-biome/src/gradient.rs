//! Piecewise-linear color gradients and color blend helpers.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Linear RGB color with channels in `[0, 1]`.
pub type Color = Vec3;

/// One breakpoint of a [`ColorGradient`], as it appears in configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    /// Position along the gradient axis.
    pub position: f32,
    /// Linear RGB color at `position`.
    pub color: [f32; 3],
}

impl ColorStop {
    /// Create a stop from a position and a color.
    pub const fn new(position: f32, color: [f32; 3]) -> Self {
        Self { position, color }
    }

    /// Create a stop from a position and a `0xRRGGBB` hex color.
    pub fn hex(position: f32, rgb: u32) -> Self {
        Self::new(position, hex_to_rgb(rgb))
    }
}

/// Convert a `0xRRGGBB` value into `[r, g, b]` with channels in `[0, 1]`.
pub fn hex_to_rgb(rgb: u32) -> [f32; 3] {
    [
        ((rgb >> 16) & 0xFF) as f32 / 255.0,
        ((rgb >> 8) & 0xFF) as f32 / 255.0,
        (rgb & 0xFF) as f32 / 255.0,
    ]
}

/// Colors interpolated linearly between sorted breakpoints.
///
/// Positions before the first stop or after the last clamp to the endpoint color.
#[derive(Clone, Debug, Default)]
pub struct ColorGradient {
    stops: Vec<(f32, Color)>,
}

impl ColorGradient {
    /// Build a gradient, sorting stops ascending by position.
    ///
    /// Stops with a NaN position are dropped. Channels are clamped to `[0, 1]`.
    pub fn new(stops: &[ColorStop]) -> Self {
        let mut sorted: Vec<(f32, Color)> = stops
            .iter()
            .filter(|stop| {
                let valid = !stop.position.is_nan();
                if !valid {
                    warn!("dropping color stop with NaN position");
                }
                valid
            })
            .map(|stop| {
                let color = Vec3::from_array(stop.color).clamp(Vec3::ZERO, Vec3::ONE);
                (stop.position, color)
            })
            .collect();
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self { stops: sorted }
    }

    /// The color at `position`. Black for an empty gradient.
    pub fn get(&self, position: f32) -> Color {
        let (first, last) = match (self.stops.first(), self.stops.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Vec3::ZERO,
        };
        if position.is_nan() || position <= first.0 {
            return first.1;
        }
        if position >= last.0 {
            return last.1;
        }

        // First stop strictly above `position`; the loop guards above keep this in
        // `1..len`.
        let upper = self.stops.partition_point(|(p, _)| *p <= position);
        let (p1, c1) = self.stops[upper - 1];
        let (p2, c2) = self.stops[upper];

        let span = p2 - p1;
        let ratio = if span > 0.0 { (position - p1) / span } else { 0.0 };
        c1.lerp(c2, ratio)
    }

    /// Number of stops.
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// Returns `true` if the gradient has no stops.
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }
}

/// Soft-light blend of `tint` over `base`, per channel.
///
/// Dark tint channels darken, bright ones lighten, and a mid-gray tint is neutral.
pub fn soft_light(base: Color, tint: Color) -> Color {
    let channel = |a: f32, t: f32| {
        let a = a.clamp(0.0, 1.0);
        if t < 0.5 {
            a - (1.0 - 2.0 * t) * a * (1.0 - a)
        } else {
            a + (2.0 * t - 1.0) * (a.sqrt() - a)
        }
    };
    Vec3::new(
        channel(base.x, tint.x),
        channel(base.y, tint.y),
        channel(base.z, tint.z),
    )
}

/// Linear blend between two colors. `w = 0.0` returns `a`, `w = 1.0` returns `b`.
pub fn blend_colors(a: Color, b: Color, w: f32) -> Color {
    a.lerp(b, w.clamp(0.0, 1.0))
}
