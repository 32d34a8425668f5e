//! Base tessellations: a subdivided icosahedron and a flat grid.

use std::fmt;
use std::str::FromStr;

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// A triangle given by its three corners, wound counter-clockwise seen from outside.
pub type Triangle = [DVec3; 3];

/// The twelve icosahedron corners before projection onto the unit sphere.
const ICOSAHEDRON_CORNERS: [[f64; 3]; 12] = {
    const T: f64 = 1.618_033_988_749_895;
    [
        [-1.0, T, 0.0],
        [1.0, T, 0.0],
        [-1.0, -T, 0.0],
        [1.0, -T, 0.0],
        [0.0, -1.0, T],
        [0.0, 1.0, T],
        [0.0, -1.0, -T],
        [0.0, 1.0, -T],
        [T, 0.0, -1.0],
        [T, 0.0, 1.0],
        [-T, 0.0, -1.0],
        [-T, 0.0, 1.0],
    ]
};

#[rustfmt::skip]
const ICOSAHEDRON_FACES: [[usize; 3]; 20] = [
    [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
    [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
    [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
    [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
];

/// Base shape to tessellate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    /// Unit sphere from a subdivided icosahedron; up is the radial direction.
    #[default]
    Sphere,
    /// `[-1, 1]²` grid in the XZ plane; up is `+Y`.
    Plane,
}

/// Error returned when parsing an unrecognized shape name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown shape: {0} (expected \"sphere\" or \"plane\")")]
pub struct UnknownShape(pub String);

impl Shape {
    pub fn name(self) -> &'static str {
        match self {
            Shape::Sphere => "sphere",
            Shape::Plane => "plane",
        }
    }

    /// Number of triangles produced at `detail`.
    pub fn face_count(self, detail: u32) -> usize {
        let segments = detail as usize + 1;
        match self {
            Shape::Sphere => 20 * segments * segments,
            Shape::Plane => 2 * segments * segments,
        }
    }

    /// Local up direction at `point`.
    pub fn up(self, point: DVec3) -> DVec3 {
        match self {
            Shape::Sphere => point.try_normalize().unwrap_or(DVec3::Y),
            Shape::Plane => DVec3::Y,
        }
    }

    /// The point at which per-face fields are sampled: the midpoint, projected
    /// back onto the sphere for [`Shape::Sphere`].
    pub fn surface_point(self, triangle: &Triangle) -> DVec3 {
        let mid = (triangle[0] + triangle[1] + triangle[2]) / 3.0;
        match self {
            Shape::Sphere => mid.try_normalize().unwrap_or(mid),
            Shape::Plane => mid,
        }
    }

    /// Non-indexed triangles at `detail`. Shared corners are repeated per face.
    pub fn faces(self, detail: u32) -> Vec<Triangle> {
        match self {
            Shape::Sphere => icosphere(detail),
            Shape::Plane => grid(detail),
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Shape {
    type Err = UnknownShape;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sphere" => Ok(Shape::Sphere),
            "plane" => Ok(Shape::Plane),
            _ => Err(UnknownShape(s.to_string())),
        }
    }
}

/// Split each icosahedron face into `(detail + 1)²` triangles on a barycentric
/// grid, then project every corner onto the unit sphere.
fn icosphere(detail: u32) -> Vec<Triangle> {
    let corners = ICOSAHEDRON_CORNERS.map(|c| DVec3::from_array(c).normalize());
    let cols = detail as usize + 1;
    let mut out = Vec::with_capacity(Shape::Sphere.face_count(detail));

    for [a, b, c] in ICOSAHEDRON_FACES {
        let (a, b, c) = (corners[a], corners[b], corners[c]);

        // rows[i][j]: i steps from edge ab toward c, j steps along the row.
        let rows: Vec<Vec<DVec3>> = (0..=cols)
            .map(|i| {
                let t = i as f64 / cols as f64;
                let start = a.lerp(c, t);
                let end = b.lerp(c, t);
                let len = cols - i;
                (0..=len)
                    .map(|j| {
                        if len == 0 {
                            start
                        } else {
                            start.lerp(end, j as f64 / len as f64)
                        }
                    })
                    .collect()
            })
            .collect();

        for i in 0..cols {
            for j in 0..2 * (cols - i) - 1 {
                let k = j / 2;
                let tri = if j % 2 == 0 {
                    [rows[i][k + 1], rows[i + 1][k], rows[i][k]]
                } else {
                    [rows[i][k + 1], rows[i + 1][k + 1], rows[i + 1][k]]
                };
                out.push(tri.map(DVec3::normalize));
            }
        }
    }
    out
}

/// Two triangles per cell of a `(detail + 1)²` grid over `[-1, 1]²` in XZ.
fn grid(detail: u32) -> Vec<Triangle> {
    let segments = detail as usize + 1;
    let step = 2.0 / segments as f64;
    let at = |x: usize, z: usize| DVec3::new(-1.0 + x as f64 * step, 0.0, -1.0 + z as f64 * step);
    let mut out = Vec::with_capacity(Shape::Plane.face_count(detail));

    for z in 0..segments {
        for x in 0..segments {
            let p00 = at(x, z);
            let p10 = at(x + 1, z);
            let p01 = at(x, z + 1);
            let p11 = at(x + 1, z + 1);
            out.push([p00, p01, p10]);
            out.push([p10, p01, p11]);
        }
    }
    out
}
