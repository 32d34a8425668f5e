//! Two-pass face processing: displacement, shading, and vegetation.

use std::collections::BTreeMap;
use std::time::Instant;

use biosphere_biome::{Biome, Color};
use glam::{DQuat, DVec3};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, warn};

use crate::buffers::{MeshBuffers, OceanBuffers};
use crate::cache::{VertexCache, VertexKey, VertexRecord};
use crate::error::GenerationError;
use crate::request::GenerationRequest;
use crate::result::{GenerationResult, GenerationStats, VegetationPlacement};
use crate::shape::{Shape, Triangle};

/// Highest subdivision level accepted by default.
pub const DEFAULT_MAX_DETAIL: u32 = 64;

/// Per-rule rotation of the backfill directions, in radians.
const BACKFILL_ROTATION: f64 = 0.618_033_988_749_895;

/// Backfill targets on a plane are pulled in from the edges by this factor.
const PLANE_BACKFILL_REACH: f64 = 0.9;

/// What pass 1 learned about a face that later stages need again.
struct FaceSample {
    /// Un-displaced sampling point.
    point: DVec3,
    normalized_height: f64,
    steepness: f64,
}

/// A vegetation instance awaiting its final surface point.
struct PendingPlacement {
    rule: usize,
    face: usize,
    /// The point recorded in the biome's spatial index.
    point: DVec3,
    color: Color,
}

/// Turns a [`GenerationRequest`] into a [`GenerationResult`].
#[derive(Clone, Debug)]
pub struct MeshGenerator {
    max_detail: u32,
}

impl Default for MeshGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DETAIL)
    }
}

impl MeshGenerator {
    pub fn new(max_detail: u32) -> Self {
        Self { max_detail }
    }

    pub fn max_detail(&self) -> u32 {
        self.max_detail
    }

    /// Generate terrain, ocean, and vegetation for `request`.
    pub fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult, GenerationError> {
        if request.detail > self.max_detail {
            return Err(GenerationError::DetailTooHigh {
                detail: request.detail,
                max: self.max_detail,
            });
        }

        let started = Instant::now();
        let config = request.biome.resolve();
        let mut biome = Biome::new(&config);
        let shape = request.shape;
        let scatter = scatter_amount(request.scatter_amount);

        let faces = shape.faces(request.detail);
        debug!(
            shape = %shape,
            detail = request.detail,
            faces = faces.len(),
            biome = biome.name(),
            "generating mesh"
        );

        let mut cache = VertexCache::with_capacity(request.vertex_precision, faces.len() / 2 + 12);
        let mut terrain = MeshBuffers::with_faces(faces.len());
        let mut ocean = OceanBuffers::with_faces(faces.len());
        let mut samples = Vec::with_capacity(faces.len());
        let mut pending = Vec::new();

        // Pass 1: displace, shade, and scatter vegetation stochastically.
        for (index, raw) in faces.iter().enumerate() {
            let point = shape.surface_point(raw);
            let up = shape.up(point);
            let records = raw.map(|corner| {
                cache.get_or_insert_with(corner, |base| sample_vertex(&biome, shape, scatter, base))
            });

            let terrain_corners = records.map(|r| r.terrain(shape.up(r.base)));
            let ocean_corners = records.map(|r| r.ocean(shape.up(r.base)));
            let morph_corners = records.map(|r| r.ocean_morph(shape.up(r.base)));

            let normal = flat_normal(&terrain_corners, up);
            let steepness = normal.dot(up).clamp(-1.0, 1.0).acos();
            let mean_height = records.iter().map(|r| r.height).sum::<f64>() / 3.0;
            let normalized_height = biome.normalized_height(mean_height);

            terrain.push_face(
                &terrain_corners,
                normal,
                biome.color_at(normalized_height, steepness),
            );
            ocean.push_face(
                &ocean_corners,
                flat_normal(&ocean_corners, up),
                &morph_corners,
                flat_normal(&morph_corners, up),
                biome.sea_color_at(normalized_height),
            );

            let area = face_area(raw);
            for rule in 0..biome.rules().len() {
                if let Some(color) =
                    biome.try_place_vegetation(rule, point, normalized_height, steepness, area)
                {
                    pending.push(PendingPlacement {
                        rule,
                        face: index,
                        point,
                        color,
                    });
                }
            }

            samples.push(FaceSample {
                point,
                normalized_height,
                steepness,
            });
        }
        debug!(
            cached_vertices = cache.len(),
            placements = pending.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "pass 1 complete"
        );

        let backfilled = backfill(
            &mut biome,
            shape,
            &samples,
            request.minimum_vegetation_per_rule,
            &mut pending,
        );

        // Pass 2: ground footprints raise and recolor the terrain around placements.
        let mut raise_memo: FxHashMap<VertexKey, f64> = FxHashMap::default();
        let mut centroids = Vec::with_capacity(faces.len());
        for (index, raw) in faces.iter().enumerate() {
            let sample = &samples[index];
            let up = shape.up(sample.point);
            let records = raw.map(|corner| {
                cache.get_or_insert_with(corner, |base| sample_vertex(&biome, shape, scatter, base))
            });
            let corners = records.map(|r| {
                let vertex_up = shape.up(r.base);
                let raise = *raise_memo
                    .entry(cache.key(r.base))
                    .or_insert_with(|| biome.ground_raise(r.base));
                r.terrain(vertex_up) + vertex_up * raise
            });

            let color = biome.ground_color(sample.point, terrain.face_color(index));
            terrain.set_face(index, &corners, flat_normal(&corners, up), color);
            centroids.push((corners[0] + corners[1] + corners[2]) / 3.0);
        }

        if !terrain.all_finite() {
            return Err(GenerationError::NonFiniteGeometry { buffer: "terrain" });
        }
        if !ocean.all_finite() {
            return Err(GenerationError::NonFiniteGeometry { buffer: "ocean" });
        }

        let mut vegetation: BTreeMap<String, Vec<VegetationPlacement>> = biome
            .rules()
            .iter()
            .map(|rule| (rule.name.clone(), Vec::new()))
            .collect();
        for placement in &pending {
            let rule = &biome.rules()[placement.rule];
            let centroid = centroids[placement.face];
            vegetation
                .entry(rule.name.clone())
                .or_default()
                .push(VegetationPlacement {
                    position: placement.point.as_vec3().to_array(),
                    surface: centroid.as_vec3().to_array(),
                    normal: shape.up(placement.point).as_vec3().to_array(),
                    color: placement.color.to_array(),
                    face: placement.face,
                });
        }

        let stats = GenerationStats {
            faces: faces.len(),
            vertices: terrain.vertex_count(),
            cached_vertices: cache.len(),
            placements: pending.len(),
            backfilled,
        };
        debug!(
            ?stats,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "mesh generated"
        );

        Ok(GenerationResult {
            terrain,
            ocean,
            vegetation,
            stats,
        })
    }
}

fn scatter_amount(requested: f64) -> f64 {
    if requested.is_finite() {
        requested.abs()
    } else {
        warn!(requested, "non-finite scatter amount, disabling scatter");
        0.0
    }
}

fn sample_vertex(biome: &Biome, shape: Shape, scatter: f64, base: DVec3) -> VertexRecord {
    // Plane scatter stays in the plane so the grid edges remain straight in height.
    let mut jitter = biome.scatter_at(base, scatter);
    if shape == Shape::Plane {
        jitter.y = 0.0;
    }
    VertexRecord {
        base,
        height: biome.height_at(base),
        scatter: jitter,
        sea_height: biome.sea_height_at(base),
        sea_morph_height: biome.sea_morph_height_at(base),
    }
}

/// Unit normal of a counter-clockwise triangle, or `fallback` when degenerate.
fn flat_normal(corners: &Triangle, fallback: DVec3) -> DVec3 {
    (corners[1] - corners[0])
        .cross(corners[2] - corners[0])
        .try_normalize()
        .unwrap_or(fallback)
}

fn face_area(corners: &Triangle) -> f64 {
    0.5 * (corners[1] - corners[0])
        .cross(corners[2] - corners[0])
        .length()
}

/// The six axes and eight cube diagonals, rotated by an amount unique to `rule`.
fn canonical_directions(rule: usize) -> Vec<DVec3> {
    let angle = rule as f64 * BACKFILL_ROTATION;
    let rotation = DQuat::from_rotation_y(angle) * DQuat::from_rotation_x(angle * 0.5);
    let axes = [
        DVec3::X,
        DVec3::NEG_X,
        DVec3::Y,
        DVec3::NEG_Y,
        DVec3::Z,
        DVec3::NEG_Z,
    ];
    let diagonals = [-1.0, 1.0].into_iter().flat_map(|x| {
        [-1.0, 1.0]
            .into_iter()
            .flat_map(move |y| [-1.0, 1.0].map(move |z| DVec3::new(x, y, z).normalize()))
    });
    axes.into_iter()
        .chain(diagonals)
        .map(|d| rotation * d)
        .collect()
}

/// Where a backfill direction lands on `shape`.
fn backfill_target(shape: Shape, direction: DVec3) -> DVec3 {
    match shape {
        Shape::Sphere => direction,
        Shape::Plane => DVec3::new(direction.x, 0.0, direction.z) * PLANE_BACKFILL_REACH,
    }
}

fn closest_face(samples: &[FaceSample], target: DVec3) -> Option<usize> {
    samples
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            a.point
                .distance_squared(target)
                .total_cmp(&b.point.distance_squared(target))
        })
        .map(|(index, _)| index)
}

/// Top up rules that ended pass 1 with fewer than `minimum` placements.
///
/// Canonical directions whose closest face satisfies the rule come first, then
/// any satisfying face in index order. A rule that still has nothing gets one
/// instance at its first canonical face regardless of constraints. Returns the
/// number of placements added.
fn backfill(
    biome: &mut Biome,
    shape: Shape,
    samples: &[FaceSample],
    minimum: usize,
    pending: &mut Vec<PendingPlacement>,
) -> usize {
    if minimum == 0 || samples.is_empty() {
        return 0;
    }

    let mut added = 0;
    for rule in 0..biome.rules().len() {
        if biome.rules()[rule].density <= 0.0 || biome.placement_count(rule) >= minimum {
            continue;
        }

        let mut used: FxHashSet<usize> = pending
            .iter()
            .filter(|p| p.rule == rule)
            .map(|p| p.face)
            .collect();
        let canonical: Vec<usize> = canonical_directions(rule)
            .into_iter()
            .filter_map(|d| closest_face(samples, backfill_target(shape, d)))
            .collect();

        let mut place = |biome: &mut Biome, face: usize, used: &mut FxHashSet<usize>| {
            let point = samples[face].point;
            let color = biome.place_unchecked(rule, point);
            used.insert(face);
            pending.push(PendingPlacement {
                rule,
                face,
                point,
                color,
            });
            added += 1;
        };
        let fits = |biome: &Biome, face: usize| {
            let s = &samples[face];
            biome.satisfies_constraints(rule, s.point, s.normalized_height, s.steepness)
        };

        for &face in &canonical {
            if biome.placement_count(rule) >= minimum {
                break;
            }
            if !used.contains(&face) && fits(biome, face) {
                place(biome, face, &mut used);
            }
        }

        for face in 0..samples.len() {
            if biome.placement_count(rule) >= minimum {
                break;
            }
            if !used.contains(&face) && fits(biome, face) {
                place(biome, face, &mut used);
            }
        }

        if biome.placement_count(rule) == 0 {
            if let Some(&face) = canonical.first() {
                warn!(
                    rule = %biome.rules()[rule].name,
                    face,
                    "no face satisfies the rule, placing one instance unconditionally"
                );
                place(biome, face, &mut used);
            }
        }

        debug!(
            rule = %biome.rules()[rule].name,
            count = biome.placement_count(rule),
            "backfilled vegetation"
        );
    }
    added
}
