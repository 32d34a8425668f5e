//! Degraded output for failed requests: a low-detail sphere that always exists.

use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};

use biosphere_mesh::{
    GenerationRequest, GenerationResult, GenerationStats, MeshBuffers, MeshGenerator,
    OceanBuffers, Shape,
};
use glam::Vec3;
use tracing::warn;

use crate::planet::PlanetMesh;
use crate::protocol::RequestId;

const BARE_LAND: Vec3 = Vec3::new(0.45, 0.42, 0.38);
const BARE_SEA: Vec3 = Vec3::new(0.10, 0.30, 0.55);

/// Radius of the bare ocean shell, just under the land surface.
const BARE_SEA_RADIUS: f64 = 0.999;

/// Detail of the substitute sphere: the configured fallback detail, but always
/// below the failed request.
///
/// A failed detail-0 request has no lower level, so its fallback is also detail 0
/// (20 faces). Every other request gets a strictly lower detail.
pub fn fallback_detail(requested: u32, configured: u32) -> u32 {
    configured.min(requested.saturating_sub(1))
}

/// Build the substitute for failed request `request_id`.
///
/// Regenerates a sphere at [`fallback_detail`] with the original biome. If that
/// fails as well, returns an undecorated sphere instead.
pub fn fallback_mesh(
    request_id: RequestId,
    original: &GenerationRequest,
    configured_detail: u32,
) -> PlanetMesh {
    let request = GenerationRequest {
        shape: Shape::Sphere,
        detail: fallback_detail(original.detail, configured_detail),
        ..original.clone()
    };
    let generator = MeshGenerator::new(request.detail);

    let result = match catch_unwind(AssertUnwindSafe(|| generator.generate(&request))) {
        Ok(Ok(result)) => result,
        Ok(Err(err)) => {
            warn!(request_id, %err, "fallback generation failed, using bare sphere");
            bare_sphere(request.detail)
        }
        Err(_) => {
            warn!(request_id, "fallback generation panicked, using bare sphere");
            bare_sphere(request.detail)
        }
    };
    PlanetMesh::from_result(request_id, &request, result, true)
}

/// An undecorated sphere: flat land color, a slightly smaller ocean shell, and no
/// vegetation. Needs nothing but the tessellation, so it cannot fail.
pub fn bare_sphere(detail: u32) -> GenerationResult {
    let faces = Shape::Sphere.faces(detail);
    let mut terrain = MeshBuffers::with_faces(faces.len());
    let mut ocean = OceanBuffers::with_faces(faces.len());

    for tri in &faces {
        let up = Shape::Sphere.surface_point(tri);
        let normal = (tri[1] - tri[0])
            .cross(tri[2] - tri[0])
            .try_normalize()
            .unwrap_or(up);
        terrain.push_face(tri, normal, BARE_LAND);
        let shell = tri.map(|p| p * BARE_SEA_RADIUS);
        ocean.push_face(&shell, normal, &shell, normal, BARE_SEA);
    }

    let segments = detail as usize + 1;
    let stats = GenerationStats {
        faces: faces.len(),
        vertices: terrain.vertex_count(),
        cached_vertices: 10 * segments * segments + 2,
        placements: 0,
        backfilled: 0,
    };
    GenerationResult {
        terrain,
        ocean,
        vegetation: BTreeMap::new(),
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use biosphere_biome::BiomeOptions;

    #[test]
    fn test_fallback_detail_is_lower() {
        assert_eq!(fallback_detail(10, 2), 2);
        assert_eq!(fallback_detail(2, 2), 1);
        assert_eq!(fallback_detail(1, 2), 0);
        assert_eq!(fallback_detail(100, 0), 0);
        for requested in 1..20 {
            assert!(fallback_detail(requested, 5) < requested);
        }
    }

    #[test]
    fn test_detail_zero_falls_back_to_detail_zero() {
        assert_eq!(fallback_detail(0, 2), 0);
        let original = GenerationRequest::sphere(0, "forest");
        let mesh = fallback_mesh(8, &original, 2);
        assert!(mesh.fallback);
        assert_eq!(mesh.detail, 0);
        assert_eq!(mesh.face_count(), 20);
    }

    #[test]
    fn test_fallback_mesh_is_a_flagged_sphere() {
        let original = GenerationRequest {
            shape: Shape::Plane,
            detail: 12,
            biome: BiomeOptions::preset("arctic"),
            ..Default::default()
        };
        let mesh = fallback_mesh(3, &original, 2);
        assert!(mesh.fallback);
        assert_eq!(mesh.request_id, 3);
        assert_eq!(mesh.shape, Shape::Sphere);
        assert_eq!(mesh.detail, 2);
        assert_eq!(mesh.face_count(), Shape::Sphere.face_count(2));
        assert!(mesh.vegetation.contains_key("spruce"));
    }

    #[test]
    fn test_bare_sphere_is_consistent() {
        let result = bare_sphere(3);
        assert!(result.is_consistent());
        assert_eq!(result.face_count(), Shape::Sphere.face_count(3));
        assert!(result.vegetation.is_empty());
    }
}
