//! Full request/response cycles through a live worker thread.

use std::sync::mpsc;
use std::time::{Duration, Instant};

use biosphere_biome::Preset;
use biosphere_mesh::{GenerationRequest, Shape};
use biosphere_worker::{PlanetMesh, PlanetMesher, TransferMode, WorkerConfig};

const DEADLINE: Duration = Duration::from_secs(120);

/// Issue one request and poll until its callback has run.
fn generate(config: WorkerConfig, request: GenerationRequest) -> PlanetMesh {
    let mut mesher = PlanetMesher::new(config).unwrap();
    let (tx, rx) = mpsc::channel();
    mesher.request_mesh(request, move |mesh| tx.send(mesh).unwrap());

    let deadline = Instant::now() + DEADLINE;
    while mesher.pending_count() > 0 && Instant::now() < deadline {
        mesher.poll_timeout(Duration::from_millis(50));
    }
    rx.try_recv().expect("callback did not run before the deadline")
}

#[test]
fn test_forest_sphere_detail_10() {
    let mesh = generate(
        WorkerConfig::default(),
        GenerationRequest::sphere(10, "forest"),
    );

    assert!(!mesh.fallback);
    assert_eq!(mesh.shape, Shape::Sphere);
    assert_eq!(mesh.detail, 10);

    let faces = Shape::Sphere.face_count(10);
    assert_eq!(faces, 2420);
    assert_eq!(mesh.terrain.positions.len(), 3 * faces * 3);
    assert_eq!(mesh.terrain.colors.len(), 3 * faces * 3);
    assert_eq!(mesh.terrain.normals.len(), 3 * faces * 3);
    assert_eq!(mesh.ocean.surface.positions.len(), 3 * faces * 3);
    assert_eq!(mesh.ocean.morph_positions.len(), 3 * faces * 3);
    assert_eq!(mesh.ocean.morph_normals.len(), 3 * faces * 3);

    for rule in &Preset::Forest.config().vegetation {
        let placed = mesh
            .vegetation
            .get(&rule.name)
            .unwrap_or_else(|| panic!("missing rule {}", rule.name));
        assert!(!placed.is_empty(), "rule {} has no placements", rule.name);
    }

    let channels = mesh.terrain.colors.iter().chain(&mesh.ocean.surface.colors);
    for c in channels {
        assert!((0.0..=1.0).contains(c), "color channel {c} out of range");
    }
    for placement in mesh.vegetation.values().flatten() {
        assert!(placement.face < faces);
        assert!(placement.color.iter().all(|c| (0.0..=1.0).contains(c)));
    }
}

#[test]
fn test_failing_request_yields_lower_detail_fallback() {
    let config = WorkerConfig {
        max_detail: 4,
        fallback_detail: 2,
        ..Default::default()
    };
    let mesh = generate(config, GenerationRequest::sphere(6, "desert"));

    assert!(mesh.fallback);
    assert_eq!(mesh.shape, Shape::Sphere);
    assert!(mesh.detail < 6);
    assert_eq!(mesh.detail, 2);
    assert!(mesh.face_count() > 0);
    assert_eq!(mesh.terrain.positions.len(), 3 * Shape::Sphere.face_count(2) * 3);
}

#[test]
fn test_serialized_transfer_matches_owned() {
    let request = GenerationRequest::sphere(4, "tropical");
    let owned = generate(WorkerConfig::default(), request.clone());
    let serialized = generate(
        WorkerConfig {
            transfer: TransferMode::Serialized,
            ..Default::default()
        },
        request,
    );

    assert!(!serialized.fallback);
    assert_eq!(owned.stats, serialized.stats);
    assert_eq!(owned.terrain.positions.len(), serialized.terrain.positions.len());
    for (a, b) in owned.terrain.positions.iter().zip(&serialized.terrain.positions) {
        assert!((a - b).abs() <= 1e-6);
    }
    assert_eq!(
        owned.vegetation.keys().collect::<Vec<_>>(),
        serialized.vegetation.keys().collect::<Vec<_>>()
    );
}

#[test]
fn test_each_callback_fires_once_in_order() {
    let mut mesher = PlanetMesher::new(WorkerConfig::default()).unwrap();
    let (tx, rx) = mpsc::channel();

    let mut ids = Vec::new();
    for (detail, preset) in [(1, "arctic"), (2, "barren"), (0, "forest")] {
        let tx = tx.clone();
        ids.push(mesher.request_mesh(GenerationRequest::plane(detail, preset), move |mesh| {
            tx.send(mesh.request_id).unwrap()
        }));
    }

    let deadline = Instant::now() + DEADLINE;
    while mesher.pending_count() > 0 && Instant::now() < deadline {
        mesher.poll_timeout(Duration::from_millis(50));
    }
    assert_eq!(mesher.poll(), 0);

    let delivered: Vec<_> = rx.try_iter().collect();
    assert_eq!(delivered, ids);
}
