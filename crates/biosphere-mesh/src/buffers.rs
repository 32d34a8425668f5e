//! Flat, non-indexed vertex buffers ready for upload.

use glam::{DVec3, Vec3};
use serde::{Deserialize, Serialize};

/// Floats per vertex attribute.
pub const COMPONENTS: usize = 3;

/// Floats per face for one attribute (three vertices).
pub const FACE_STRIDE: usize = 3 * COMPONENTS;

/// Flat-shaded triangle soup: three vertices per face, three floats per attribute.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshBuffers {
    pub positions: Vec<f32>,
    pub colors: Vec<f32>,
    pub normals: Vec<f32>,
}

impl MeshBuffers {
    /// Empty buffers with room for `faces` triangles.
    pub fn with_faces(faces: usize) -> Self {
        Self {
            positions: Vec::with_capacity(faces * FACE_STRIDE),
            colors: Vec::with_capacity(faces * FACE_STRIDE),
            normals: Vec::with_capacity(faces * FACE_STRIDE),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / COMPONENTS
    }

    pub fn face_count(&self) -> usize {
        self.positions.len() / FACE_STRIDE
    }

    /// Append one flat-shaded face.
    pub fn push_face(&mut self, corners: &[DVec3; 3], normal: DVec3, color: Vec3) {
        for corner in corners {
            push_vec(&mut self.positions, corner.as_vec3());
            push_vec(&mut self.normals, normal.as_vec3());
            push_vec(&mut self.colors, color);
        }
    }

    /// Overwrite face `face` in place.
    pub fn set_face(&mut self, face: usize, corners: &[DVec3; 3], normal: DVec3, color: Vec3) {
        let start = face * FACE_STRIDE;
        for (i, corner) in corners.iter().enumerate() {
            let at = start + i * COMPONENTS;
            write_vec(&mut self.positions, at, corner.as_vec3());
            write_vec(&mut self.normals, at, normal.as_vec3());
            write_vec(&mut self.colors, at, color);
        }
    }

    /// Color of the first vertex of `face`. All three are equal.
    pub fn face_color(&self, face: usize) -> Vec3 {
        read_vec(&self.colors, face * FACE_STRIDE)
    }

    /// Whether all attribute arrays hold the same whole number of faces.
    pub fn is_consistent(&self) -> bool {
        self.positions.len() % FACE_STRIDE == 0
            && self.colors.len() == self.positions.len()
            && self.normals.len() == self.positions.len()
    }

    /// Raw bytes of `[positions, colors, normals]` for GPU upload.
    pub fn as_bytes(&self) -> [&[u8]; 3] {
        [
            bytemuck::cast_slice(&self.positions),
            bytemuck::cast_slice(&self.colors),
            bytemuck::cast_slice(&self.normals),
        ]
    }

    pub(crate) fn all_finite(&self) -> bool {
        [&self.positions, &self.colors, &self.normals]
            .iter()
            .all(|v| v.iter().all(|x| x.is_finite()))
    }
}

/// The ocean shell: a resting surface plus a tide morph target with the same topology.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OceanBuffers {
    #[serde(flatten)]
    pub surface: MeshBuffers,
    pub morph_positions: Vec<f32>,
    pub morph_normals: Vec<f32>,
}

impl OceanBuffers {
    pub fn with_faces(faces: usize) -> Self {
        Self {
            surface: MeshBuffers::with_faces(faces),
            morph_positions: Vec::with_capacity(faces * FACE_STRIDE),
            morph_normals: Vec::with_capacity(faces * FACE_STRIDE),
        }
    }

    /// Append one face of the resting surface and its morph target.
    pub fn push_face(
        &mut self,
        corners: &[DVec3; 3],
        normal: DVec3,
        morph_corners: &[DVec3; 3],
        morph_normal: DVec3,
        color: Vec3,
    ) {
        self.surface.push_face(corners, normal, color);
        for corner in morph_corners {
            push_vec(&mut self.morph_positions, corner.as_vec3());
            push_vec(&mut self.morph_normals, morph_normal.as_vec3());
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.surface.vertex_count()
    }

    pub fn is_consistent(&self) -> bool {
        self.surface.is_consistent()
            && self.morph_positions.len() == self.surface.positions.len()
            && self.morph_normals.len() == self.surface.positions.len()
    }

    /// Raw bytes of `[morph_positions, morph_normals]`.
    pub fn morph_as_bytes(&self) -> [&[u8]; 2] {
        [
            bytemuck::cast_slice(&self.morph_positions),
            bytemuck::cast_slice(&self.morph_normals),
        ]
    }

    pub(crate) fn all_finite(&self) -> bool {
        self.surface.all_finite()
            && self.morph_positions.iter().all(|x| x.is_finite())
            && self.morph_normals.iter().all(|x| x.is_finite())
    }
}

fn push_vec(buf: &mut Vec<f32>, v: Vec3) {
    buf.extend_from_slice(&v.to_array());
}

fn write_vec(buf: &mut [f32], at: usize, v: Vec3) {
    buf[at..at + COMPONENTS].copy_from_slice(&v.to_array());
}

fn read_vec(buf: &[f32], at: usize) -> Vec3 {
    Vec3::new(buf[at], buf[at + 1], buf[at + 2])
}
