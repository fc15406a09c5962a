//! Mesh output handed to renderers and collider consumers.

use glam::{Vec2, Vec3};

use crate::vertex::TerrainVertex;

/// Triangulated chunk surface at one LOD.
///
/// Contains only interior vertices; border ring data never leaves the
/// builder. Payloads are immutable once built and replaced wholesale.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshPayload {
    /// LOD level this payload was built at.
    pub lod: u8,
    /// World-space positions.
    pub positions: Vec<Vec3>,
    /// Texture coordinates in [0, 1] across the chunk.
    pub uvs: Vec<Vec2>,
    /// Unit-length vertex normals.
    pub normals: Vec<Vec3>,
    /// Index buffer (triangles, 3 indices per triangle).
    pub indices: Vec<u32>,
}

impl MeshPayload {
    /// Number of interior vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Interleave positions, normals and uvs for upload.
    pub fn interleaved(&self) -> Vec<TerrainVertex> {
        self.positions
            .iter()
            .zip(&self.normals)
            .zip(&self.uvs)
            .map(|((p, n), uv)| TerrainVertex::new(*p, *n, *uv))
            .collect()
    }

    /// Approximate heap size in bytes.
    pub fn memory_usage(&self) -> usize {
        self.positions.len() * size_of::<Vec3>()
            + self.normals.len() * size_of::<Vec3>()
            + self.uvs.len() * size_of::<Vec2>()
            + self.indices.len() * size_of::<u32>()
    }
}
