//! Seams to the host: whoever displays meshes and whoever moves the viewer.

use std::sync::Arc;

use glam::{Vec2, Vec3};
use strata_mesh::MeshPayload;
use strata_terrain::ColorRegion;

use crate::chunk::ChunkCoord;

/// Receives chunk output on the control thread.
pub trait TerrainRenderer {
    /// Display `mesh` for the chunk, replacing whatever was shown before.
    fn apply_mesh(&mut self, coord: ChunkCoord, lod: u8, mesh: &Arc<MeshPayload>);

    /// Attach a collider mesh, or remove it with `None`.
    fn apply_collider(&mut self, coord: ChunkCoord, mesh: Option<&Arc<MeshPayload>>);

    /// Set the chunk's color texture. Called once per chunk.
    fn apply_texture(&mut self, coord: ChunkCoord, texture: &ColorRegion);
}

/// Anything that can report where the viewer stands.
pub trait ViewerPosition {
    /// World-space `(x, z)` of the viewer.
    fn ground_position(&self) -> Vec2;
}

impl ViewerPosition for Vec2 {
    fn ground_position(&self) -> Vec2 {
        *self
    }
}

impl ViewerPosition for Vec3 {
    fn ground_position(&self) -> Vec2 {
        Vec2::new(self.x, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_drops_height() {
        assert_eq!(
            Vec3::new(1.0, 50.0, -3.0).ground_position(),
            Vec2::new(1.0, -3.0)
        );
    }
}
