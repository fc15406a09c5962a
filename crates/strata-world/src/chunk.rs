//! Per-chunk state: placement, bounds, cached meshes and generation status.

use std::fmt;
use std::sync::Arc;

use glam::Vec3;
use strata_lod::{ChunkBounds, LOD_COUNT, LodChoice, collider_lod};
use strata_mesh::MeshPayload;

/// Integer chunk grid coordinate; `(0, 0)` is the world origin chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub x: u32,
    pub y: u32,
}

impl ChunkCoord {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Mesh generation status of a chunk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChunkState {
    /// Nothing requested yet.
    #[default]
    Uninitialized,
    /// A generation for this LOD is queued or running.
    Generating(u8),
    /// The last generation finished at this LOD.
    Ready(u8),
}

/// A fixed-size square of the world.
#[derive(Clone, Debug)]
pub struct Chunk {
    coord: ChunkCoord,
    offset_x: usize,
    offset_y: usize,
    bounds: ChunkBounds,
    meshes: [Option<Arc<MeshPayload>>; LOD_COUNT],
    state: ChunkState,
    target: Option<LodChoice>,
    applied: Option<LodChoice>,
    last_distance: f32,
    textured: bool,
}

impl Chunk {
    /// Create a chunk and fix its bounds from its grid position.
    pub fn new(coord: ChunkCoord, chunk_size: usize, height_multiplier: f32) -> Self {
        let offset_x = coord.x as usize * chunk_size;
        let offset_y = coord.y as usize * chunk_size;
        let half = chunk_size as f32 / 2.0;
        let bounds = ChunkBounds::new(
            Vec3::new(half + offset_x as f32, 0.0, -half - offset_y as f32),
            Vec3::new(
                chunk_size as f32,
                2.0 * height_multiplier,
                chunk_size as f32,
            ),
        );
        Self {
            coord,
            offset_x,
            offset_y,
            bounds,
            meshes: Default::default(),
            state: ChunkState::Uninitialized,
            target: None,
            applied: None,
            last_distance: f32::INFINITY,
            textured: false,
        }
    }

    /// Grid position of this chunk.
    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Interior height-field origin `(x, y)` of this chunk.
    pub fn offset(&self) -> (usize, usize) {
        (self.offset_x, self.offset_y)
    }

    pub fn bounds(&self) -> &ChunkBounds {
        &self.bounds
    }

    pub fn state(&self) -> ChunkState {
        self.state
    }

    pub fn is_generating(&self) -> bool {
        matches!(self.state, ChunkState::Generating(_))
    }

    /// LOD choice from the most recent evaluation.
    pub fn target(&self) -> Option<LodChoice> {
        self.target
    }

    /// LOD choice currently shown by the renderer.
    pub fn applied(&self) -> Option<LodChoice> {
        self.applied
    }

    /// Distance to the viewer at the most recent evaluation.
    pub fn last_distance(&self) -> f32 {
        self.last_distance
    }

    pub fn is_textured(&self) -> bool {
        self.textured
    }

    /// Cached mesh for `lod`, if one was built.
    pub fn mesh(&self, lod: u8) -> Option<&Arc<MeshPayload>> {
        self.meshes.get(lod as usize).and_then(Option::as_ref)
    }

    /// Number of cached LOD meshes.
    pub fn cached_lod_count(&self) -> usize {
        self.meshes.iter().flatten().count()
    }

    /// Collider LOD for a choice, or `None` when the choice carries no collider.
    pub fn collider_lod_for(choice: LodChoice, offset: u8) -> Option<u8> {
        choice.collider.then(|| collider_lod(choice.lod, offset))
    }

    /// LODs a choice needs that are not cached yet, render LOD first.
    pub fn missing_lods(&self, choice: LodChoice, collider_offset: u8) -> Vec<u8> {
        let mut missing = Vec::with_capacity(2);
        let collider = Self::collider_lod_for(choice, collider_offset);
        for lod in std::iter::once(choice.lod).chain(collider) {
            if self.mesh(lod).is_none() && !missing.contains(&lod) {
                missing.push(lod);
            }
        }
        missing
    }

    pub(crate) fn set_target(&mut self, choice: LodChoice, distance: f32) {
        self.target = Some(choice);
        self.last_distance = distance;
    }

    pub(crate) fn mark_generating(&mut self, lod: u8) {
        self.state = ChunkState::Generating(lod);
    }

    pub(crate) fn mark_applied(&mut self, choice: LodChoice) {
        self.applied = Some(choice);
    }

    pub(crate) fn mark_textured(&mut self) {
        self.textured = true;
    }

    /// Leave the generating state after a failed build, keeping the cache.
    pub(crate) fn abandon(&mut self) {
        self.state = match self.applied {
            Some(choice) => ChunkState::Ready(choice.lod),
            None => ChunkState::Uninitialized,
        };
    }

    /// Fill cache slots with finished meshes and leave the generating state.
    ///
    /// Each payload replaces its slot wholesale.
    pub(crate) fn adopt(&mut self, requested_lod: u8, meshes: Vec<Arc<MeshPayload>>) {
        for mesh in meshes {
            if let Some(slot) = self.meshes.get_mut(mesh.lod as usize) {
                *slot = Some(mesh);
            }
        }
        self.state = ChunkState::Ready(requested_lod);
    }
}
