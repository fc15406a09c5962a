//! Level-of-detail management: LOD strides, distance-based preset selection,
//! and chunk bounding volumes.

mod bounds;
mod selector;

pub use bounds::ChunkBounds;
pub use selector::{
    LOD_COUNT, LodChoice, LodError, LodPreset, LodSelector, MAX_LOD, collider_lod, lod_stride,
};
