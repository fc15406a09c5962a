//! World construction errors.

use strata_config::ConfigError;
use strata_lod::LodError;
use strata_terrain::TerrainError;

/// Errors raised while building a terrain session.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("terrain error: {0}")]
    Terrain(#[from] TerrainError),

    #[error("LOD error: {0}")]
    Lod(#[from] LodError),

    #[error("chunk size must be positive")]
    ZeroChunkSize,

    #[error("chunk size {chunk_size} is not divisible by the LOD {lod} stride {stride}")]
    ChunkSizeNotDivisible {
        chunk_size: usize,
        lod: u8,
        stride: usize,
    },

    #[error("world scale must be positive and finite, got {0}")]
    InvalidScale(f32),
}
