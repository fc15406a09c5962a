//! Chunked terrain streaming: chunk lifecycle, background meshing, LOD
//! re-evaluation around a moving viewer, and synchronous editor previews.

pub mod chunk;
pub mod error;
pub mod interface;
pub mod pool;
pub mod preview;
pub mod settings;
pub mod world;

pub use chunk::{Chunk, ChunkCoord, ChunkState};
pub use error::WorldError;
pub use interface::{TerrainRenderer, ViewerPosition};
pub use pool::{MeshFailure, MeshRequest, MeshResult, MeshingPool, SubmitOutcome};
pub use preview::{Preview, PreviewMode, PreviewRequest, PreviewTile, render_preview};
pub use settings::WorldSettings;
pub use world::{TickReport, WorldTerrain};
