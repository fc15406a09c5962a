//! Chunk meshing over padded height fields: border-skirted triangulation,
//! seam-consistent normals, mesh payloads and the GPU vertex format.

pub mod builder;
pub mod diagnostics;
pub mod payload;
pub mod vertex;

pub use builder::{MeshBuild, MeshBuilder, VertexSlot};
pub use diagnostics::{ExecutionMode, MeshDiagnostics};
pub use payload::MeshPayload;
pub use vertex::TerrainVertex;
