//! Debug geometry collected while meshing outside the streaming loop.

use glam::Vec3;

/// Whether a build runs inside the streaming session or for an editor preview.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExecutionMode {
    #[default]
    Runtime,
    /// Also collect [`MeshDiagnostics`].
    Preview,
}

impl ExecutionMode {
    pub fn collects_diagnostics(self) -> bool {
        matches!(self, Self::Preview)
    }
}

/// Line segments for visualizing a built chunk.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshDiagnostics {
    /// Edges of every border ring triangle.
    pub border_edges: Vec<(Vec3, Vec3)>,
    /// One `(origin, origin + normal)` segment per interior vertex.
    pub normal_rays: Vec<(Vec3, Vec3)>,
}

impl MeshDiagnostics {
    /// Line segments a debug overlay would draw.
    pub fn segment_count(&self) -> usize {
        self.border_edges.len() + self.normal_rays.len()
    }
}
