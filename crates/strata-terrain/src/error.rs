//! Terrain error types.

/// Errors raised while preparing terrain inputs.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TerrainError {
    /// Region thresholds must be ascending for first-match classification.
    #[error("region '{name}' (index {index}) has threshold {threshold} below its predecessor")]
    UnsortedRegions {
        index: usize,
        name: String,
        threshold: f32,
    },
}
