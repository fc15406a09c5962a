//! Distance-based LOD selection from ordered presets.

use strata_config::LodConfig;

/// Coarsest supported LOD level.
pub const MAX_LOD: u8 = 6;

/// Number of LOD levels, `0..=MAX_LOD`.
pub const LOD_COUNT: usize = MAX_LOD as usize + 1;

/// Vertex step for a LOD level: 1 at LOD 0, `2 * lod` above.
///
/// Levels past [`MAX_LOD`] are clamped.
pub const fn lod_stride(lod: u8) -> usize {
    let lod = if lod > MAX_LOD { MAX_LOD } else { lod };
    match lod {
        0 => 1,
        l => l as usize * 2,
    }
}

/// LOD used for a collider mesh: the render LOD plus `offset`, clamped.
pub fn collider_lod(lod: u8, offset: u8) -> u8 {
    lod.saturating_add(offset).min(MAX_LOD)
}

/// Errors raised when building a selector.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum LodError {
    /// Presets must be ascending by distance for first-match selection.
    #[error("LOD preset {index} has max view distance {distance} below its predecessor")]
    UnsortedPresets { index: usize, distance: f32 },
    /// A preset names a level the mesh builder cannot produce.
    #[error("LOD preset {index} uses level {lod}, maximum is {MAX_LOD}")]
    LodOutOfRange { index: usize, lod: u8 },
}

/// One preset: the LOD used for chunks up to `max_view_distance` away.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LodPreset {
    pub lod: u8,
    pub max_view_distance: f32,
    pub collider: bool,
}

/// Result of a selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LodChoice {
    pub lod: u8,
    pub collider: bool,
}

impl LodChoice {
    /// Used when no preset covers the distance.
    pub const COARSEST: Self = Self {
        lod: MAX_LOD,
        collider: false,
    };
}

/// Selects LOD levels based on distance from the viewer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LodSelector {
    presets: Vec<LodPreset>,
}

impl LodSelector {
    /// Create a selector, rejecting unsorted or out-of-range presets.
    ///
    /// Equal distances are allowed; the earlier preset wins.
    pub fn new(presets: Vec<LodPreset>) -> Result<Self, LodError> {
        if let Some((index, preset)) = presets
            .iter()
            .enumerate()
            .find(|(_, p)| p.lod > MAX_LOD)
        {
            return Err(LodError::LodOutOfRange {
                index,
                lod: preset.lod,
            });
        }
        if let Some(index) = presets
            .windows(2)
            .position(|pair| pair[1].max_view_distance < pair[0].max_view_distance)
        {
            return Err(LodError::UnsortedPresets {
                index: index + 1,
                distance: presets[index + 1].max_view_distance,
            });
        }
        Ok(Self { presets })
    }

    /// Build a selector from configuration.
    pub fn from_config(config: &LodConfig) -> Result<Self, LodError> {
        Self::new(
            config
                .presets
                .iter()
                .map(|p| LodPreset {
                    lod: p.lod,
                    max_view_distance: p.max_view_distance,
                    collider: p.collider,
                })
                .collect(),
        )
    }

    /// Presets in ascending distance order.
    pub fn presets(&self) -> &[LodPreset] {
        &self.presets
    }

    /// Largest configured view distance, 0 with no presets.
    pub fn max_view_distance(&self) -> f32 {
        self.presets.last().map_or(0.0, |p| p.max_view_distance)
    }

    /// First preset whose distance bound covers `distance`, else the coarsest
    /// level without a collider. Non-finite distances get the coarsest level.
    pub fn select(&self, distance: f32) -> LodChoice {
        if !distance.is_finite() {
            return LodChoice::COARSEST;
        }
        self.presets
            .iter()
            .find(|p| distance <= p.max_view_distance)
            .map_or(LodChoice::COARSEST, |p| LodChoice {
                lod: p.lod,
                collider: p.collider,
            })
    }
}
