//! Height-threshold color regions.

use strata_config::RegionConfig;

use crate::error::TerrainError;

/// An RGBA8 color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Fallback for heights no region covers: fully transparent black.
    ///
    /// Every configured region color is expected to be opaque, so this value
    /// never collides with a real classification in practice.
    pub const UNCLASSIFIED: Self = Self::rgba(0, 0, 0, 0);
    pub const WHITE: Self = Self::rgba(255, 255, 255, 255);
    pub const BLACK: Self = Self::rgba(0, 0, 0, 255);

    /// Construct a color from components.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Components as an array.
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Linear interpolation per channel, `t` clamped to [0, 1].
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (f32::from(a) + (f32::from(b) - f32::from(a)) * t).round() as u8;
        Self::rgba(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }
}

impl From<[u8; 4]> for Color {
    fn from(c: [u8; 4]) -> Self {
        Self::rgba(c[0], c[1], c[2], c[3])
    }
}

/// A named color covering heights up to `threshold`.
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    pub name: String,
    pub threshold: f32,
    pub color: Color,
}

/// Regions ordered ascending by threshold.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RegionTable {
    regions: Vec<Region>,
}

impl RegionTable {
    /// Build a table, rejecting regions that are not ascending by threshold.
    pub fn new(regions: Vec<Region>) -> Result<Self, TerrainError> {
        if let Some(index) = regions
            .windows(2)
            .position(|pair| pair[1].threshold < pair[0].threshold)
        {
            let offender = &regions[index + 1];
            return Err(TerrainError::UnsortedRegions {
                index: index + 1,
                name: offender.name.clone(),
                threshold: offender.threshold,
            });
        }
        Ok(Self { regions })
    }

    /// Build a table from configuration.
    pub fn from_config(regions: &[RegionConfig]) -> Result<Self, TerrainError> {
        Self::new(
            regions
                .iter()
                .map(|r| Region {
                    name: r.name.clone(),
                    threshold: r.threshold,
                    color: Color::from(r.color),
                })
                .collect(),
        )
    }

    /// Regions in ascending order.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// First region whose threshold is at least `height`.
    pub fn classify(&self, height: f32) -> Option<&Region> {
        self.regions.iter().find(|r| height <= r.threshold)
    }

    /// Color for `height`, or [`Color::UNCLASSIFIED`] when no region covers it.
    pub fn color_for(&self, height: f32) -> Color {
        self.classify(height)
            .map_or(Color::UNCLASSIFIED, |region| region.color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLUE: Color = Color::rgba(0, 0, 255, 255);
    const GREEN: Color = Color::rgba(0, 255, 0, 255);
    const GRAY: Color = Color::rgba(128, 128, 128, 255);

    fn table() -> RegionTable {
        RegionTable::new(vec![
            Region {
                name: "water".into(),
                threshold: 0.3,
                color: BLUE,
            },
            Region {
                name: "grass".into(),
                threshold: 0.6,
                color: GREEN,
            },
            Region {
                name: "rock".into(),
                threshold: 1.0,
                color: GRAY,
            },
        ])
        .unwrap()
    }

    #[test]
    fn test_mid_height_classifies_green() {
        assert_eq!(table().color_for(0.5), GREEN);
        assert_eq!(table().classify(0.5).unwrap().name, "grass");
    }

    #[test]
    fn test_threshold_is_inclusive() {
        assert_eq!(table().color_for(0.3), BLUE);
        assert_eq!(table().color_for(1.0), GRAY);
    }

    #[test]
    fn test_out_of_range_height_is_unclassified() {
        assert!(table().classify(1.1).is_none());
        assert_eq!(table().color_for(1.1), Color::UNCLASSIFIED);
    }

    #[test]
    fn test_empty_table_leaves_everything_unclassified() {
        assert_eq!(RegionTable::default().color_for(0.0), Color::UNCLASSIFIED);
    }

    #[test]
    fn test_unsorted_regions_rejected() {
        let mut regions = table().regions().to_vec();
        regions.swap(1, 2);
        let err = RegionTable::new(regions).unwrap_err();
        assert_eq!(
            err,
            TerrainError::UnsortedRegions {
                index: 2,
                name: "grass".into(),
                threshold: 0.6
            }
        );
    }

    #[test]
    fn test_from_config() {
        let table = RegionTable::from_config(&[RegionConfig {
            name: "all".into(),
            threshold: 1.0,
            color: [1, 2, 3, 255],
        }])
        .unwrap();
        assert_eq!(table.color_for(0.2), Color::rgba(1, 2, 3, 255));
    }

    #[test]
    fn test_color_lerp_endpoints() {
        assert_eq!(Color::WHITE.lerp(Color::BLACK, 0.0), Color::WHITE);
        assert_eq!(Color::WHITE.lerp(Color::BLACK, 1.0), Color::BLACK);
        assert_eq!(Color::WHITE.lerp(Color::BLACK, 0.5).r, 128);
    }
}
