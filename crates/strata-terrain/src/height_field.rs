//! Padded height field with per-cell color classification.
//!
//! The noise grid is allocated with a [`BORDER_MARGIN`] ring on every side so
//! that mesh builders can sample one border ring past any chunk edge without
//! leaving the field. Colors are only classified for interior cells.

use crate::image::TextureImage;
use crate::noise_field::{HeightGrid, NoiseField};
use crate::region::{Color, RegionTable};

/// Padding (in cells) on each side of the interior vertex extent.
///
/// Must be at least the widest border-ring reach a mesh builder uses, i.e. the
/// stride of the coarsest LOD.
pub const BORDER_MARGIN: usize = 12;

/// A rectangular slice of classified colors, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorRegion {
    pub width: usize,
    pub height: usize,
    pub colors: Vec<Color>,
}

impl ColorRegion {
    /// Convert to an RGBA image for display.
    pub fn to_image(&self) -> TextureImage {
        let mut image = TextureImage::new(self.width as u32, self.height as u32);
        for (i, color) in self.colors.iter().enumerate() {
            let x = (i % self.width) as u32;
            let y = (i / self.width) as u32;
            image.set_color(x, y, *color);
        }
        image
    }
}

/// Normalized heights over a padded grid plus interior color classification.
///
/// Heights are written once at construction and never mutated afterwards.
#[derive(Clone, Debug)]
pub struct HeightField {
    vertices_x: usize,
    vertices_y: usize,
    grid: HeightGrid,
    colors: Vec<Color>,
    unclassified: usize,
}

impl HeightField {
    /// Generate a field covering `vertices_x` x `vertices_y` interior vertices.
    pub fn build(
        seed: u64,
        noise: &NoiseField,
        regions: &RegionTable,
        vertices_x: usize,
        vertices_y: usize,
    ) -> Self {
        let grid = noise.generate(
            vertices_x + 2 * BORDER_MARGIN,
            vertices_y + 2 * BORDER_MARGIN,
            seed,
        );
        let field = Self::from_grid(grid, regions);
        tracing::info!(
            vertices_x,
            vertices_y,
            unclassified = field.unclassified,
            "height field built"
        );
        field
    }

    /// Wrap an already padded grid and classify its interior.
    ///
    /// # Panics
    ///
    /// Panics if the grid is not larger than the margin on both axes.
    pub fn from_grid(grid: HeightGrid, regions: &RegionTable) -> Self {
        assert!(
            grid.width() > 2 * BORDER_MARGIN && grid.height() > 2 * BORDER_MARGIN,
            "grid {}x{} too small for a {BORDER_MARGIN}-cell margin",
            grid.width(),
            grid.height()
        );
        let vertices_x = grid.width() - 2 * BORDER_MARGIN;
        let vertices_y = grid.height() - 2 * BORDER_MARGIN;

        let mut colors = vec![Color::UNCLASSIFIED; vertices_x * vertices_y];
        let mut unclassified = 0;
        for y in 0..vertices_y {
            for x in 0..vertices_x {
                let h = grid.get(x + BORDER_MARGIN, y + BORDER_MARGIN);
                match regions.classify(h) {
                    Some(region) => colors[y * vertices_x + x] = region.color,
                    None => unclassified += 1,
                }
            }
        }
        if unclassified > 0 {
            tracing::warn!(unclassified, "cells not covered by any region");
        }

        Self {
            vertices_x,
            vertices_y,
            grid,
            colors,
            unclassified,
        }
    }

    /// Interior vertex count along x.
    pub fn vertices_x(&self) -> usize {
        self.vertices_x
    }

    /// Interior vertex count along y.
    pub fn vertices_y(&self) -> usize {
        self.vertices_y
    }

    /// The full padded grid.
    pub fn grid(&self) -> &HeightGrid {
        &self.grid
    }

    /// Height at padded grid coordinates.
    #[inline]
    pub fn height_at_padded(&self, x: usize, y: usize) -> f32 {
        self.grid.get(x, y)
    }

    /// Height at interior coordinates; valid down to `-BORDER_MARGIN` and up
    /// to `vertices + BORDER_MARGIN - 1`.
    ///
    /// # Panics
    ///
    /// Panics when the coordinate falls outside the padded grid.
    #[inline]
    pub fn height_at(&self, x: isize, y: isize) -> f32 {
        let px = x + BORDER_MARGIN as isize;
        let py = y + BORDER_MARGIN as isize;
        assert!(px >= 0 && py >= 0, "({x}, {y}) is beyond the border margin");
        self.grid.get(px as usize, py as usize)
    }

    /// Classified color of an interior cell.
    pub fn color_at(&self, x: usize, y: usize) -> Color {
        assert!(x < self.vertices_x && y < self.vertices_y);
        self.colors[y * self.vertices_x + x]
    }

    /// Number of interior cells that fell through every region.
    pub fn unclassified_count(&self) -> usize {
        self.unclassified
    }

    /// Copy a `width` x `height` rectangle of colors starting at interior `(offset_x, offset_y)`.
    ///
    /// Returns `None` if the rectangle leaves the interior.
    pub fn color_region(
        &self,
        offset_x: usize,
        offset_y: usize,
        width: usize,
        height: usize,
    ) -> Option<ColorRegion> {
        if offset_x + width > self.vertices_x || offset_y + height > self.vertices_y {
            return None;
        }
        let mut colors = Vec::with_capacity(width * height);
        for y in offset_y..offset_y + height {
            let start = y * self.vertices_x + offset_x;
            colors.extend_from_slice(&self.colors[start..start + width]);
        }
        Some(ColorRegion {
            width,
            height,
            colors,
        })
    }

    /// Grayscale image of the interior heights, white at 0 and black at 1.
    pub fn height_image(&self) -> TextureImage {
        let mut image = TextureImage::new(self.vertices_x as u32, self.vertices_y as u32);
        for y in 0..self.vertices_y {
            for x in 0..self.vertices_x {
                let h = self.height_at(x as isize, y as isize);
                image.set_color(x as u32, y as u32, Color::WHITE.lerp(Color::BLACK, h));
            }
        }
        image
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise_layer::NoiseLayer;
    use crate::region::Region;

    fn regions() -> RegionTable {
        RegionTable::new(vec![
            Region {
                name: "low".into(),
                threshold: 0.5,
                color: Color::rgba(0, 0, 255, 255),
            },
            Region {
                name: "high".into(),
                threshold: 1.0,
                color: Color::rgba(0, 255, 0, 255),
            },
        ])
        .unwrap()
    }

    fn field() -> HeightField {
        let noise = NoiseField::new(vec![NoiseLayer {
            scale: 20.0,
            ..Default::default()
        }]);
        HeightField::build(7, &noise, &regions(), 49, 33)
    }

    #[test]
    fn test_grid_is_padded_by_margin() {
        let f = field();
        assert_eq!(f.vertices_x(), 49);
        assert_eq!(f.vertices_y(), 33);
        assert_eq!(f.grid().width(), 49 + 2 * BORDER_MARGIN);
        assert_eq!(f.grid().height(), 33 + 2 * BORDER_MARGIN);
    }

    #[test]
    fn test_interior_coordinates_are_offset() {
        let f = field();
        assert_eq!(f.height_at(0, 0), f.height_at_padded(BORDER_MARGIN, BORDER_MARGIN));
        let m = BORDER_MARGIN as isize;
        assert_eq!(f.height_at(-m, -m), f.height_at_padded(0, 0));
    }

    #[test]
    #[should_panic(expected = "beyond the border margin")]
    fn test_sampling_past_margin_panics() {
        let f = field();
        let _ = f.height_at(-(BORDER_MARGIN as isize) - 1, 0);
    }

    #[test]
    fn test_full_coverage_classifies_every_cell() {
        let f = field();
        assert_eq!(f.unclassified_count(), 0);
        for y in 0..f.vertices_y() {
            for x in 0..f.vertices_x() {
                let h = f.height_at(x as isize, y as isize);
                let expected = regions().color_for(h);
                assert_eq!(f.color_at(x, y), expected);
            }
        }
    }

    #[test]
    fn test_uncovered_heights_keep_sentinel() {
        let partial = RegionTable::new(vec![Region {
            name: "low".into(),
            threshold: 0.5,
            color: Color::rgba(0, 0, 255, 255),
        }])
        .unwrap();
        let noise = NoiseField::new(vec![NoiseLayer::default()]);
        let f = HeightField::build(3, &noise, &partial, 40, 40);
        assert!(f.unclassified_count() > 0);

        let mut sentinel_cells = 0;
        for y in 0..40 {
            for x in 0..40 {
                if f.height_at(x as isize, y as isize) > 0.5 {
                    assert_eq!(f.color_at(x, y), Color::UNCLASSIFIED);
                    sentinel_cells += 1;
                }
            }
        }
        assert_eq!(sentinel_cells, f.unclassified_count());
    }

    #[test]
    fn test_color_region_slices_rows() {
        let f = field();
        let region = f.color_region(10, 5, 8, 4).unwrap();
        assert_eq!(region.colors.len(), 32);
        assert_eq!(region.colors[0], f.color_at(10, 5));
        assert_eq!(region.colors[8 * 3 + 7], f.color_at(17, 8));
        assert!(f.color_region(45, 0, 8, 4).is_none());
    }

    #[test]
    fn test_height_image_dimensions() {
        let image = field().height_image();
        assert_eq!(image.dimensions(), (49, 33));
    }

    #[test]
    fn test_from_grid_flat_field() {
        let side = 2 * BORDER_MARGIN + 5;
        let grid = HeightGrid::from_values(side, side, vec![0.25; side * side]);
        let f = HeightField::from_grid(grid, &regions());
        assert_eq!(f.vertices_x(), 5);
        assert_eq!(f.color_at(4, 4), Color::rgba(0, 0, 255, 255));
    }
}
