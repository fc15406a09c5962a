//! Layered noise synthesis into a normalized height grid.
//!
//! Rows are split into batches that run on scoped worker threads. Each worker
//! owns a disjoint slice of the grid and reports the raw min/max of its rows;
//! all workers are joined before the bounds are combined and the grid is
//! rescaled, so the parallel and sequential paths are bit-identical.

use std::thread;

use glam::DVec2;
use noise::Perlin;
use strata_config::NoiseConfig;

use crate::falloff::FalloffMask;
use crate::noise_layer::NoiseLayer;
use crate::seed::octave_offsets;

/// Default number of row batches a field is split into.
pub const DEFAULT_NOISE_BATCHES: usize = 32;

/// A row-major grid of heights.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightGrid {
    width: usize,
    height: usize,
    values: Vec<f32>,
}

impl HeightGrid {
    /// Wrap row-major values. `values.len()` must equal `width * height`.
    pub fn from_values(width: usize, height: usize, values: Vec<f32>) -> Self {
        assert_eq!(values.len(), width * height, "grid size mismatch");
        Self {
            width,
            height,
            values,
        }
    }

    /// Grid width in cells.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in cells.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Height at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate lies outside the grid.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        assert!(x < self.width && y < self.height, "({x}, {y}) outside grid");
        self.values[y * self.width + x]
    }

    /// All values in row-major order.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Smallest and largest value, or `None` for an empty grid.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        let bounds = self
            .values
            .iter()
            .fold(RawBounds::EMPTY, |b, &v| b.include(v));
        (!bounds.is_empty()).then_some((bounds.min, bounds.max))
    }
}

/// Running min/max of raw (unnormalized) heights.
#[derive(Clone, Copy, Debug)]
struct RawBounds {
    min: f32,
    max: f32,
}

impl RawBounds {
    const EMPTY: Self = Self {
        min: f32::INFINITY,
        max: f32::NEG_INFINITY,
    };

    fn include(self, v: f32) -> Self {
        Self {
            min: self.min.min(v),
            max: self.max.max(v),
        }
    }

    fn merge(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    fn is_empty(&self) -> bool {
        self.min > self.max
    }
}

/// A layer with its seeded octave offsets, ready to sample.
struct PreparedLayer<'a> {
    layer: &'a NoiseLayer,
    offsets: Vec<DVec2>,
}

/// Composes noise layers and an optional falloff mask into normalized height grids.
#[derive(Clone, Debug)]
pub struct NoiseField {
    layers: Vec<NoiseLayer>,
    falloff: Option<FalloffMask>,
    batches: usize,
}

impl NoiseField {
    /// Create a field from already-repaired layers.
    pub fn new(layers: Vec<NoiseLayer>) -> Self {
        Self {
            layers: layers.into_iter().map(NoiseLayer::repaired).collect(),
            falloff: None,
            batches: DEFAULT_NOISE_BATCHES,
        }
    }

    /// Create a field from the noise section of the configuration.
    pub fn from_config(config: &NoiseConfig) -> Self {
        Self {
            layers: config.layers.iter().map(NoiseLayer::from_config).collect(),
            falloff: FalloffMask::from_config(&config.falloff),
            batches: config.worker_batches.max(1),
        }
    }

    /// Set the falloff mask subtracted after normalization.
    pub fn with_falloff(mut self, falloff: Option<FalloffMask>) -> Self {
        self.falloff = falloff;
        self
    }

    /// Set the number of row batches (at least one).
    pub fn with_batches(mut self, batches: usize) -> Self {
        self.batches = batches.max(1);
        self
    }

    /// Layers in accumulation order.
    pub fn layers(&self) -> &[NoiseLayer] {
        &self.layers
    }

    /// Falloff mask, if enabled.
    pub fn falloff(&self) -> Option<&FalloffMask> {
        self.falloff.as_ref()
    }

    /// Generate a normalized `width` x `height` grid on worker threads.
    ///
    /// Blocks until every batch has finished.
    pub fn generate(&self, width: usize, height: usize, seed: u64) -> HeightGrid {
        if width == 0 || height == 0 {
            return HeightGrid::from_values(width, height, Vec::new());
        }

        let prepared = self.prepare(seed);
        let batches = self.batches.clamp(1, height);
        let rows_per_batch = height.div_ceil(batches);
        let mut values = vec![0.0_f32; width * height];

        let bounds = thread::scope(|scope| {
            let handles: Vec<_> = values
                .chunks_mut(rows_per_batch * width)
                .enumerate()
                .map(|(batch, rows)| {
                    let prepared = &prepared;
                    let first_row = batch * rows_per_batch;
                    scope.spawn(move || fill_rows(prepared, seed, rows, width, first_row))
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| handle.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
                .fold(RawBounds::EMPTY, RawBounds::merge)
        });

        tracing::debug!(width, height, batches, "noise rows generated");
        self.finish(width, height, values, bounds)
    }

    /// Generate the same grid as [`generate`](Self::generate) on the calling thread.
    pub fn generate_sequential(&self, width: usize, height: usize, seed: u64) -> HeightGrid {
        if width == 0 || height == 0 {
            return HeightGrid::from_values(width, height, Vec::new());
        }

        let prepared = self.prepare(seed);
        let mut values = vec![0.0_f32; width * height];
        let bounds = fill_rows(&prepared, seed, &mut values, width, 0);
        self.finish(width, height, values, bounds)
    }

    fn prepare(&self, seed: u64) -> Vec<PreparedLayer<'_>> {
        self.layers
            .iter()
            .enumerate()
            .filter(|(_, layer)| layer.contributes())
            .map(|(index, layer)| PreparedLayer {
                layer,
                offsets: octave_offsets(seed, index, layer.octaves, layer.offset),
            })
            .collect()
    }

    /// Global rescale into [0, 1], then the optional falloff subtraction.
    fn finish(
        &self,
        width: usize,
        height: usize,
        mut values: Vec<f32>,
        bounds: RawBounds,
    ) -> HeightGrid {
        let range = bounds.max - bounds.min;
        if range > 0.0 {
            for v in &mut values {
                *v = (*v - bounds.min) / range;
            }
        } else {
            values.fill(0.0);
        }

        if let Some(mask) = &self.falloff {
            for y in 0..height {
                for x in 0..width {
                    let cell = &mut values[y * width + x];
                    *cell = (*cell - mask.at(x, y, width, height)).clamp(0.0, 1.0);
                }
            }
        }

        HeightGrid::from_values(width, height, values)
    }
}

/// Fill consecutive rows starting at `first_row`, returning their raw bounds.
fn fill_rows(
    layers: &[PreparedLayer<'_>],
    seed: u64,
    rows: &mut [f32],
    width: usize,
    first_row: usize,
) -> RawBounds {
    let perlin = Perlin::new(perlin_seed(seed));
    let mut bounds = RawBounds::EMPTY;

    for (row_index, row) in rows.chunks_mut(width).enumerate() {
        let y = (first_row + row_index) as f64;
        for (x, cell) in row.iter_mut().enumerate() {
            let x = x as f64;
            let total: f64 = layers
                .iter()
                .map(|p| p.layer.strength * p.layer.sample(&perlin, &p.offsets, x, y))
                .sum();
            *cell = total as f32;
            bounds = bounds.include(*cell);
        }
    }

    bounds
}

/// Fold a 64-bit world seed into the 32-bit permutation seed.
fn perlin_seed(seed: u64) -> u32 {
    (seed ^ (seed >> 32)) as u32
}
