//! A single multi-octave noise layer.
//!
//! Composites octaves of Perlin noise where each successive octave grows in
//! frequency by `lacunarity` and decays in amplitude by `persistence`.

use glam::DVec2;
use noise::NoiseFn;
use strata_config::{NoiseKind, NoiseLayerConfig};

/// Smallest scale a layer is allowed to use; non-positive scales are repaired to this.
pub const MIN_SCALE: f64 = 1e-4;

/// Parameters of one noise layer, already repaired into a usable range.
#[derive(Clone, Debug, PartialEq)]
pub struct NoiseLayer {
    /// Smooth or ridged composition.
    pub kind: NoiseKind,
    /// Number of octaves. Zero contributes nothing.
    pub octaves: u32,
    /// Amplitude multiplier between successive octaves (0.0 - 1.0).
    pub persistence: f64,
    /// Frequency multiplier between successive octaves (>= 1.0).
    pub lacunarity: f64,
    /// Divisor applied to cell coordinates before the first octave.
    pub scale: f64,
    /// Weight of this layer's output in the shared accumulator.
    pub strength: f64,
    /// Disabled layers are skipped entirely.
    pub enabled: bool,
    /// Offset added to every octave's sample position.
    pub offset: DVec2,
}

impl Default for NoiseLayer {
    fn default() -> Self {
        Self {
            kind: NoiseKind::Smooth,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
            scale: 50.0,
            strength: 1.0,
            enabled: true,
            offset: DVec2::ZERO,
        }
    }
}

impl NoiseLayer {
    /// Build a layer from configuration, repairing invalid values in place.
    pub fn from_config(config: &NoiseLayerConfig) -> Self {
        Self {
            kind: config.kind,
            octaves: config.octaves.max(0) as u32,
            persistence: f64::from(config.persistence),
            lacunarity: f64::from(config.lacunarity),
            scale: f64::from(config.scale),
            strength: f64::from(config.strength),
            enabled: config.enabled,
            offset: DVec2::new(f64::from(config.offset[0]), f64::from(config.offset[1])),
        }
        .repaired()
    }

    /// Clamp parameters into their valid ranges; non-positive scales become
    /// [`MIN_SCALE`].
    pub fn repaired(mut self) -> Self {
        if !(self.scale > 0.0) {
            tracing::warn!(scale = self.scale, "noise scale must be positive, using {MIN_SCALE}");
            self.scale = MIN_SCALE;
        }
        if !(self.lacunarity >= 1.0) {
            tracing::warn!(lacunarity = self.lacunarity, "lacunarity below 1, clamping");
            self.lacunarity = 1.0;
        }
        if !(0.0..=1.0).contains(&self.persistence) {
            tracing::warn!(persistence = self.persistence, "persistence outside [0, 1], clamping");
            self.persistence = if self.persistence > 1.0 { 1.0 } else { 0.0 };
        }
        self
    }

    /// Whether this layer contributes to the accumulator.
    pub fn contributes(&self) -> bool {
        self.enabled && self.octaves > 0 && self.strength != 0.0
    }

    /// Sample the layer at a cell coordinate.
    ///
    /// `offsets` holds one entry per octave (see [`crate::octave_offsets`]);
    /// octaves beyond `offsets.len()` are not sampled.
    pub fn sample(&self, noise: &impl NoiseFn<f64, 2>, offsets: &[DVec2], x: f64, y: f64) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;

        for offset in offsets.iter().take(self.octaves as usize) {
            let sample_x = (x + offset.x) / self.scale * frequency;
            let sample_y = (y + offset.y) / self.scale * frequency;
            let value = noise.get([sample_x, sample_y]);
            let value = match self.kind {
                NoiseKind::Smooth => value,
                NoiseKind::Ridged => 1.0 - value.abs(),
            };
            total += value * amplitude;

            amplitude *= self.persistence;
            frequency *= self.lacunarity;
        }

        total
    }
}
