//! Square falloff mask that tapers heights toward the edges of a region.

use strata_config::FalloffConfig;

/// Falloff mask `f(v) = v^a / (v^a + (b - b*v)^a)`, where `v` is the
/// Chebyshev distance of a cell from the region center mapped into [0, 1].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FalloffMask {
    /// Transition sharpness `a`.
    pub transition: f32,
    /// Bias `b`; larger values push the transition outward.
    pub bias: f32,
}

impl FalloffMask {
    /// Build the mask from configuration, or `None` when disabled.
    pub fn from_config(config: &FalloffConfig) -> Option<Self> {
        config.enabled.then_some(Self {
            transition: config.transition,
            bias: config.bias,
        })
    }

    /// Evaluate the easing curve for a normalized distance `v` in [0, 1].
    pub fn evaluate(&self, v: f32) -> f32 {
        let a = v.powf(self.transition);
        let b = (self.bias - self.bias * v).powf(self.transition);
        let denominator = a + b;
        if denominator <= 0.0 {
            return 0.0;
        }
        (a / denominator).clamp(0.0, 1.0)
    }

    /// Mask value for cell `(x, y)` of a `width` x `height` region.
    pub fn at(&self, x: usize, y: usize, width: usize, height: usize) -> f32 {
        let j = x as f32 / width as f32 * 2.0 - 1.0;
        let k = y as f32 / height as f32 * 2.0 - 1.0;
        self.evaluate(j.abs().max(k.abs()))
    }

    /// Row-major mask values for a whole region.
    pub fn map(&self, width: usize, height: usize) -> Vec<f32> {
        let mut values = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                values.push(self.at(x, y, width, height));
            }
        }
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask() -> FalloffMask {
        FalloffMask {
            transition: 3.0,
            bias: 2.2,
        }
    }

    #[test]
    fn test_disabled_config_yields_none() {
        assert!(FalloffMask::from_config(&FalloffConfig::default()).is_none());
        let enabled = FalloffConfig {
            enabled: true,
            ..Default::default()
        };
        assert!(FalloffMask::from_config(&enabled).is_some());
    }

    #[test]
    fn test_endpoints() {
        let m = mask();
        assert_eq!(m.evaluate(0.0), 0.0);
        assert_eq!(m.evaluate(1.0), 1.0);
    }

    #[test]
    fn test_monotonic_in_distance() {
        let m = mask();
        let mut prev = 0.0;
        for i in 0..=100 {
            let v = m.evaluate(i as f32 / 100.0);
            assert!(v + 1e-6 >= prev, "falloff decreased at {i}: {v} < {prev}");
            prev = v;
        }
    }

    #[test]
    fn test_center_low_edges_high() {
        let m = mask();
        let map = m.map(64, 64);
        let center = map[32 * 64 + 32];
        let corner = map[0];
        assert!(center < 0.01, "center should be near zero, got {center}");
        assert!(corner > 0.99, "corner should be near one, got {corner}");
    }

    #[test]
    fn test_zero_bias_does_not_divide_by_zero() {
        let m = FalloffMask {
            transition: 3.0,
            bias: 0.0,
        };
        assert_eq!(m.evaluate(0.0), 0.0);
        assert_eq!(m.evaluate(0.5), 1.0);
    }
}
