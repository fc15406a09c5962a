//! Keyframed height curve applied to normalized heights before meshing.

use strata_config::CurveKey;

/// Piecewise-linear curve over `(time, value)` keys.
///
/// An empty curve is the identity. Inputs outside the key range clamp to the
/// first/last key's value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HeightCurve {
    keys: Vec<CurveKey>,
}

impl HeightCurve {
    /// Identity curve.
    pub fn identity() -> Self {
        Self::default()
    }

    /// Build a curve from keys in any order.
    pub fn new(mut keys: Vec<CurveKey>) -> Self {
        keys.retain(|k| k.time.is_finite() && k.value.is_finite());
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { keys }
    }

    /// Keys sorted by time.
    pub fn keys(&self) -> &[CurveKey] {
        &self.keys
    }

    /// Evaluate the curve at `t`.
    pub fn evaluate(&self, t: f32) -> f32 {
        let (first, last) = match (self.keys.first(), self.keys.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return t,
        };
        if t <= first.time {
            return first.value;
        }
        if t >= last.time {
            return last.value;
        }

        // First key strictly after t; t > first.time guarantees upper >= 1.
        let upper = self.keys.partition_point(|k| k.time <= t);
        let a = self.keys[upper - 1];
        let b = self.keys[upper];
        let span = b.time - a.time;
        if span <= 0.0 {
            return b.value;
        }
        let f = (t - a.time) / span;
        a.value + (b.value - a.value) * f
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(time: f32, value: f32) -> CurveKey {
        CurveKey { time, value }
    }

    #[test]
    fn test_empty_curve_is_identity() {
        let curve = HeightCurve::identity();
        for t in [0.0, 0.25, 0.8, 1.0] {
            assert_eq!(curve.evaluate(t), t);
        }
    }

    #[test]
    fn test_linear_interpolation_between_keys() {
        let curve = HeightCurve::new(vec![key(0.0, 0.0), key(0.5, 0.0), key(1.0, 1.0)]);
        assert_eq!(curve.evaluate(0.25), 0.0);
        assert!((curve.evaluate(0.75) - 0.5).abs() < 1e-6);
        assert_eq!(curve.evaluate(1.0), 1.0);
    }

    #[test]
    fn test_out_of_range_clamps() {
        let curve = HeightCurve::new(vec![key(0.2, 0.1), key(0.8, 0.9)]);
        assert_eq!(curve.evaluate(-1.0), 0.1);
        assert_eq!(curve.evaluate(2.0), 0.9);
    }

    #[test]
    fn test_unsorted_keys_are_sorted() {
        let curve = HeightCurve::new(vec![key(1.0, 1.0), key(0.0, 0.0)]);
        assert_eq!(curve.keys()[0].time, 0.0);
        assert!((curve.evaluate(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_single_key_is_constant() {
        let curve = HeightCurve::new(vec![key(0.4, 0.7)]);
        assert_eq!(curve.evaluate(0.0), 0.7);
        assert_eq!(curve.evaluate(1.0), 0.7);
    }
}
