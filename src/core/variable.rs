//! Decision variable encodings.

use rand::{Rng, RngCore};

/// Scalar type of a decision variable.
///
/// Operators work in `f64` space and convert back through
/// [`from_f64`](Variable::from_f64), so one SBX or polynomial mutation
/// implementation serves both real and integer encodings.
///
/// Built-in implementations exist for `f64` and `i32`.
pub trait Variable: Copy + PartialOrd + Send + Sync + std::fmt::Debug + 'static {
    /// Draws a value uniformly from `[lower, upper]`.
    fn sample(lower: Self, upper: Self, rng: &mut dyn RngCore) -> Self;

    /// Widens the value to `f64`.
    fn to_f64(self) -> f64;

    /// Narrows an `f64` back to this encoding (integers round to nearest).
    fn from_f64(value: f64) -> Self;
}

impl Variable for f64 {
    fn sample(lower: Self, upper: Self, rng: &mut dyn RngCore) -> Self {
        if upper > lower {
            lower + rng.random::<f64>() * (upper - lower)
        } else {
            lower
        }
    }

    fn to_f64(self) -> f64 {
        self
    }

    fn from_f64(value: f64) -> Self {
        value
    }
}

impl Variable for i32 {
    fn sample(lower: Self, upper: Self, rng: &mut dyn RngCore) -> Self {
        if upper > lower {
            rng.random_range(lower..=upper)
        } else {
            lower
        }
    }

    fn to_f64(self) -> f64 {
        self as f64
    }

    fn from_f64(value: f64) -> Self {
        value.round() as i32
    }
}

/// Inclusive lower/upper bound of one decision variable.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds<V> {
    /// Smallest admissible value.
    pub lower: V,
    /// Largest admissible value.
    pub upper: V,
}

impl<V: Variable> Bounds<V> {
    /// Creates a bound pair.
    pub fn new(lower: V, upper: V) -> Self {
        Self { lower, upper }
    }

    /// Clamps `value` into the bounds.
    pub fn clamp(&self, value: V) -> V {
        if value < self.lower {
            self.lower
        } else if value > self.upper {
            self.upper
        } else {
            value
        }
    }

    /// Clamps an `f64` intermediate in `f64` space and converts it back.
    pub fn repair(&self, value: f64) -> V {
        let lower = self.lower.to_f64();
        let upper = self.upper.to_f64();
        self.clamp(V::from_f64(value.max(lower).min(upper)))
    }

    /// `upper - lower` in `f64` space.
    pub fn width(&self) -> f64 {
        self.upper.to_f64() - self.lower.to_f64()
    }

    /// Whether `value` lies inside the bounds.
    pub fn contains(&self, value: V) -> bool {
        value >= self.lower && value <= self.upper
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;

    #[test]
    fn test_sample_within_bounds() {
        let mut rng = create_rng(42);
        for _ in 0..1000 {
            let x = f64::sample(-2.0, 3.0, &mut rng);
            assert!((-2.0..=3.0).contains(&x));
            let k = i32::sample(1, 4, &mut rng);
            assert!((1..=4).contains(&k));
        }
    }

    #[test]
    fn test_sample_degenerate_bounds() {
        let mut rng = create_rng(42);
        assert_eq!(f64::sample(1.5, 1.5, &mut rng), 1.5);
        assert_eq!(i32::sample(3, 3, &mut rng), 3);
    }

    #[test]
    fn test_integer_rounding() {
        assert_eq!(i32::from_f64(2.49), 2);
        assert_eq!(i32::from_f64(2.5), 3);
        assert_eq!(i32::from_f64(-1.6), -2);
    }

    #[test]
    fn test_repair_clamps() {
        let b = Bounds::new(0, 10);
        assert_eq!(b.repair(-3.2), 0);
        assert_eq!(b.repair(12.7), 10);
        assert_eq!(b.repair(4.4), 4);
        let r = Bounds::new(0.0, 1.0);
        assert_eq!(r.clamp(1.5), 1.0);
        assert!(r.contains(0.5));
        assert!((r.width() - 1.0).abs() < 1e-15);
    }
}
