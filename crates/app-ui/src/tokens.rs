//! Motion tokens for Shopfront
//!
//! Durations and easing curves shared by screen transitions and
//! shared-element animations.

use serde::{Deserialize, Serialize};

// =============================================================================
// Animation Tokens
// =============================================================================

/// Animation durations in milliseconds
pub mod duration {
    /// Instant (0ms)
    pub const INSTANT: u32 = 0;
    /// Fast (100ms)
    pub const FAST: u32 = 100;
    /// Moderate (200ms)
    pub const MODERATE: u32 = 200;
    /// Slow (300ms), screen enter/exit
    pub const SLOW: u32 = 300;
    /// Extra slow (500ms), shared-element bounds
    pub const EXTRA_SLOW: u32 = 500;
}

/// Cubic-bezier easing curve through (0,0), (x1,y1), (x2,y2), (1,1)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CubicBezier {
    /// First control point x
    pub x1: f32,
    /// First control point y
    pub y1: f32,
    /// Second control point x
    pub x2: f32,
    /// Second control point y
    pub y2: f32,
}

impl CubicBezier {
    /// Create a curve from its two control points
    pub const fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    fn sample(a1: f32, a2: f32, s: f32) -> f32 {
        let inv = 1.0 - s;
        3.0 * inv * inv * s * a1 + 3.0 * inv * s * s * a2 + s * s * s
    }

    fn sample_derivative(a1: f32, a2: f32, s: f32) -> f32 {
        let inv = 1.0 - s;
        3.0 * inv * inv * a1 + 6.0 * inv * s * (a2 - a1) + 3.0 * s * s * (1.0 - a2)
    }

    /// Map linear progress `t` in `[0, 1]` to eased progress
    pub fn transform(&self, t: f32) -> f32 {
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }

        // Newton-Raphson on x(s) = t, bisection if the slope flattens out.
        let mut s = t;
        for _ in 0..8 {
            let x = Self::sample(self.x1, self.x2, s) - t;
            if x.abs() < 1e-5 {
                return Self::sample(self.y1, self.y2, s);
            }
            let dx = Self::sample_derivative(self.x1, self.x2, s);
            if dx.abs() < 1e-6 {
                break;
            }
            s -= x / dx;
        }

        let (mut lo, mut hi) = (0.0_f32, 1.0_f32);
        s = t;
        for _ in 0..32 {
            let x = Self::sample(self.x1, self.x2, s);
            if (x - t).abs() < 1e-5 {
                break;
            }
            if x < t {
                lo = s;
            } else {
                hi = s;
            }
            s = (lo + hi) / 2.0;
        }
        Self::sample(self.y1, self.y2, s)
    }
}

/// Easing curves
pub mod easing {
    use super::CubicBezier;

    /// Default easing curve
    pub const DEFAULT: CubicBezier = CubicBezier::new(0.17, 0.73, 0.14, 1.0);
    /// Linear
    pub const LINEAR: CubicBezier = CubicBezier::new(0.0, 0.0, 1.0, 1.0);
    /// Ease in
    pub const EASE_IN: CubicBezier = CubicBezier::new(0.4, 0.0, 1.0, 1.0);
    /// Ease out
    pub const EASE_OUT: CubicBezier = CubicBezier::new(0.0, 0.0, 0.2, 1.0);
    /// Ease in out
    pub const EASE_IN_OUT: CubicBezier = CubicBezier::new(0.4, 0.0, 0.2, 1.0);
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_scale() {
        assert!(duration::INSTANT < duration::FAST);
        assert!(duration::FAST < duration::MODERATE);
        assert!(duration::MODERATE < duration::SLOW);
        assert!(duration::SLOW < duration::EXTRA_SLOW);
        assert_eq!(duration::EXTRA_SLOW, 500);
    }

    #[test]
    fn test_easing_endpoints() {
        for curve in [
            easing::DEFAULT,
            easing::LINEAR,
            easing::EASE_IN,
            easing::EASE_OUT,
            easing::EASE_IN_OUT,
        ] {
            assert_eq!(curve.transform(0.0), 0.0);
            assert_eq!(curve.transform(1.0), 1.0);
            assert_eq!(curve.transform(-0.5), 0.0);
            assert_eq!(curve.transform(1.5), 1.0);
        }
    }

    #[test]
    fn test_linear_is_identity() {
        for t in [0.1, 0.25, 0.5, 0.9] {
            assert!((easing::LINEAR.transform(t) - t).abs() < 1e-3);
        }
    }

    #[test]
    fn test_ease_in_out_shape() {
        let curve = easing::EASE_IN_OUT;
        // Slow start, fast middle, slow finish
        assert!(curve.transform(0.1) < 0.1);
        assert!(curve.transform(0.9) > 0.9);
        assert!(curve.transform(0.5) > 0.5);

        let mut previous = 0.0;
        for step in 1..=20 {
            let value = curve.transform(step as f32 / 20.0);
            assert!(value >= previous);
            previous = value;
        }
    }
}
