//! Easing functions for animation blocks
//!
//! An easing function maps leg progress in [0, 1] to an interpolation factor.
//! The factor may leave [0, 1]: back and elastic curves overshoot on purpose.
//!
//! Anything implementing [`EasingFunction`] can drive a block. The built-in
//! [`Easing`] curves implement it, and so does any `Fn(f32) -> f32` closure:
//!
//! ```rust
//! use animblock::easing::{Easing, EasingFunction};
//!
//! let smoothstep = |t: f32| t * t * (3.0 - 2.0 * t);
//! assert_eq!(smoothstep.ease(0.5), 0.5);
//! assert_eq!(Easing::Linear.ease(0.25), 0.25);
//! ```

use std::f32::consts::PI;
use std::fmt;
use std::sync::Arc;

/// A pure mapping from normalized progress to an interpolation factor
pub trait EasingFunction: Send + Sync {
    fn ease(&self, t: f32) -> f32;
}

impl<F> EasingFunction for F
where
    F: Fn(f32) -> f32 + Send + Sync,
{
    fn ease(&self, t: f32) -> f32 {
        self(t)
    }
}

impl EasingFunction for Easing {
    fn ease(&self, t: f32) -> f32 {
        self.apply(t)
    }
}

/// Shared, type-erased easing function stored on an animation record
#[derive(Clone)]
pub struct Ease(Arc<dyn EasingFunction>);

impl Ease {
    pub fn new<E: EasingFunction + 'static>(ease: E) -> Self {
        Self(Arc::new(ease))
    }

    pub fn apply(&self, t: f32) -> f32 {
        self.0.ease(t)
    }
}

impl EasingFunction for Ease {
    fn ease(&self, t: f32) -> f32 {
        self.apply(t)
    }
}

impl Default for Ease {
    fn default() -> Self {
        Self::new(Easing::Linear)
    }
}

impl fmt::Debug for Ease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Ease(..)")
    }
}

impl From<Easing> for Ease {
    fn from(easing: Easing) -> Self {
        Self::new(easing)
    }
}

/// Built-in easing curves
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Easing {
    #[default]
    Linear,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,
    EaseInQuart,
    EaseOutQuart,
    EaseInOutQuart,
    EaseInSine,
    EaseOutSine,
    EaseInOutSine,
    EaseInBack,
    EaseOutBack,
    EaseInOutBack,
    EaseInElastic,
    EaseOutElastic,
    EaseInOutElastic,
    EaseInBounce,
    EaseOutBounce,
    EaseInOutBounce,
    /// CSS-style cubic bezier with control points (x1, y1, x2, y2)
    CubicBezier(f32, f32, f32, f32),
}

// Overshoot constants for the back family
const BACK_C1: f32 = 1.70158;
const BACK_C2: f32 = BACK_C1 * 1.525;
const BACK_C3: f32 = BACK_C1 + 1.0;

impl Easing {
    /// Apply the curve to a progress value
    pub fn apply(&self, t: f32) -> f32 {
        match *self {
            Easing::Linear => t,
            Easing::EaseInQuad => t.powi(2),
            Easing::EaseOutQuad => out_of(t, |t| t.powi(2)),
            Easing::EaseInOutQuad => in_out_of(t, |t| t.powi(2)),
            Easing::EaseInCubic => t.powi(3),
            Easing::EaseOutCubic => out_of(t, |t| t.powi(3)),
            Easing::EaseInOutCubic => in_out_of(t, |t| t.powi(3)),
            Easing::EaseInQuart => t.powi(4),
            Easing::EaseOutQuart => out_of(t, |t| t.powi(4)),
            Easing::EaseInOutQuart => in_out_of(t, |t| t.powi(4)),
            Easing::EaseInSine => 1.0 - (t * PI / 2.0).cos(),
            Easing::EaseOutSine => (t * PI / 2.0).sin(),
            Easing::EaseInOutSine => -((PI * t).cos() - 1.0) / 2.0,
            Easing::EaseInBack => back_in(t),
            Easing::EaseOutBack => out_of(t, back_in),
            Easing::EaseInOutBack => {
                if t < 0.5 {
                    ((2.0 * t).powi(2) * ((BACK_C2 + 1.0) * 2.0 * t - BACK_C2)) / 2.0
                } else {
                    ((2.0 * t - 2.0).powi(2) * ((BACK_C2 + 1.0) * (t * 2.0 - 2.0) + BACK_C2)
                        + 2.0)
                        / 2.0
                }
            }
            Easing::EaseInElastic => elastic_in(t),
            Easing::EaseOutElastic => out_of(t, elastic_in),
            Easing::EaseInOutElastic => in_out_of(t, elastic_in),
            Easing::EaseInBounce => out_of(t, bounce_out),
            Easing::EaseOutBounce => bounce_out(t),
            Easing::EaseInOutBounce => {
                if t < 0.5 {
                    (1.0 - bounce_out(1.0 - 2.0 * t)) / 2.0
                } else {
                    (1.0 + bounce_out(2.0 * t - 1.0)) / 2.0
                }
            }
            Easing::CubicBezier(x1, y1, x2, y2) => TimingCurve::new(x1, y1, x2, y2).ease(t),
        }
    }
}

/// Mirror an ease-in curve into its ease-out counterpart
#[inline]
fn out_of(t: f32, ease_in: impl Fn(f32) -> f32) -> f32 {
    1.0 - ease_in(1.0 - t)
}

/// Ease-in for the first half, mirrored ease-out for the second
#[inline]
fn in_out_of(t: f32, ease_in: impl Fn(f32) -> f32) -> f32 {
    if t < 0.5 {
        ease_in(2.0 * t) / 2.0
    } else {
        1.0 - ease_in(2.0 - 2.0 * t) / 2.0
    }
}

fn back_in(t: f32) -> f32 {
    BACK_C3 * t.powi(3) - BACK_C1 * t.powi(2)
}

fn elastic_in(t: f32) -> f32 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    let c4 = (2.0 * PI) / 3.0;
    -(2.0f32.powf(10.0 * t - 10.0)) * ((t * 10.0 - 10.75) * c4).sin()
}

fn bounce_out(t: f32) -> f32 {
    const N1: f32 = 7.5625;
    const D1: f32 = 2.75;

    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        let t = t - 1.5 / D1;
        N1 * t * t + 0.75
    } else if t < 2.5 / D1 {
        let t = t - 2.25 / D1;
        N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / D1;
        N1 * t * t + 0.984375
    }
}

const BEZIER_EPSILON: f64 = 1e-7;

/// A CSS timing curve: a cubic bezier from (0, 0) to (1, 1).
///
/// Stores each axis as the polynomial `((a * s + b) * s + c) * s` in the curve
/// parameter `s`.
#[derive(Clone, Copy, Debug)]
struct TimingCurve {
    ax: f64,
    bx: f64,
    cx: f64,
    ay: f64,
    by: f64,
    cy: f64,
}

impl TimingCurve {
    fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        let (cx, bx, ax) = Self::coefficients(x1 as f64, x2 as f64);
        let (cy, by, ay) = Self::coefficients(y1 as f64, y2 as f64);
        Self { ax, bx, cx, ay, by, cy }
    }

    fn coefficients(p1: f64, p2: f64) -> (f64, f64, f64) {
        let c = 3.0 * p1;
        let b = 3.0 * (p2 - p1) - c;
        let a = 1.0 - c - b;
        (c, b, a)
    }

    fn x_at(&self, s: f64) -> f64 {
        ((self.ax * s + self.bx) * s + self.cx) * s
    }

    fn y_at(&self, s: f64) -> f64 {
        ((self.ay * s + self.by) * s + self.cy) * s
    }

    fn dx_at(&self, s: f64) -> f64 {
        (3.0 * self.ax * s + 2.0 * self.bx) * s + self.cx
    }

    /// Find `s` with `x_at(s) == x`
    fn solve_x(&self, x: f64) -> f64 {
        let mut s = x;
        for _ in 0..8 {
            let error = self.x_at(s) - x;
            if error.abs() < BEZIER_EPSILON {
                return s;
            }
            let slope = self.dx_at(s);
            if slope.abs() < BEZIER_EPSILON {
                break;
            }
            s -= error / slope;
        }

        // x is monotonic in s while x1 and x2 stay within [0, 1]
        let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
        s = x;
        for _ in 0..32 {
            let current = self.x_at(s);
            if (current - x).abs() < BEZIER_EPSILON {
                break;
            }
            if current < x {
                lo = s;
            } else {
                hi = s;
            }
            s = lo + (hi - lo) * 0.5;
        }
        s
    }

    fn ease(&self, t: f32) -> f32 {
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        self.y_at(self.solve_x(t as f64)) as f32
    }
}
