// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Easing curves for feedback animations.
//!
//! An [`Easing`] maps a linear time fraction in `[0, 1]` to an eased progress value.
//! Overshooting curves ([`Easing::SpringIn`], [`Easing::SpringOut`]) may leave `[0, 1]`
//! in between the end points.

use core::f64::consts::PI;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

/// Overshoot constant used by the spring curves.
const SPRING_OVERSHOOT: f64 = 1.701_58;

/// Easing curve applied to a feedback animation.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum Easing {
    /// No easing.
    #[default]
    Linear,
    /// Sine ease-in.
    SinIn,
    /// Sine ease-out.
    SinOut,
    /// Sine ease-in-out.
    SinInOut,
    /// Cubic ease-in.
    CubicIn,
    /// Cubic ease-out.
    CubicOut,
    /// Cubic ease-in-out.
    CubicInOut,
    /// Bounces at the start.
    BounceIn,
    /// Bounces at the end.
    BounceOut,
    /// Pulls back before moving forward.
    SpringIn,
    /// Overshoots the target before settling.
    SpringOut,
    /// CSS-style cubic Bézier with control points `(x1, y1)` and `(x2, y2)`.
    ///
    /// `x1` and `x2` are expected to lie in `[0, 1]`.
    CubicBezier {
        /// First control point, x.
        x1: f64,
        /// First control point, y.
        y1: f64,
        /// Second control point, x.
        x2: f64,
        /// Second control point, y.
        y2: f64,
    },
}

impl Easing {
    /// Apply the curve to a linear fraction. Inputs are clamped to `[0, 1]`.
    #[must_use]
    pub fn ease(self, fraction: f64) -> f64 {
        let x = fraction.clamp(0.0, 1.0);
        match self {
            Self::Linear => x,
            Self::SinIn => 1.0 - (x * PI / 2.0).cos(),
            Self::SinOut => (x * PI / 2.0).sin(),
            Self::SinInOut => -(PI * x).cos() / 2.0 + 0.5,
            Self::CubicIn => x * x * x,
            Self::CubicOut => {
                let t = x - 1.0;
                t * t * t + 1.0
            }
            Self::CubicInOut => {
                if x < 0.5 {
                    4.0 * x * x * x
                } else {
                    (x - 1.0) * (2.0 * x - 2.0) * (2.0 * x - 2.0) + 1.0
                }
            }
            Self::BounceIn => 1.0 - bounce_out(1.0 - x),
            Self::BounceOut => bounce_out(x),
            Self::SpringIn => x * x * ((SPRING_OVERSHOOT + 1.0) * x - SPRING_OVERSHOOT),
            Self::SpringOut => {
                let t = x - 1.0;
                t * t * ((SPRING_OVERSHOOT + 1.0) * t + SPRING_OVERSHOOT) + 1.0
            }
            Self::CubicBezier { x1, y1, x2, y2 } => cubic_bezier(x1, y1, x2, y2, x),
        }
    }
}

fn bounce_out(p: f64) -> f64 {
    const N: f64 = 7.5625;
    const D: f64 = 2.75;
    if p < 1.0 / D {
        N * p * p
    } else if p < 2.0 / D {
        let p = p - 1.5 / D;
        N * p * p + 0.75
    } else if p < 2.5 / D {
        let p = p - 2.25 / D;
        N * p * p + 0.9375
    } else {
        let p = p - 2.625 / D;
        N * p * p + 0.984_375
    }
}

/// Evaluate a unit cubic Bézier for the given x fraction.
///
/// Solves for the curve parameter with Newton-Raphson and falls back to bisection when
/// the derivative is too flat to converge.
fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64, fraction: f64) -> f64 {
    if fraction <= 0.0 {
        return 0.0;
    }
    if fraction >= 1.0 {
        return 1.0;
    }

    let cx = 3.0 * x1;
    let bx = 3.0 * (x2 - x1) - cx;
    let ax = 1.0 - cx - bx;

    let cy = 3.0 * y1;
    let by = 3.0 * (y2 - y1) - cy;
    let ay = 1.0 - cy - by;

    let sample = |a: f64, b: f64, c: f64, t: f64| ((a * t + b) * t + c) * t;
    let derivative = |a: f64, b: f64, c: f64, t: f64| (3.0 * a * t + 2.0 * b) * t + c;

    let mut t = fraction;
    let mut converged = false;
    for _ in 0..8 {
        let x = sample(ax, bx, cx, t) - fraction;
        if x.abs() < 1e-7 {
            converged = true;
            break;
        }
        let dx = derivative(ax, bx, cx, t);
        if dx.abs() < 1e-7 {
            break;
        }
        t = (t - x / dx).clamp(0.0, 1.0);
    }

    if !converged {
        let (mut lo, mut hi) = (0.0, 1.0);
        t = fraction;
        for _ in 0..24 {
            let delta = sample(ax, bx, cx, t) - fraction;
            if delta.abs() < 1e-7 {
                break;
            }
            if delta > 0.0 {
                hi = t;
            } else {
                lo = t;
            }
            t = 0.5 * (lo + hi);
        }
    }

    sample(ay, by, cy, t)
}
