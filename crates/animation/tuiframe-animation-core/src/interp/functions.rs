//! Interpolation helpers:
//! - cubic Bezier basis and its derivative over (0, p1, p2, 1)
//! - handle -> control point mapping
//! - Newton-Raphson inversion of X(u) = t followed by Y(u)

use crate::config::SolverConfig;
use crate::data::EasingHandle;

/// Vertical offset that puts a zero-bias handle near a visually linear curve.
const BIAS_CENTER: f64 = 0.33;

/// Linear interpolation of scalars.
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Cubic Bezier basis with pinned endpoints p0 = 0, p3 = 1.
#[inline]
fn cubic_bezier(p1: f64, p2: f64, u: f64) -> f64 {
    let v = 1.0 - u;
    3.0 * v * v * u * p1 + 3.0 * v * u * u * p2 + u * u * u
}

#[inline]
fn cubic_bezier_derivative(p1: f64, p2: f64, u: f64) -> f64 {
    let v = 1.0 - u;
    3.0 * v * v * p1 + 6.0 * v * u * (p2 - p1) + 3.0 * u * u * (1.0 - p2)
}

/// Map a segment's handles to Bezier control points `[x1, y1, x2, y2]`.
#[inline]
pub fn control_points(handle_out: &EasingHandle, handle_in: &EasingHandle) -> [f64; 4] {
    [
        handle_out.tension / 100.0,
        handle_out.bias / 100.0 + BIAS_CENTER,
        1.0 - handle_in.tension / 100.0,
        1.0 - handle_in.bias / 100.0 - BIAS_CENTER,
    ]
}

/// Find the curve parameter `u` whose X component equals `t`.
fn invert_x(t: f64, x1: f64, x2: f64, cfg: &SolverConfig) -> f64 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    let mut u = t;
    for _ in 0..cfg.max_iterations {
        let err = cubic_bezier(x1, x2, u) - t;
        if err.abs() < cfg.tolerance {
            break;
        }
        let slope = cubic_bezier_derivative(x1, x2, u);
        if slope.abs() < cfg.min_slope {
            break;
        }
        u = (u - err / slope).clamp(0.0, 1.0);
    }
    u
}

/// Eased time for normalized `t` on the segment shaped by `handle_out` (leaving
/// keyframe) and `handle_in` (arriving keyframe), using the stock solver budget.
///
/// Endpoints are pinned: `solve(0, ..) == 0` and `solve(1, ..) == 1`. Results
/// fall in `[-0.5, 1.5]`.
#[inline]
pub fn solve(t: f64, handle_out: &EasingHandle, handle_in: &EasingHandle) -> f64 {
    solve_with(t, handle_out, handle_in, &SolverConfig::default())
}

/// [`solve`] with an explicit solver configuration.
pub fn solve_with(
    t: f64,
    handle_out: &EasingHandle,
    handle_in: &EasingHandle,
    cfg: &SolverConfig,
) -> f64 {
    let [x1, y1, x2, y2] = control_points(handle_out, handle_in);
    let u = invert_x(t, x1, x2, cfg);
    cubic_bezier(y1, y2, u).clamp(cfg.output_min, cfg.output_max)
}
