//! Curve solving for eased keyframe segments.
//!
//! A segment's timing is a cubic Bezier through (0,0) and (1,1) whose inner
//! control points come from the leaving keyframe's out-handle and the arriving
//! keyframe's in-handle.

pub mod functions;

pub use functions::{control_points, solve, solve_with};
