//! Driven-value evaluation for animated properties.
//!
//! Model:
//! - A keyframe exactly at the frame wins and is returned verbatim; the curve
//!   solver never touches exact hits.
//! - Before the first keyframe the first value holds; after the last, the last.
//! - Between keyframes A and B the segment timing is the cubic Bezier built from
//!   A.handle_out and B.handle_in, and the value is a linear blend on eased time.
//!
//! API:
//! - drive(&AnimatedProperty, frame) for one property
//! - sample_store(&KeyframeStore, frame) for every property at once

use serde::{Deserialize, Serialize};

use crate::config::SolverConfig;
use crate::data::{AnimatedProperty, Frame, Keyframe};
use crate::interp::functions::{lerp, solve_with};
use crate::store::KeyframeStore;

/// Where a frame falls relative to a property's keyframes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Segment<'a> {
    /// A keyframe sits exactly at the frame.
    Exact(&'a Keyframe),
    /// Outside the keyed range; the nearest end keyframe holds.
    Hold(&'a Keyframe),
    /// Strictly between two adjacent keyframes.
    Between(&'a Keyframe, &'a Keyframe),
}

/// Locate `frame` among sorted `keyframes`. `None` only for an empty slice.
pub fn find_segment(keyframes: &[Keyframe], frame: Frame) -> Option<Segment<'_>> {
    let first = keyframes.first()?;
    let last = keyframes.last()?;
    Some(match keyframes.binary_search_by_key(&frame, |k| k.frame) {
        Ok(i) => Segment::Exact(&keyframes[i]),
        Err(0) => Segment::Hold(first),
        Err(i) if i >= keyframes.len() => Segment::Hold(last),
        Err(i) => Segment::Between(&keyframes[i - 1], &keyframes[i]),
    })
}

/// Value of `start -> end` at `frame`, eased by `start.handle_out` and `end.handle_in`.
pub fn interpolate(start: &Keyframe, end: &Keyframe, frame: Frame, cfg: &SolverConfig) -> f64 {
    if end.frame == start.frame {
        return start.value;
    }
    let span = f64::from(end.frame) - f64::from(start.frame);
    let t = (f64::from(frame) - f64::from(start.frame)) / span;
    let eased = solve_with(t, &start.handle_out, &end.handle_in, cfg);
    lerp(start.value, end.value, eased)
}

/// Driven value of `property` at `frame` with the stock solver settings.
#[inline]
pub fn drive(property: &AnimatedProperty, frame: Frame) -> f64 {
    drive_with(property, frame, &SolverConfig::default())
}

/// [`drive`] with an explicit solver configuration.
pub fn drive_with(property: &AnimatedProperty, frame: Frame, cfg: &SolverConfig) -> f64 {
    match find_segment(property.keyframes(), frame) {
        Some(Segment::Exact(k)) | Some(Segment::Hold(k)) => k.value,
        Some(Segment::Between(start, end)) => interpolate(start, end, frame, cfg),
        // Unreachable for store-built properties; fail-soft to a neutral scalar.
        None => 0.0,
    }
}

/// One property's driven value at a frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrivenValue {
    pub node_id: String,
    pub property: String,
    pub value: f64,
}

/// Drive every property in `store` at `frame`, in store order.
pub fn sample_store(store: &KeyframeStore, frame: Frame) -> Vec<DrivenValue> {
    let cfg = &store.config().solver;
    store
        .iter()
        .map(|p| DrivenValue {
            node_id: p.node_id().to_string(),
            property: p.property().to_string(),
            value: drive_with(p, frame, cfg),
        })
        .collect()
}
