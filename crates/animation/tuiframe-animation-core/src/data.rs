//! Keyframe data model: easing handles, keyframes and animated properties.
//!
//! Keyframes are addressed by `(node id, property name, frame)`; there are no
//! synthetic ids. An [`AnimatedProperty`] is only ever built by the store, which
//! keeps its keyframe list non-empty and strictly ascending by frame.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Discrete, 0-based frame index on the timeline.
pub type Frame = u32;

pub const TENSION_MIN: f64 = 0.0;
pub const TENSION_MAX: f64 = 100.0;
pub const BIAS_MIN: f64 = -100.0;
pub const BIAS_MAX: f64 = 100.0;

/// One side of a segment's ease curve.
///
/// `tension` moves the Bezier control point horizontally (0 = abrupt,
/// 100 = maximally eased), `bias` offsets it vertically (positive overshoots,
/// negative undershoots).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EasingHandle {
    pub tension: f64,
    pub bias: f64,
}

impl EasingHandle {
    /// Near-linear handle assigned to newly created keyframes.
    pub const DEFAULT: Self = Self {
        tension: 33.0,
        bias: 0.0,
    };

    /// Build a handle with both components clamped into range.
    /// Returns `None` if either component is NaN or infinite.
    pub fn clamped(tension: f64, bias: f64) -> Option<Self> {
        if !tension.is_finite() || !bias.is_finite() {
            return None;
        }
        Some(Self {
            tension: tension.clamp(TENSION_MIN, TENSION_MAX),
            bias: bias.clamp(BIAS_MIN, BIAS_MAX),
        })
    }

    /// True when both components are finite and inside their ranges.
    pub fn is_valid(&self) -> bool {
        self.tension.is_finite()
            && self.bias.is_finite()
            && (TENSION_MIN..=TENSION_MAX).contains(&self.tension)
            && (BIAS_MIN..=BIAS_MAX).contains(&self.bias)
    }
}

impl Default for EasingHandle {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A user-set value at one frame.
///
/// `handle_out` shapes the segment leaving this keyframe, `handle_in` the
/// segment arriving at it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Keyframe {
    pub frame: Frame,
    pub value: f64,
    pub handle_out: EasingHandle,
    pub handle_in: EasingHandle,
}

impl Keyframe {
    pub fn new(frame: Frame, value: f64) -> Self {
        Self::with_handles(frame, value, EasingHandle::DEFAULT, EasingHandle::DEFAULT)
    }

    pub fn with_handles(
        frame: Frame,
        value: f64,
        handle_out: EasingHandle,
        handle_in: EasingHandle,
    ) -> Self {
        Self {
            frame,
            value,
            handle_out,
            handle_in,
        }
    }
}

/// Identity of an animated property: an opaque node id plus a property name.
///
/// Both halves are shared `Arc<str>` so cloning a key (and every store value
/// holding it) never copies the strings.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct PropertyKey {
    pub node_id: Arc<str>,
    pub property: Arc<str>,
}

impl PropertyKey {
    pub fn new(node_id: impl Into<Arc<str>>, property: impl Into<Arc<str>>) -> Self {
        Self {
            node_id: node_id.into(),
            property: property.into(),
        }
    }
}

// Hash must stay field-by-field `str` hashing so borrowed lookups through
// `KeyRef` land in the same bucket.
impl Hash for PropertyKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.node_id.as_ref().hash(state);
        self.property.as_ref().hash(state);
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.node_id, self.property)
    }
}

/// Borrowed form of [`PropertyKey`] for allocation-free map lookups.
#[derive(Clone, Copy, Debug)]
pub(crate) struct KeyRef<'a> {
    pub node_id: &'a str,
    pub property: &'a str,
}

impl Hash for KeyRef<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.node_id.hash(state);
        self.property.hash(state);
    }
}

impl indexmap::Equivalent<PropertyKey> for KeyRef<'_> {
    fn equivalent(&self, key: &PropertyKey) -> bool {
        *key.node_id == *self.node_id && *key.property == *self.property
    }
}

/// The full keyframe timeline for one `(node, property)` pair.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimatedProperty {
    pub(crate) key: PropertyKey,
    /// Sorted by frame, strictly ascending, never empty.
    pub(crate) keyframes: Vec<Keyframe>,
}

impl AnimatedProperty {
    pub(crate) fn new(key: PropertyKey, keyframes: Vec<Keyframe>) -> Self {
        debug_assert!(!keyframes.is_empty());
        debug_assert!(keyframes.windows(2).all(|w| w[0].frame < w[1].frame));
        Self { key, keyframes }
    }

    pub fn key(&self) -> &PropertyKey {
        &self.key
    }

    pub fn node_id(&self) -> &str {
        &self.key.node_id
    }

    pub fn property(&self) -> &str {
        &self.key.property
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    pub fn first(&self) -> Option<&Keyframe> {
        self.keyframes.first()
    }

    pub fn last(&self) -> Option<&Keyframe> {
        self.keyframes.last()
    }

    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    pub fn frames(&self) -> impl Iterator<Item = Frame> + '_ {
        self.keyframes.iter().map(|k| k.frame)
    }

    /// Binary search by frame: `Ok(index)` on an exact hit, `Err(insert_at)` otherwise.
    pub fn position(&self, frame: Frame) -> Result<usize, usize> {
        self.keyframes.binary_search_by_key(&frame, |k| k.frame)
    }

    pub fn keyframe_at(&self, frame: Frame) -> Option<&Keyframe> {
        self.position(frame).ok().map(|i| &self.keyframes[i])
    }

    /// Closest keyframe frame strictly before `frame`.
    pub fn prev_frame(&self, frame: Frame) -> Option<Frame> {
        let idx = self.keyframes.partition_point(|k| k.frame < frame);
        idx.checked_sub(1).map(|i| self.keyframes[i].frame)
    }

    /// Closest keyframe frame strictly after `frame`.
    pub fn next_frame(&self, frame: Frame) -> Option<Frame> {
        let idx = self.keyframes.partition_point(|k| k.frame <= frame);
        self.keyframes.get(idx).map(|k| k.frame)
    }
}
