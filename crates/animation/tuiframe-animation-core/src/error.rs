//! Error types for loading and exporting keyframe stores.
//!
//! Engine operations themselves are total; only the persisted layout can be
//! rejected.

/// Convenience result type for fallible store I/O.
pub type AnimationResult<T> = Result<T, AnimationError>;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum AnimationError {
    /// A stored property record carried no keyframes.
    #[error("Animated property {node_id}.{property} has no keyframes")]
    EmptyProperty { node_id: String, property: String },

    /// Two stored records share the same `(nodeId, property)` pair.
    #[error("Duplicate animated property {node_id}.{property}")]
    DuplicateProperty { node_id: String, property: String },

    /// Two keyframes of one property share a frame.
    #[error("Duplicate keyframe at frame {frame} on {node_id}.{property}")]
    DuplicateFrame {
        node_id: String,
        property: String,
        frame: u32,
    },

    #[error("Non-finite value at frame {frame} on {node_id}.{property}")]
    NonFiniteValue {
        node_id: String,
        property: String,
        frame: u32,
    },

    /// Handle component outside its range or not finite.
    #[error(
        "Invalid easing handle at frame {frame} on {node_id}.{property}: tension={tension}, bias={bias}"
    )]
    InvalidHandle {
        node_id: String,
        property: String,
        frame: u32,
        tension: f64,
        bias: f64,
    },

    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },
}

impl AnimationError {
    /// Error category for logging.
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::EmptyProperty { .. }
            | Self::DuplicateProperty { .. }
            | Self::DuplicateFrame { .. } => "data",
            Self::NonFiniteValue { .. } | Self::InvalidHandle { .. } => "validation",
            Self::SerializationError { .. } => "serialization",
        }
    }
}

impl From<serde_json::Error> for AnimationError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError {
            reason: err.to_string(),
        }
    }
}
