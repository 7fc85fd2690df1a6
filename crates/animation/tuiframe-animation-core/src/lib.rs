//! tuiframe Animation Core (engine-agnostic)
//!
//! Keyframe animation for terminal UI scene trees. Any numeric property of any
//! node, addressed by an opaque `(node id, property name)` pair, can be driven
//! over a discrete frame timeline with eased transitions between keyframes.
//!
//! Pieces, leaf-first:
//! - `interp`: cubic-Bezier curve solver (handles -> eased time)
//! - `store`: keyframe CRUD and navigation over immutable store values
//! - `sampling`: driven value of a property at a frame
//! - `reindex`: frame insertion/deletion bookkeeping
//! - `baking`: flatten a store onto per-frame tree snapshots
//!
//! Everything is synchronous and pure: each mutation takes a store value and
//! returns the next one.

pub mod baking;
pub mod config;
pub mod data;
pub mod error;
pub mod interp;
pub mod reindex;
pub mod sampling;
pub mod store;
pub mod stored_animation;

// Re-exports for consumers (editor, preview, exporters)
pub use baking::{bake, bake_with, JsonTreeWriter, SnapshotWriter};
pub use config::{Config, SolverConfig};
pub use data::{AnimatedProperty, EasingHandle, Frame, Keyframe, PropertyKey};
pub use error::{AnimationError, AnimationResult};
pub use interp::{solve, solve_with};
pub use sampling::{drive, drive_with, sample_store, DrivenValue, Segment};
pub use store::{KeyframeStore, Scope};
pub use stored_animation::{
    export_store_json, export_store_value, parse_store_json, StoredProperty,
};
