//! Baking API: resolve every animated property onto a sequence of tree
//! snapshots (one per frame), producing keyframe-free output for export.
//!
//! The engine never walks the scene tree itself; node resolution and the write
//! are injected through [`SnapshotWriter`].

use std::borrow::Cow;

use hashbrown::HashSet;
use log::{debug, warn};
use serde_json::{Map, Number, Value};

use crate::config::SolverConfig;
use crate::data::Frame;
use crate::sampling::drive_with;
use crate::store::KeyframeStore;

/// Writes a driven value onto one node of a snapshot.
/// Hosts implement this (or pass a closure) to resolve node ids in their tree.
pub trait SnapshotWriter<S> {
    /// Returns `false` when `node_id` does not resolve in `snapshot`.
    fn write(&mut self, snapshot: &mut S, node_id: &str, property: &str, value: f64) -> bool;
}

impl<S, F> SnapshotWriter<S> for F
where
    F: FnMut(&mut S, &str, &str, f64) -> bool,
{
    fn write(&mut self, snapshot: &mut S, node_id: &str, property: &str, value: f64) -> bool {
        self(snapshot, node_id, property, value)
    }
}

/// Bake `store` onto `snapshots`, snapshot `i` receiving frame `i`.
///
/// An empty store returns the input borrowed without copying. Nodes that no
/// longer exist are skipped.
pub fn bake<'a, S, W>(snapshots: &'a [S], store: &KeyframeStore, writer: &mut W) -> Cow<'a, [S]>
where
    S: Clone,
    W: SnapshotWriter<S> + ?Sized,
{
    bake_with(snapshots, store, writer, &store.config().solver)
}

/// [`bake`] with an explicit solver configuration.
pub fn bake_with<'a, S, W>(
    snapshots: &'a [S],
    store: &KeyframeStore,
    writer: &mut W,
    cfg: &SolverConfig,
) -> Cow<'a, [S]>
where
    S: Clone,
    W: SnapshotWriter<S> + ?Sized,
{
    if store.is_empty() {
        return Cow::Borrowed(snapshots);
    }

    let mut missing: HashSet<&str> = HashSet::new();
    let mut baked = snapshots.to_vec();
    for (i, snapshot) in baked.iter_mut().enumerate() {
        let frame = frame_for_index(i);
        for property in store.iter() {
            let value = drive_with(property, frame, cfg);
            if !value.is_finite() {
                warn!(
                    "bake: {} is non-finite ({value}) at frame {frame}; skipped",
                    property.key()
                );
                continue;
            }
            if !writer.write(snapshot, property.node_id(), property.property(), value) {
                missing.insert(property.node_id());
            }
        }
    }
    for node_id in &missing {
        debug!("bake: node '{node_id}' not found in some snapshots; skipped");
    }
    debug!(
        "baked {} properties over {} frames",
        store.len(),
        baked.len()
    );
    Cow::Owned(baked)
}

/// Frame sampled for snapshot `index`. Indices past `Frame::MAX` hold the
/// last representable frame.
pub(crate) fn frame_for_index(index: usize) -> Frame {
    Frame::try_from(index).unwrap_or(Frame::MAX)
}

/// [`SnapshotWriter`] for JSON trees of the shape
/// `{ "id": .., "props": { .. }, "children": [ .. ] }`.
///
/// Nodes are matched on their id field anywhere in the tree (a top-level array
/// is treated as a forest). Values land in the props object, which is created
/// when missing.
#[derive(Clone, Debug)]
pub struct JsonTreeWriter {
    pub id_field: String,
    pub props_field: String,
    pub children_field: String,
}

impl Default for JsonTreeWriter {
    fn default() -> Self {
        Self {
            id_field: "id".into(),
            props_field: "props".into(),
            children_field: "children".into(),
        }
    }
}

impl JsonTreeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Depth-first search for the node whose id field equals `node_id`.
    pub fn find_node_mut<'v>(&self, tree: &'v mut Value, node_id: &str) -> Option<&'v mut Value> {
        let is_target = tree.get(&self.id_field).and_then(Value::as_str) == Some(node_id);
        if is_target {
            return Some(tree);
        }
        let children = match tree {
            Value::Array(roots) => roots,
            Value::Object(node) => node.get_mut(&self.children_field)?.as_array_mut()?,
            _ => return None,
        };
        children
            .iter_mut()
            .find_map(|child| self.find_node_mut(child, node_id))
    }

    fn write_json(
        &self,
        tree: &mut Value,
        node_id: &str,
        property: &str,
        value: f64,
    ) -> Option<()> {
        let node = self.find_node_mut(tree, node_id)?.as_object_mut()?;
        let props = node
            .entry(self.props_field.as_str())
            .or_insert_with(|| Value::Object(Map::new()))
            .as_object_mut()?;
        let Some(number) = Number::from_f64(value) else {
            warn!("bake: cannot store non-finite {value} for {node_id}.{property}");
            return None;
        };
        props.insert(property.to_string(), Value::Number(number));
        Some(())
    }
}

impl SnapshotWriter<Value> for JsonTreeWriter {
    fn write(&mut self, snapshot: &mut Value, node_id: &str, property: &str, value: f64) -> bool {
        self.write_json(snapshot, node_id, property, value).is_some()
    }
}
