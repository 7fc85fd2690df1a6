//! Keyframe store: every animated `(node, property)` timeline, with CRUD and
//! navigation queries.
//!
//! Mutations never touch the receiver. Each call clones the store (one `Arc`
//! bump per property) and copy-on-writes only the property it edits, so prior
//! store values stay valid and share everything unchanged with their successors.

use std::sync::Arc;

use indexmap::IndexMap;
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::data::{AnimatedProperty, EasingHandle, Frame, KeyRef, Keyframe, PropertyKey};
use crate::stored_animation::StoredProperty;

/// Which keyframes a navigation query looks at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope<'a> {
    /// A single animated property.
    Property { node_id: &'a str, property: &'a str },
    /// Every animated property of one node.
    Node(&'a str),
}

impl<'a> Scope<'a> {
    pub fn property(node_id: &'a str, property: &'a str) -> Self {
        Self::Property { node_id, property }
    }
}

/// All animated properties, in first-animated order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<StoredProperty>", into = "Vec<StoredProperty>")]
pub struct KeyframeStore {
    pub(crate) properties: IndexMap<PropertyKey, Arc<AnimatedProperty>>,
    pub(crate) config: Config,
}

impl PartialEq for KeyframeStore {
    fn eq(&self, other: &Self) -> bool {
        self.properties == other.properties
    }
}

impl KeyframeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty store using `config`. The default handle is normalized first, so
    /// every keyframe the store creates carries a valid handle.
    pub fn with_config(config: Config) -> Self {
        Self {
            properties: IndexMap::new(),
            config: config.normalized(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of animated properties.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Total keyframes across every property.
    pub fn keyframe_count(&self) -> usize {
        self.properties.values().map(|p| p.len()).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnimatedProperty> + '_ {
        self.properties.values().map(|p| p.as_ref())
    }

    pub fn get(&self, node_id: &str, property: &str) -> Option<&AnimatedProperty> {
        self.properties
            .get(&KeyRef { node_id, property })
            .map(|p| p.as_ref())
    }

    pub fn properties_for_node<'s>(
        &'s self,
        node_id: &'s str,
    ) -> impl Iterator<Item = &'s AnimatedProperty> + 's {
        self.iter().filter(move |p| p.node_id() == node_id)
    }

    pub fn has_keyframe_at(&self, node_id: &str, property: &str, frame: Frame) -> bool {
        self.get(node_id, property)
            .is_some_and(|p| p.keyframe_at(frame).is_some())
    }

    /// Closest keyframe frame strictly before `frame` within `scope`.
    pub fn prev_keyframe_frame(&self, scope: Scope<'_>, frame: Frame) -> Option<Frame> {
        match scope {
            Scope::Property { node_id, property } => {
                self.get(node_id, property)?.prev_frame(frame)
            }
            Scope::Node(node_id) => self
                .properties_for_node(node_id)
                .filter_map(|p| p.prev_frame(frame))
                .max(),
        }
    }

    /// Closest keyframe frame strictly after `frame` within `scope`.
    pub fn next_keyframe_frame(&self, scope: Scope<'_>, frame: Frame) -> Option<Frame> {
        match scope {
            Scope::Property { node_id, property } => {
                self.get(node_id, property)?.next_frame(frame)
            }
            Scope::Node(node_id) => self
                .properties_for_node(node_id)
                .filter_map(|p| p.next_frame(frame))
                .min(),
        }
    }

    /// Sorted, deduplicated frames holding a keyframe on any property of `node_id`.
    pub fn node_keyframe_frames(&self, node_id: &str) -> Vec<Frame> {
        let mut frames: Vec<Frame> = self
            .properties_for_node(node_id)
            .flat_map(|p| p.frames())
            .collect();
        frames.sort_unstable();
        frames.dedup();
        frames
    }

    /// Set `value` at `frame`. A new keyframe gets the configured default handle
    /// on both sides; an existing keyframe keeps its handles.
    #[must_use]
    pub fn upsert(&self, node_id: &str, property: &str, frame: Frame, value: f64) -> Self {
        let handle = self.config.default_handle;
        let mut next = self.clone();
        next.upsert_in_place(
            node_id,
            property,
            Keyframe::with_handles(frame, value, handle, handle),
            false,
        );
        next
    }

    /// Set `value` and both handles at `frame`, replacing whatever was there.
    #[must_use]
    pub fn upsert_with_handles(
        &self,
        node_id: &str,
        property: &str,
        frame: Frame,
        value: f64,
        handle_out: EasingHandle,
        handle_in: EasingHandle,
    ) -> Self {
        let mut next = self.clone();
        if !handle_out.is_valid() || !handle_in.is_valid() {
            warn!("ignoring keyframe with invalid handles at {node_id}.{property}@{frame}");
            return next;
        }
        next.upsert_in_place(
            node_id,
            property,
            Keyframe::with_handles(frame, value, handle_out, handle_in),
            true,
        );
        next
    }

    /// Drop the keyframe at `frame`; the property goes with its last keyframe.
    #[must_use]
    pub fn remove(&self, node_id: &str, property: &str, frame: Frame) -> Self {
        let mut next = self.clone();
        next.remove_in_place(node_id, property, frame);
        next
    }

    /// Set both handles of the keyframe at `frame` to the same clamped ease.
    /// No-op when there is no such keyframe or either input is not finite.
    #[must_use]
    pub fn set_handle(
        &self,
        node_id: &str,
        property: &str,
        frame: Frame,
        tension: f64,
        bias: f64,
    ) -> Self {
        let mut next = self.clone();
        next.set_handle_in_place(node_id, property, frame, tension, bias);
        next
    }

    pub(crate) fn upsert_in_place(
        &mut self,
        node_id: &str,
        property: &str,
        keyframe: Keyframe,
        replace_handles: bool,
    ) {
        if !keyframe.value.is_finite() {
            warn!(
                "ignoring non-finite value {} at {node_id}.{property}@{}",
                keyframe.value, keyframe.frame
            );
            return;
        }
        trace!(
            "upsert {node_id}.{property}@{} = {}",
            keyframe.frame,
            keyframe.value
        );
        match self.properties.get_mut(&KeyRef { node_id, property }) {
            Some(shared) => {
                let prop = Arc::make_mut(shared);
                match prop.position(keyframe.frame) {
                    Ok(i) => {
                        let existing = &mut prop.keyframes[i];
                        existing.value = keyframe.value;
                        if replace_handles {
                            existing.handle_out = keyframe.handle_out;
                            existing.handle_in = keyframe.handle_in;
                        }
                    }
                    Err(i) => prop.keyframes.insert(i, keyframe),
                }
            }
            None => {
                let key = self.intern_key(node_id, property);
                debug!("animating new property {key}");
                self.properties
                    .insert(key.clone(), Arc::new(AnimatedProperty::new(key, vec![keyframe])));
            }
        }
    }

    pub(crate) fn remove_in_place(&mut self, node_id: &str, property: &str, frame: Frame) {
        let lookup = KeyRef { node_id, property };
        let Some(shared) = self.properties.get_mut(&lookup) else {
            return;
        };
        let Ok(idx) = shared.position(frame) else {
            return;
        };
        trace!("remove {node_id}.{property}@{frame}");
        if shared.len() == 1 {
            self.properties.shift_remove(&lookup);
            debug!("dropped empty property {node_id}.{property}");
        } else {
            Arc::make_mut(shared).keyframes.remove(idx);
        }
    }

    pub(crate) fn set_handle_in_place(
        &mut self,
        node_id: &str,
        property: &str,
        frame: Frame,
        tension: f64,
        bias: f64,
    ) {
        let Some(handle) = EasingHandle::clamped(tension, bias) else {
            warn!("ignoring non-finite handle ({tension}, {bias}) at {node_id}.{property}@{frame}");
            return;
        };
        let Some(shared) = self.properties.get_mut(&KeyRef { node_id, property }) else {
            return;
        };
        let Ok(idx) = shared.position(frame) else {
            return;
        };
        let keyframe = &mut Arc::make_mut(shared).keyframes[idx];
        keyframe.handle_out = handle;
        keyframe.handle_in = handle;
    }

    /// Build a key that reuses already-interned node id / property strings.
    fn intern_key(&self, node_id: &str, property: &str) -> PropertyKey {
        let node = self
            .properties
            .keys()
            .find(|k| &*k.node_id == node_id)
            .map(|k| Arc::clone(&k.node_id))
            .unwrap_or_else(|| Arc::from(node_id));
        let prop = self
            .properties
            .keys()
            .find(|k| &*k.property == property)
            .map(|k| Arc::clone(&k.property))
            .unwrap_or_else(|| Arc::from(property));
        PropertyKey {
            node_id: node,
            property: prop,
        }
    }
}
