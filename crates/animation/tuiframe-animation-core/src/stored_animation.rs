//! Persisted layout of a [`KeyframeStore`].
//!
//! The store is stored as a list of property records:
//!
//! ```json
//! [
//!   { "nodeId": "box-1", "property": "x",
//!     "keyframes": [
//!       { "frame": 0, "value": 0.0,
//!         "handleOut": { "tension": 33.0, "bias": 0.0 },
//!         "handleIn":  { "tension": 33.0, "bias": 0.0 } }
//!     ] }
//! ]
//! ```
//!
//! The outer project file owns this list, so the shape must round-trip
//! exactly. Loading validates everything the store relies on (non-empty
//! properties, unique frames, finite values, in-range handles); keyframes may
//! arrive in any order and are sorted on load.

use std::sync::Arc;

use hashbrown::HashSet;
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::data::{AnimatedProperty, Keyframe, PropertyKey};
use crate::error::{AnimationError, AnimationResult};
use crate::store::KeyframeStore;

/// One animated property as it appears on disk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredProperty {
    pub node_id: String,
    pub property: String,
    pub keyframes: Vec<Keyframe>,
}

impl KeyframeStore {
    /// Snapshot the store as persisted records, in store order.
    pub fn to_records(&self) -> Vec<StoredProperty> {
        self.iter()
            .map(|p| StoredProperty {
                node_id: p.node_id().to_string(),
                property: p.property().to_string(),
                keyframes: p.keyframes().to_vec(),
            })
            .collect()
    }

    /// Rebuild a store from persisted records, validating every invariant.
    pub fn from_records(records: Vec<StoredProperty>) -> AnimationResult<Self> {
        let mut seen: HashSet<(String, String)> = HashSet::with_capacity(records.len());
        let mut properties = IndexMap::with_capacity(records.len());
        for record in records {
            let StoredProperty {
                node_id,
                property,
                mut keyframes,
            } = record;

            if !seen.insert((node_id.clone(), property.clone())) {
                return Err(AnimationError::DuplicateProperty { node_id, property });
            }
            if keyframes.is_empty() {
                return Err(AnimationError::EmptyProperty { node_id, property });
            }
            for k in &keyframes {
                if !k.value.is_finite() {
                    return Err(AnimationError::NonFiniteValue {
                        node_id,
                        property,
                        frame: k.frame,
                    });
                }
                if let Some(h) = [k.handle_out, k.handle_in].into_iter().find(|h| !h.is_valid()) {
                    return Err(AnimationError::InvalidHandle {
                        node_id,
                        property,
                        frame: k.frame,
                        tension: h.tension,
                        bias: h.bias,
                    });
                }
            }
            keyframes.sort_by_key(|k| k.frame);
            if let Some(w) = keyframes.windows(2).find(|w| w[0].frame == w[1].frame) {
                let frame = w[0].frame;
                return Err(AnimationError::DuplicateFrame {
                    node_id,
                    property,
                    frame,
                });
            }

            let key = PropertyKey::new(node_id, property);
            properties.insert(key.clone(), Arc::new(AnimatedProperty::new(key, keyframes)));
        }
        debug!("loaded {} animated properties", properties.len());
        Ok(Self {
            properties,
            ..Self::default()
        })
    }
}

impl TryFrom<Vec<StoredProperty>> for KeyframeStore {
    type Error = AnimationError;

    fn try_from(records: Vec<StoredProperty>) -> Result<Self, Self::Error> {
        Self::from_records(records)
    }
}

impl From<KeyframeStore> for Vec<StoredProperty> {
    fn from(store: KeyframeStore) -> Self {
        store.to_records()
    }
}

/// Parse a persisted store from JSON.
pub fn parse_store_json(s: &str) -> AnimationResult<KeyframeStore> {
    let records: Vec<StoredProperty> = serde_json::from_str(s)?;
    KeyframeStore::from_records(records)
}

/// Export a store as its persisted JSON list.
pub fn export_store_json(store: &KeyframeStore) -> AnimationResult<String> {
    Ok(serde_json::to_string(&store.to_records())?)
}

/// Export a store as a `serde_json::Value` for embedding in a larger document.
pub fn export_store_value(store: &KeyframeStore) -> AnimationResult<serde_json::Value> {
    Ok(serde_json::to_value(store.to_records())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::EasingHandle;

    fn record(node: &str, prop: &str, keyframes: Vec<Keyframe>) -> StoredProperty {
        StoredProperty {
            node_id: node.into(),
            property: prop.into(),
            keyframes,
        }
    }

    #[test]
    fn records_round_trip() {
        let store = KeyframeStore::new()
            .upsert("box-1", "x", 0, 0.0)
            .upsert("box-1", "x", 10, 100.0)
            .set_handle("box-1", "x", 10, 75.0, -20.0)
            .upsert("label", "opacity", 3, 0.5);
        let back = KeyframeStore::from_records(store.to_records()).unwrap();
        assert_eq!(back, store);
        assert_eq!(back.to_records(), store.to_records());
    }

    #[test]
    fn unsorted_keyframes_are_sorted_on_load() {
        let store = KeyframeStore::from_records(vec![record(
            "box-1",
            "x",
            vec![Keyframe::new(9, 1.0), Keyframe::new(2, 0.0)],
        )])
        .unwrap();
        let frames: Vec<u32> = store.get("box-1", "x").unwrap().frames().collect();
        assert_eq!(frames, vec![2, 9]);
    }

    #[test]
    fn rejects_invalid_records() {
        let err = KeyframeStore::from_records(vec![record("a", "x", vec![])]).unwrap_err();
        assert!(matches!(err, AnimationError::EmptyProperty { .. }));

        let err = KeyframeStore::from_records(vec![record(
            "a",
            "x",
            vec![Keyframe::new(1, 0.0), Keyframe::new(1, 2.0)],
        )])
        .unwrap_err();
        assert!(matches!(err, AnimationError::DuplicateFrame { frame: 1, .. }));

        let err = KeyframeStore::from_records(vec![
            record("a", "x", vec![Keyframe::new(0, 0.0)]),
            record("a", "x", vec![Keyframe::new(1, 0.0)]),
        ])
        .unwrap_err();
        assert!(matches!(err, AnimationError::DuplicateProperty { .. }));

        let bad = Keyframe::with_handles(
            0,
            0.0,
            EasingHandle {
                tension: 120.0,
                bias: 0.0,
            },
            EasingHandle::DEFAULT,
        );
        let err = KeyframeStore::from_records(vec![record("a", "x", vec![bad])]).unwrap_err();
        assert!(matches!(err, AnimationError::InvalidHandle { tension, .. } if tension == 120.0));
    }

    #[test]
    fn serde_uses_record_list() {
        let store = KeyframeStore::new().upsert("box-1", "x", 2, 4.0);
        let json = serde_json::to_value(&store).unwrap();
        assert_eq!(json[0]["nodeId"], "box-1");
        assert_eq!(json[0]["property"], "x");
        assert_eq!(json[0]["keyframes"][0]["frame"], 2);
        assert_eq!(json[0]["keyframes"][0]["handleIn"]["tension"], 33.0);
        let back: KeyframeStore = serde_json::from_value(json).unwrap();
        assert_eq!(back, store);
    }

    #[test]
    fn json_helpers() {
        let store = KeyframeStore::new().upsert("n", "p", 1, 2.0);
        let text = export_store_json(&store).unwrap();
        assert_eq!(parse_store_json(&text).unwrap(), store);
        assert_eq!(export_store_value(&store).unwrap()[0]["nodeId"], "n");
        let err = parse_store_json("{").unwrap_err();
        assert_eq!(err.category(), "serialization");
    }
}
