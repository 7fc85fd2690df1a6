//! Timeline reindexing after the frame sequencer inserts or deletes a frame.
//!
//! Indices are 0-based and match the sequencer's. Only frame numbers move;
//! values and handles ride along unchanged.

use std::sync::Arc;

use log::{debug, warn};

use crate::data::Frame;
use crate::store::KeyframeStore;

impl KeyframeStore {
    /// A frame was inserted at `at`: every keyframe at `frame >= at` moves one later.
    ///
    /// A keyframe already at `Frame::MAX` has no later frame to move to and is
    /// dropped, along with any property it leaves empty.
    #[must_use]
    pub fn on_frame_inserted(&self, at: Frame) -> Self {
        let mut next = self.clone();
        let mut shifted = 0usize;
        let mut overflowed = 0usize;
        for shared in next.properties.values_mut() {
            if shared.last().map_or(true, |k| k.frame < at) {
                continue;
            }
            let prop = Arc::make_mut(shared);
            if prop.keyframes.last().is_some_and(|k| k.frame == Frame::MAX) {
                warn!(
                    "frame inserted at {at}: {} keyframe at frame {} falls off the timeline",
                    prop.key,
                    Frame::MAX
                );
                prop.keyframes.pop();
                overflowed += 1;
            }
            for keyframe in prop.keyframes.iter_mut().filter(|k| k.frame >= at) {
                keyframe.frame += 1;
                shifted += 1;
            }
        }
        if overflowed > 0 {
            next.properties.retain(|_, p| !p.is_empty());
        }
        debug!("frame inserted at {at}: shifted {shifted} keyframes, dropped {overflowed}");
        next
    }

    /// The frame at `at` was deleted: keyframes on it are dropped, later ones
    /// move one earlier, and properties left empty are removed.
    #[must_use]
    pub fn on_frame_deleted(&self, at: Frame) -> Self {
        let mut next = self.clone();
        let mut dropped = 0usize;
        let mut shifted = 0usize;
        for shared in next.properties.values_mut() {
            if shared.last().map_or(true, |k| k.frame < at) {
                continue;
            }
            let prop = Arc::make_mut(shared);
            let before = prop.keyframes.len();
            prop.keyframes.retain(|k| k.frame != at);
            dropped += before - prop.keyframes.len();
            for keyframe in prop.keyframes.iter_mut().filter(|k| k.frame > at) {
                keyframe.frame -= 1;
                shifted += 1;
            }
        }
        let before = next.properties.len();
        next.properties.retain(|_, p| !p.is_empty());
        debug!(
            "frame deleted at {at}: dropped {dropped} keyframes, shifted {shifted}, removed {} properties",
            before - next.properties.len()
        );
        next
    }
}

#[cfg(test)]
mod tests {
    use crate::data::Frame;
    use crate::store::KeyframeStore;

    fn store_with(frames: &[Frame]) -> KeyframeStore {
        frames
            .iter()
            .fold(KeyframeStore::new(), |s, &f| s.upsert("box-1", "x", f, f as f64))
    }

    fn frames(store: &KeyframeStore) -> Vec<Frame> {
        store
            .get("box-1", "x")
            .map(|p| p.frames().collect())
            .unwrap_or_default()
    }

    #[test]
    fn insert_shifts_at_and_after() {
        let store = store_with(&[2, 5, 8]).on_frame_inserted(5);
        assert_eq!(frames(&store), vec![2, 6, 9]);
    }

    #[test]
    fn delete_drops_and_shifts() {
        let store = store_with(&[2, 5, 8]).on_frame_deleted(5);
        assert_eq!(frames(&store), vec![2, 7]);
        // values travel with their keyframes
        let values: Vec<f64> = store
            .get("box-1", "x")
            .unwrap()
            .keyframes()
            .iter()
            .map(|k| k.value)
            .collect();
        assert_eq!(values, vec![2.0, 8.0]);
    }

    #[test]
    fn delete_removes_emptied_property() {
        let store = KeyframeStore::new()
            .upsert("box-1", "x", 3, 1.0)
            .upsert("box-1", "y", 4, 1.0)
            .on_frame_deleted(3);
        assert!(store.get("box-1", "x").is_none());
        let y: Vec<Frame> = store.get("box-1", "y").unwrap().frames().collect();
        assert_eq!(y, vec![3]);
    }

    #[test]
    fn frames_before_index_untouched() {
        let store = store_with(&[0, 1, 2]);
        assert_eq!(store.on_frame_inserted(10), store);
        assert_eq!(store.on_frame_deleted(10), store);
    }

    #[test]
    fn insert_then_delete_round_trips() {
        let store = store_with(&[0, 3, 7])
            .upsert("box-2", "y", 4, 2.0)
            .set_handle("box-1", "x", 7, 80.0, 30.0);
        for i in [1, 4, 5, 8, 20] {
            assert_eq!(store.on_frame_inserted(i).on_frame_deleted(i), store, "index {i}");
        }
    }

    #[test]
    fn insert_drops_keyframe_at_end_of_timeline() {
        let store = store_with(&[Frame::MAX - 1, Frame::MAX]).on_frame_inserted(Frame::MAX - 1);
        assert_eq!(frames(&store), vec![Frame::MAX]);
        let kf = &store.get("box-1", "x").unwrap().keyframes()[0];
        assert_eq!(kf.value, f64::from(Frame::MAX - 1));
        // still a valid persisted store
        assert_eq!(KeyframeStore::from_records(store.to_records()).unwrap(), store);
    }

    #[test]
    fn insert_removes_property_emptied_at_end_of_timeline() {
        let store = store_with(&[Frame::MAX])
            .upsert("box-2", "y", 3, 1.0)
            .on_frame_inserted(0);
        assert!(store.get("box-1", "x").is_none());
        let y: Vec<Frame> = store.get("box-2", "y").unwrap().frames().collect();
        assert_eq!(y, vec![4]);
    }

    #[test]
    fn reindex_at_last_frame() {
        let store = store_with(&[4, Frame::MAX - 1]);
        assert_eq!(frames(&store.on_frame_inserted(Frame::MAX)), vec![4, Frame::MAX - 1]);
        let inserted = store.on_frame_inserted(Frame::MAX - 1);
        assert_eq!(frames(&inserted), vec![4, Frame::MAX]);
        assert_eq!(inserted.on_frame_deleted(Frame::MAX - 1), store);
        assert_eq!(frames(&store.on_frame_deleted(Frame::MAX - 1)), vec![4]);
    }
}
