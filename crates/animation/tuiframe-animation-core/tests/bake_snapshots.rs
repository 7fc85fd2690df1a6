use std::borrow::Cow;

use serde_json::Value;
use tuiframe_animation_core::{
    bake, bake_with, parse_store_json, sampling::drive, JsonTreeWriter, KeyframeStore,
    SolverConfig,
};

fn scene() -> Value {
    tuiframe_test_fixtures::SCENES.load("two-boxes").expect("load two-boxes scene")
}

fn box_slide() -> KeyframeStore {
    let json = tuiframe_test_fixtures::STORES.json("box-slide").expect("load box-slide");
    parse_store_json(&json).expect("parse box-slide")
}

fn box1(snapshot: &Value) -> &Value {
    &snapshot["children"][0]
}

#[test]
fn bakes_driven_values_onto_each_frame() {
    let store = box_slide();
    let snapshots = vec![scene(); 12];
    let baked = bake(&snapshots, &store, &mut JsonTreeWriter::new());
    assert_eq!(baked.len(), snapshots.len());

    let x = store.get("box-1", "x").unwrap();
    let y = store.get("box-1", "y").unwrap();
    for (i, snap) in baked.iter().enumerate() {
        let frame = i as u32;
        let props = &box1(snap)["props"];
        assert_eq!(props["x"].as_f64(), Some(drive(x, frame)), "x @ {frame}");
        assert_eq!(props["y"].as_f64(), Some(drive(y, frame)), "y @ {frame}");
        // untouched props survive the copy
        assert_eq!(props["border"], "rounded");
    }
    assert_eq!(box1(&baked[0])["props"]["x"].as_f64(), Some(0.0));
    assert_eq!(box1(&baked[10])["props"]["x"].as_f64(), Some(100.0));
    assert_eq!(box1(&baked[11])["props"]["x"].as_f64(), Some(100.0));
}

#[test]
fn missing_nodes_are_skipped() {
    // box-slide also animates "box-ghost", which is not in the scene.
    let store = box_slide();
    let snapshots = vec![scene(); 3];
    let baked = bake(&snapshots, &store, &mut JsonTreeWriter::new());
    assert_eq!(baked.len(), 3);
    let text = serde_json::to_string(&baked[2]).unwrap();
    assert!(!text.contains("box-ghost"));
    // box-2 is not animated and stays as authored
    assert_eq!(baked[2]["children"][1], snapshots[2]["children"][1]);
}

#[test]
fn input_snapshots_are_not_modified() {
    let store = box_slide();
    let snapshots = vec![scene(); 5];
    let pristine = snapshots.clone();
    let _ = bake(&snapshots, &store, &mut JsonTreeWriter::new());
    assert_eq!(snapshots, pristine);
}

#[test]
fn empty_store_is_identity_without_copies() {
    let snapshots = vec![scene(); 4];
    let baked = bake(&snapshots, &KeyframeStore::new(), &mut JsonTreeWriter::new());
    assert!(matches!(baked, Cow::Borrowed(_)));
    assert!(std::ptr::eq(baked.as_ref(), snapshots.as_slice()));
}

#[test]
fn empty_sequence_bakes_to_empty() {
    let snapshots: Vec<Value> = Vec::new();
    let baked = bake(&snapshots, &box_slide(), &mut JsonTreeWriter::new());
    assert!(baked.is_empty());
}

#[test]
fn solver_config_reaches_the_bake() {
    let store = KeyframeStore::new()
        .upsert("box-1", "x", 0, 0.0)
        .upsert("box-1", "x", 4, 10.0)
        .set_handle("box-1", "x", 0, 0.0, 100.0)
        .set_handle("box-1", "x", 4, 0.0, -100.0);
    let tight = SolverConfig {
        output_min: 0.0,
        output_max: 1.0,
        ..SolverConfig::default()
    };
    let snapshots = vec![scene(); 5];
    let baked = bake_with(&snapshots, &store, &mut JsonTreeWriter::new(), &tight);
    for snap in baked.iter() {
        let x = box1(snap)["props"]["x"].as_f64().unwrap();
        assert!((0.0..=10.0).contains(&x), "x={x}");
    }
}
