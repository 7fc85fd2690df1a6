use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;

/// Manifest sections ("stores", "scenes") mapping fixture names to paths
/// relative to the fixtures root.
type Manifest = BTreeMap<String, BTreeMap<String, String>>;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

/// Persisted keyframe stores (record-list layout).
pub const STORES: Group = Group {
    section: "stores",
    kind: "store",
};

/// Serialized scene-tree snapshots.
pub const SCENES: Group = Group {
    section: "scenes",
    kind: "scene",
};

/// One manifest section of named JSON fixtures.
#[derive(Clone, Copy, Debug)]
pub struct Group {
    section: &'static str,
    kind: &'static str,
}

impl Group {
    /// Fixture names in this group, sorted.
    pub fn keys(&self) -> Vec<String> {
        MANIFEST
            .get(self.section)
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn path(&self, name: &str) -> Result<PathBuf> {
        let rel = MANIFEST
            .get(self.section)
            .and_then(|entries| entries.get(name))
            .ok_or_else(|| anyhow!("unknown {} fixture '{name}'", self.kind))?;
        Ok(Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures")
            .join(rel))
    }

    /// Raw fixture text.
    pub fn json(&self, name: &str) -> Result<String> {
        let path = self.path(name)?;
        fs::read_to_string(&path)
            .with_context(|| format!("reading {} fixture {}", self.kind, path.display()))
    }

    /// Fixture deserialized into `T`.
    pub fn load<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let text = self.json(name)?;
        serde_json::from_str(&text)
            .with_context(|| format!("parsing {} fixture '{name}'", self.kind))
    }
}
