//! Shared JSON fixtures for the cadenza crates, looked up by name through
//! `fixtures/manifest.json`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<std::result::Result<Manifest, String>> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).map_err(|err| err.to_string())
});

#[derive(Debug, Deserialize)]
struct Manifest {
    clips: BTreeMap<String, String>,
    easing: BTreeMap<String, String>,
}

fn manifest() -> Result<&'static Manifest> {
    MANIFEST
        .as_ref()
        .map_err(|err| anyhow!("fixtures manifest failed to parse: {err}"))
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup<'a>(map: &'a BTreeMap<String, String>, kind: &str, name: &str) -> Result<&'a str> {
    map.get(name)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

/// Serialized `AnimationClip` documents.
pub mod clips {
    use super::*;

    pub fn keys() -> Vec<String> {
        manifest()
            .map(|m| m.clips.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn json(name: &str) -> Result<String> {
        let rel = lookup(&manifest()?.clips, "clip", name)?;
        read_to_string(rel)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let rel = lookup(&manifest()?.clips, "clip", name)?;
        super::load_json(rel)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let rel = lookup(&manifest()?.clips, "clip", name)?;
        Ok(resolve_path(rel))
    }
}

/// Reference samples for the easing family.
pub mod easing {
    use super::*;

    /// One named curve and its `(t, y)` samples.
    #[derive(Debug, Clone, Deserialize)]
    pub struct ReferenceCurve {
        pub name: String,
        pub samples: Vec<(f64, f64)>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ReferenceTable {
        pub tolerance: f64,
        pub curves: Vec<ReferenceCurve>,
    }

    pub fn keys() -> Vec<String> {
        manifest()
            .map(|m| m.easing.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let rel = lookup(&manifest()?.easing, "easing", name)?;
        super::load_json(rel)
    }

    pub fn reference() -> Result<ReferenceTable> {
        load("reference")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_manifest_entry_resolves() {
        for key in clips::keys() {
            let path = clips::path(&key).unwrap();
            assert!(path.exists(), "missing clip fixture {}", path.display());
        }
        assert!(!easing::reference().unwrap().curves.is_empty());
    }

    #[test]
    fn unknown_fixture_is_an_error() {
        assert!(clips::json("no-such-clip").is_err());
    }
}
