//! Tile asset lookup.
//!
//! The map core never loads images. It only needs pixel dimensions for the
//! editor's decoration hit-test and a variant count per kind for the brush.
//! A kind/variant pair with no registered asset is a configuration error and
//! surfaces as [`AssetError::MissingTile`].

use crate::tile::TileKind;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("no asset registered for tile {kind} variant {variant}")]
    MissingTile { kind: TileKind, variant: u32 },
    #[error("failed to read asset manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse asset manifest {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("asset manifest validation failed: {0}")]
    Invalid(String),
}

/// Source of per-tile asset facts.
pub trait TileAssets {
    /// Pixel `(width, height)` of the image for this kind/variant.
    fn tile_dimensions(&self, kind: TileKind, variant: u32) -> Result<(u32, u32), AssetError>;

    /// Number of variants available for `kind`. Zero if the kind is unknown.
    fn variant_count(&self, kind: TileKind) -> usize;
}

/// Raw manifest document: kind name to a list of `[width, height]`, one per
/// variant in variant order.
#[derive(Debug, Deserialize)]
struct ManifestFile {
    tiles: HashMap<String, Vec<[u32; 2]>>,
}

#[derive(Debug, Clone, Default)]
pub struct AssetManifest {
    sizes: HashMap<TileKind, Vec<(u32, u32)>>,
}

impl AssetManifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `count` variants of `kind`, all with the same dimensions.
    pub fn with_uniform(mut self, kind: TileKind, count: usize, size: (u32, u32)) -> Self {
        self.sizes.insert(kind, vec![size; count]);
        self
    }

    pub fn insert(&mut self, kind: TileKind, sizes: Vec<(u32, u32)>) {
        self.sizes.insert(kind, sizes);
    }

    pub fn kinds(&self) -> impl Iterator<Item = TileKind> + '_ {
        TileKind::ALL
            .iter()
            .copied()
            .filter(|kind| self.sizes.contains_key(kind))
    }
}

impl TileAssets for AssetManifest {
    fn tile_dimensions(&self, kind: TileKind, variant: u32) -> Result<(u32, u32), AssetError> {
        self.sizes
            .get(&kind)
            .and_then(|sizes| sizes.get(variant as usize))
            .copied()
            .ok_or(AssetError::MissingTile { kind, variant })
    }

    fn variant_count(&self, kind: TileKind) -> usize {
        self.sizes.get(&kind).map_or(0, Vec::len)
    }
}

pub fn load_manifest_from_path(path: &Path) -> Result<AssetManifest, AssetError> {
    let raw = fs::read_to_string(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file: ManifestFile = serde_json::from_str(&raw).map_err(|source| AssetError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let mut manifest = AssetManifest::new();
    for (name, sizes) in file.tiles {
        let kind: TileKind = name.parse().map_err(AssetError::Invalid)?;
        if sizes.is_empty() {
            return Err(AssetError::Invalid(format!("tile group '{name}' has no variants")));
        }
        if let Some([w, h]) = sizes.iter().find(|[w, h]| *w == 0 || *h == 0) {
            return Err(AssetError::Invalid(format!(
                "tile group '{name}' has an empty image ({w}x{h})"
            )));
        }
        manifest.insert(kind, sizes.into_iter().map(|[w, h]| (w, h)).collect());
    }
    log::debug!(
        "Loaded asset manifest {} ({} tile groups)",
        path.display(),
        manifest.sizes.len()
    );
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_file_parses() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("tiles.json");
        fs::write(
            &path,
            r#"{ "tiles": { "grass": [[16,16],[16,16]], "decorations": [[11,9]] } }"#,
        )
        .expect("write manifest");

        let manifest = load_manifest_from_path(&path).expect("manifest should load");
        assert_eq!(manifest.variant_count(TileKind::Grass), 2);
        assert_eq!(
            manifest.tile_dimensions(TileKind::Decoration, 0).expect("known tile"),
            (11, 9)
        );
        assert_eq!(manifest.variant_count(TileKind::Spawner), 0);
    }

    #[test]
    fn missing_variant_fails_loudly() {
        let manifest = AssetManifest::new().with_uniform(TileKind::Grass, 9, (16, 16));
        let err = manifest
            .tile_dimensions(TileKind::Grass, 9)
            .expect_err("variant 9 does not exist");
        assert!(matches!(
            err,
            AssetError::MissingTile {
                kind: TileKind::Grass,
                variant: 9
            }
        ));
    }

    #[test]
    fn unknown_group_name_is_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("tiles.json");
        fs::write(&path, r#"{ "tiles": { "lava": [[16,16]] } }"#).expect("write manifest");
        let err = load_manifest_from_path(&path).expect_err("unknown kind");
        assert!(err.to_string().contains("unknown tile kind 'lava'"));
    }
}
