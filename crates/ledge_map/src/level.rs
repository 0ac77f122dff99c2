//! Level file persistence.
//!
//! On-disk format (JSON):
//!
//! ```json
//! { "tile_map": { "3;10": { "type": "grass", "variant": 1, "pos": [3, 10] } },
//!   "tile_size": 16,
//!   "off_grid": [ { "type": "decorations", "variant": 0, "pos": [52.0, 140.0] } ] }
//! ```
//!
//! Grid `pos` is in cells, off-grid `pos` in world pixels. Loading parses and
//! validates the whole document before touching the live map, so a bad file
//! never leaves a half-loaded level behind.

use crate::tile::{GridPos, GridTile, OffGridTile, TileKind};
use crate::tilemap::TileMap;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("level file {path} does not exist")]
    NotFound { path: PathBuf },
    #[error("failed to access level file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse level JSON {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("level validation failed: {0}")]
    InvalidKey(String),
    #[error("level validation failed: key '{key}' does not match tile position {pos}")]
    KeyMismatch { key: String, pos: GridPos },
    #[error("level validation failed: tile_size must be > 0, got {0}")]
    InvalidTileSize(i32),
}

impl LevelError {
    /// "No level data yet" rather than a broken file.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LevelFile {
    pub tile_map: BTreeMap<String, GridTileRecord>,
    pub tile_size: i32,
    pub off_grid: Vec<OffGridRecord>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct GridTileRecord {
    #[serde(rename = "type")]
    pub kind: TileKind,
    pub variant: u32,
    pub pos: [i32; 2],
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct OffGridRecord {
    #[serde(rename = "type")]
    pub kind: TileKind,
    pub variant: u32,
    pub pos: [f32; 2],
}

impl LevelFile {
    pub fn from_tile_map(map: &TileMap) -> Self {
        let tile_map = map
            .grid_tiles()
            .map(|tile| {
                (
                    tile.pos.to_string(),
                    GridTileRecord {
                        kind: tile.kind,
                        variant: tile.variant,
                        pos: [tile.pos.x, tile.pos.y],
                    },
                )
            })
            .collect();
        let off_grid = map
            .off_grid_tiles()
            .iter()
            .map(|tile| OffGridRecord {
                kind: tile.kind,
                variant: tile.variant,
                pos: [tile.pos.x, tile.pos.y],
            })
            .collect();
        Self {
            tile_map,
            tile_size: map.tile_size(),
            off_grid,
        }
    }

    /// Validate and convert into a map. Every key must be the canonical
    /// encoding of its tile's `pos`.
    pub fn into_tile_map(self) -> Result<TileMap, LevelError> {
        if self.tile_size <= 0 {
            return Err(LevelError::InvalidTileSize(self.tile_size));
        }

        let mut grid = Vec::with_capacity(self.tile_map.len());
        for (key, record) in self.tile_map {
            let key_pos: GridPos = key.parse().map_err(LevelError::InvalidKey)?;
            let pos = GridPos::new(record.pos[0], record.pos[1]);
            if key_pos != pos {
                return Err(LevelError::KeyMismatch { key, pos });
            }
            grid.push(GridTile {
                kind: record.kind,
                variant: record.variant,
                pos,
            });
        }

        let off_grid = self
            .off_grid
            .into_iter()
            .map(|record| OffGridTile {
                kind: record.kind,
                variant: record.variant,
                pos: Vec2::new(record.pos[0], record.pos[1]),
            })
            .collect();

        Ok(TileMap::from_parts(self.tile_size, grid, off_grid))
    }
}

pub fn parse_level(raw: &str, path: &Path) -> Result<TileMap, LevelError> {
    let file: LevelFile = serde_json::from_str(raw).map_err(|source| LevelError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    file.into_tile_map()
}

pub fn load_level_from_path(path: &Path) -> Result<TileMap, LevelError> {
    let raw = fs::read_to_string(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => LevelError::NotFound {
            path: path.to_path_buf(),
        },
        _ => LevelError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;
    parse_level(&raw, path)
}

impl TileMap {
    /// Replace this map (tiles, decorations and tile size) with the level at
    /// `path`. On any error the map is left exactly as it was.
    pub fn load(&mut self, path: &Path) -> Result<(), LevelError> {
        let loaded = load_level_from_path(path)?;
        if loaded.tile_size() != self.tile_size() {
            log::info!(
                "Level {} switches tile size {} -> {}",
                path.display(),
                self.tile_size(),
                loaded.tile_size()
            );
        }
        *self = loaded;
        log::info!(
            "Loaded level {} ({} grid tiles, {} decorations)",
            path.display(),
            self.grid_len(),
            self.off_grid_tiles().len()
        );
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<(), LevelError> {
        let file = LevelFile::from_tile_map(self);
        let json = serde_json::to_string_pretty(&file).map_err(|source| LevelError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| LevelError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, json).map_err(|source| LevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!(
            "Saved level {} ({} grid tiles, {} decorations)",
            path.display(),
            self.grid_len(),
            self.off_grid_tiles().len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_map() -> TileMap {
        let mut map = TileMap::new(16);
        for x in -3..6 {
            map.place(GridPos::new(x, 10), TileKind::Grass, 1);
        }
        map.place(GridPos::new(10, -5), TileKind::Cobblestone, 3);
        map.place(GridPos::new(2, 9), TileKind::Spawner, 0);
        map.place_off_grid(Vec2::new(52.5, 140.0), TileKind::Decoration, 2);
        map.place_off_grid(Vec2::new(52.5, 140.0), TileKind::Decoration, 2);
        map.place_off_grid(Vec2::new(-8.0, 120.0), TileKind::BigDecoration, 1);
        map
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("levels").join("0.json");
        let original = sample_map();
        original.save(&path).expect("save should succeed");

        let mut loaded = TileMap::default();
        loaded.load(&path).expect("load should succeed");
        assert_eq!(loaded, original);
    }

    #[test]
    fn saved_document_uses_string_keys_and_arrays() {
        let map = sample_map();
        let json = serde_json::to_value(LevelFile::from_tile_map(&map)).expect("to json");
        assert_eq!(json["tile_size"], 16);
        assert_eq!(json["tile_map"]["-3;10"]["type"], "grass");
        assert_eq!(json["tile_map"]["-3;10"]["pos"], serde_json::json!([-3, 10]));
        assert_eq!(json["tile_map"]["10;-5"]["variant"], 3);
        assert_eq!(json["off_grid"][2]["type"], "big_decorations");
        assert_eq!(json["off_grid"][0]["pos"], serde_json::json!([52.5, 140.0]));
    }

    #[test]
    fn load_missing_file_is_recoverable_and_leaves_map() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut map = sample_map();
        let err = map
            .load(&dir.path().join("nope.json"))
            .expect_err("file does not exist");
        assert!(err.is_not_found());
        assert_eq!(map, sample_map());
    }

    #[test]
    fn malformed_file_does_not_mutate_live_map() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("bad.json");
        fs::write(
            &path,
            r#"{ "tile_map": { "0;0": { "type": "lava", "variant": 0, "pos": [0, 0] } },
                 "tile_size": 16, "off_grid": [] }"#,
        )
        .expect("write level");

        let mut map = sample_map();
        let err = map.load(&path).expect_err("unknown kind should fail");
        assert!(matches!(err, LevelError::Parse { .. }));
        assert!(!err.is_not_found());
        assert_eq!(map, sample_map());
    }

    #[test]
    fn key_position_mismatch_is_rejected() {
        let raw = r#"{ "tile_map": { "1;2": { "type": "grass", "variant": 0, "pos": [2, 1] } },
                       "tile_size": 16, "off_grid": [] }"#;
        let err = parse_level(raw, Path::new("inline.json")).expect_err("mismatch");
        assert!(matches!(err, LevelError::KeyMismatch { .. }));
    }

    #[test]
    fn non_canonical_key_is_rejected() {
        let raw = r#"{ "tile_map": { "01;2": { "type": "grass", "variant": 0, "pos": [1, 2] } },
                       "tile_size": 16, "off_grid": [] }"#;
        let err = parse_level(raw, Path::new("inline.json")).expect_err("bad key");
        assert!(matches!(err, LevelError::InvalidKey(_)));
    }

    #[test]
    fn loaded_tile_size_replaces_session_size() {
        let raw = r#"{ "tile_map": { "1;2": { "type": "grass", "variant": 0, "pos": [1, 2] } },
                       "tile_size": 32, "off_grid": [ { "type": "decorations", "variant": 0, "pos": [3, 4] } ] }"#;
        let map = parse_level(raw, Path::new("inline.json")).expect("valid level");
        assert_eq!(map.tile_size(), 32);
        assert_eq!(map.off_grid_tiles()[0].pos, Vec2::new(3.0, 4.0));
        assert_eq!(
            map.physics_tiles_near(Vec2::new(40.0, 70.0)),
            vec![crate::tile::Aabb::new(32.0, 64.0, 32.0, 32.0)]
        );
    }

    #[test]
    fn far_spawner_extracts_without_overflow() {
        let raw = r#"{ "tile_map": { "200000000;0": { "type": "spawners", "variant": 0, "pos": [200000000, 0] } },
                       "tile_size": 16, "off_grid": [] }"#;
        let mut map = parse_level(raw, Path::new("inline.json")).expect("valid level");
        let spawners = map.extract(&[(TileKind::Spawner, 0)], false);
        assert_eq!(spawners.len(), 1);
        assert_eq!(spawners[0].pos, Vec2::new(3_200_000_000.0, 0.0));
        assert!(map.is_empty());
    }

    #[test]
    fn zero_tile_size_is_rejected() {
        let raw = r#"{ "tile_map": {}, "tile_size": 0, "off_grid": [] }"#;
        let err = parse_level(raw, Path::new("inline.json")).expect_err("zero size");
        assert!(matches!(err, LevelError::InvalidTileSize(0)));
    }
}
