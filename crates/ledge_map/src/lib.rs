//! Tile map core shared by the game and the level editor.
//!
//! A level is a sparse grid of tiles keyed by cell plus a list of free-placed
//! decorations. The game consumes spatial queries (`physics_tiles_near`,
//! `solid_check`, `tiles_visible_in`) and one-shot `extract`; the editor
//! mutates it (`place`, `remove`, `auto_tile`) and persists it.

pub mod assets;
pub mod autotile;
pub mod level;
pub mod tile;
pub mod tilemap;

pub use assets::{AssetError, AssetManifest, TileAssets};
pub use level::LevelError;
pub use tile::{Aabb, GridPos, GridTile, OffGridTile, PlacedTile, TileKind};
pub use tilemap::TileMap;
