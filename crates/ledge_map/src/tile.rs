//! Tile kinds, grid coordinates and the tile records stored in a [`TileMap`].
//!
//! Grid coordinates are value types in memory. The `"x;y"` string form exists
//! only at the level-file boundary, see [`GridPos`]'s `Display`/`FromStr`.
//!
//! [`TileMap`]: crate::tilemap::TileMap

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every tile kind a level can contain. The serialized names match the asset
/// group names used in level files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TileKind {
    #[serde(rename = "grass")]
    Grass,
    #[serde(rename = "cobblestone")]
    Cobblestone,
    #[serde(rename = "decorations")]
    Decoration,
    #[serde(rename = "big_decorations")]
    BigDecoration,
    #[serde(rename = "spawners")]
    Spawner,
}

impl TileKind {
    /// All kinds in editor palette order.
    pub const ALL: &'static [TileKind] = &[
        TileKind::Grass,
        TileKind::Cobblestone,
        TileKind::Decoration,
        TileKind::BigDecoration,
        TileKind::Spawner,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Grass => "grass",
            Self::Cobblestone => "cobblestone",
            Self::Decoration => "decorations",
            Self::BigDecoration => "big_decorations",
            Self::Spawner => "spawners",
        }
    }

    /// Participates in collision resolution.
    pub fn is_solid(self) -> bool {
        matches!(self, Self::Grass | Self::Cobblestone)
    }

    /// Variant is chosen from the neighbor pattern by `auto_tile`.
    pub fn is_autotiled(self) -> bool {
        matches!(self, Self::Grass | Self::Cobblestone)
    }
}

impl fmt::Display for TileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TileKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| format!("unknown tile kind '{s}'"))
    }
}

/// Integer cell coordinate on the tile grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Cell containing a world-space point (floor division, so negative
    /// coordinates land in negative cells).
    pub fn from_world(world: Vec2, tile_size: i32) -> Self {
        let size = tile_size as f32;
        Self {
            x: (world.x / size).floor() as i32,
            y: (world.y / size).floor() as i32,
        }
    }

    /// Top-left corner of this cell in world pixels. Computed in `f32`, so
    /// cells far from the origin lose precision instead of overflowing.
    pub fn to_world(self, tile_size: i32) -> Vec2 {
        let size = tile_size as f32;
        Vec2::new(self.x as f32 * size, self.y as f32 * size)
    }

    /// Neighboring cell, or `None` past the edge of the grid.
    pub fn checked_offset(self, dx: i32, dy: i32) -> Option<Self> {
        Some(Self {
            x: self.x.checked_add(dx)?,
            y: self.y.checked_add(dy)?,
        })
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};{}", self.x, self.y)
    }
}

/// Parses the canonical `"x;y"` key. Anything that would not re-encode to the
/// same string (`"+1;2"`, `"01;2"`, `"-0;0"`, whitespace) is rejected so two
/// different keys can never name the same cell.
impl FromStr for GridPos {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(';')
            .ok_or_else(|| format!("grid key '{s}' is missing ';'"))?;
        let x: i32 = x
            .parse()
            .map_err(|e| format!("grid key '{s}' has invalid x: {e}"))?;
        let y: i32 = y
            .parse()
            .map_err(|e| format!("grid key '{s}' has invalid y: {e}"))?;
        let pos = GridPos { x, y };
        if pos.to_string() != s {
            return Err(format!("grid key '{s}' is not in canonical form"));
        }
        Ok(pos)
    }
}

/// A tile aligned to the grid. Its position doubles as its map key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridTile {
    pub kind: TileKind,
    pub variant: u32,
    pub pos: GridPos,
}

/// A decoration placed at an arbitrary world position. Never collides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffGridTile {
    pub kind: TileKind,
    pub variant: u32,
    pub pos: Vec2,
}

/// A tile resolved to world pixels, as handed to the renderer and to
/// spawner extraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedTile {
    pub kind: TileKind,
    pub variant: u32,
    pub pos: Vec2,
}

/// Axis-aligned box, top-left origin, +y down.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Aabb {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Aabb {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos.x, pos.y, size.x, size.y)
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    /// Strict overlap: boxes that merely share an edge do not intersect, so a
    /// body resting flush on a tile is not considered inside it.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }

    /// Half-open containment: left/top edges inside, right/bottom outside.
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.left()
            && point.x < self.right()
            && point.y >= self.top()
            && point.y < self.bottom()
    }
}
