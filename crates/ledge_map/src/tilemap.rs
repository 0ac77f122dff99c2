//! Sparse tile store: grid tiles keyed by cell, plus free-floating decorations.
//!
//! Lookup is a `HashMap<GridPos, GridTile>` so every spatial query is a
//! handful of O(1) probes. Nothing here scans the whole map except
//! `extract`, which runs once at level load, and `auto_tile`, which is an
//! editor command.

use crate::assets::{AssetError, TileAssets};
use crate::tile::{Aabb, GridPos, GridTile, OffGridTile, PlacedTile, TileKind};
use glam::Vec2;
use std::collections::HashMap;

pub const DEFAULT_TILE_SIZE: i32 = 16;

/// The 3x3 block around a cell, self included.
const NEIGHBOR_OFFSETS: [(i32, i32); 9] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (0, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

#[derive(Debug, Clone, PartialEq)]
pub struct TileMap {
    tile_size: i32,
    grid: HashMap<GridPos, GridTile>,
    off_grid: Vec<OffGridTile>,
}

impl TileMap {
    pub fn new(tile_size: i32) -> Self {
        Self {
            tile_size,
            grid: HashMap::new(),
            off_grid: Vec::new(),
        }
    }

    /// Build from parts. Callers must have checked `tile_size > 0`; each grid
    /// tile is keyed by its own position, so key and tile cannot disagree.
    pub(crate) fn from_parts(
        tile_size: i32,
        grid: impl IntoIterator<Item = GridTile>,
        off_grid: Vec<OffGridTile>,
    ) -> Self {
        Self {
            tile_size,
            grid: grid.into_iter().map(|tile| (tile.pos, tile)).collect(),
            off_grid,
        }
    }

    pub fn tile_size(&self) -> i32 {
        self.tile_size
    }

    pub fn get(&self, pos: GridPos) -> Option<&GridTile> {
        self.grid.get(&pos)
    }

    pub fn grid_tiles(&self) -> impl Iterator<Item = &GridTile> {
        self.grid.values()
    }

    pub fn grid_len(&self) -> usize {
        self.grid.len()
    }

    pub fn off_grid_tiles(&self) -> &[OffGridTile] {
        &self.off_grid
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty() && self.off_grid.is_empty()
    }

    pub(crate) fn grid_mut(&mut self) -> &mut HashMap<GridPos, GridTile> {
        &mut self.grid
    }

    // --- Spatial queries ------------------------------------------------------

    /// Grid tiles in the 3x3 block of cells around `world_pos`.
    ///
    /// Fixed radius of one cell: anything farther away is never returned, so
    /// bodies must be no larger than a tile and move less than a tile per tick.
    pub fn tiles_near(&self, world_pos: Vec2) -> impl Iterator<Item = &GridTile> + '_ {
        let center = GridPos::from_world(world_pos, self.tile_size);
        NEIGHBOR_OFFSETS
            .iter()
            .filter_map(move |&(dx, dy)| self.grid.get(&center.checked_offset(dx, dy)?))
    }

    /// Bounding boxes of solid tiles in the 3x3 block around `world_pos`.
    pub fn physics_tiles_near(&self, world_pos: Vec2) -> Vec<Aabb> {
        let size = self.tile_size as f32;
        self.tiles_near(world_pos)
            .filter(|tile| tile.kind.is_solid())
            .map(|tile| Aabb::from_pos_size(tile.pos.to_world(self.tile_size), Vec2::splat(size)))
            .collect()
    }

    /// The solid grid tile whose cell contains `world_pos`, if any.
    pub fn solid_check(&self, world_pos: Vec2) -> Option<&GridTile> {
        self.grid
            .get(&GridPos::from_world(world_pos, self.tile_size))
            .filter(|tile| tile.kind.is_solid())
    }

    /// Everything a renderer needs to draw `viewport` (world pixels).
    ///
    /// Decorations come first and are never culled. Grid tiles are enumerated
    /// by probing only the cells the viewport covers, so cost scales with the
    /// viewport rather than with the map.
    pub fn tiles_visible_in(&self, viewport: Aabb) -> Vec<PlacedTile> {
        let size = self.tile_size as f32;
        let mut out: Vec<PlacedTile> = self
            .off_grid
            .iter()
            .map(|tile| PlacedTile {
                kind: tile.kind,
                variant: tile.variant,
                pos: tile.pos,
            })
            .collect();

        let x0 = (viewport.left() / size).floor() as i32;
        let y0 = (viewport.top() / size).floor() as i32;
        let x1 = (viewport.right() / size).ceil() as i32;
        let y1 = (viewport.bottom() / size).ceil() as i32;
        for x in x0..=x1 {
            for y in y0..=y1 {
                if let Some(tile) = self.grid.get(&GridPos::new(x, y)) {
                    out.push(PlacedTile {
                        kind: tile.kind,
                        variant: tile.variant,
                        pos: tile.pos.to_world(self.tile_size),
                    });
                }
            }
        }
        out
    }

    // --- Mutation ---------------------------------------------------------------

    /// Place a grid tile, replacing whatever occupied the cell.
    pub fn place(&mut self, pos: GridPos, kind: TileKind, variant: u32) -> Option<GridTile> {
        self.grid.insert(pos, GridTile { kind, variant, pos })
    }

    /// Append a decoration. No de-duplication: placing twice at the same spot
    /// stacks two decorations.
    pub fn place_off_grid(&mut self, pos: Vec2, kind: TileKind, variant: u32) {
        self.off_grid.push(OffGridTile { kind, variant, pos });
    }

    pub fn remove(&mut self, pos: GridPos) -> Option<GridTile> {
        self.grid.remove(&pos)
    }

    /// Remove every decoration whose image rectangle contains `world_point`.
    ///
    /// Hits are decided against the sequence as it was before any removal, so
    /// overlapping decorations are all removed in one sweep. If any decoration
    /// has no known asset the map is left untouched.
    pub fn remove_off_grid_at(
        &mut self,
        world_point: Vec2,
        assets: &impl TileAssets,
    ) -> Result<usize, AssetError> {
        let mut hits = Vec::with_capacity(self.off_grid.len());
        for tile in &self.off_grid {
            let (w, h) = assets.tile_dimensions(tile.kind, tile.variant)?;
            let bounds = Aabb::from_pos_size(tile.pos, Vec2::new(w as f32, h as f32));
            hits.push(bounds.contains_point(world_point));
        }

        let before = self.off_grid.len();
        let mut hit = hits.into_iter();
        self.off_grid.retain(|_| !hit.next().unwrap_or(false));
        Ok(before - self.off_grid.len())
    }

    /// Pull out every tile matching one of `pairs`, positions in world pixels.
    ///
    /// With `keep == false` the matches are deleted, so a second call yields
    /// nothing for them. Decorations are reported before grid tiles.
    pub fn extract(&mut self, pairs: &[(TileKind, u32)], keep: bool) -> Vec<PlacedTile> {
        let matches = |kind: TileKind, variant: u32| pairs.contains(&(kind, variant));
        let mut out = Vec::new();

        for tile in &self.off_grid {
            if matches(tile.kind, tile.variant) {
                out.push(PlacedTile {
                    kind: tile.kind,
                    variant: tile.variant,
                    pos: tile.pos,
                });
            }
        }
        if !keep {
            self.off_grid.retain(|tile| !matches(tile.kind, tile.variant));
        }

        let mut grid_hits: Vec<&GridTile> = self
            .grid
            .values()
            .filter(|tile| matches(tile.kind, tile.variant))
            .collect();
        // HashMap order is arbitrary; keep results stable across runs.
        grid_hits.sort_by_key(|tile| (tile.pos.y, tile.pos.x));
        let grid_out: Vec<PlacedTile> = grid_hits
            .into_iter()
            .map(|tile| PlacedTile {
                kind: tile.kind,
                variant: tile.variant,
                pos: tile.pos.to_world(self.tile_size),
            })
            .collect();
        if !keep {
            self.grid.retain(|_, tile| !matches(tile.kind, tile.variant));
        }
        out.extend(grid_out);

        log::debug!(
            "Extracted {} tiles for {:?} (keep = {keep})",
            out.len(),
            pairs
        );
        out
    }
}

impl Default for TileMap {
    fn default() -> Self {
        Self::new(DEFAULT_TILE_SIZE)
    }
}
