//! Editor state: brush selection, camera scroll and pointer-driven edits.
//!
//! The editor is tick-driven like the game. Input events only change
//! `InputState`; `tick` turns the current button state into map edits.

use glam::Vec2;
use ledge_core::input::{InputState, MouseBtn};
use ledge_map::{AssetError, GridPos, LevelError, PlacedTile, TileAssets, TileKind, TileMap};
use std::path::Path;

/// Current tile selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Brush {
    pub kind: TileKind,
    pub variant: u32,
}

/// Map edits made by one `tick`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditOutcome {
    pub placed: usize,
    pub removed: usize,
}

pub struct EditorState<A: TileAssets> {
    pub map: TileMap,
    assets: A,
    /// Tile groups that have at least one asset variant, in palette order.
    groups: Vec<TileKind>,
    group: usize,
    variant: u32,
    pub on_grid: bool,
    pub scroll: Vec2,
    pub input: InputState,
}

impl<A: TileAssets> EditorState<A> {
    pub fn new(map: TileMap, assets: A) -> Result<Self, AssetError> {
        let groups: Vec<TileKind> = TileKind::ALL
            .iter()
            .copied()
            .filter(|&kind| assets.variant_count(kind) > 0)
            .collect();
        if groups.is_empty() {
            return Err(AssetError::Invalid(
                "no tile group has any variants".to_string(),
            ));
        }
        Ok(Self {
            map,
            assets,
            groups,
            group: 0,
            variant: 0,
            on_grid: true,
            scroll: Vec2::ZERO,
            input: InputState::new(),
        })
    }

    pub fn brush(&self) -> Brush {
        Brush {
            kind: self.groups[self.group],
            variant: self.variant,
        }
    }

    fn variant_count(&self) -> u32 {
        self.assets.variant_count(self.groups[self.group]) as u32
    }

    /// Step through tile groups; the variant resets to 0.
    pub fn cycle_group(&mut self, forward: bool) {
        let len = self.groups.len();
        self.group = if forward {
            (self.group + 1) % len
        } else {
            (self.group + len - 1) % len
        };
        self.variant = 0;
        log::debug!("brush group {}", self.groups[self.group]);
    }

    /// Step through the current group's variants, wrapping at either end.
    pub fn cycle_variant(&mut self, forward: bool) {
        let count = self.variant_count().max(1);
        self.variant = if forward {
            (self.variant + 1) % count
        } else {
            (self.variant + count - 1) % count
        };
    }

    /// Select a brush directly. Fails if the assets have no such variant.
    pub fn select(&mut self, kind: TileKind, variant: u32) -> Result<(), AssetError> {
        let group = self
            .groups
            .iter()
            .position(|&k| k == kind)
            .ok_or(AssetError::MissingTile { kind, variant })?;
        self.assets.tile_dimensions(kind, variant)?;
        self.group = group;
        self.variant = variant;
        Ok(())
    }

    pub fn toggle_grid(&mut self) {
        self.on_grid = !self.on_grid;
        log::debug!("on-grid placement {}", if self.on_grid { "on" } else { "off" });
    }

    pub fn scroll_by(&mut self, delta: Vec2) {
        self.scroll += delta;
    }

    /// Pointer position in world pixels.
    pub fn world_pointer(&self) -> Vec2 {
        let (x, y) = self.input.mouse_position;
        Vec2::new(x, y) + self.scroll
    }

    pub fn pointer_cell(&self) -> GridPos {
        GridPos::from_world(self.world_pointer(), self.map.tile_size())
    }

    /// Where the brush would land if placed now.
    pub fn preview(&self) -> PlacedTile {
        let brush = self.brush();
        let pos = if self.on_grid {
            self.pointer_cell().to_world(self.map.tile_size())
        } else {
            self.world_pointer()
        };
        PlacedTile {
            kind: brush.kind,
            variant: brush.variant,
            pos,
        }
    }

    /// Apply the held mouse buttons to the map, then clear input edges.
    ///
    /// Left places the brush: every tick on-grid, once per click off-grid.
    /// Right erases the grid tile under the pointer and every decoration
    /// whose image covers it. On error the map is unchanged; input edges are
    /// cleared either way.
    pub fn tick(&mut self) -> Result<EditOutcome, AssetError> {
        let result = self.apply_buttons();
        self.input.end_frame();
        result
    }

    fn apply_buttons(&mut self) -> Result<EditOutcome, AssetError> {
        let mut outcome = EditOutcome::default();
        let brush = self.brush();
        let erasing = self.input.is_mouse_held(MouseBtn::Right);

        if erasing {
            // Erasing hit-tests every decoration, so all of them need a size.
            for tile in self.map.off_grid_tiles() {
                self.assets.tile_dimensions(tile.kind, tile.variant)?;
            }
        }

        if self.input.is_mouse_held(MouseBtn::Left) {
            if self.on_grid {
                self.map.place(self.pointer_cell(), brush.kind, brush.variant);
                outcome.placed += 1;
            } else if self.input.is_mouse_just_pressed(MouseBtn::Left) {
                self.map
                    .place_off_grid(self.world_pointer(), brush.kind, brush.variant);
                outcome.placed += 1;
            }
        }

        if erasing {
            outcome.removed += self
                .map
                .remove_off_grid_at(self.world_pointer(), &self.assets)?;
            if self.map.remove(self.pointer_cell()).is_some() {
                outcome.removed += 1;
            }
        }
        Ok(outcome)
    }

    pub fn auto_tile(&mut self) -> usize {
        let changed = self.map.auto_tile();
        log::info!("Auto-tile updated {changed} tiles");
        changed
    }

    pub fn save(&self, path: &Path) -> Result<(), LevelError> {
        self.map.save(path)
    }
}
