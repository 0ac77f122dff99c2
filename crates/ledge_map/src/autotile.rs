//! Neighbor-pattern auto-tiling.
//!
//! For each auto-tileable grid tile, the occupied cardinal neighbors are
//! collected, sorted into a canonical tuple and looked up in [`RULES`]. The
//! table covers the eight edge and corner shapes of a terrain block; any
//! other pattern leaves the tile's variant alone. Variant numbers index the
//! terrain art, so the table must not change without the art changing too.

use crate::tile::GridPos;
use crate::tilemap::TileMap;

/// Cardinal offsets probed around each tile (+y is down).
pub const CARDINALS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Sorted neighbor pattern -> variant.
pub const RULES: [(&[(i32, i32)], u32); 8] = [
    (&[(-1, 0), (0, 1), (1, 0)], 0),
    (&[(-1, 0), (0, 1)], 1),
    (&[(-1, 0), (0, -1), (0, 1)], 2),
    (&[(-1, 0), (0, -1)], 3),
    (&[(-1, 0), (0, -1), (1, 0)], 4),
    (&[(0, -1), (1, 0)], 5),
    (&[(0, -1), (0, 1), (1, 0)], 6),
    (&[(0, 1), (1, 0)], 7),
];

/// Variant for a neighbor pattern, or `None` if the table has no entry.
/// `neighbors` may be in any order.
pub fn variant_for(neighbors: &[(i32, i32)]) -> Option<u32> {
    let mut pattern = neighbors.to_vec();
    pattern.sort_unstable();
    pattern.dedup();
    RULES
        .iter()
        .find(|(rule, _)| *rule == pattern.as_slice())
        .map(|&(_, variant)| variant)
}

impl TileMap {
    /// Occupied cardinal neighbors of `pos`, any tile kind counting.
    pub fn occupied_neighbors(&self, pos: GridPos) -> Vec<(i32, i32)> {
        CARDINALS
            .iter()
            .copied()
            .filter(|&(dx, dy)| {
                pos.checked_offset(dx, dy)
                    .is_some_and(|neighbor| self.get(neighbor).is_some())
            })
            .collect()
    }

    /// Re-pick the variant of every auto-tileable grid tile. Returns how many
    /// tiles changed. Occupancy never depends on variants, so running this on
    /// its own output changes nothing.
    pub fn auto_tile(&mut self) -> usize {
        let updates: Vec<(GridPos, u32)> = self
            .grid_tiles()
            .filter(|tile| tile.kind.is_autotiled())
            .filter_map(|tile| {
                let variant = variant_for(&self.occupied_neighbors(tile.pos))?;
                (variant != tile.variant).then_some((tile.pos, variant))
            })
            .collect();

        let grid = self.grid_mut();
        for &(pos, variant) in &updates {
            if let Some(tile) = grid.get_mut(&pos) {
                tile.variant = variant;
            }
        }
        log::debug!("Auto-tile updated {} tiles", updates.len());
        updates.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::TileKind;

    fn block(map: &mut TileMap, x0: i32, y0: i32, w: i32, h: i32, kind: TileKind) {
        for x in x0..x0 + w {
            for y in y0..y0 + h {
                map.place(GridPos::new(x, y), kind, 1);
            }
        }
    }

    fn variants(map: &TileMap) -> Vec<(GridPos, u32)> {
        let mut out: Vec<_> = map.grid_tiles().map(|t| (t.pos, t.variant)).collect();
        out.sort_by_key(|(pos, _)| *pos);
        out
    }

    #[test]
    fn rules_are_sorted_and_distinct() {
        for (i, (rule, _)) in RULES.iter().enumerate() {
            let mut sorted = rule.to_vec();
            sorted.sort_unstable();
            assert_eq!(sorted.as_slice(), *rule);
            for (other, _) in &RULES[i + 1..] {
                assert_ne!(rule, other);
            }
        }
    }

    #[test]
    fn top_left_corner_maps_to_seven() {
        assert_eq!(variant_for(&[(0, 1), (1, 0)]), Some(7));
        assert_eq!(variant_for(&[(1, 0), (0, 1)]), Some(7));
    }

    #[test]
    fn unmapped_patterns_return_none() {
        assert_eq!(variant_for(&[]), None);
        assert_eq!(variant_for(&[(1, 0)]), None);
        assert_eq!(variant_for(&[(1, 0), (-1, 0)]), None);
        assert_eq!(variant_for(&CARDINALS), None);
    }

    #[test]
    fn auto_tile_corner_of_block() {
        let mut map = TileMap::new(16);
        block(&mut map, 0, 0, 2, 2, TileKind::Grass);
        map.auto_tile();
        assert_eq!(map.get(GridPos::new(0, 0)).map(|t| t.variant), Some(7));
        assert_eq!(map.get(GridPos::new(1, 0)).map(|t| t.variant), Some(1));
        assert_eq!(map.get(GridPos::new(0, 1)).map(|t| t.variant), Some(5));
        assert_eq!(map.get(GridPos::new(1, 1)).map(|t| t.variant), Some(3));
    }

    #[test]
    fn unmatched_tiles_keep_variant() {
        let mut map = TileMap::new(16);
        block(&mut map, 0, 0, 3, 3, TileKind::Cobblestone);
        map.place(GridPos::new(10, 10), TileKind::Grass, 4);
        map.auto_tile();
        // Fully surrounded center and the isolated tile are unmapped.
        assert_eq!(map.get(GridPos::new(1, 1)).map(|t| t.variant), Some(1));
        assert_eq!(map.get(GridPos::new(10, 10)).map(|t| t.variant), Some(4));
        // Edges of the block are mapped.
        assert_eq!(map.get(GridPos::new(1, 0)).map(|t| t.variant), Some(0));
        assert_eq!(map.get(GridPos::new(2, 1)).map(|t| t.variant), Some(2));
        assert_eq!(map.get(GridPos::new(1, 2)).map(|t| t.variant), Some(4));
        assert_eq!(map.get(GridPos::new(0, 1)).map(|t| t.variant), Some(6));
    }

    #[test]
    fn non_terrain_kinds_are_not_retiled_but_count_as_neighbors() {
        let mut map = TileMap::new(16);
        map.place(GridPos::new(0, 0), TileKind::Grass, 3);
        map.place(GridPos::new(1, 0), TileKind::Decoration, 2);
        map.place(GridPos::new(0, 1), TileKind::Spawner, 0);
        map.auto_tile();
        assert_eq!(map.get(GridPos::new(0, 0)).map(|t| t.variant), Some(7));
        assert_eq!(map.get(GridPos::new(1, 0)).map(|t| t.variant), Some(2));
        assert_eq!(map.get(GridPos::new(0, 1)).map(|t| t.variant), Some(0));
    }

    #[test]
    fn auto_tile_at_grid_edge() {
        let mut map = TileMap::new(16);
        map.place(GridPos::new(i32::MAX, 0), TileKind::Grass, 0);
        map.place(GridPos::new(i32::MAX - 1, 0), TileKind::Grass, 0);
        map.place(GridPos::new(i32::MAX, 1), TileKind::Grass, 0);
        map.auto_tile();
        assert_eq!(
            map.occupied_neighbors(GridPos::new(i32::MAX, 0)),
            vec![(-1, 0), (0, 1)]
        );
        assert_eq!(map.get(GridPos::new(i32::MAX, 0)).map(|t| t.variant), Some(1));
    }

    #[test]
    fn auto_tile_is_idempotent() {
        let mut map = TileMap::new(16);
        block(&mut map, -4, 2, 6, 3, TileKind::Grass);
        block(&mut map, 5, -2, 1, 4, TileKind::Cobblestone);
        map.place(GridPos::new(6, -2), TileKind::Cobblestone, 0);

        map.auto_tile();
        let once = variants(&map);
        assert_eq!(map.auto_tile(), 0);
        assert_eq!(variants(&map), once);
    }
}
