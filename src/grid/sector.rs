use std::collections::HashMap;

use bevy::math::Vec2;

use super::{Grid, Layout, connect};
use crate::config::hsl;
use crate::hex::{Direction, SectorSlot, Spring, Tile, TileId};

/// Index deltas `(major, minor)` for each direction relative to the sector's
/// major direction
const RELATIVE_STEPS: [(i64, i64); 6] = [(1, 0), (0, 1), (-1, 1), (-1, 0), (0, -1), (1, -1)];

/// One sixth of the tessellation around the expanded tile.
///
/// Tile `(a, b)` sits at `base + (a + 1) * major_delta + b * minor_delta`;
/// the table is gap-free: every row `a` holds minors `0..=len`.
#[derive(Debug, Clone)]
pub struct Sector {
    pub index: usize,
    pub base: TileId,
    pub major: Direction,
    pub minor: Direction,
    pub major_delta: Vec2,
    pub minor_delta: Vec2,
    /// Full outward push applied when the sector is open
    pub displacement: Vec2,
    /// Offset currently applied to every anchor in the sector
    pub offset: Vec2,
    /// Original anchor of tile (0, 0)
    pub anchor: Vec2,
    cells: Vec<Vec<TileId>>,
    tiles: Vec<TileId>,
    created: usize,
}

impl Sector {
    /// Tiles ordered by major, then minor
    pub fn tiles(&self) -> &[TileId] {
        &self.tiles
    }

    pub fn tile_at(&self, major: usize, minor: usize) -> Option<TileId> {
        self.cells.get(major).and_then(|row| row.get(minor)).copied()
    }

    pub fn major_len(&self) -> usize {
        self.cells.len()
    }

    pub fn minor_len(&self, major: usize) -> usize {
        self.cells.get(major).map_or(0, Vec::len)
    }

    /// Edge `(0, 0..)`, which faces the next sector
    pub fn minor_edge(&self) -> &[TileId] {
        self.cells.first().map_or(&[], Vec::as_slice)
    }

    /// Edge `(0.., 0)`, which faces the previous sector
    pub fn major_edge(&self) -> Vec<TileId> {
        self.cells.iter().filter_map(|row| row.first().copied()).collect()
    }

    pub fn current_anchor(&self) -> Vec2 {
        self.anchor + self.offset
    }

    /// Number of tiles synthesised for this sector
    pub fn created_count(&self) -> usize {
        self.created
    }
}

impl Grid {
    /// Gather (and where needed create) the tiles of wedge `index` and link
    /// them among themselves.
    ///
    /// `base` must have all six tessellation neighbours.
    pub(super) fn build_sector(
        &mut self,
        base: TileId,
        index: usize,
        springs: &mut Vec<Spring>,
    ) -> Sector {
        let major = Direction::from_index(index);
        let minor = major.rotated(1);
        let base_anchor = self.tiles[base.index()].original_anchor;
        let neighbor_anchor = |dir: Direction| {
            self.tiles[base.index()].collapsed_neighbors()[dir.index()]
                .map(|link| self.tiles[link.tile.index()].original_anchor)
                .unwrap_or(base_anchor + self.layout.step(dir))
        };
        let major_delta = neighbor_anchor(major) - base_anchor;
        let minor_delta = neighbor_anchor(minor) - base_anchor;
        let displacement = major_delta * self.tiling.expansion_depth as f32;
        let position = |a: usize, b: usize| {
            base_anchor + (a as f32 + 1.0) * major_delta + b as f32 * minor_delta
        };

        let existing = self.sweep_existing(base, major, minor);

        // Minor extent of every major row: what already exists, plus whatever
        // would land inside the padded viewport once fully displaced.
        let half = self.layout.container / 2.0 + Vec2::splat(self.layout.spacing);
        let limit = (self.layout.container.length() / self.layout.spacing).ceil() as usize
            + self.tiling.expansion_depth
            + 2;
        let mut extents: Vec<Option<usize>> = vec![None; limit];
        for &(a, b) in existing.keys() {
            if a >= extents.len() {
                extents.resize(a + 1, None);
            }
            extents[a] = Some(extents[a].map_or(b, |e| e.max(b)));
        }
        for a in 0..limit {
            for b in 0..limit {
                let offset = position(a, b) + displacement - base_anchor;
                if offset.x.abs() <= half.x && offset.y.abs() <= half.y {
                    extents[a] = Some(extents[a].map_or(b, |e| e.max(b)));
                }
            }
        }
        let rows = extents.iter().rposition(Option::is_some).map_or(1, |a| a + 1);

        let base_row = self.tiles[base.index()].row;
        let base_doubled = self.layout.doubled_offset(base_row, self.tiles[base.index()].col);
        let (major_dd, major_dr) = major.doubled_delta();
        let (minor_dd, minor_dr) = minor.doubled_delta();

        let mut created = 0;
        let mut cells = Vec::with_capacity(rows);
        for (a, extent) in extents.iter().take(rows).enumerate() {
            let mut row = Vec::new();
            for b in 0..=extent.unwrap_or(0) {
                let id = match existing.get(&(a, b)) {
                    Some(id) => *id,
                    None => {
                        let steps = (a as i32 + 1, b as i32);
                        let lattice_row = base_row + steps.0 * major_dr + steps.1 * minor_dr;
                        let doubled = base_doubled + steps.0 * major_dd + steps.1 * minor_dd;
                        created += 1;
                        self.create_tile(lattice_row, doubled, position(a, b))
                    }
                };
                self.tiles[id.index()].enter_expanded(Some(SectorSlot {
                    sector: index,
                    major: a,
                    minor: b,
                }));
                row.push(id);
            }
            cells.push(row);
        }

        for (a, row) in cells.iter().enumerate() {
            for (b, &id) in row.iter().enumerate() {
                for (rel, (da, db)) in RELATIVE_STEPS.iter().enumerate().take(3) {
                    let (na, nb) = (a as i64 + da, b as i64 + db);
                    if na < 0 || nb < 0 {
                        continue;
                    }
                    let Some(&other) = cells.get(na as usize).and_then(|r| r.get(nb as usize))
                    else {
                        continue;
                    };
                    let rest = self.tiles[id.index()]
                        .original_anchor
                        .distance(self.tiles[other.index()].original_anchor);
                    connect(&mut self.tiles, springs, id, major.rotated(rel as i32), other, rest);
                }
            }
        }

        let tiles = cells.iter().flatten().copied().collect();
        Sector {
            index,
            base,
            major,
            minor,
            major_delta,
            minor_delta,
            displacement,
            offset: Vec2::ZERO,
            anchor: position(0, 0),
            cells,
            tiles,
            created,
        }
    }

    /// Tessellation tiles of the wedge, found by walking major-then-minor and
    /// minor-then-major from the tile just outward of `base`
    fn sweep_existing(
        &self,
        base: TileId,
        major: Direction,
        minor: Direction,
    ) -> HashMap<(usize, usize), TileId> {
        let mut found = HashMap::new();
        let Some(start) = self.collapsed_neighbor(base, major) else {
            return found;
        };

        for (outer, inner, major_first) in [(major, minor, true), (minor, major, false)] {
            let mut head = Some(start);
            let mut i = 0;
            while let Some(h) = head {
                let mut cursor = Some(h);
                let mut j = 0;
                while let Some(c) = cursor {
                    let key = if major_first { (i, j) } else { (j, i) };
                    found.entry(key).or_insert(c);
                    cursor = self.collapsed_neighbor(c, inner);
                    j += 1;
                }
                head = self.collapsed_neighbor(h, outer);
                i += 1;
            }
        }
        found
    }

    fn collapsed_neighbor(&self, tile: TileId, dir: Direction) -> Option<TileId> {
        self.tiles[tile.index()].collapsed_neighbors()[dir.index()].map(|link| link.tile)
    }

    /// Append a tile that exists only while the grid is expanded
    fn create_tile(&mut self, row: i32, doubled: i32, anchor: Vec2) -> TileId {
        let id = TileId(self.tiles.len());
        let col = self.layout.col_for_offset(row, doubled);
        let mut tile = Tile::new(
            id,
            row,
            col,
            anchor,
            self.physics.mass,
            hsl(self.tiling.base_color),
        );
        tile.is_margin = !self.layout.in_content_column(doubled);
        tile.is_in_larger_row = Layout::is_larger_row(row);
        tile.current_anchor = anchor + self.pan;
        tile.particle.position = tile.current_anchor;
        tile.update_vertices(&self.outer_offsets, &self.inner_offsets);
        self.tiles.push(tile);
        id
    }
}
