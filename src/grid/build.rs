use bevy::math::Vec2;

use super::{Grid, Layout, connect};
use crate::config::hsl;
use crate::hex::{ContentId, Direction, Tile, TileId};

impl Grid {
    /// Throw away every tile and lay the tessellation out for `container`
    pub(super) fn rebuild(&mut self, container: Vec2) {
        if self.expansion.is_some() {
            log::debug!("Dropping expansion before rebuilding the grid");
            self.expansion = None;
        }

        self.layout = Layout::compute(&self.tiling, container, self.placement.len());
        self.outer_offsets = self.layout.orientation.vertex_offsets(self.layout.outer_radius);
        self.inner_offsets = self.layout.orientation.vertex_offsets(
            (self.layout.outer_radius - self.tiling.content_border_width).max(0.0),
        );
        self.pan = Vec2::ZERO;

        self.create_tiles();
        self.assign_content();
        self.wire_neighbors();

        self.original_count = self.tiles.len();
        self.active = (0..self.original_count).map(TileId).collect();
        for tile in &mut self.tiles {
            tile.update_vertices(&self.outer_offsets, &self.inner_offsets);
        }
        self.refresh_lists();
        self.generation += 1;

        log::info!(
            "Built {}x{} hex grid ({} tiles, {} with content)",
            self.layout.tiles_per_row,
            self.layout.rows,
            self.tiles.len(),
            self.content_tiles.len()
        );
    }

    /// Rows top to bottom, columns left to right, classified by position only
    fn create_tiles(&mut self) {
        let layout = &self.layout;
        let base_color = hsl(self.tiling.base_color);
        let rows = layout.rows as i32;

        self.tiles.clear();
        self.springs.clear();
        self.free_springs.clear();
        self.row_starts.clear();

        let side_row = layout.middle_larger_row();

        for row in 0..rows {
            self.row_starts.push(self.tiles.len());
            let len = layout.row_len(row) as i32;
            let larger = Layout::is_larger_row(row);

            for col in 0..len {
                let doubled = layout.doubled_offset(row, col);
                let id = TileId(self.tiles.len());
                let mut tile = Tile::new(
                    id,
                    row,
                    col,
                    layout.anchor(row, doubled),
                    self.physics.mass,
                    base_color,
                );

                let is_end = col == 0 || col == len - 1;
                let is_edge_row = row == 0 || row == rows - 1;

                tile.set_border(is_edge_row || is_end);
                // Six corners, like a hexagon: both ends of the first and last
                // rows and of the larger row through the middle.
                tile.is_corner = is_end && (is_edge_row || row == side_row);
                tile.is_margin = !layout.in_content_column(doubled);
                tile.is_in_larger_row = larger;

                self.tiles.push(tile);
            }
        }
    }

    /// Hand the placement's filled slots to content-column tiles, starting at
    /// the first on-screen row
    fn assign_content(&mut self) {
        let content_color = hsl(self.tiling.content_color);
        let start = self.row_starts[self.layout.first_content_row.min(self.layout.rows - 1)];

        let mut slot = 0;
        let mut next = 0;
        for tile in &mut self.tiles[start..] {
            if slot >= self.placement.len() {
                break;
            }
            if tile.is_margin || tile.is_border() {
                continue;
            }
            if self.placement.is_filled(slot) {
                tile.set_content(Some(ContentId(next)));
                tile.set_color(content_color);
                next += 1;
            }
            slot += 1;
        }

        if next < self.placement.filled_count() {
            log::warn!(
                "Only {} of {} content items fit in the grid",
                next,
                self.placement.filled_count()
            );
        }
    }

    /// Link every tile to its east, south-east and south-west neighbours;
    /// `connect` fills in the opposite slots
    fn wire_neighbors(&mut self) {
        for index in 0..self.tiles.len() {
            let (row, col) = (self.tiles[index].row, self.tiles[index].col);
            let doubled = self.layout.doubled_offset(row, col);

            for dir in [Direction::East, Direction::SouthEast, Direction::SouthWest] {
                let (dd, dr) = dir.doubled_delta();
                let Some(other) = self.tile_at_offset(row + dr, doubled + dd) else {
                    continue;
                };
                let rest = self.tiles[index]
                    .original_anchor
                    .distance(self.tiles[other.index()].original_anchor);
                connect(&mut self.tiles, &mut self.springs, TileId(index), dir, other, rest);
            }
        }
    }

    /// Tessellation tile at a lattice position, if it is inside the grid
    pub(super) fn tile_at_offset(&self, row: i32, doubled: i32) -> Option<TileId> {
        if doubled.rem_euclid(2) == row.rem_euclid(2) {
            return None;
        }
        let col = self.layout.col_for_offset(row, doubled);
        if !self.layout.contains(row, col) {
            return None;
        }
        Some(TileId(self.row_starts[row as usize] + col as usize))
    }
}
