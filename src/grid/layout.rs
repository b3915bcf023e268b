use bevy::math::Vec2;

use crate::config::TilingConfig;
use crate::hex::{Direction, Orientation};

/// Row/column layout derived from the container size and tiling config.
///
/// Rows alternate between one tile fewer than `tiles_per_row` (even rows)
/// and `tiles_per_row` (odd rows, the larger ones), so the first row is
/// always a short one. A tile's horizontal place inside its row is written as
/// a doubled offset from the row centre, `2 * col - (row_len - 1)`, which is
/// even on larger rows and odd on smaller ones.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub container: Vec2,
    pub orientation: Orientation,
    pub outer_radius: f32,
    pub inner_radius: f32,
    pub gap: f32,
    /// Centre-to-centre distance of adjacent tiles
    pub spacing: f32,
    /// Distance between consecutive rows
    pub row_spacing: f32,
    /// Length of the larger rows (always odd)
    pub tiles_per_row: usize,
    pub rows: usize,
    /// Width of the content column in tiles of a larger row (always odd)
    pub content_column: usize,
    /// Off-screen rows/columns on every edge
    pub margin: usize,
    /// First on-screen row that may hold content
    pub first_content_row: usize,
}

impl Layout {
    pub fn compute(tiling: &TilingConfig, container: Vec2, content_slots: usize) -> Self {
        let outer_radius = tiling.outer_radius.max(1.0);
        let inner_radius = outer_radius * 3f32.sqrt() / 2.0;
        let spacing = 2.0 * inner_radius + tiling.gap.max(0.0);
        let row_spacing = spacing * 3f32.sqrt() / 2.0;
        let margin = tiling.margin_tiles;

        let extent = tiling.orientation.to_row_space(container.max(Vec2::ZERO));

        let mut tiles_per_row = (extent.x / spacing).ceil() as usize + 1 + 2 * margin;
        if tiles_per_row % 2 == 0 {
            tiles_per_row += 1;
        }
        let tiles_per_row = tiles_per_row.max(3);

        let mut content_column = tiling.content_column_tiles.max(1).min(tiles_per_row);
        if content_column % 2 == 0 {
            content_column -= 1;
        }

        let first_content_row = margin.max(1);
        let viewport_rows = (extent.y / row_spacing).ceil() as usize + 1 + 2 * margin;
        let content_rows = rows_for_slots(content_slots, content_column, first_content_row);
        let rows = viewport_rows
            .max(first_content_row + content_rows + margin.max(1))
            .max(3);

        Self {
            container,
            orientation: tiling.orientation,
            outer_radius,
            inner_radius,
            gap: tiling.gap,
            spacing,
            row_spacing,
            tiles_per_row,
            rows,
            content_column,
            margin,
            first_content_row,
        }
    }

    pub fn is_larger_row(row: i32) -> bool {
        row.rem_euclid(2) == 1
    }

    /// Larger row closest to the middle. Its end tiles are the side corners
    /// of the tessellation.
    pub fn middle_larger_row(&self) -> i32 {
        let middle = (self.rows as i32 - 1) / 2;
        if Self::is_larger_row(middle) {
            middle
        } else {
            middle + 1
        }
    }

    /// Number of tiles in `row`, following the alternation past the edges too
    pub fn row_len(&self, row: i32) -> usize {
        if Self::is_larger_row(row) {
            self.tiles_per_row
        } else {
            self.tiles_per_row - 1
        }
    }

    pub fn doubled_offset(&self, row: i32, col: i32) -> i32 {
        2 * col - (self.row_len(row) as i32 - 1)
    }

    /// Inverse of [`Layout::doubled_offset`]
    pub fn col_for_offset(&self, row: i32, doubled: i32) -> i32 {
        (doubled + self.row_len(row) as i32 - 1).div_euclid(2)
    }

    /// Whether `(row, col)` lies inside the tessellation
    pub fn contains(&self, row: i32, col: i32) -> bool {
        row >= 0 && (row as usize) < self.rows && col >= 0 && (col as usize) < self.row_len(row)
    }

    pub fn in_content_column(&self, doubled: i32) -> bool {
        doubled.unsigned_abs() as usize <= self.content_column - 1
    }

    /// Screen-space rest position of a lattice point.
    ///
    /// Rows are centred along the row axis; the first on-screen row touches
    /// the top edge and `margin` rows sit above it.
    pub fn anchor(&self, row: i32, doubled: i32) -> Vec2 {
        let extent = self.orientation.to_row_space(self.container);
        let along = extent.x / 2.0 + doubled as f32 * self.spacing / 2.0;
        let across = self.outer_radius + (row - self.margin as i32) as f32 * self.row_spacing;
        self.orientation.to_screen(Vec2::new(along, across))
    }

    /// Screen-space step between the centres of two adjacent tiles
    pub fn step(&self, dir: Direction) -> Vec2 {
        self.orientation.to_screen(dir.unit() * self.spacing)
    }
}

/// Rows needed below `first_row` to hold `slots` content-column slots
fn rows_for_slots(slots: usize, column: usize, first_row: usize) -> usize {
    let mut rows = 0;
    let mut covered = 0;
    while covered < slots {
        let larger = Layout::is_larger_row((first_row + rows) as i32);
        covered += if larger { column } else { column.saturating_sub(1).max(1) };
        rows += 1;
    }
    rows
}
