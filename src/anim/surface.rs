use bevy::color::Hsla;
use bevy::math::Vec2;

use crate::hex::{Tile, TileId};

/// Whatever reflects the grid on screen
pub trait RenderSurface {
    /// Draw a tile at its current vertices and colour
    fn draw_tile(&mut self, tile: &Tile);

    /// Draw an open polyline through `points`
    fn draw_polyline(&mut self, points: &[Vec2], color: Hsla, width: f32);
}

/// Surface that draws nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSurface;

impl RenderSurface for NullSurface {
    fn draw_tile(&mut self, _tile: &Tile) {}

    fn draw_polyline(&mut self, _points: &[Vec2], _color: Hsla, _width: f32) {}
}

/// Surface that remembers what it was asked to draw
#[derive(Debug, Default, Clone)]
pub struct RecordingSurface {
    pub tiles: Vec<TileId>,
    pub polylines: Vec<Vec<Vec2>>,
}

impl RecordingSurface {
    pub fn clear(&mut self) {
        self.tiles.clear();
        self.polylines.clear();
    }
}

impl RenderSurface for RecordingSurface {
    fn draw_tile(&mut self, tile: &Tile) {
        self.tiles.push(tile.id);
    }

    fn draw_polyline(&mut self, points: &[Vec2], _color: Hsla, _width: f32) {
        self.polylines.push(points.to_vec());
    }
}
