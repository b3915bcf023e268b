use bevy::prelude::*;
use hexfold::anim::RenderSurface;
use hexfold::hex::Tile;

use crate::camera::Viewport;

/// Lightness added to the inner ring of content tiles
const CONTENT_RING_LIGHTNESS: f32 = 0.15;

/// Immediate-mode gizmo rendering of the grid on the XZ plane
pub struct GizmoSurface<'a, 'w, 's> {
    gizmos: &'a mut Gizmos<'w, 's>,
    viewport: Viewport,
}

impl<'a, 'w, 's> GizmoSurface<'a, 'w, 's> {
    pub fn new(gizmos: &'a mut Gizmos<'w, 's>, viewport: Viewport) -> Self {
        Self { gizmos, viewport }
    }

    fn closed_loop(&mut self, points: &[Vec2; 6], color: Hsla) {
        let viewport = self.viewport;
        self.gizmos.linestrip(
            points.iter().chain(points.first()).map(|&p| viewport.to_world(p)),
            color,
        );
    }
}

impl RenderSurface for GizmoSurface<'_, '_, '_> {
    fn draw_tile(&mut self, tile: &Tile) {
        self.closed_loop(&tile.vertices, tile.color);

        if let Some(inner) = &tile.inner_vertices {
            let mut ring = tile.color;
            ring.lightness = (ring.lightness + CONTENT_RING_LIGHTNESS).min(1.0);
            self.closed_loop(inner, ring);
        }
    }

    // Gizmo line width is shared by the whole gizmo group
    fn draw_polyline(&mut self, points: &[Vec2], color: Hsla, _width: f32) {
        let viewport = self.viewport;
        self.gizmos
            .linestrip(points.iter().map(|&p| viewport.to_world(p)), color);
    }
}
