use std::fmt;

use bevy::math::Vec2;

use super::tile::TileId;
use super::Particle;

/// Index of a spring in the spring table of the active topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpringId(pub usize);

impl fmt::Display for SpringId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One side of a neighbour relation.
///
/// Slot `i` on tile `a` and slot `(i + 3) % 6` on its neighbour hold the same
/// `spring`, so both sides read one force cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    pub tile: TileId,
    pub spring: SpringId,
}

/// Damped spring along one hex edge
#[derive(Debug, Clone, PartialEq)]
pub struct Spring {
    pub a: TileId,
    pub b: TileId,
    pub rest_length: f32,
    /// Force on `a` from the last resolve; `b` receives the negation
    force: Vec2,
    /// Cleared when the neighbour relation goes away; the slot is then free
    attached: bool,
}

impl Spring {
    pub fn new(a: TileId, b: TileId, rest_length: f32) -> Self {
        Self {
            a,
            b,
            rest_length,
            force: Vec2::ZERO,
            attached: true,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub(crate) fn detach(&mut self) {
        self.attached = false;
        self.force = Vec2::ZERO;
    }

    /// Compute the force for this step and cache it
    pub fn resolve(&mut self, a: &Particle, b: &Particle, stiffness: f32, damping: f32) {
        let delta = b.position - a.position;
        let length = delta.length();
        if length < f32::EPSILON {
            self.force = Vec2::ZERO;
            return;
        }

        let unit = delta / length;
        let closing_speed = (b.velocity - a.velocity).dot(unit);
        let magnitude = stiffness * (length - self.rest_length) + damping * closing_speed;
        self.force = unit * magnitude;
    }

    /// Cached force acting on `tile`
    pub fn force_on(&self, tile: TileId) -> Vec2 {
        if tile == self.a { self.force } else { -self.force }
    }

    pub fn other(&self, tile: TileId) -> TileId {
        if tile == self.a { self.b } else { self.a }
    }
}
