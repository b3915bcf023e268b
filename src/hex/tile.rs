use std::fmt;

use bevy::color::Hsla;
use bevy::math::Vec2;

use super::{Direction, Link, Particle};

/// Stable index of a tile inside its grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(pub usize);

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TileId {
    pub const fn index(&self) -> usize {
        self.0
    }
}

/// Opaque reference into the caller's ordered content list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentId(pub usize);

/// Where a tile sits inside a sector's major/minor table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectorSlot {
    pub sector: usize,
    pub major: usize,
    pub minor: usize,
}

/// Topology of a tile while the grid is expanded.
///
/// The expanded tile itself belongs to no sector, so `sector` is `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedState {
    pub sector: Option<SectorSlot>,
    pub neighbors: [Option<Link>; 6],
    pub is_border: bool,
}

impl ExpandedState {
    pub fn new(sector: Option<SectorSlot>) -> Self {
        Self {
            sector,
            neighbors: [None; 6],
            is_border: false,
        }
    }
}

/// One hexagonal cell
#[derive(Debug, Clone)]
pub struct Tile {
    pub id: TileId,
    /// Row and column in the tessellation; tiles created for an expansion
    /// carry the lattice position they would have had, possibly outside it.
    pub row: i32,
    pub col: i32,
    /// Rest position before pan and sector offsets
    pub original_anchor: Vec2,
    /// Spring target: original anchor plus every offset currently applied
    pub current_anchor: Vec2,
    pub particle: Particle,
    pub original_color: Hsla,
    pub color: Hsla,
    /// Absolute outer hex vertices
    pub vertices: [Vec2; 6],
    /// Absolute inner hex vertices, present only on content tiles
    pub inner_vertices: Option<[Vec2; 6]>,
    pub is_margin: bool,
    pub is_corner: bool,
    pub is_in_larger_row: bool,
    pub is_highlighted: bool,
    pub is_hidden: bool,
    is_border: bool,
    content: Option<ContentId>,
    neighbors: [Option<Link>; 6],
    expanded: Option<ExpandedState>,
}

impl Tile {
    pub fn new(id: TileId, row: i32, col: i32, anchor: Vec2, mass: f32, color: Hsla) -> Self {
        Self {
            id,
            row,
            col,
            original_anchor: anchor,
            current_anchor: anchor,
            particle: Particle::new(anchor, mass),
            original_color: color,
            color,
            vertices: [anchor; 6],
            inner_vertices: None,
            is_margin: false,
            is_corner: false,
            is_in_larger_row: false,
            is_highlighted: false,
            is_hidden: false,
            is_border: false,
            content: None,
            neighbors: [None; 6],
            expanded: None,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.particle.position
    }

    /// Neighbour slots of the active topology
    pub fn neighbors(&self) -> &[Option<Link>; 6] {
        match &self.expanded {
            Some(state) => &state.neighbors,
            None => &self.neighbors,
        }
    }

    pub(crate) fn neighbors_mut(&mut self) -> &mut [Option<Link>; 6] {
        match &mut self.expanded {
            Some(state) => &mut state.neighbors,
            None => &mut self.neighbors,
        }
    }

    pub fn neighbor(&self, dir: Direction) -> Option<TileId> {
        self.neighbors()[dir.index()].map(|link| link.tile)
    }

    pub fn neighbor_count(&self) -> usize {
        self.neighbors().iter().flatten().count()
    }

    /// Neighbour slots of the tessellation, regardless of expansion
    pub fn collapsed_neighbors(&self) -> &[Option<Link>; 6] {
        &self.neighbors
    }

    pub fn is_border(&self) -> bool {
        match &self.expanded {
            Some(state) => state.is_border,
            None => self.is_border,
        }
    }

    pub(crate) fn set_border(&mut self, is_border: bool) {
        match &mut self.expanded {
            Some(state) => state.is_border = is_border,
            None => self.is_border = is_border,
        }
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded.is_some()
    }

    pub fn expanded_state(&self) -> Option<&ExpandedState> {
        self.expanded.as_ref()
    }

    pub(crate) fn enter_expanded(&mut self, sector: Option<SectorSlot>) {
        self.expanded = Some(ExpandedState::new(sector));
    }

    pub(crate) fn leave_expanded(&mut self) {
        self.expanded = None;
    }

    pub fn sector(&self) -> Option<SectorSlot> {
        self.expanded.as_ref().and_then(|state| state.sector)
    }

    pub fn content(&self) -> Option<ContentId> {
        self.content
    }

    pub fn holds_content(&self) -> bool {
        self.content.is_some()
    }

    pub fn set_content(&mut self, content: Option<ContentId>) {
        self.content = content;
        if content.is_none() {
            self.inner_vertices = None;
        }
    }

    /// Set both the baseline and the working colour
    pub fn set_color(&mut self, color: Hsla) {
        self.original_color = color;
        self.color = color;
    }

    pub fn set_highlighted(&mut self, highlighted: bool) {
        self.is_highlighted = highlighted;
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.is_hidden = hidden;
    }

    pub fn apply_force(&mut self, force: Vec2) {
        self.particle.apply_force(force);
    }

    /// Freeze the particle at `position`
    pub fn pin(&mut self, position: Vec2) {
        self.particle.pin(position);
    }

    pub fn unpin(&mut self) {
        self.particle.unpin();
    }

    /// Recompute vertices from the particle position
    pub fn update_vertices(&mut self, outer: &[Vec2; 6], inner: &[Vec2; 6]) {
        let center = self.particle.position;
        self.vertices = std::array::from_fn(|k| center + outer[k]);
        self.inner_vertices = self
            .content
            .map(|_| std::array::from_fn(|k| center + inner[k]));
    }
}
