use std::fmt;

use bevy::color::Hsla;
use bevy::math::Vec2;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use crate::anim::job::AnimationJob;
use crate::anim::surface::RenderSurface;
use crate::config::{LineConfig, hsl};
use crate::grid::Grid;
use crate::hex::{Direction, Tile, TileId};

/// Invalid starting points for a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineJobError {
    UnknownTile(TileId),
    CornerTile(TileId),
    NotBorderTile(TileId),
    /// Heading or corner do not point into the grid from this tile's edge
    InconsistentStart {
        tile: TileId,
        edge: BorderEdge,
        heading: Direction,
        corner: usize,
    },
}

impl fmt::Display for LineJobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineJobError::UnknownTile(tile) => write!(f, "Tile {} does not exist", tile),
            LineJobError::CornerTile(tile) => {
                write!(f, "Line cannot start from corner tile {}", tile)
            }
            LineJobError::NotBorderTile(tile) => {
                write!(f, "Line must start from a border tile, {} is interior", tile)
            }
            LineJobError::InconsistentStart {
                tile,
                edge,
                heading,
                corner,
            } => write!(
                f,
                "Tile {} on the {:?} edge cannot start a line at corner {} heading {:?}",
                tile, edge, corner, heading
            ),
        }
    }
}

impl std::error::Error for LineJobError {}

/// Edge of the tessellation a border tile sits on, named in row space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderEdge {
    Top,
    Bottom,
    Left,
    Right,
}

impl BorderEdge {
    pub fn of(grid: &Grid, tile: &Tile) -> Option<Self> {
        let layout = grid.layout();
        if tile.row == 0 {
            Some(BorderEdge::Top)
        } else if tile.row == layout.rows as i32 - 1 {
            Some(BorderEdge::Bottom)
        } else if tile.col == 0 {
            Some(BorderEdge::Left)
        } else if tile.col == layout.row_len(tile.row) as i32 - 1 {
            Some(BorderEdge::Right)
        } else {
            None
        }
    }

    /// Headings that point into the grid
    pub fn inward_headings(self) -> &'static [Direction] {
        use Direction::*;
        match self {
            BorderEdge::Top => &[SouthEast, SouthWest],
            BorderEdge::Bottom => &[NorthEast, NorthWest],
            BorderEdge::Left => &[East, NorthEast, SouthEast],
            BorderEdge::Right => &[West, SouthWest, NorthWest],
        }
    }

    /// Corners that lie on the outside of the grid
    pub fn outer_corners(self) -> &'static [usize] {
        match self {
            BorderEdge::Top => &[3, 4, 5],
            BorderEdge::Bottom => &[0, 1, 2],
            BorderEdge::Left => &[2, 3],
            BorderEdge::Right => &[5, 0],
        }
    }
}

/// Corner `corner` of tile `tile`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexRef {
    pub tile: TileId,
    pub corner: usize,
}

/// Smallest angle between two row-space angles, in degrees
fn deviation(a: f32, b: f32) -> f32 {
    let d = (a - b).rem_euclid(360.0);
    d.min(360.0 - d)
}

/// The three honeycomb edges leaving a corner, with the row-space angle of
/// each. The outward edge has no target when it leaves the grid.
fn edges_from(grid: &Grid, vertex: VertexRef) -> Option<[(Option<VertexRef>, f32); 3]> {
    let tile = grid.tile(vertex.tile)?;
    let k = vertex.corner;
    let base = 60.0 * k as f32;

    let along = |corner: usize| {
        Some(VertexRef {
            tile: vertex.tile,
            corner: corner % 6,
        })
    };
    let outward = match (
        tile.neighbor(Direction::from_index(k)),
        tile.neighbor(Direction::from_index(k + 1)),
    ) {
        (Some(n), _) => Some(VertexRef {
            tile: n,
            corner: (k + 1) % 6,
        }),
        (None, Some(m)) => Some(VertexRef {
            tile: m,
            corner: (k + 5) % 6,
        }),
        (None, None) => None,
    };

    Some([
        (along(k + 1), (150.0 + base) % 360.0),
        (along(k + 5), (270.0 + base) % 360.0),
        (outward, (30.0 + base) % 360.0),
    ])
}

/// A line that crawls from a border tile across the tile corners.
///
/// Each step picks one of the corner's edges with a weight keyed by how far
/// it turns away from the line's heading; it never doubles back. The visible
/// part is a window `length` segments long whose head moves at `speed`.
#[derive(Debug, Clone)]
pub struct LineJob {
    start: VertexRef,
    heading: Direction,
    config: LineConfig,
    color: Hsla,
    rng: StdRng,
    path: Vec<VertexRef>,
    last_angle: Option<f32>,
    /// The walk has reached the grid edge
    finished: bool,
    max_segments: usize,
    start_time: f32,
    head: f32,
    tail: f32,
    complete: bool,
}

impl LineJob {
    pub fn new(
        grid: &Grid,
        tile: TileId,
        heading: Direction,
        corner: usize,
        config: LineConfig,
        rng: &mut impl Rng,
    ) -> Result<Self, LineJobError> {
        let t = grid.tile(tile).ok_or(LineJobError::UnknownTile(tile))?;
        if t.is_corner {
            return Err(LineJobError::CornerTile(tile));
        }
        if !t.is_border() {
            return Err(LineJobError::NotBorderTile(tile));
        }
        let edge = BorderEdge::of(grid, t).ok_or(LineJobError::NotBorderTile(tile))?;
        if !edge.inward_headings().contains(&heading) || !edge.outer_corners().contains(&corner) {
            return Err(LineJobError::InconsistentStart {
                tile,
                edge,
                heading,
                corner,
            });
        }

        let layout = grid.layout();
        Ok(Self {
            start: VertexRef { tile, corner },
            heading,
            config,
            color: hsl(config.color),
            rng: StdRng::seed_from_u64(rng.random()),
            path: Vec::new(),
            last_angle: None,
            finished: false,
            max_segments: 6 * (layout.rows + layout.tiles_per_row),
            start_time: 0.0,
            head: 0.0,
            tail: 0.0,
            complete: false,
        })
    }

    /// A line from a random valid border start, if the grid has one
    pub fn random(grid: &Grid, config: LineConfig, rng: &mut impl Rng) -> Option<Self> {
        let starts: Vec<(TileId, BorderEdge)> = grid
            .border_tiles()
            .iter()
            .filter_map(|&id| {
                let tile = grid.tile(id)?;
                if tile.is_corner {
                    return None;
                }
                BorderEdge::of(grid, tile).map(|edge| (id, edge))
            })
            .collect();

        let &(tile, edge) = starts.choose(rng)?;
        let heading = *edge.inward_headings().choose(rng)?;
        let corner = *edge.outer_corners().choose(rng)?;
        Self::new(grid, tile, heading, corner, config, rng).ok()
    }

    pub fn start_tile(&self) -> TileId {
        self.start.tile
    }

    pub fn path(&self) -> &[VertexRef] {
        &self.path
    }

    /// Visible window `(tail, head)` in segments along the path
    pub fn window(&self) -> (f32, f32) {
        (self.tail, self.head)
    }

    /// Walk until the path holds `needed` corners or leaves the grid
    fn extend(&mut self, grid: &Grid, needed: usize) {
        while !self.finished && self.path.len() < needed {
            let Some(edges) = self.path.last().and_then(|v| edges_from(grid, *v)) else {
                self.finished = true;
                break;
            };

            let heading = 60.0 * self.heading.index() as f32;
            let chosen = match self.last_angle {
                // First segment: whichever edge lines up best with the heading.
                None => edges
                    .iter()
                    .filter(|(target, _)| target.is_some())
                    .min_by(|a, b| deviation(a.1, heading).total_cmp(&deviation(b.1, heading)))
                    .copied(),
                Some(last) => {
                    let options: Vec<_> = edges
                        .iter()
                        .filter(|(_, angle)| deviation(*angle, last + 180.0) > 1.0)
                        .copied()
                        .collect();
                    let weights = options.iter().map(|(_, angle)| {
                        let turn = (deviation(*angle, heading) / 60.0).floor() as usize;
                        self.config.turn_weights[turn.min(3)].max(0.0)
                    });
                    WeightedIndex::new(weights)
                        .ok()
                        .map(|dist| options[dist.sample(&mut self.rng)])
                }
            };

            match chosen {
                Some((Some(next), angle)) => {
                    self.path.push(next);
                    self.last_angle = Some(angle);
                }
                _ => self.finished = true,
            }
            if self.path.len() > self.max_segments {
                self.finished = true;
            }
        }
    }

    /// Interpolated position `s` segments along the path
    fn point_at(&self, grid: &Grid, s: f32) -> Option<Vec2> {
        let last = self.path.len().checked_sub(2)?;
        let i = (s.floor().max(0.0) as usize).min(last);
        let a = self.vertex_position(grid, i)?;
        let b = self.vertex_position(grid, i + 1)?;
        Some(a.lerp(b, (s - i as f32).clamp(0.0, 1.0)))
    }

    fn vertex_position(&self, grid: &Grid, i: usize) -> Option<Vec2> {
        let vertex = self.path.get(i)?;
        grid.tile(vertex.tile).map(|t| t.vertices[vertex.corner])
    }
}

impl AnimationJob for LineJob {
    fn init(&mut self, _grid: &Grid) {
        self.path.clear();
        self.path.push(self.start);
        self.last_angle = None;
        self.finished = false;
    }

    fn start(&mut self, time: f32, _grid: &mut Grid) {
        self.start_time = time;
        self.head = 0.0;
        self.tail = -self.config.length;
        self.complete = false;
    }

    fn update(&mut self, time: f32, _dt: f32, grid: &mut Grid) {
        let travelled = self.config.speed * (time - self.start_time).max(0.0);
        self.extend(grid, travelled.floor() as usize + 2);

        let end = self.path.len().saturating_sub(1) as f32;
        self.head = travelled.min(end);
        self.tail = travelled - self.config.length;

        if self.finished && self.tail >= end {
            self.complete = true;
        }
    }

    fn draw(&self, grid: &Grid, surface: &mut dyn RenderSurface) {
        if self.path.len() < 2 {
            return;
        }
        let end = (self.path.len() - 1) as f32;
        let from = self.tail.clamp(0.0, end);
        let to = self.head.clamp(0.0, end);
        if to <= from {
            return;
        }

        let mut points = Vec::new();
        let Some(first) = self.point_at(grid, from) else {
            return;
        };
        points.push(first);
        for i in (from.floor() as usize + 1)..=(to.ceil() as usize) {
            if (i as f32) < to {
                if let Some(p) = self.vertex_position(grid, i) {
                    points.push(p);
                }
            }
        }
        if let Some(last) = self.point_at(grid, to) {
            points.push(last);
        }

        surface.draw_polyline(&points, self.color, self.config.width);
    }

    fn cancel(&mut self, _grid: &mut Grid) {
        self.path.clear();
        self.finished = true;
        self.complete = true;
    }

    fn is_complete(&self) -> bool {
        self.complete
    }
}
