//! Tile collection, layout and topology changes.

mod build;
mod content;
mod error;
mod expansion;
mod layout;
mod sector;

pub use content::ContentPlacement;
pub use error::GridError;
pub use expansion::Expansion;
pub use layout::Layout;
pub use sector::Sector;

use bevy::math::Vec2;
use rand::Rng;

use crate::config::{HexConfig, PhysicsConfig, TilingConfig};
use crate::hex::{Direction, Link, Spring, SpringId, Tile, TileId};

/// The hex tessellation and its spring network
#[derive(Debug, Clone)]
pub struct Grid {
    tiling: TilingConfig,
    physics: PhysicsConfig,
    layout: Layout,
    outer_offsets: [Vec2; 6],
    inner_offsets: [Vec2; 6],
    /// Tessellation tiles first, then tiles created for the current expansion
    tiles: Vec<Tile>,
    row_starts: Vec<usize>,
    original_count: usize,
    /// Springs of the collapsed tessellation
    springs: Vec<Spring>,
    free_springs: Vec<SpringId>,
    placement: ContentPlacement,
    active: Vec<TileId>,
    content_tiles: Vec<TileId>,
    border_tiles: Vec<TileId>,
    pan: Vec2,
    expansion: Option<Expansion>,
    /// Bumped whenever the set of active tiles changes
    generation: u64,
}

impl Grid {
    pub fn new(config: &HexConfig, container: Vec2, content_count: usize, rng: &mut impl Rng) -> Self {
        let placement = ContentPlacement::shuffled(
            content_count,
            config.tiling.content_density,
            rng,
        );
        let layout = Layout::compute(&config.tiling, container, placement.len());

        let mut grid = Self {
            tiling: config.tiling.clone(),
            physics: config.physics,
            layout,
            outer_offsets: [Vec2::ZERO; 6],
            inner_offsets: [Vec2::ZERO; 6],
            tiles: Vec::new(),
            row_starts: Vec::new(),
            original_count: 0,
            springs: Vec::new(),
            free_springs: Vec::new(),
            placement,
            active: Vec::new(),
            content_tiles: Vec::new(),
            border_tiles: Vec::new(),
            pan: Vec2::ZERO,
            expansion: None,
            generation: 0,
        };
        grid.rebuild(container);
        grid
    }

    /// Lay the tiles out again for a new container size.
    ///
    /// Content placement is kept, so the same slots hold the same content.
    pub fn resize(&mut self, container: Vec2) {
        self.rebuild(container);
    }

    /// Replace the content set and reshuffle where it goes
    pub fn set_contents(&mut self, content_count: usize, rng: &mut impl Rng) {
        self.placement =
            ContentPlacement::shuffled(content_count, self.tiling.content_density, rng);
        let container = self.layout.container;
        self.rebuild(container);
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn tiling(&self) -> &TilingConfig {
        &self.tiling
    }

    pub fn physics(&self) -> &PhysicsConfig {
        &self.physics
    }

    pub fn set_physics(&mut self, physics: PhysicsConfig) {
        self.physics = physics;
    }

    pub fn placement(&self) -> &ContentPlacement {
        &self.placement
    }

    /// Changes every time the grid is rebuilt, expanded or collapsed
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Tiles taking part in the current topology
    pub fn all_tiles(&self) -> &[TileId] {
        &self.active
    }

    pub fn content_tiles(&self) -> &[TileId] {
        &self.content_tiles
    }

    pub fn border_tiles(&self) -> &[TileId] {
        &self.border_tiles
    }

    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(id.index())
    }

    pub fn tile_mut(&mut self, id: TileId) -> Option<&mut Tile> {
        self.tiles.get_mut(id.index())
    }

    /// Tiles of the current topology, in id order
    pub fn active_tiles_mut(&mut self) -> impl Iterator<Item = &mut Tile> + '_ {
        let expanded = self.expansion.is_some();
        let original_count = self.original_count;
        self.tiles
            .iter_mut()
            .filter(move |tile| in_topology(tile, expanded, original_count))
    }

    /// Whether `id` takes part in the current topology
    pub fn is_active(&self, id: TileId) -> bool {
        self.tile(id)
            .is_some_and(|tile| in_topology(tile, self.expansion.is_some(), self.original_count))
    }

    /// Screen-space offsets from a tile centre to its outer vertices
    pub fn vertex_offsets(&self) -> &[Vec2; 6] {
        &self.outer_offsets
    }

    /// Every tile currently allocated, including inactive ones
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Size of the collapsed tessellation
    pub fn original_tile_count(&self) -> usize {
        self.original_count
    }

    pub fn tile_at(&self, row: usize, col: usize) -> Option<TileId> {
        if row >= self.layout.rows || col >= self.layout.row_len(row as i32) {
            return None;
        }
        Some(TileId(self.row_starts[row] + col))
    }

    /// Active tile whose particle is closest to `point`
    pub fn nearest_tile(&self, point: Vec2) -> Option<TileId> {
        self.active
            .iter()
            .copied()
            .min_by(|a, b| {
                let da = self.tiles[a.index()].position().distance_squared(point);
                let db = self.tiles[b.index()].position().distance_squared(point);
                da.total_cmp(&db)
            })
    }

    /// Springs of the active topology, detached slots included
    pub fn springs(&self) -> &[Spring] {
        match &self.expansion {
            Some(expansion) => &expansion.springs,
            None => &self.springs,
        }
    }

    pub fn spring(&self, id: SpringId) -> Option<&Spring> {
        self.springs().get(id.0)
    }

    /// Replace (or clear) the neighbour of `tile` in `dir`, keeping the
    /// reciprocal slot on the other side in sync.
    ///
    /// Both tiles must belong to the current topology. A freed spring slot is
    /// reused by the next connection, so rewiring never grows the table.
    pub fn set_neighbor(
        &mut self,
        tile: TileId,
        dir: Direction,
        neighbor: Option<TileId>,
    ) -> Result<(), GridError> {
        for id in [Some(tile), neighbor].into_iter().flatten() {
            if id.index() >= self.tiles.len() {
                return Err(GridError::UnknownTile(id));
            }
            if !self.is_active(id) {
                return Err(GridError::InactiveTile(id));
            }
        }

        self.disconnect(tile, dir);
        if let Some(other) = neighbor {
            self.disconnect(other, dir.opposite());
            let rest =
                self.tiles[tile.index()].original_anchor.distance(self.tiles[other.index()].original_anchor);
            let (springs, free) = match &mut self.expansion {
                Some(expansion) => (&mut expansion.springs, &mut expansion.free_springs),
                None => (&mut self.springs, &mut self.free_springs),
            };
            match free.pop() {
                Some(slot) => {
                    springs[slot.0] = Spring::new(tile, other, rest);
                    link(&mut self.tiles, tile, dir, other, slot);
                }
                None => connect(&mut self.tiles, springs, tile, dir, other, rest),
            }
        }
        Ok(())
    }

    fn disconnect(&mut self, tile: TileId, dir: Direction) {
        let Some(link) = self.tiles[tile.index()].neighbors_mut()[dir.index()].take() else {
            return;
        };
        self.tiles[link.tile.index()].neighbors_mut()[dir.opposite().index()] = None;

        let (springs, free) = match &mut self.expansion {
            Some(expansion) => (&mut expansion.springs, &mut expansion.free_springs),
            None => (&mut self.springs, &mut self.free_springs),
        };
        springs[link.spring.0].detach();
        free.push(link.spring);
    }

    pub fn pan_offset(&self) -> Vec2 {
        self.pan
    }

    /// Shift every active anchor by the change in pan, keeping any
    /// perturbation already applied this frame
    pub fn set_pan_offset(&mut self, pan: Vec2) {
        let delta = pan - self.pan;
        self.pan = pan;
        for id in &self.active {
            self.tiles[id.index()].current_anchor += delta;
        }
    }

    /// Pan that puts `tile` in the middle of the container
    pub fn centering_pan(&self, tile: TileId) -> Option<Vec2> {
        self.tile(tile)
            .map(|t| self.layout.container / 2.0 - t.original_anchor)
    }

    /// Anchor with no transient perturbation: original + pan + sector offset
    pub fn rest_anchor(&self, id: TileId) -> Vec2 {
        let tile = &self.tiles[id.index()];
        let sector_offset = match (&self.expansion, tile.sector()) {
            (Some(expansion), Some(slot)) => expansion.sectors[slot.sector].offset,
            _ => Vec2::ZERO,
        };
        tile.original_anchor + self.pan + sector_offset
    }

    /// Put every active anchor back to its rest anchor
    pub fn reset_anchors(&mut self) {
        for i in 0..self.active.len() {
            let id = self.active[i];
            let anchor = self.rest_anchor(id);
            self.tiles[id.index()].current_anchor = anchor;
        }
    }

    /// One physics step over every active tile.
    ///
    /// Each spring is resolved once; both endpoints read the cached force.
    pub fn step(&mut self, dt: f32) {
        let physics = self.physics;

        let springs = match &mut self.expansion {
            Some(expansion) => &mut expansion.springs,
            None => &mut self.springs,
        };
        for spring in springs.iter_mut().filter(|s| s.is_attached()) {
            let (a, b) = (spring.a.index(), spring.b.index());
            spring.resolve(
                &self.tiles[a].particle,
                &self.tiles[b].particle,
                physics.neighbor_spring,
                physics.neighbor_damping,
            );
        }

        let springs: &[Spring] = springs;
        for &id in &self.active {
            let tile = &mut self.tiles[id.index()];

            let spring_force: Vec2 = tile
                .neighbors()
                .iter()
                .flatten()
                .map(|link| springs[link.spring.0].force_on(id))
                .sum();

            let velocity = tile.particle.velocity;
            let drag = -physics.drag * velocity;

            let (anchor_spring, anchor_damping) = if tile.is_border() {
                (physics.border_anchor_spring, physics.border_anchor_damping)
            } else {
                (physics.anchor_spring, physics.anchor_damping)
            };
            let anchor = anchor_spring * (tile.current_anchor - tile.particle.position)
                - anchor_damping * velocity;

            tile.particle.apply_force(spring_force + drag + anchor);
            tile.particle
                .integrate(dt, physics.force_epsilon, physics.velocity_epsilon);
            tile.update_vertices(&self.outer_offsets, &self.inner_offsets);
        }
    }

    fn refresh_lists(&mut self) {
        self.content_tiles = self
            .active
            .iter()
            .copied()
            .filter(|id| self.tiles[id.index()].holds_content())
            .collect();
        self.border_tiles = self
            .active
            .iter()
            .copied()
            .filter(|id| self.tiles[id.index()].is_border())
            .collect();
    }
}

fn in_topology(tile: &Tile, expanded: bool, original_count: usize) -> bool {
    if expanded {
        tile.is_expanded()
    } else {
        tile.id.index() < original_count
    }
}

/// Create a spring between `a` and `b` and store it in both tiles' active
/// neighbour slots
fn connect(
    tiles: &mut [Tile],
    springs: &mut Vec<Spring>,
    a: TileId,
    dir: Direction,
    b: TileId,
    rest_length: f32,
) {
    let spring = SpringId(springs.len());
    springs.push(Spring::new(a, b, rest_length));
    link(tiles, a, dir, b, spring);
}

fn link(tiles: &mut [Tile], a: TileId, dir: Direction, b: TileId, spring: SpringId) {
    tiles[a.index()].neighbors_mut()[dir.index()] = Some(Link { tile: b, spring });
    tiles[b.index()].neighbors_mut()[dir.opposite().index()] = Some(Link { tile: a, spring });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HexConfig, PhysicsConfig};
    use crate::hex::Orientation;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    pub(crate) fn test_config() -> HexConfig {
        let mut config = HexConfig::default();
        config.tiling.outer_radius = 40.0;
        config.tiling.gap = 4.0;
        config.tiling.margin_tiles = 1;
        config.tiling.content_density = 0.5;
        config
    }

    pub(crate) fn test_grid() -> Grid {
        let mut rng = StdRng::seed_from_u64(3);
        Grid::new(&test_config(), Vec2::new(800.0, 600.0), 6, &mut rng)
    }

    /// Container that yields exactly `cols` x `rows` with no margin
    fn exact_container(layout_cfg: &HexConfig, cols: usize, rows: usize) -> Vec2 {
        let reference = Layout::compute(&layout_cfg.tiling, Vec2::new(100.0, 100.0), 0);
        let along = (cols - 1) as f32 * reference.spacing - 1.0;
        let across = (rows - 1) as f32 * reference.row_spacing - 1.0;
        layout_cfg.tiling.orientation.to_screen(Vec2::new(along, across))
    }

    fn flat_config() -> HexConfig {
        let mut config = HexConfig::default();
        config.tiling.orientation = Orientation::FlatTop;
        config.tiling.outer_radius = 80.0;
        config.tiling.gap = 12.0;
        config.tiling.content_density = 0.0;
        config.tiling.margin_tiles = 0;
        config
    }

    #[test]
    fn test_neighbor_reciprocity() {
        let grid = test_grid();

        for &id in grid.all_tiles() {
            let tile = grid.tile(id).unwrap();
            for dir in Direction::ALL {
                let Some(link) = tile.neighbors()[dir.index()] else {
                    continue;
                };
                let back = grid.tile(link.tile).unwrap().neighbors()[dir.opposite().index()]
                    .expect("neighbor must link back");
                assert_eq!(back.tile, id);
                assert_eq!(back.spring, link.spring, "both sides share one spring");
            }
        }
    }

    #[test]
    fn test_neighbor_offsets_match_directions() {
        let grid = test_grid();
        let layout = grid.layout();

        for &id in grid.all_tiles() {
            let tile = grid.tile(id).unwrap();
            for dir in Direction::ALL {
                if let Some(other) = tile.neighbor(dir) {
                    let delta = grid.tile(other).unwrap().original_anchor - tile.original_anchor;
                    assert!((delta - layout.step(dir)).length() < 1e-3);
                }
            }
        }
    }

    #[test]
    fn test_seven_by_seven_flat_top_border_and_corners() {
        let config = flat_config();
        let container = exact_container(&config, 7, 7);
        let mut rng = StdRng::seed_from_u64(1);
        let grid = Grid::new(&config, container, 0, &mut rng);

        assert_eq!(grid.layout().tiles_per_row, 7);
        assert_eq!(grid.layout().rows, 7);
        assert_eq!(grid.original_tile_count(), 3 * 7 + 4 * 6);
        assert!(grid.content_tiles().is_empty());

        for &id in grid.all_tiles() {
            let tile = grid.tile(id).unwrap();
            let outer_ring = tile.row == 0
                || tile.row == 6
                || tile.col == 0
                || tile.col == grid.layout().row_len(tile.row) as i32 - 1;
            assert_eq!(tile.is_border(), outer_ring);
            assert_eq!(tile.is_border(), tile.neighbor_count() < 6);
        }

        let corners: Vec<_> = grid
            .all_tiles()
            .iter()
            .filter(|id| grid.tile(**id).unwrap().is_corner)
            .map(|id| {
                let t = grid.tile(*id).unwrap();
                (t.row, t.col)
            })
            .collect();
        assert_eq!(corners.len(), 6);
        assert_eq!(corners, vec![(0, 0), (0, 5), (3, 0), (3, 6), (6, 0), (6, 5)]);
    }

    #[test]
    fn test_even_row_count_has_six_corners() {
        let config = flat_config();
        let container = exact_container(&config, 7, 8);
        let mut rng = StdRng::seed_from_u64(1);
        let grid = Grid::new(&config, container, 0, &mut rng);

        assert_eq!(grid.layout().rows, 8);
        let corners: Vec<_> = grid
            .all_tiles()
            .iter()
            .filter(|id| grid.tile(**id).unwrap().is_corner)
            .map(|id| {
                let t = grid.tile(*id).unwrap();
                (t.row, t.col)
            })
            .collect();
        assert_eq!(corners, vec![(0, 0), (0, 5), (3, 0), (3, 6), (7, 0), (7, 6)]);
        assert!(corners.iter().all(|(row, col)| {
            grid.tile(grid.tile_at(*row as usize, *col as usize).unwrap())
                .unwrap()
                .is_border()
        }));
    }

    #[test]
    fn test_content_assigned_inside_column() {
        let grid = test_grid();

        assert_eq!(grid.content_tiles().len(), 6);
        for (i, id) in grid.content_tiles().iter().enumerate() {
            let tile = grid.tile(*id).unwrap();
            assert!(!tile.is_margin);
            assert!(!tile.is_border());
            assert_eq!(tile.content().map(|c| c.0), Some(i));
            assert!(tile.inner_vertices.is_some());
        }
    }

    #[test]
    fn test_resize_keeps_placement() {
        let mut grid = test_grid();
        let before: Vec<_> = grid
            .content_tiles()
            .iter()
            .map(|id| {
                let t = grid.tile(*id).unwrap();
                (t.row, grid.layout().doubled_offset(t.row, t.col))
            })
            .collect();
        let placement = grid.placement().clone();

        grid.resize(Vec2::new(1200.0, 700.0));

        assert_eq!(grid.placement(), &placement);
        let after: Vec<_> = grid
            .content_tiles()
            .iter()
            .map(|id| {
                let t = grid.tile(*id).unwrap();
                (t.row, grid.layout().doubled_offset(t.row, t.col))
            })
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_drag_only_converges_monotonically() {
        let mut grid = test_grid();
        grid.set_physics(PhysicsConfig::drag_only(2.0));
        let id = grid.content_tiles()[0];
        grid.tile_mut(id).unwrap().particle.velocity = Vec2::new(30.0, -20.0);

        let mut previous = grid.tile(id).unwrap().particle.velocity.length();
        for _ in 0..200 {
            let before = grid.tile(id).unwrap().particle.clone();
            grid.step(1.0 / 60.0);
            let after = &grid.tile(id).unwrap().particle;

            let speed = after.velocity.length();
            assert!(speed <= previous);
            // Velocity only shrinks along its own direction.
            assert!(after.velocity.perp_dot(before.velocity).abs() < 1e-3);
            assert!((after.position - (before.position + before.velocity / 60.0)).length() < 1e-4);
            previous = speed;
        }
        assert!(previous < 30.0 * 0.1);
    }

    #[test]
    fn test_displaced_tile_settles_back() {
        let mut grid = test_grid();
        let id = grid.content_tiles()[0];
        let anchor = grid.tile(id).unwrap().current_anchor;
        grid.tile_mut(id).unwrap().apply_force(Vec2::new(4000.0, 0.0));

        grid.step(1.0 / 60.0);
        grid.step(1.0 / 60.0);
        assert!(grid.tile(id).unwrap().position().x > anchor.x);

        for _ in 0..600 {
            grid.step(1.0 / 60.0);
        }
        assert!(grid.tile(id).unwrap().position().distance(anchor) < 0.5);
    }

    #[test]
    fn test_pinned_tile_stays_put() {
        let mut grid = test_grid();
        let id = grid.content_tiles()[0];
        let target = Vec2::new(5.0, 5.0);
        grid.tile_mut(id).unwrap().pin(target);

        for _ in 0..10 {
            grid.step(1.0 / 60.0);
        }
        assert_eq!(grid.tile(id).unwrap().position(), target);
    }

    #[test]
    fn test_pan_shifts_anchors() {
        let mut grid = test_grid();
        let id = grid.all_tiles()[10];
        let original = grid.tile(id).unwrap().original_anchor;

        grid.set_pan_offset(Vec2::new(15.0, -5.0));
        assert_eq!(grid.tile(id).unwrap().current_anchor, original + Vec2::new(15.0, -5.0));
        assert_eq!(grid.rest_anchor(id), original + Vec2::new(15.0, -5.0));
        assert_eq!(grid.tile(id).unwrap().original_anchor, original);
    }

    #[test]
    fn test_set_neighbor_keeps_reciprocity() {
        let mut grid = test_grid();
        let a = grid.tile_at(3, 3).unwrap();
        let old = grid.tile(a).unwrap().neighbor(Direction::East).unwrap();

        grid.set_neighbor(a, Direction::East, None).unwrap();
        assert_eq!(grid.tile(a).unwrap().neighbor(Direction::East), None);
        assert_eq!(grid.tile(old).unwrap().neighbor(Direction::West), None);

        grid.set_neighbor(a, Direction::East, Some(old)).unwrap();
        assert_eq!(grid.tile(old).unwrap().neighbor(Direction::West), Some(a));

        assert_eq!(
            grid.set_neighbor(a, Direction::East, Some(TileId(usize::MAX))),
            Err(GridError::UnknownTile(TileId(usize::MAX)))
        );
    }

    #[test]
    fn test_rewiring_reuses_spring_slots() {
        let mut grid = test_grid();
        let a = grid.tile_at(3, 3).unwrap();
        let b = grid.tile(a).unwrap().neighbor(Direction::East).unwrap();
        let count = grid.springs().len();

        for _ in 0..1000 {
            grid.set_neighbor(a, Direction::East, Some(b)).unwrap();
        }
        assert_eq!(grid.springs().len(), count);

        grid.set_neighbor(a, Direction::East, None).unwrap();
        let attached: Vec<_> = grid.springs().iter().filter(|s| s.is_attached()).collect();
        assert_eq!(attached.len(), count - 1);
        assert!(!attached.iter().any(|s| (s.a, s.b) == (a, b)));

        grid.set_neighbor(a, Direction::East, Some(b)).unwrap();
        assert_eq!(grid.springs().len(), count);
        assert!(grid.springs().iter().all(Spring::is_attached));
    }

    #[test]
    fn test_detached_spring_pulls_nothing() {
        let mut grid = test_grid();
        let physics = PhysicsConfig {
            drag: 0.0,
            anchor_spring: 0.0,
            anchor_damping: 0.0,
            border_anchor_spring: 0.0,
            border_anchor_damping: 0.0,
            ..*grid.physics()
        };
        grid.set_physics(physics);
        let a = grid.tile_at(3, 3).unwrap();
        let ids: Vec<_> = grid.tile(a).unwrap().neighbors().iter().flatten().map(|l| l.tile).collect();
        for dir in Direction::ALL {
            grid.set_neighbor(a, dir, None).unwrap();
        }
        grid.tile_mut(a).unwrap().particle.position += Vec2::new(20.0, 0.0);

        grid.step(1.0 / 60.0);

        assert_eq!(grid.tile(a).unwrap().particle.velocity, Vec2::ZERO);
        for id in ids {
            assert_eq!(grid.tile(id).unwrap().particle.velocity, Vec2::ZERO);
        }
    }

    #[test]
    fn test_nearest_tile() {
        let grid = test_grid();
        let id = grid.all_tiles()[17];
        let point = grid.tile(id).unwrap().position() + Vec2::new(3.0, -2.0);
        assert_eq!(grid.nearest_tile(point), Some(id));
    }
}
