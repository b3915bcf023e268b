use std::f32::consts::PI;

use bevy::math::Vec2;
use serde::Deserialize;

/// How hexes sit on screen.
///
/// Layout math works in "row space": `x` runs along a row, `y` runs across
/// rows (downwards). `PointyTop` uses row space as screen space; `FlatTop`
/// is the same lattice transposed, so its rows run vertically.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    PointyTop,
    FlatTop,
}

impl Orientation {
    /// Row space -> screen space
    pub fn to_screen(self, v: Vec2) -> Vec2 {
        match self {
            Orientation::PointyTop => v,
            Orientation::FlatTop => Vec2::new(v.y, v.x),
        }
    }

    /// Screen space -> row space (the transpose is its own inverse)
    pub fn to_row_space(self, v: Vec2) -> Vec2 {
        self.to_screen(v)
    }

    /// Screen-space offsets from a hex centre to its six vertices.
    ///
    /// Vertex `k` always lies between direction `k` and direction `k + 1`.
    pub fn vertex_offsets(self, radius: f32) -> [Vec2; 6] {
        std::array::from_fn(|k| {
            let angle = (30.0 + 60.0 * k as f32).to_radians();
            self.to_screen(Vec2::new(angle.cos(), angle.sin()) * radius)
        })
    }
}

/// The six neighbour directions of a hex, named in row space (y down).
///
/// Direction `i` points at `60° * i`, so `D(i) + D(i + 2) == D(i + 1)` and
/// `D(i + 3) == -D(i)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    East,
    SouthEast,
    SouthWest,
    West,
    NorthWest,
    NorthEast,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::East,
        Direction::SouthEast,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
        Direction::NorthEast,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn from_index(i: usize) -> Self {
        Self::ALL[i % 6]
    }

    pub const fn opposite(self) -> Self {
        Self::from_index(self.index() + 3)
    }

    /// Rotate clockwise (in row space) by `steps` sixths of a turn
    pub fn rotated(self, steps: i32) -> Self {
        Self::from_index((self.index() as i32 + steps).rem_euclid(6) as usize)
    }

    /// Unit vector in row space
    pub fn unit(self) -> Vec2 {
        let angle = self.index() as f32 * PI / 3.0;
        Vec2::new(angle.cos(), angle.sin())
    }

    /// Step in doubled coordinates `(2 * offset along row, row)`
    pub const fn doubled_delta(self) -> (i32, i32) {
        match self {
            Direction::East => (2, 0),
            Direction::SouthEast => (1, 1),
            Direction::SouthWest => (-1, 1),
            Direction::West => (-2, 0),
            Direction::NorthWest => (-1, -1),
            Direction::NorthEast => (1, -1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_opposite_and_rotation() {
        for dir in Direction::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
            assert!(close(dir.unit(), -dir.opposite().unit()));
            assert_eq!(dir.rotated(6), dir);
            assert_eq!(dir.rotated(-1).rotated(1), dir);
        }
        assert_eq!(Direction::East.rotated(-1), Direction::NorthEast);
    }

    #[test]
    fn test_direction_sum_identity() {
        for i in 0..6 {
            let sum = Direction::from_index(i).unit() + Direction::from_index(i + 2).unit();
            assert!(close(sum, Direction::from_index(i + 1).unit()));
        }
    }

    #[test]
    fn test_vertex_between_directions() {
        for orientation in [Orientation::PointyTop, Orientation::FlatTop] {
            let offsets = orientation.vertex_offsets(1.0);
            for k in 0..6 {
                let a = orientation.to_screen(Direction::from_index(k).unit());
                let b = orientation.to_screen(Direction::from_index(k + 1).unit());
                let bisector = (a + b).normalize();
                assert!(close(offsets[k], bisector));
            }
        }
    }

    #[test]
    fn test_pointy_and_flat_tables() {
        let pointy = Orientation::PointyTop.vertex_offsets(2.0);
        let flat = Orientation::FlatTop.vertex_offsets(2.0);

        // Pointy hexes have a vertex straight below the centre, flat ones to the right.
        assert!(pointy.iter().any(|v| close(*v, Vec2::new(0.0, 2.0))));
        assert!(flat.iter().any(|v| close(*v, Vec2::new(2.0, 0.0))));
        assert!(!pointy.iter().any(|v| close(*v, Vec2::new(2.0, 0.0))));
    }
}
