mod direction;
mod particle;
mod spring;
mod tile;

pub use direction::{Direction, Orientation};
pub use particle::Particle;
pub use spring::{Link, Spring, SpringId};
pub use tile::{ContentId, ExpandedState, SectorSlot, Tile, TileId};
