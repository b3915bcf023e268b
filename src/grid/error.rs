use std::fmt;

use crate::hex::TileId;

/// Reasons a grid operation is rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// Sectors can only grow around a tile with all six neighbours
    BaseTileNotInterior { tile: TileId, neighbors: usize },
    UnknownTile(TileId),
    /// The tile exists but is not part of the current topology
    InactiveTile(TileId),
    UnknownSector(usize),
    AlreadyExpanded,
    NotExpanded,
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::BaseTileNotInterior { tile, neighbors } => write!(
                f,
                "Tile {} has {} neighbors; sectors need a fully interior base tile",
                tile, neighbors
            ),
            GridError::UnknownTile(tile) => write!(f, "Tile {} does not exist", tile),
            GridError::InactiveTile(tile) => {
                write!(f, "Tile {} is not part of the current topology", tile)
            }
            GridError::UnknownSector(index) => write!(f, "Sector {} does not exist", index),
            GridError::AlreadyExpanded => write!(f, "Grid is already expanded"),
            GridError::NotExpanded => write!(f, "Grid is not expanded"),
        }
    }
}

impl std::error::Error for GridError {}
