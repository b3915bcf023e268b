use bevy::math::Vec2;

use super::{Grid, GridError, Sector, connect};
use crate::hex::{Direction, Spring, SpringId, TileId};

/// Sectors and springs of the expanded topology
#[derive(Debug, Clone)]
pub struct Expansion {
    pub base: TileId,
    pub sectors: Vec<Sector>,
    pub springs: Vec<Spring>,
    /// Detached slots in `springs`, reused by the next connection
    pub(super) free_springs: Vec<SpringId>,
}

impl Grid {
    pub fn is_expanded(&self) -> bool {
        self.expansion.is_some()
    }

    /// The tile the sectors were built around
    pub fn expanded_tile(&self) -> Option<TileId> {
        self.expansion.as_ref().map(|e| e.base)
    }

    pub fn sectors(&self) -> &[Sector] {
        self.expansion.as_ref().map_or(&[], |e| e.sectors.as_slice())
    }

    /// Build six sectors around `base` and stitch them together.
    ///
    /// Sectors start at offset zero; a dilation job moves them out.
    pub fn expand(&mut self, base: TileId) -> Result<(), GridError> {
        if self.expansion.is_some() {
            return Err(GridError::AlreadyExpanded);
        }
        if base.index() >= self.original_count {
            return Err(GridError::UnknownTile(base));
        }
        let neighbors = self.tiles[base.index()].neighbor_count();
        if neighbors < 6 {
            return Err(GridError::BaseTileNotInterior {
                tile: base,
                neighbors,
            });
        }

        let mut springs = Vec::new();
        let sectors: Vec<Sector> = (0..6)
            .map(|index| self.build_sector(base, index, &mut springs))
            .collect();

        let base_tile = &mut self.tiles[base.index()];
        base_tile.enter_expanded(None);
        base_tile.set_border(true);

        self.stitch_sectors(&sectors, &mut springs);

        self.active = std::iter::once(base)
            .chain(sectors.iter().flat_map(|s| s.tiles().iter().copied()))
            .collect();
        let created: usize = sectors.iter().map(Sector::created_count).sum();
        self.expansion = Some(Expansion {
            base,
            sectors,
            springs,
            free_springs: Vec::new(),
        });
        self.refresh_lists();
        self.generation += 1;

        log::info!(
            "Expanded grid around tile {} ({} active tiles, {} created)",
            base,
            self.active.len(),
            created
        );
        Ok(())
    }

    /// Link each sector's minor edge to the next sector's major edge, walking
    /// both in step, and mark the expanded border
    fn stitch_sectors(&mut self, sectors: &[Sector], springs: &mut Vec<Spring>) {
        for (i, sector) in sectors.iter().enumerate() {
            let next = &sectors[(i + 1) % sectors.len()];
            let ours = sector.minor_edge();
            let theirs = next.major_edge();
            let forward = Direction::from_index(i + 2);
            let back = Direction::from_index(i + 3);

            let rest = |grid: &Grid, a: TileId, b: TileId| {
                let pa = grid.tiles[a.index()].original_anchor + sector.displacement;
                let pb = grid.tiles[b.index()].original_anchor + next.displacement;
                pa.distance(pb)
            };

            for (k, &tile) in ours.iter().enumerate() {
                if let Some(&other) = theirs.get(k) {
                    let length = rest(self, tile, other);
                    connect(&mut self.tiles, springs, tile, forward, other, length);
                }
                if k >= 1 {
                    if let Some(&other) = theirs.get(k - 1) {
                        let length = rest(self, tile, other);
                        connect(&mut self.tiles, springs, tile, back, other, length);
                    }
                }
            }

            for end in [ours.first(), ours.last(), theirs.first(), theirs.last()]
                .into_iter()
                .flatten()
            {
                self.tiles[end.index()].set_border(true);
            }
        }

        for sector in sectors {
            for &id in sector.tiles() {
                if self.tiles[id.index()].neighbor_count() < 6 {
                    self.tiles[id.index()].set_border(true);
                }
            }
        }
    }

    /// Destroy the sectors, discard created tiles and return to the
    /// tessellation's own topology
    pub fn collapse(&mut self) -> Result<(), GridError> {
        let Some(expansion) = self.expansion.take() else {
            return Err(GridError::NotExpanded);
        };

        let created = self.tiles.len() - self.original_count;
        self.tiles.truncate(self.original_count);
        for tile in &mut self.tiles {
            tile.leave_expanded();
        }
        self.active = (0..self.original_count).map(TileId).collect();
        self.reset_anchors();
        self.refresh_lists();
        self.generation += 1;

        log::info!(
            "Collapsed expansion around tile {} ({} created tiles discarded)",
            expansion.base,
            created
        );
        Ok(())
    }

    /// Move every tile of sector `index` to `offset` from its rest position
    pub fn set_sector_offset(&mut self, index: usize, offset: Vec2) -> Result<(), GridError> {
        let expansion = self.expansion.as_mut().ok_or(GridError::NotExpanded)?;
        let sector = expansion
            .sectors
            .get_mut(index)
            .ok_or(GridError::UnknownSector(index))?;

        let delta = offset - sector.offset;
        sector.offset = offset;
        for &id in sector.tiles() {
            self.tiles[id.index()].current_anchor += delta;
        }
        Ok(())
    }
}
