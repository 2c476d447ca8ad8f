#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that prepares a Bastion Defence map.

use bastion_defence_core::{Command, TileCoord, TileGrid};
use bastion_defence_world::{query, World};
use serde::Deserialize;
use thiserror::Error;

/// Map layout used when no configuration overrides are supplied.
///
/// Every field falls back to its default when omitted from a configuration file.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BootstrapConfig {
    /// Number of tile columns.
    pub columns: u32,
    /// Number of tile rows.
    pub rows: u32,
    /// Side length of a tile in pixels.
    pub tile_length: f32,
    /// Number of resource draws scattered across the map.
    pub resource_tiles: u32,
    /// Seed for resource placement.
    pub seed: u64,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            columns: 20,
            rows: 12,
            tile_length: 40.0,
            resource_tiles: 28,
            seed: 42,
        }
    }
}

impl BootstrapConfig {
    /// Checks that the layout describes a playable map.
    pub fn validate(&self) -> Result<(), BootstrapError> {
        if self.columns == 0 || self.rows == 0 {
            return Err(BootstrapError::EmptyGrid);
        }
        if u64::from(self.columns) * u64::from(self.rows) < 2 {
            return Err(BootstrapError::NoBuildableTiles);
        }
        if !(self.tile_length.is_finite() && self.tile_length > 0.0) {
            return Err(BootstrapError::InvalidTileLength(self.tile_length));
        }
        Ok(())
    }
}

/// Reasons a bootstrap configuration cannot produce a map.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum BootstrapError {
    /// The grid has no columns or no rows.
    #[error("grid must have at least one column and one row")]
    EmptyGrid,
    /// The grid holds only the base tile.
    #[error("grid must contain at least one tile besides the base")]
    NoBuildableTiles,
    /// Tiles must have a positive, finite length.
    #[error("tile length must be positive, got {0}")]
    InvalidTileLength(f32),
}

/// Produces the commands that lay out a fresh map and data required to greet the player.
#[derive(Debug, Default)]
pub struct Bootstrap;

impl Bootstrap {
    /// Derives the banner that should be shown when the experience starts.
    #[must_use]
    pub fn welcome_banner<'world>(&self, world: &'world World) -> &'world str {
        query::welcome_banner(world)
    }

    /// Exposes the tile grid configuration required for presentation.
    #[must_use]
    pub fn tile_grid<'world>(&self, world: &'world World) -> &'world TileGrid {
        query::tile_grid(world)
    }

    /// Emits the commands that configure the grid and scatter resources.
    pub fn generate(
        &self,
        config: &BootstrapConfig,
        out: &mut Vec<Command>,
    ) -> Result<(), BootstrapError> {
        config.validate()?;
        out.push(Command::ConfigureTileGrid {
            columns: TileCoord::new(config.columns),
            rows: TileCoord::new(config.rows),
            tile_length: config.tile_length,
        });
        out.push(Command::ScatterResources {
            seed: config.seed,
            count: config.resource_tiles,
        });
        Ok(())
    }
}
