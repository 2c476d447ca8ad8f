//! Tile terrain: buildable ground, resource deposits and the base tile.

use bastion_defence_core::{CellCoord, TileGrid, TileKind};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Row-major terrain layer for the configured grid.
#[derive(Clone, Debug)]
pub(crate) struct Terrain {
    columns: u32,
    rows: u32,
    base: CellCoord,
    tiles: Vec<TileKind>,
}

impl Terrain {
    /// Creates plain terrain with the base tile at the grid's center.
    pub(crate) fn new(grid: &TileGrid) -> Self {
        let columns = grid.columns().get();
        let rows = grid.rows().get();
        let base = grid.center_cell();
        let mut terrain = Self {
            columns,
            rows,
            base,
            tiles: vec![TileKind::Empty; grid.cell_count()],
        };
        if let Some(index) = terrain.index(base) {
            terrain.tiles[index] = TileKind::Base;
        }
        terrain
    }

    pub(crate) fn base(&self) -> CellCoord {
        self.base
    }

    pub(crate) fn kind(&self, cell: CellCoord) -> Option<TileKind> {
        self.index(cell).and_then(|index| self.tiles.get(index).copied())
    }

    /// Marks `count` randomly drawn tiles as resources.
    ///
    /// Draws landing on the base are repeated. Draws may land on a tile that is
    /// already a resource, so fewer than `count` distinct tiles can result.
    pub(crate) fn scatter_resources(&mut self, seed: u64, count: u32) {
        if self.tiles.len() < 2 {
            return;
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut placed = 0;
        while placed < count {
            let cell = CellCoord::new(
                rng.gen_range(0..self.columns),
                rng.gen_range(0..self.rows),
            );
            if cell == self.base {
                continue;
            }
            if let Some(index) = self.index(cell) {
                self.tiles[index] = TileKind::Resource;
            }
            placed += 1;
        }
    }

    pub(crate) fn resource_tiles(&self) -> u32 {
        let count = self
            .tiles
            .iter()
            .filter(|&&tile| tile == TileKind::Resource)
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() >= self.columns || cell.row() >= self.rows {
            return None;
        }
        let width = usize::try_from(self.columns).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let row = usize::try_from(cell.row()).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bastion_defence_core::TileCoord;

    fn grid() -> TileGrid {
        TileGrid::new(TileCoord::new(20), TileCoord::new(12), 40.0)
    }

    #[test]
    fn base_sits_at_grid_center() {
        let terrain = Terrain::new(&grid());
        assert_eq!(terrain.base(), CellCoord::new(10, 6));
        assert_eq!(terrain.kind(CellCoord::new(10, 6)), Some(TileKind::Base));
        assert_eq!(terrain.kind(CellCoord::new(0, 0)), Some(TileKind::Empty));
        assert_eq!(terrain.kind(CellCoord::new(20, 0)), None);
    }

    #[test]
    fn scatter_never_covers_the_base() {
        let mut terrain = Terrain::new(&grid());
        terrain.scatter_resources(42, 28);
        assert_eq!(terrain.kind(terrain.base()), Some(TileKind::Base));
        let tiles = terrain.resource_tiles();
        assert!(tiles > 0 && tiles <= 28);
    }

    #[test]
    fn scatter_is_deterministic_per_seed() {
        let mut first = Terrain::new(&grid());
        let mut second = Terrain::new(&grid());
        first.scatter_resources(7, 28);
        second.scatter_resources(7, 28);
        assert_eq!(first.tiles, second.tiles);
    }
}
