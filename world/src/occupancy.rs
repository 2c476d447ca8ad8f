//! Structure storage: one slot per grid cell plus the stack on the base.

use bastion_defence_core::{CellCoord, StructureId};

use crate::structures::{Structure, StructureSlot};

/// Dense row-major structure grid together with the base stack.
///
/// The base cell's grid slot is never populated; structures built on the base
/// are pushed onto the stack instead and the top entry is the one exposed to
/// combat and removal.
#[derive(Clone, Debug)]
pub(crate) struct OccupancyGrid {
    columns: u32,
    rows: u32,
    base: CellCoord,
    cells: Vec<Option<Structure>>,
    stack: Vec<Structure>,
}

impl OccupancyGrid {
    pub(crate) fn new(columns: u32, rows: u32, base: CellCoord) -> Self {
        let count = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        Self {
            columns,
            rows,
            base,
            cells: vec![None; count],
            stack: Vec::new(),
        }
    }

    pub(crate) fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() >= self.columns || cell.row() >= self.rows {
            return None;
        }
        let width = usize::try_from(self.columns).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let row = usize::try_from(cell.row()).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    /// Grid occupant of the cell, ignoring the base stack.
    pub(crate) fn grid_structure(&self, cell: CellCoord) -> Option<&Structure> {
        self.index(cell)
            .and_then(|index| self.cells.get(index))
            .and_then(Option::as_ref)
    }

    pub(crate) fn stack(&self) -> &[Structure] {
        &self.stack
    }

    pub(crate) fn top_slot(&self) -> Option<StructureSlot> {
        self.stack.len().checked_sub(1).map(StructureSlot::Stack)
    }

    pub(crate) fn get(&self, slot: StructureSlot) -> Option<&Structure> {
        match slot {
            StructureSlot::Cell(cell) => self.grid_structure(cell),
            StructureSlot::Stack(index) => self.stack.get(index),
        }
    }

    pub(crate) fn get_mut(&mut self, slot: StructureSlot) -> Option<&mut Structure> {
        match slot {
            StructureSlot::Cell(cell) => {
                let index = self.index(cell)?;
                self.cells.get_mut(index).and_then(Option::as_mut)
            }
            StructureSlot::Stack(index) => self.stack.get_mut(index),
        }
    }

    /// Stores the structure on the grid cell, or pushes it onto the stack for the base.
    pub(crate) fn insert(&mut self, cell: CellCoord, structure: Structure) -> Option<StructureSlot> {
        if cell == self.base {
            self.stack.push(structure);
            return self.top_slot();
        }
        let index = self.index(cell)?;
        self.cells[index] = Some(structure);
        Some(StructureSlot::Cell(cell))
    }

    pub(crate) fn remove(&mut self, slot: StructureSlot) -> Option<Structure> {
        match slot {
            StructureSlot::Cell(cell) => {
                let index = self.index(cell)?;
                self.cells.get_mut(index).and_then(Option::take)
            }
            StructureSlot::Stack(index) => {
                if index < self.stack.len() {
                    Some(self.stack.remove(index))
                } else {
                    None
                }
            }
        }
    }

    /// Cell a slot lives on.
    pub(crate) fn cell_of(&self, slot: StructureSlot) -> CellCoord {
        match slot {
            StructureSlot::Cell(cell) => cell,
            StructureSlot::Stack(_) => self.base,
        }
    }

    /// Every occupied slot: grid cells in column-major order, then the stack bottom to top.
    pub(crate) fn slots(&self) -> Vec<StructureSlot> {
        let mut slots = Vec::new();
        for column in 0..self.columns {
            for row in 0..self.rows {
                let cell = CellCoord::new(column, row);
                if self.grid_structure(cell).is_some() {
                    slots.push(StructureSlot::Cell(cell));
                }
            }
        }
        slots.extend((0..self.stack.len()).map(StructureSlot::Stack));
        slots
    }

    /// Iterator over occupied slots in the same order as [`Self::slots`].
    pub(crate) fn iter(&self) -> impl Iterator<Item = (StructureSlot, &Structure)> + '_ {
        self.slots()
            .into_iter()
            .filter_map(move |slot| self.get(slot).map(|structure| (slot, structure)))
    }

    pub(crate) fn locate(&self, id: StructureId) -> Option<StructureSlot> {
        self.iter()
            .find(|(_, structure)| structure.id == id)
            .map(|(slot, _)| slot)
    }

    /// Reports whether routing treats the cell as impassable.
    pub(crate) fn blocks(&self, cell: CellCoord) -> bool {
        if cell == self.base {
            return self
                .stack
                .iter()
                .any(|structure| structure.kind.blocks_movement());
        }
        self.grid_structure(cell)
            .map_or(false, |structure| structure.kind.blocks_movement())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bastion_defence_core::StructureKind;

    fn grid() -> OccupancyGrid {
        OccupancyGrid::new(4, 3, CellCoord::new(2, 1))
    }

    #[test]
    fn base_insertions_stack_and_expose_the_top() {
        let mut occupancy = grid();
        let base = CellCoord::new(2, 1);
        let first = occupancy.insert(base, Structure::new(StructureId::new(0), StructureKind::Turret));
        let second = occupancy.insert(base, Structure::new(StructureId::new(1), StructureKind::Miner));
        assert_eq!(first, Some(StructureSlot::Stack(0)));
        assert_eq!(second, Some(StructureSlot::Stack(1)));
        assert_eq!(occupancy.stack().last().map(|s| s.id), Some(StructureId::new(1)));
        assert_eq!(occupancy.top_slot(), Some(StructureSlot::Stack(1)));
        assert!(occupancy.grid_structure(base).is_none());
        assert!(occupancy.blocks(base));
    }

    #[test]
    fn slots_scan_columns_before_rows_then_the_stack() {
        let mut occupancy = grid();
        let cells = [CellCoord::new(1, 2), CellCoord::new(0, 1), CellCoord::new(1, 0)];
        for (id, cell) in cells.into_iter().enumerate() {
            let id = StructureId::new(u32::try_from(id).expect("small id"));
            let _ = occupancy.insert(cell, Structure::new(id, StructureKind::Wall));
        }
        let _ = occupancy.insert(
            CellCoord::new(2, 1),
            Structure::new(StructureId::new(9), StructureKind::Healer),
        );

        assert_eq!(
            occupancy.slots(),
            vec![
                StructureSlot::Cell(CellCoord::new(0, 1)),
                StructureSlot::Cell(CellCoord::new(1, 0)),
                StructureSlot::Cell(CellCoord::new(1, 2)),
                StructureSlot::Stack(0),
            ]
        );
        assert_eq!(occupancy.locate(StructureId::new(9)), Some(StructureSlot::Stack(0)));
    }

    #[test]
    fn removal_clears_the_slot() {
        let mut occupancy = grid();
        let cell = CellCoord::new(0, 0);
        let _ = occupancy.insert(cell, Structure::new(StructureId::new(4), StructureKind::Wall));
        assert!(occupancy.blocks(cell));
        let removed = occupancy.remove(StructureSlot::Cell(cell));
        assert_eq!(removed.map(|s| s.id), Some(StructureId::new(4)));
        assert!(!occupancy.blocks(cell));
        assert!(occupancy.remove(StructureSlot::Cell(cell)).is_none());
    }
}
