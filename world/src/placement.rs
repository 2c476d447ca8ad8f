//! Place-or-upgrade validation and the removal flow.

use bastion_defence_core::{
    CellCoord, Event, PlacementAction, PlacementError, PlacementPreview, RemovalError,
    StructureKind, TileKind,
};
use tracing::debug;

use crate::{
    structures::{Structure, StructureSlot},
    World,
};

/// Resolved outcome of a valid place-or-upgrade request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum PlacementPlan {
    /// Upgrade the structure stored in the slot.
    Upgrade { slot: StructureSlot, cost: u32 },
    /// Build a fresh level-one structure.
    Build { cost: u32 },
}

impl PlacementPlan {
    pub(crate) fn preview(self, kind: StructureKind, cell: CellCoord) -> PlacementPreview {
        let (action, cost) = match self {
            Self::Upgrade { cost, .. } => (PlacementAction::Upgrade, cost),
            Self::Build { cost } => (PlacementAction::Build, cost),
        };
        PlacementPreview {
            kind,
            cell,
            action,
            cost,
        }
    }
}

impl World {
    /// Validates a place-or-upgrade request without mutating the world.
    pub(crate) fn plan_placement(
        &self,
        kind: StructureKind,
        cell: CellCoord,
    ) -> Result<PlacementPlan, PlacementError> {
        if self.defeated {
            return Err(PlacementError::NotPlaying);
        }
        if !self.tile_grid.contains(cell) {
            return Err(PlacementError::OutOfBounds);
        }

        if cell == self.terrain.base() {
            if kind == StructureKind::Wall {
                return Err(PlacementError::CannotWallBase);
            }
            if kind == StructureKind::Miner {
                return Err(PlacementError::InvalidTerrain);
            }

            let cheapest = self
                .occupancy
                .stack()
                .iter()
                .enumerate()
                .filter(|(_, structure)| structure.kind == kind)
                .min_by_key(|(_, structure)| structure.next_upgrade_cost);
            if let Some((index, structure)) = cheapest {
                if self.economy.can_afford(structure.next_upgrade_cost) {
                    return Ok(PlacementPlan::Upgrade {
                        slot: StructureSlot::Stack(index),
                        cost: structure.next_upgrade_cost,
                    });
                }
            }

            return self.plan_build(kind);
        }

        if let Some(existing) = self.occupancy.grid_structure(cell) {
            if existing.kind != kind {
                return Err(PlacementError::Occupied);
            }
            if !self.economy.can_afford(existing.next_upgrade_cost) {
                return Err(PlacementError::InsufficientGold);
            }
            return Ok(PlacementPlan::Upgrade {
                slot: StructureSlot::Cell(cell),
                cost: existing.next_upgrade_cost,
            });
        }

        if kind == StructureKind::Miner && self.terrain.kind(cell) != Some(TileKind::Resource) {
            return Err(PlacementError::InvalidTerrain);
        }

        self.plan_build(kind)
    }

    fn plan_build(&self, kind: StructureKind) -> Result<PlacementPlan, PlacementError> {
        if !self.economy.has_capacity(kind) {
            return Err(PlacementError::CapReached);
        }
        let cost = kind.base_cost();
        if !self.economy.can_afford(cost) {
            return Err(PlacementError::InsufficientGold);
        }
        Ok(PlacementPlan::Build { cost })
    }

    /// Executes a place-or-upgrade request, reporting the outcome as events.
    pub(crate) fn place_or_upgrade(
        &mut self,
        kind: StructureKind,
        cell: CellCoord,
        out_events: &mut Vec<Event>,
    ) {
        let plan = match self.plan_placement(kind, cell) {
            Ok(plan) => plan,
            Err(reason) => {
                debug!(?kind, ?cell, %reason, "placement rejected");
                out_events.push(Event::PlacementRejected { kind, cell, reason });
                return;
            }
        };

        match plan {
            PlacementPlan::Upgrade { slot, cost } => {
                let Some(structure) = self.occupancy.get_mut(slot) else {
                    return;
                };
                let charged = structure.upgrade();
                let (id, level) = (structure.id, structure.level);
                self.economy.spend(charged);
                debug!(?kind, ?cell, level, cost, "structure upgraded");
                out_events.push(Event::StructureUpgraded {
                    structure: id,
                    kind,
                    cell,
                    level,
                    cost: charged,
                });
            }
            PlacementPlan::Build { cost } => {
                let id = self.allocate_structure_id();
                if self.occupancy.insert(cell, Structure::new(id, kind)).is_none() {
                    return;
                }
                self.economy.spend(cost);
                self.economy.register(kind);
                debug!(?kind, ?cell, cost, "structure placed");
                out_events.push(Event::StructurePlaced {
                    structure: id,
                    kind,
                    cell,
                    cost,
                });
                if kind.blocks_movement() {
                    self.recompute_flow(out_events);
                }
            }
        }
    }

    /// Removes the structure at the cell (or the top of the base stack) for a refund.
    pub(crate) fn remove_structure(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) {
        let slot = match self.removal_slot(cell) {
            Ok(slot) => slot,
            Err(reason) => {
                debug!(?cell, %reason, "removal rejected");
                out_events.push(Event::RemovalRejected { cell, reason });
                return;
            }
        };

        let Some(structure) = self.occupancy.remove(slot) else {
            return;
        };
        let refund = structure.refund();
        self.economy.credit(refund);
        self.economy.release(structure.kind);
        debug!(kind = ?structure.kind, ?cell, refund, "structure removed");
        out_events.push(Event::StructureRemoved {
            structure: structure.id,
            kind: structure.kind,
            cell,
            refund,
        });
        if structure.kind.blocks_movement() {
            self.recompute_flow(out_events);
        }
    }

    fn removal_slot(&self, cell: CellCoord) -> Result<StructureSlot, RemovalError> {
        if self.defeated {
            return Err(RemovalError::NotPlaying);
        }
        if !self.tile_grid.contains(cell) {
            return Err(RemovalError::OutOfBounds);
        }
        if cell == self.terrain.base() {
            return self.occupancy.top_slot().ok_or(RemovalError::Empty);
        }
        self.occupancy
            .grid_structure(cell)
            .map(|_| StructureSlot::Cell(cell))
            .ok_or(RemovalError::Empty)
    }
}
