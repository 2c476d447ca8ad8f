//! Gold balance and per-kind placement counters.

use std::collections::BTreeMap;

use bastion_defence_core::StructureKind;

/// Gold balance at the start of every match.
pub(crate) const STARTING_GOLD: f32 = 60.0;

/// Tracks the player's gold and the live counts of capped structure kinds.
#[derive(Clone, Debug)]
pub(crate) struct Economy {
    gold: f32,
    counts: BTreeMap<StructureKind, u32>,
}

impl Economy {
    pub(crate) fn new() -> Self {
        Self {
            gold: STARTING_GOLD,
            counts: BTreeMap::new(),
        }
    }

    pub(crate) fn gold(&self) -> f32 {
        self.gold
    }

    pub(crate) fn can_afford(&self, cost: u32) -> bool {
        self.gold >= cost as f32
    }

    /// Deducts the cost. Callers verify affordability first.
    pub(crate) fn spend(&mut self, cost: u32) {
        self.gold -= cost as f32;
    }

    /// Credits a whole-gold amount such as a bounty or refund.
    pub(crate) fn credit(&mut self, amount: u32) {
        self.gold += amount as f32;
    }

    /// Credits fractional gold produced by miners.
    pub(crate) fn accrue(&mut self, amount: f32) {
        self.gold += amount;
    }

    /// Live count for the kind. Uncapped kinds always report zero.
    pub(crate) fn count(&self, kind: StructureKind) -> u32 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    /// Reports whether another structure of the kind may be built.
    pub(crate) fn has_capacity(&self, kind: StructureKind) -> bool {
        kind.placement_cap()
            .map_or(true, |cap| self.count(kind) < cap)
    }

    pub(crate) fn register(&mut self, kind: StructureKind) {
        if kind.placement_cap().is_some() {
            *self.counts.entry(kind).or_insert(0) += 1;
        }
    }

    /// Decrements the count for the kind, never dropping below zero.
    pub(crate) fn release(&mut self, kind: StructureKind) {
        if let Some(count) = self.counts.get_mut(&kind) {
            *count = count.saturating_sub(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_economy_holds_starting_gold() {
        let economy = Economy::new();
        assert_eq!(economy.gold(), 60.0);
        assert!(economy.can_afford(60));
        assert!(!economy.can_afford(61));
    }

    #[test]
    fn only_capped_kinds_are_counted() {
        let mut economy = Economy::new();
        economy.register(StructureKind::Miner);
        economy.register(StructureKind::Turret);
        assert_eq!(economy.count(StructureKind::Miner), 0);
        assert_eq!(economy.count(StructureKind::Turret), 1);
    }

    #[test]
    fn release_never_goes_negative() {
        let mut economy = Economy::new();
        economy.release(StructureKind::Wall);
        economy.register(StructureKind::Wall);
        economy.release(StructureKind::Wall);
        economy.release(StructureKind::Wall);
        assert_eq!(economy.count(StructureKind::Wall), 0);
    }

    #[test]
    fn capacity_stops_at_cap() {
        let mut economy = Economy::new();
        for _ in 0..10 {
            assert!(economy.has_capacity(StructureKind::Tesla));
            economy.register(StructureKind::Tesla);
        }
        assert!(!economy.has_capacity(StructureKind::Tesla));
        assert!(economy.has_capacity(StructureKind::Healer));
    }

    #[test]
    fn spending_and_crediting_adjust_balance() {
        let mut economy = Economy::new();
        economy.spend(10);
        economy.credit(3);
        economy.accrue(0.5);
        assert_eq!(economy.gold(), 53.5);
    }
}
