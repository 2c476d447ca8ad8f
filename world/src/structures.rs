//! Authoritative structure state and level-driven statistics.

use bastion_defence_core::{CellCoord, StructureId, StructureKind, StructureStats};

const TURRET_FIRE_INTERVAL: f32 = 1.0;
const TURRET_RANGE_TILES: f32 = 5.0;
const TURRET_DAMAGE: u32 = 12;
const MINER_RATE: f32 = 4.0;
const TESLA_FIRE_INTERVAL: f32 = 0.5;
const TESLA_RANGE_TILES: f32 = 3.0;
const TESLA_SLOW: f32 = 0.6;
const TESLA_SLOW_FLOOR: f32 = 0.3;
const TESLA_DAMAGE: u32 = 8;
const HEALER_RANGE_TILES: f32 = 3.0;
const HEALER_RATE: f32 = 6.0;
const WALL_HEALTH_PER_LEVEL: f32 = 100.0;

/// Structure stored inside the world, either on a grid cell or the base stack.
#[derive(Clone, Debug)]
pub(crate) struct Structure {
    pub(crate) id: StructureId,
    pub(crate) kind: StructureKind,
    pub(crate) health: f32,
    pub(crate) max_health: f32,
    pub(crate) level: u32,
    pub(crate) next_upgrade_cost: u32,
    pub(crate) spent: u32,
    pub(crate) cooldown: f32,
    pub(crate) stats: StructureStats,
}

impl Structure {
    /// Creates a freshly built level-one structure.
    pub(crate) fn new(id: StructureId, kind: StructureKind) -> Self {
        let base_cost = kind.base_cost();
        let health = kind.initial_health();
        Self {
            id,
            kind,
            health,
            max_health: health,
            level: 1,
            next_upgrade_cost: base_cost.saturating_mul(2),
            spent: base_cost,
            cooldown: 0.0,
            stats: stats_for_level(kind, 1),
        }
    }

    /// Pays for and applies a single level upgrade, returning the gold charged.
    pub(crate) fn upgrade(&mut self) -> u32 {
        let cost = self.next_upgrade_cost;
        self.level = self.level.saturating_add(1);
        self.spent = self.spent.saturating_add(cost);
        self.next_upgrade_cost = cost.saturating_mul(2);
        self.stats = stats_for_level(self.kind, self.level);

        if self.kind == StructureKind::Wall {
            self.max_health = wall_health_for_level(self.level);
            self.health = self.max_health;
        }

        cost
    }

    /// Gold returned when the structure is removed on request.
    pub(crate) fn refund(&self) -> u32 {
        self.spent / 2
    }

    /// Applies damage, returning `true` when the structure was destroyed.
    pub(crate) fn take_damage(&mut self, amount: f32) -> bool {
        self.health -= amount;
        self.health <= 0.0
    }

    /// Restores health without exceeding the maximum.
    pub(crate) fn heal(&mut self, amount: f32) {
        self.health = (self.health + amount).min(self.max_health);
    }

    pub(crate) fn decay_cooldown(&mut self, dt: f32) {
        self.cooldown = (self.cooldown - dt).max(0.0);
    }

    pub(crate) fn is_ready(&self) -> bool {
        self.cooldown <= 0.0
    }

    pub(crate) fn reset_cooldown(&mut self) {
        self.cooldown = self.stats.fire_interval;
    }
}

/// Location of a structure within the world's storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum StructureSlot {
    /// Stored on a regular grid cell.
    Cell(CellCoord),
    /// Stored at the given index of the base stack.
    Stack(usize),
}

/// Computes the type-specific parameters of a structure at the provided level.
pub(crate) fn stats_for_level(kind: StructureKind, level: u32) -> StructureStats {
    let steps = level.saturating_sub(1) as f32;
    let mut stats = StructureStats {
        fire_interval: TURRET_FIRE_INTERVAL,
        range_tiles: TURRET_RANGE_TILES,
        damage: TURRET_DAMAGE,
        mine_rate: MINER_RATE,
        slow_factor: TESLA_SLOW,
        heal_range_tiles: HEALER_RANGE_TILES,
        heal_rate: HEALER_RATE,
        self_heal: true,
    };

    match kind {
        StructureKind::Wall => {}
        StructureKind::Turret => {
            stats.fire_interval = TURRET_FIRE_INTERVAL * 0.85_f32.powf(steps);
            stats.range_tiles = TURRET_RANGE_TILES + 0.7 * steps;
            stats.damage = TURRET_DAMAGE + 2 * level.saturating_sub(1);
        }
        StructureKind::Miner => {
            stats.mine_rate = MINER_RATE * 1.5_f32.powf(steps);
        }
        StructureKind::Tesla => {
            stats.fire_interval = TESLA_FIRE_INTERVAL * 0.92_f32.powf(steps);
            stats.range_tiles = TESLA_RANGE_TILES;
            stats.damage = TESLA_DAMAGE + level.saturating_sub(1);
            stats.slow_factor = (TESLA_SLOW - 0.08 * steps).max(TESLA_SLOW_FLOOR);
        }
        StructureKind::Healer => {
            stats.heal_rate = HEALER_RATE * 1.5_f32.powf(steps);
            stats.heal_range_tiles = HEALER_RANGE_TILES + 0.5 * steps;
        }
    }

    stats
}

fn wall_health_for_level(level: u32) -> f32 {
    StructureKind::Wall.initial_health() + WALL_HEALTH_PER_LEVEL * level.saturating_sub(1) as f32
}
