#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Bastion Defence.
//!
//! The world owns the tile grid, every structure, enemy and projectile, the
//! economy and the base. It mutates only in response to [`Command`] values
//! passed to [`apply`] and reports what happened through [`Event`] values.

mod economy;
mod enemies;
mod navigation;
mod occupancy;
mod placement;
mod projectiles;
mod structures;
mod terrain;

use bastion_defence_core::{
    CellCoord, Command, EnemyId, Event, ProjectileId, StructureId, StructureKind, TileCoord,
    TileGrid, TileKind, WELCOME_BANNER,
};
use tracing::{debug, info};

use crate::{
    economy::Economy,
    enemies::Enemy,
    navigation::FlowField,
    occupancy::OccupancyGrid,
    projectiles::Projectile,
    structures::StructureSlot,
    terrain::Terrain,
};

const DEFAULT_GRID_COLUMNS: TileCoord = TileCoord::new(20);
const DEFAULT_GRID_ROWS: TileCoord = TileCoord::new(12);
const DEFAULT_TILE_LENGTH: f32 = 40.0;

/// Health of the base at the start of a match.
pub const BASE_MAX_HEALTH: f32 = 200.0;
/// Gold awarded for each enemy killed by a projectile.
pub const KILL_BOUNTY: u32 = 3;

/// Enemy speeds are expressed in pixels per tick at this rate.
pub(crate) const REFERENCE_TICK_RATE: f32 = 60.0;
/// Pixel radius within which a projectile strikes an enemy or structure.
pub(crate) const PROJECTILE_HIT_RADIUS: f32 = 14.0;
/// Pixel radius within which a hostile projectile strikes the base itself.
pub(crate) const BASE_HIT_RADIUS: f32 = 16.0;
/// Pixel radius within which an enemy is considered to be at the base.
pub(crate) const BASE_CONTACT_RADIUS: f32 = 16.0;
/// Pixel radius within which an enemy stops to attack a structure.
pub(crate) const MELEE_REACH: f32 = 18.0;
/// Seconds a chain slow lasts after it lands.
pub(crate) const SLOW_DURATION: f32 = 0.8;
/// Share of a healer's output that restores the base.
const BASE_HEAL_SHARE: f32 = 0.10;

/// Represents the authoritative Bastion Defence world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    tile_grid: TileGrid,
    terrain: Terrain,
    occupancy: OccupancyGrid,
    flow: FlowField,
    enemies: Vec<Enemy>,
    friendly_projectiles: Vec<Projectile>,
    hostile_projectiles: Vec<Projectile>,
    economy: Economy,
    wave: u32,
    base_health: f32,
    defeated: bool,
    next_structure_id: u32,
    next_enemy_id: u32,
    next_projectile_id: u32,
}

impl World {
    /// Creates a new Bastion Defence world ready for simulation.
    #[must_use]
    pub fn new() -> Self {
        let tile_grid = TileGrid::new(DEFAULT_GRID_COLUMNS, DEFAULT_GRID_ROWS, DEFAULT_TILE_LENGTH);
        let terrain = Terrain::new(&tile_grid);
        let mut world = Self {
            banner: WELCOME_BANNER,
            occupancy: OccupancyGrid::new(
                tile_grid.columns().get(),
                tile_grid.rows().get(),
                terrain.base(),
            ),
            terrain,
            tile_grid,
            flow: FlowField::default(),
            enemies: Vec::new(),
            friendly_projectiles: Vec::new(),
            hostile_projectiles: Vec::new(),
            economy: Economy::new(),
            wave: 1,
            base_health: BASE_MAX_HEALTH,
            defeated: false,
            next_structure_id: 0,
            next_enemy_id: 0,
            next_projectile_id: 0,
        };
        world.reset_match(&mut Vec::new());
        world
    }

    fn reset_match(&mut self, out_events: &mut Vec<Event>) {
        self.occupancy = OccupancyGrid::new(
            self.tile_grid.columns().get(),
            self.tile_grid.rows().get(),
            self.terrain.base(),
        );
        self.enemies.clear();
        self.friendly_projectiles.clear();
        self.hostile_projectiles.clear();
        self.economy = Economy::new();
        self.wave = 1;
        self.base_health = BASE_MAX_HEALTH;
        self.defeated = false;
        self.next_structure_id = 0;
        self.next_enemy_id = 0;
        self.next_projectile_id = 0;
        self.recompute_flow(out_events);
    }

    pub(crate) fn allocate_structure_id(&mut self) -> StructureId {
        let id = StructureId::new(self.next_structure_id);
        self.next_structure_id = self.next_structure_id.wrapping_add(1);
        id
    }

    fn allocate_enemy_id(&mut self) -> EnemyId {
        let id = EnemyId::new(self.next_enemy_id);
        self.next_enemy_id = self.next_enemy_id.wrapping_add(1);
        id
    }

    pub(crate) fn allocate_projectile_id(&mut self) -> ProjectileId {
        let id = ProjectileId::new(self.next_projectile_id);
        self.next_projectile_id = self.next_projectile_id.wrapping_add(1);
        id
    }

    /// Rebuilds the flow field from the current occupancy.
    pub(crate) fn recompute_flow(&mut self, out_events: &mut Vec<Event>) {
        let occupancy = &self.occupancy;
        self.flow.rebuild_with(
            self.tile_grid.columns().get(),
            self.tile_grid.rows().get(),
            self.terrain.base(),
            |cell| occupancy.blocks(cell),
        );
        let reachable_cells = self.flow.reachable_cells();
        debug!(reachable_cells, "flow field recomputed");
        out_events.push(Event::FlowFieldRecomputed { reachable_cells });
    }

    /// Lowers base health, clamping at zero and announcing defeat once.
    pub(crate) fn damage_base(&mut self, amount: f32, out_events: &mut Vec<Event>) {
        self.base_health = (self.base_health - amount).max(0.0);
        if self.base_health <= 0.0 && !self.defeated {
            self.defeated = true;
            info!(wave = self.wave, "base destroyed");
            out_events.push(Event::GameOver { wave: self.wave });
        }
    }

    /// Damages the structure in the slot, destroying it once its health is spent.
    pub(crate) fn damage_structure(
        &mut self,
        slot: StructureSlot,
        amount: f32,
        out_events: &mut Vec<Event>,
    ) {
        let destroyed = self
            .occupancy
            .get_mut(slot)
            .map_or(false, |structure| structure.take_damage(amount));
        if !destroyed {
            return;
        }

        let cell = self.occupancy.cell_of(slot);
        let Some(structure) = self.occupancy.remove(slot) else {
            return;
        };
        self.economy.release(structure.kind);
        debug!(kind = ?structure.kind, ?cell, "structure destroyed");
        out_events.push(Event::StructureDestroyed {
            structure: structure.id,
            kind: structure.kind,
            cell,
        });
        if structure.kind.blocks_movement() {
            self.recompute_flow(out_events);
        }
    }

    /// Decays cooldowns and runs miners and healers. A defeated world stays frozen.
    fn advance_structures(&mut self, dt: f32) {
        if self.defeated {
            return;
        }
        let mut healers = Vec::new();

        for slot in self.occupancy.slots() {
            let cell = self.occupancy.cell_of(slot);
            let on_resource = self.terrain.kind(cell) == Some(TileKind::Resource);
            let Some(structure) = self.occupancy.get_mut(slot) else {
                continue;
            };
            structure.decay_cooldown(dt);

            match structure.kind {
                StructureKind::Miner if on_resource => {
                    self.economy.accrue(structure.stats.mine_rate * dt);
                }
                StructureKind::Healer => healers.push(Healer {
                    slot,
                    cell,
                    range: structure.stats.heal_range_tiles * self.tile_grid.tile_length(),
                    amount: structure.stats.heal_rate * dt,
                    self_heal: structure.stats.self_heal,
                }),
                _ => {}
            }
        }

        for healer in healers {
            self.heal_around(&healer);
        }
    }

    fn heal_around(&mut self, healer: &Healer) {
        let origin = self.tile_grid.cell_center(healer.cell);
        let base_center = self.tile_grid.cell_center(self.terrain.base());
        let base_in_range = origin.distance(base_center) <= healer.range;

        for slot in self.occupancy.slots() {
            if slot == healer.slot && !healer.self_heal {
                continue;
            }
            let in_range = match slot {
                StructureSlot::Cell(cell) => {
                    origin.distance(self.tile_grid.cell_center(cell)) <= healer.range
                }
                StructureSlot::Stack(_) => base_in_range,
            };
            if !in_range {
                continue;
            }
            if let Some(structure) = self.occupancy.get_mut(slot) {
                structure.heal(healer.amount);
            }
        }

        if base_in_range {
            self.base_health =
                (self.base_health + healer.amount * BASE_HEAL_SHARE).min(BASE_MAX_HEALTH);
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Healing pass captured during the structure sweep.
#[derive(Clone, Copy, Debug)]
struct Healer {
    slot: StructureSlot,
    cell: CellCoord,
    range: f32,
    amount: f32,
    self_heal: bool,
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureTileGrid {
            columns,
            rows,
            tile_length,
        } => {
            world.tile_grid = TileGrid::new(columns, rows, tile_length);
            world.terrain = Terrain::new(&world.tile_grid);
            out_events.push(Event::GridConfigured {
                columns,
                rows,
                base: world.terrain.base(),
            });
            world.reset_match(out_events);
        }
        Command::ScatterResources { seed, count } => {
            world.terrain.scatter_resources(seed, count);
            let tiles = world.terrain.resource_tiles();
            debug!(seed, tiles, "resources scattered");
            out_events.push(Event::ResourcesScattered { tiles });
        }
        Command::ResetMatch => {
            world.reset_match(out_events);
            info!("match reset");
            out_events.push(Event::MatchReset);
        }
        Command::Tick { dt } => {
            world.advance_structures(dt.as_secs_f32());
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::FireProjectile { structure, target } => {
            world.fire_projectile(structure, target, out_events);
        }
        Command::FireChain { structure, targets } => {
            world.fire_chain(structure, &targets, out_events);
        }
        Command::AdvanceProjectiles { dt } => {
            world.advance_projectiles(dt.as_secs_f32(), out_events);
        }
        Command::AdvanceEnemies { dt } => {
            world.advance_enemies(dt.as_secs_f32(), out_events);
        }
        Command::SpawnEnemy { kind, cell, stats } => {
            if !world.tile_grid.contains(cell) {
                return;
            }
            let id = world.allocate_enemy_id();
            let position = world.tile_grid.cell_center(cell);
            world.enemies.push(Enemy::spawn(id, kind, position, stats));
            debug!(enemy = id.get(), ?kind, ?cell, "enemy spawned");
            out_events.push(Event::EnemySpawned {
                enemy: id,
                kind,
                cell,
            });
        }
        Command::AdvanceWave => {
            world.wave = world.wave.saturating_add(1);
            info!(wave = world.wave, "wave started");
            out_events.push(Event::WaveStarted { wave: world.wave });
        }
        Command::PlaceOrUpgrade { kind, cell } => {
            world.place_or_upgrade(kind, cell, out_events);
        }
        Command::RemoveStructure { cell } => {
            world.remove_structure(cell, out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use bastion_defence_core::{
        Allegiance, CellCoord, EnemyView, FlowFieldView, PlacementError, PlacementPreview,
        ProjectileView, StructureKind, StructureSnapshot, StructureView, TileGrid, TileKind,
    };

    use super::{structures::Structure, StructureSlot, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the world's tile grid definition.
    #[must_use]
    pub fn tile_grid(world: &World) -> &TileGrid {
        &world.tile_grid
    }

    /// Cell hosting the base.
    #[must_use]
    pub fn base_cell(world: &World) -> CellCoord {
        world.terrain.base()
    }

    /// Terrain at the provided cell, if it lies within the grid.
    #[must_use]
    pub fn tile_kind(world: &World, cell: CellCoord) -> Option<TileKind> {
        world.terrain.kind(cell)
    }

    /// Current gold balance, including fractional mined gold.
    #[must_use]
    pub fn gold(world: &World) -> f32 {
        world.economy.gold()
    }

    /// Number of the active wave, starting at one.
    #[must_use]
    pub fn wave(world: &World) -> u32 {
        world.wave
    }

    /// Remaining base health.
    #[must_use]
    pub fn base_health(world: &World) -> f32 {
        world.base_health
    }

    /// Reports whether the base has fallen.
    #[must_use]
    pub fn is_game_over(world: &World) -> bool {
        world.defeated
    }

    /// Live count of the kind; uncapped kinds always report zero.
    #[must_use]
    pub fn placement_count(world: &World, kind: StructureKind) -> u32 {
        world.economy.count(kind)
    }

    /// Structure exposed at the cell: the grid occupant, or the top of the base stack.
    #[must_use]
    pub fn structure_at(world: &World, cell: CellCoord) -> Option<StructureSnapshot> {
        let slot = if cell == world.terrain.base() {
            world.occupancy.top_slot()?
        } else {
            if world.occupancy.grid_structure(cell).is_none() {
                return None;
            }
            StructureSlot::Cell(cell)
        };
        world
            .occupancy
            .get(slot)
            .map(|structure| snapshot(world, slot, structure))
    }

    /// Structures stacked on the base, bottom first.
    #[must_use]
    pub fn base_stack(world: &World) -> Vec<StructureSnapshot> {
        world
            .occupancy
            .stack()
            .iter()
            .enumerate()
            .map(|(index, structure)| snapshot(world, StructureSlot::Stack(index), structure))
            .collect()
    }

    /// Captures every structure in scan order.
    #[must_use]
    pub fn structure_view(world: &World) -> StructureView {
        let snapshots = world
            .occupancy
            .iter()
            .map(|(slot, structure)| snapshot(world, slot, structure))
            .collect();
        StructureView::from_snapshots(snapshots)
    }

    /// Captures every live enemy in spawn order.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(world.enemies.iter().map(|enemy| enemy.snapshot()).collect())
    }

    /// Number of live enemies.
    #[must_use]
    pub fn live_enemy_count(world: &World) -> usize {
        world.enemies.len()
    }

    /// Captures every projectile in flight, friendly first.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        let friendly = world
            .friendly_projectiles
            .iter()
            .map(|projectile| projectile.snapshot(Allegiance::Friendly));
        let hostile = world
            .hostile_projectiles
            .iter()
            .map(|projectile| projectile.snapshot(Allegiance::Hostile));
        ProjectileView::from_snapshots(friendly.chain(hostile).collect())
    }

    /// Exposes the flow field distances.
    #[must_use]
    pub fn flow_field(world: &World) -> FlowFieldView<'_> {
        FlowFieldView::new(world.flow.cells(), world.flow.width(), world.flow.height())
    }

    /// Neighbour an enemy standing in the cell would head for next.
    #[must_use]
    pub fn next_step(world: &World, cell: CellCoord) -> CellCoord {
        world.flow.next_step(cell)
    }

    /// Validates a place-or-upgrade request without applying it.
    pub fn placement_preview(
        world: &World,
        kind: StructureKind,
        cell: CellCoord,
    ) -> Result<PlacementPreview, PlacementError> {
        world
            .plan_placement(kind, cell)
            .map(|plan| plan.preview(kind, cell))
    }

    fn snapshot(world: &World, slot: StructureSlot, structure: &Structure) -> StructureSnapshot {
        let cell = world.occupancy.cell_of(slot);
        StructureSnapshot {
            id: structure.id,
            kind: structure.kind,
            cell,
            center: world.tile_grid.cell_center(cell),
            stack_index: match slot {
                StructureSlot::Stack(index) => Some(index),
                StructureSlot::Cell(_) => None,
            },
            health: structure.health,
            max_health: structure.max_health,
            level: structure.level,
            next_upgrade_cost: structure.next_upgrade_cost,
            spent: structure.spent,
            cooldown: structure.cooldown,
            stats: structure.stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bastion_defence_core::PlacementError;

    fn place(world: &mut World, kind: StructureKind, cell: CellCoord) -> Vec<Event> {
        let mut events = Vec::new();
        apply(world, Command::PlaceOrUpgrade { kind, cell }, &mut events);
        events
    }

    #[test]
    fn new_world_uses_default_grid_with_central_base() {
        let world = World::new();
        let grid = query::tile_grid(&world);
        assert_eq!(grid.columns(), TileCoord::new(20));
        assert_eq!(grid.rows(), TileCoord::new(12));
        assert_eq!(query::base_cell(&world), CellCoord::new(10, 6));
        assert_eq!(query::base_health(&world), BASE_MAX_HEALTH);
        assert_eq!(query::wave(&world), 1);
        assert_eq!(query::gold(&world), 60.0);
    }

    #[test]
    fn configure_tile_grid_moves_the_base() {
        let mut world = World::new();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::ConfigureTileGrid {
                columns: TileCoord::new(9),
                rows: TileCoord::new(5),
                tile_length: 32.0,
            },
            &mut events,
        );

        assert_eq!(query::base_cell(&world), CellCoord::new(4, 2));
        assert_eq!(
            events.first(),
            Some(&Event::GridConfigured {
                columns: TileCoord::new(9),
                rows: TileCoord::new(5),
                base: CellCoord::new(4, 2),
            })
        );
        assert!(events.contains(&Event::FlowFieldRecomputed { reachable_cells: 45 }));
    }

    #[test]
    fn walls_cannot_be_stacked_on_the_base() {
        let mut world = World::new();
        let base = query::base_cell(&world);
        let events = place(&mut world, StructureKind::Wall, base);
        assert_eq!(
            events,
            vec![Event::PlacementRejected {
                kind: StructureKind::Wall,
                cell: base,
                reason: PlacementError::CannotWallBase,
            }]
        );
    }

    #[test]
    fn stacked_base_keeps_seeding_the_flow_field() {
        let mut world = World::new();
        let base = query::base_cell(&world);
        let events = place(&mut world, StructureKind::Turret, base);
        assert!(events.contains(&Event::FlowFieldRecomputed { reachable_cells: 240 }));

        let field = query::flow_field(&world);
        assert_eq!(field.distance(base), Some(0));
        assert_eq!(field.distance(CellCoord::new(11, 6)), Some(1));
        assert_eq!(query::base_stack(&world).len(), 1);
    }

    #[test]
    fn damage_base_announces_defeat_once() {
        let mut world = World::new();
        let mut events = Vec::new();
        world.damage_base(150.0, &mut events);
        world.damage_base(150.0, &mut events);
        world.damage_base(10.0, &mut events);
        assert_eq!(query::base_health(&world), 0.0);
        assert_eq!(events, vec![Event::GameOver { wave: 1 }]);
        assert!(query::is_game_over(&world));
    }

    #[test]
    fn reset_match_restores_opening_state() {
        let mut world = World::new();
        let _ = place(&mut world, StructureKind::Turret, CellCoord::new(2, 2));
        let mut events = Vec::new();
        world.damage_base(500.0, &mut events);
        apply(&mut world, Command::AdvanceWave, &mut events);

        apply(&mut world, Command::ResetMatch, &mut events);

        assert_eq!(query::gold(&world), 60.0);
        assert_eq!(query::wave(&world), 1);
        assert_eq!(query::base_health(&world), BASE_MAX_HEALTH);
        assert!(!query::is_game_over(&world));
        assert!(query::structure_view(&world).is_empty());
        assert_eq!(query::placement_count(&world, StructureKind::Turret), 0);
    }
}
