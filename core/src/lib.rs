#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Bastion Defence simulation.
//!
//! This crate defines the message surface that connects the collaborator
//! facade, the authoritative world, and pure systems. Callers submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! describing what actually happened. Systems consume immutable snapshot views
//! and respond exclusively with new command batches.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Bastion Defence.";

/// Distance value reported by the flow field for cells that cannot reach the base.
pub const UNREACHABLE: u16 = u16::MAX;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Configures the world's tile grid and places the base at its center.
    ///
    /// Clears every structure, enemy and projectile and resets the match.
    ConfigureTileGrid {
        /// Number of tile columns laid out in the grid.
        columns: TileCoord,
        /// Number of tile rows laid out in the grid.
        rows: TileCoord,
        /// Length of each square tile measured in pixels.
        tile_length: f32,
    },
    /// Scatters resource tiles across the grid using a seeded generator.
    ScatterResources {
        /// Seed feeding the deterministic generator.
        seed: u64,
        /// Number of draws performed; repeated draws may hit the same tile.
        count: u32,
    },
    /// Restores the match to its opening state while keeping the terrain.
    ResetMatch,
    /// Advances structure cooldowns and continuous structure effects.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a turret fire a single projectile at an enemy.
    FireProjectile {
        /// Structure performing the attack.
        structure: StructureId,
        /// Enemy the projectile is aimed at.
        target: EnemyId,
    },
    /// Requests that a tesla discharge a chain through the listed enemies.
    ///
    /// An empty target list still consumes the tesla's cooldown.
    FireChain {
        /// Structure performing the attack.
        structure: StructureId,
        /// Enemies struck in order, nearest first.
        targets: Vec<EnemyId>,
    },
    /// Moves every projectile and resolves their hits.
    AdvanceProjectiles {
        /// Duration of simulated time covered by the step.
        dt: Duration,
    },
    /// Runs the per-enemy state machine: slow decay, melee, routing and shooting.
    AdvanceEnemies {
        /// Duration of simulated time covered by the step.
        dt: Duration,
    },
    /// Requests that a new enemy enter the grid at the provided cell.
    SpawnEnemy {
        /// Archetype of the spawned enemy.
        kind: EnemyKind,
        /// Cell whose center becomes the enemy's initial position.
        cell: CellCoord,
        /// Fully scaled combat statistics.
        stats: EnemyStats,
    },
    /// Advances the wave counter once the previous wave has been cleared.
    AdvanceWave,
    /// Places a new structure or upgrades the matching structure at the cell.
    PlaceOrUpgrade {
        /// Type of structure requested.
        kind: StructureKind,
        /// Target cell of the request.
        cell: CellCoord,
    },
    /// Removes the structure at the cell (or the top of the base stack) for a refund.
    RemoveStructure {
        /// Target cell of the request.
        cell: CellCoord,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that the tile grid was configured.
    GridConfigured {
        /// Number of tile columns laid out in the grid.
        columns: TileCoord,
        /// Number of tile rows laid out in the grid.
        rows: TileCoord,
        /// Cell hosting the base.
        base: CellCoord,
    },
    /// Reports how many distinct tiles became resource tiles.
    ResourcesScattered {
        /// Number of distinct resource tiles on the grid after scattering.
        tiles: u32,
    },
    /// Announces that the match returned to its opening state.
    MatchReset,
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that a new wave began.
    WaveStarted {
        /// Number of the wave that became active.
        wave: u32,
    },
    /// Confirms that an enemy entered the grid.
    EnemySpawned {
        /// Identifier assigned to the enemy.
        enemy: EnemyId,
        /// Archetype of the enemy.
        kind: EnemyKind,
        /// Cell the enemy spawned in.
        cell: CellCoord,
    },
    /// Reports that an enemy died and paid out its bounty.
    EnemyKilled {
        /// Identifier of the enemy that died.
        enemy: EnemyId,
        /// Archetype of the enemy.
        kind: EnemyKind,
        /// Gold awarded for the kill.
        bounty: u32,
    },
    /// Confirms that a projectile was launched.
    ProjectileFired {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Side that fired the projectile.
        allegiance: Allegiance,
    },
    /// Confirms that a new structure was built.
    StructurePlaced {
        /// Identifier assigned to the structure.
        structure: StructureId,
        /// Type of structure that was built.
        kind: StructureKind,
        /// Cell the structure occupies.
        cell: CellCoord,
        /// Gold deducted for the placement.
        cost: u32,
    },
    /// Confirms that an existing structure gained a level.
    StructureUpgraded {
        /// Identifier of the upgraded structure.
        structure: StructureId,
        /// Type of the upgraded structure.
        kind: StructureKind,
        /// Cell the structure occupies.
        cell: CellCoord,
        /// Level reached after the upgrade.
        level: u32,
        /// Gold deducted for the upgrade.
        cost: u32,
    },
    /// Reports that a place-or-upgrade request was rejected.
    PlacementRejected {
        /// Type of structure requested.
        kind: StructureKind,
        /// Target cell of the request.
        cell: CellCoord,
        /// Specific reason the request failed.
        reason: PlacementError,
    },
    /// Confirms that a structure was removed on request.
    StructureRemoved {
        /// Identifier of the removed structure.
        structure: StructureId,
        /// Type of the removed structure.
        kind: StructureKind,
        /// Cell the structure occupied.
        cell: CellCoord,
        /// Gold returned to the player.
        refund: u32,
    },
    /// Reports that a removal request was rejected.
    RemovalRejected {
        /// Target cell of the request.
        cell: CellCoord,
        /// Specific reason the request failed.
        reason: RemovalError,
    },
    /// Reports that a structure's health was depleted.
    StructureDestroyed {
        /// Identifier of the destroyed structure.
        structure: StructureId,
        /// Type of the destroyed structure.
        kind: StructureKind,
        /// Cell the structure occupied.
        cell: CellCoord,
    },
    /// Confirms that the flow field was rebuilt after a connectivity change.
    FlowFieldRecomputed {
        /// Number of cells holding a finite distance to the base.
        reachable_cells: u32,
    },
    /// Announces that the base fell. Emitted exactly once per match.
    GameOver {
        /// Wave that was active when the base fell.
        wave: u32,
    },
}

/// Side that fired a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Allegiance {
    /// Fired by a defending structure; damages enemies.
    Friendly,
    /// Fired by an enemy; damages structures and the base.
    Hostile,
}

/// Kind of terrain found at a grid tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Plain buildable ground.
    Empty,
    /// Ore deposit that miners extract gold from.
    Resource,
    /// The single defended tile.
    Base,
}

/// Buildings the player can construct.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum StructureKind {
    /// Pure obstacle with a large health pool.
    Wall,
    /// Single-target projectile tower.
    Turret,
    /// Gold extractor that must stand on a resource tile.
    Miner,
    /// Chain-lightning tower that slows what it hits.
    Tesla,
    /// Support tower that restores nearby structures and the base.
    Healer,
}

impl StructureKind {
    /// Every buildable structure kind in selection order.
    pub const ALL: [StructureKind; 5] = [
        Self::Wall,
        Self::Turret,
        Self::Miner,
        Self::Tesla,
        Self::Healer,
    ];

    /// Gold required to build the structure.
    #[must_use]
    pub const fn base_cost(self) -> u32 {
        match self {
            Self::Wall => 5,
            Self::Turret => 10,
            Self::Miner => 20,
            Self::Tesla => 30,
            Self::Healer => 25,
        }
    }

    /// Health the structure starts with.
    #[must_use]
    pub const fn initial_health(self) -> f32 {
        match self {
            Self::Wall => 100.0,
            Self::Turret => 50.0,
            Self::Miner => 30.0,
            Self::Tesla => 80.0,
            Self::Healer => 45.0,
        }
    }

    /// Maximum number of simultaneously live structures of this kind, if capped.
    #[must_use]
    pub const fn placement_cap(self) -> Option<u32> {
        match self {
            Self::Turret => Some(15),
            Self::Wall => Some(30),
            Self::Tesla => Some(10),
            Self::Miner | Self::Healer => None,
        }
    }

    /// Reports whether the structure occupies its cell for routing purposes.
    ///
    /// Every current kind blocks movement.
    #[must_use]
    pub const fn blocks_movement(self) -> bool {
        true
    }
}

/// Archetypes of attacking units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Baseline attacker.
    Grunt,
    /// Slow, heavily armoured attacker.
    Tank,
    /// Fast, fragile attacker.
    Scout,
    /// Ranged attacker that fires at structures and the base.
    Shooter,
    /// Every third wave opens with one of these.
    Boss,
}

impl EnemyKind {
    /// Multiplier applied to the wave's base health.
    #[must_use]
    pub const fn health_multiplier(self) -> f32 {
        match self {
            Self::Grunt => 1.0,
            Self::Tank => 2.8,
            Self::Scout => 0.6,
            Self::Shooter => 0.9,
            Self::Boss => 6.0,
        }
    }

    /// Multiplier applied to the wave's base speed.
    #[must_use]
    pub const fn speed_multiplier(self) -> f32 {
        match self {
            Self::Grunt => 1.0,
            Self::Tank => 0.55,
            Self::Scout => 1.7,
            Self::Shooter => 0.9,
            Self::Boss => 0.75,
        }
    }

    /// Multiplier applied to the wave's base damage per second.
    #[must_use]
    pub const fn damage_multiplier(self) -> f32 {
        match self {
            Self::Grunt => 1.0,
            Self::Tank => 1.2,
            Self::Scout => 0.6,
            Self::Shooter => 0.8,
            Self::Boss => 2.5,
        }
    }

    /// Range in tiles within which the enemy fires projectiles, if it shoots at all.
    #[must_use]
    pub const fn shoot_range_tiles(self) -> Option<f32> {
        match self {
            Self::Shooter => Some(6.0),
            _ => None,
        }
    }
}

/// Combat statistics of a single enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyStats {
    /// Starting and maximum health.
    pub health: f32,
    /// Pixels travelled per reference tick (1/60 s) before slow effects.
    pub speed: f32,
    /// Melee damage dealt per second; also the basis for shooter projectile damage.
    pub damage_per_second: f32,
}

impl EnemyStats {
    /// Creates a new statistics block.
    #[must_use]
    pub const fn new(health: f32, speed: f32, damage_per_second: f32) -> Self {
        Self {
            health,
            speed,
            damage_per_second,
        }
    }
}

/// Unique identifier assigned to a structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StructureId(u32);

impl StructureId {
    /// Creates a new structure identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Index within the tile grid measured in whole tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord(u32);

impl TileCoord {
    /// Creates a new tile coordinate wrapper.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the underlying tile index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Describes the discrete tile layout and its mapping to pixel space.
#[derive(Clone, Debug, PartialEq)]
pub struct TileGrid {
    columns: TileCoord,
    rows: TileCoord,
    tile_length: f32,
}

impl TileGrid {
    /// Creates a new tile grid description.
    #[must_use]
    pub const fn new(columns: TileCoord, rows: TileCoord, tile_length: f32) -> Self {
        Self {
            columns,
            rows,
            tile_length,
        }
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> TileCoord {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> TileCoord {
        self.rows
    }

    /// Side length of a single square tile expressed in pixels.
    #[must_use]
    pub const fn tile_length(&self) -> f32 {
        self.tile_length
    }

    /// Total width of the grid measured in pixels.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns.get() as f32 * self.tile_length
    }

    /// Total height of the grid measured in pixels.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows.get() as f32 * self.tile_length
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns.get() && cell.row() < self.rows.get()
    }

    /// Cell at the middle of the grid, where the base is placed.
    #[must_use]
    pub const fn center_cell(&self) -> CellCoord {
        CellCoord::new(self.columns.get() / 2, self.rows.get() / 2)
    }

    /// Pixel-space center of the provided cell.
    #[must_use]
    pub fn cell_center(&self, cell: CellCoord) -> Vec2 {
        Vec2::new(
            (cell.column() as f32 + 0.5) * self.tile_length,
            (cell.row() as f32 + 0.5) * self.tile_length,
        )
    }

    /// Cell containing the provided pixel-space point, clamped onto the grid.
    ///
    /// Returns the origin cell for an empty grid.
    #[must_use]
    pub fn cell_at(&self, point: Vec2) -> CellCoord {
        if self.tile_length <= 0.0 {
            return CellCoord::new(0, 0);
        }

        let clamp_axis = |value: f32, count: u32| -> u32 {
            let last = count.saturating_sub(1);
            let index = (value / self.tile_length).floor();
            if index <= 0.0 {
                0
            } else if index >= last as f32 {
                last
            } else {
                index as u32
            }
        };

        CellCoord::new(
            clamp_axis(point.x, self.columns.get()),
            clamp_axis(point.y, self.rows.get()),
        )
    }

    /// Number of cells contained in the grid.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let count = u64::from(self.columns.get()) * u64::from(self.rows.get());
        usize::try_from(count).unwrap_or(0)
    }
}

/// Type-specific parameters of a structure at its current level.
///
/// Fields that do not apply to a kind keep their level-one defaults.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StructureStats {
    /// Seconds between attacks for cooldown-gated kinds.
    pub fire_interval: f32,
    /// Attack range measured in tiles.
    pub range_tiles: f32,
    /// Damage carried by each projectile.
    pub damage: u32,
    /// Gold produced per second while standing on a resource tile.
    pub mine_rate: f32,
    /// Speed multiplier applied to enemies struck by a chain.
    pub slow_factor: f32,
    /// Healing radius measured in tiles.
    pub heal_range_tiles: f32,
    /// Health restored per second to structures in range.
    pub heal_rate: f32,
    /// Whether the healer restores its own health.
    pub self_heal: bool,
}

/// Immutable representation of a single structure's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StructureSnapshot {
    /// Identifier allocated to the structure by the world.
    pub id: StructureId,
    /// Kind of structure that was constructed.
    pub kind: StructureKind,
    /// Cell the structure occupies.
    pub cell: CellCoord,
    /// Pixel-space center of the structure's cell.
    pub center: Vec2,
    /// Position within the base stack (zero is the bottom), if stacked on the base.
    pub stack_index: Option<usize>,
    /// Current health.
    pub health: f32,
    /// Maximum health.
    pub max_health: f32,
    /// Current level, starting at one.
    pub level: u32,
    /// Gold required for the next upgrade.
    pub next_upgrade_cost: u32,
    /// Cumulative gold spent on the structure.
    pub spent: u32,
    /// Seconds remaining before the structure may attack again.
    pub cooldown: f32,
    /// Type-specific parameters at the current level.
    pub stats: StructureStats,
}

impl StructureSnapshot {
    /// Reports whether the structure's attack cooldown has elapsed.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.cooldown <= 0.0
    }
}

/// Read-only snapshot describing all structures in deterministic scan order.
///
/// Grid structures come first in column-major order, followed by the base
/// stack from bottom to top.
#[derive(Clone, Debug, Default)]
pub struct StructureView {
    snapshots: Vec<StructureSnapshot>,
}

impl StructureView {
    /// Creates a new structure view from snapshots already in scan order.
    #[must_use]
    pub fn from_snapshots(snapshots: Vec<StructureSnapshot>) -> Self {
        Self { snapshots }
    }

    /// Iterator over the captured structure snapshots in scan order.
    pub fn iter(&self) -> impl Iterator<Item = &StructureSnapshot> {
        self.snapshots.iter()
    }

    /// Finds the snapshot for the provided structure.
    #[must_use]
    pub fn get(&self, id: StructureId) -> Option<&StructureSnapshot> {
        self.snapshots.iter().find(|snapshot| snapshot.id == id)
    }

    /// Number of captured structures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no structures.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<StructureSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Archetype of the enemy.
    pub kind: EnemyKind,
    /// Pixel-space position of the enemy.
    pub position: Vec2,
    /// Current health.
    pub health: f32,
    /// Maximum health.
    pub max_health: f32,
    /// Speed multiplier currently applied by slow effects.
    pub slow_factor: f32,
}

/// Read-only snapshot describing all enemies in spawn order.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from snapshots already in spawn order.
    #[must_use]
    pub fn from_snapshots(snapshots: Vec<EnemySnapshot>) -> Self {
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Number of live enemies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no enemies are alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier assigned to the projectile.
    pub id: ProjectileId,
    /// Side that fired the projectile.
    pub allegiance: Allegiance,
    /// Pixel-space position.
    pub position: Vec2,
    /// Velocity measured in tiles per second.
    pub velocity: Vec2,
    /// Damage applied on hit.
    pub damage: u32,
    /// Seconds of flight remaining.
    pub remaining_life: f32,
    /// Slow multiplier applied on hit, if any.
    pub slow_factor: Option<f32>,
}

/// Read-only snapshot describing every projectile in flight.
#[derive(Clone, Debug, Default)]
pub struct ProjectileView {
    snapshots: Vec<ProjectileSnapshot>,
}

impl ProjectileView {
    /// Creates a new projectile view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(snapshots: Vec<ProjectileSnapshot>) -> Self {
        Self { snapshots }
    }

    /// Iterator over the captured projectiles, friendly first.
    pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots.iter()
    }

    /// Iterator over the projectiles fired by the provided side.
    pub fn by_allegiance(
        &self,
        allegiance: Allegiance,
    ) -> impl Iterator<Item = &ProjectileSnapshot> {
        self.snapshots
            .iter()
            .filter(move |snapshot| snapshot.allegiance == allegiance)
    }

    /// Number of projectiles in flight.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no projectiles are in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Read-only view into the flow field's dense distance grid.
#[derive(Clone, Copy, Debug)]
pub struct FlowFieldView<'a> {
    distances: &'a [u16],
    columns: u32,
    rows: u32,
}

impl<'a> FlowFieldView<'a> {
    /// Captures a new flow field view backed by row-major distances.
    #[must_use]
    pub fn new(distances: &'a [u16], columns: u32, rows: u32) -> Self {
        Self {
            distances,
            columns,
            rows,
        }
    }

    /// Distance to the base for the provided cell, if it lies within the field.
    ///
    /// Unreachable cells report [`UNREACHABLE`].
    #[must_use]
    pub fn distance(&self, cell: CellCoord) -> Option<u16> {
        if cell.column() >= self.columns || cell.row() >= self.rows {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        self.distances.get(row * width + column).copied()
    }

    /// Reports whether a path to the base exists from the provided cell.
    #[must_use]
    pub fn is_reachable(&self, cell: CellCoord) -> bool {
        self.distance(cell)
            .map_or(false, |distance| distance != UNREACHABLE)
    }

    /// Dense distances stored in row-major order.
    #[must_use]
    pub fn cells(&self) -> &'a [u16] {
        self.distances
    }

    /// Provides the dimensions of the field.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }
}

/// Attack assignment computed for a single turret or tesla.
#[derive(Clone, Debug, PartialEq)]
pub struct StructureTarget {
    /// Structure the assignment belongs to.
    pub structure: StructureId,
    /// Kind of the attacking structure.
    pub kind: StructureKind,
    /// Enemies to strike, nearest first. Turrets carry exactly one entry.
    pub targets: Vec<EnemyId>,
}

/// Outcome a place-or-upgrade request would produce if submitted now.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementAction {
    /// A new structure would be built.
    Build,
    /// An existing structure of the same kind would gain a level.
    Upgrade,
}

/// Result of validating a place-or-upgrade request without applying it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PlacementPreview {
    /// Type of structure requested.
    pub kind: StructureKind,
    /// Target cell of the request.
    pub cell: CellCoord,
    /// Action the request would perform.
    pub action: PlacementAction,
    /// Gold the request would deduct.
    pub cost: u32,
}

/// Reasons a place-or-upgrade request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// The match is not running, so building is disabled.
    #[error("the match is not running")]
    NotPlaying,
    /// The requested cell lies outside the grid.
    #[error("cell lies outside the grid")]
    OutOfBounds,
    /// Walls may never be stacked on the base.
    #[error("the base cannot be walled")]
    CannotWallBase,
    /// The structure kind cannot be built on this tile.
    #[error("terrain does not support this structure")]
    InvalidTerrain,
    /// The live count of a capped kind already equals its cap.
    #[error("placement cap reached")]
    CapReached,
    /// The player cannot afford the build or upgrade.
    #[error("insufficient gold")]
    InsufficientGold,
    /// The cell holds a structure of a different kind.
    #[error("cell is occupied by a different structure")]
    Occupied,
}

/// Reasons a removal request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum RemovalError {
    /// The match is not running, so removal is disabled.
    #[error("the match is not running")]
    NotPlaying,
    /// The requested cell lies outside the grid.
    #[error("cell lies outside the grid")]
    OutOfBounds,
    /// No structure occupies the cell.
    #[error("no structure to remove")]
    Empty,
}
