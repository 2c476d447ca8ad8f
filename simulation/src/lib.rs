#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-step Bastion Defence simulation driving the world and its systems.
//!
//! [`Simulation`] is the surface a presentation layer talks to. It owns the
//! authoritative [`World`], routes player intents into world commands and runs
//! every system in a fixed order on each [`Simulation::tick`]:
//!
//! 1. structures cool down, miners and healers act,
//! 2. the wave director spawns enemies or advances the wave,
//! 3. ready turrets and teslas pick targets and fire,
//! 4. projectiles move and resolve hits,
//! 5. enemies move, fight and shoot.

use std::{fmt, time::Duration};

use bastion_defence_core::{
    CellCoord, Command, Event, PlacementError, RemovalError, StructureId, StructureKind,
    StructureTarget,
};
use bastion_defence_system_bootstrap::{Bootstrap, BootstrapConfig, BootstrapError};
use bastion_defence_system_builder::{Builder, BuilderInput};
use bastion_defence_system_structure_combat::StructureCombat;
use bastion_defence_system_structure_targeting::StructureTargeting;
use bastion_defence_system_wave_director::{
    self as wave_director, WaveDirector, WaveStatus, WeightedError,
};
use bastion_defence_world::{self as world, query, World};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, trace};

/// Lifecycle of a play session as seen by the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// The world is generated but no match is running.
    Menu,
    /// A match is running and ticks advance the world.
    Playing,
    /// A match is suspended; ticks are ignored.
    Paused,
    /// The base fell; ticks are ignored until the next start or reset.
    GameOver,
}

/// Wave timing and randomness settings.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WaveConfig {
    /// Seconds before the first wave of a match starts spawning.
    pub first_wave_delay: f32,
    /// Seconds between a cleared wave and the next one.
    pub wave_interval: f32,
    /// Seed for spawn positions and enemy kinds.
    pub seed: u64,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            first_wave_delay: 8.0,
            wave_interval: 10.0,
            seed: 42,
        }
    }
}

/// Complete configuration of a simulation session.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Map layout.
    pub bootstrap: BootstrapConfig,
    /// Wave timings.
    pub waves: WaveConfig,
}

impl SimulationConfig {
    fn wave_director_config(&self) -> Result<wave_director::Config, SimulationError> {
        let first = seconds(self.waves.first_wave_delay)?;
        let interval = seconds(self.waves.wave_interval)?;
        Ok(wave_director::Config::new(first, interval, self.waves.seed))
    }
}

fn seconds(value: f32) -> Result<Duration, SimulationError> {
    Duration::try_from_secs_f32(value).map_err(|_| SimulationError::InvalidWaveTiming(value))
}

/// Reasons a simulation cannot be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum SimulationError {
    /// The map layout is unusable.
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),
    /// A wave timing is negative or not finite.
    #[error("wave timings must be finite and non-negative, got {0}")]
    InvalidWaveTiming(f32),
    /// The enemy kind weights cannot be sampled.
    #[error("invalid enemy kind weights: {0}")]
    KindWeights(#[from] WeightedError),
}

/// Successful result of a place-or-upgrade request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlacementOutcome {
    /// A new structure was built.
    Built {
        /// Identifier of the new structure.
        structure: StructureId,
        /// Gold paid.
        cost: u32,
    },
    /// An existing structure gained a level.
    Upgraded {
        /// Identifier of the upgraded structure.
        structure: StructureId,
        /// Level reached.
        level: u32,
        /// Gold paid.
        cost: u32,
    },
}

/// Headline figures of a session, suitable for a status line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionSummary {
    /// Current session state.
    pub state: SessionState,
    /// Active wave number.
    pub wave: u32,
    /// Gold available.
    pub gold: f32,
    /// Remaining base health.
    pub base_health: f32,
    /// Enemies currently alive.
    pub live_enemies: usize,
    /// Structures on the grid and the base stack.
    pub structures: usize,
    /// Time before the next wave starts spawning.
    pub wave_countdown: Duration,
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}: wave {} | gold {:.1} | base {:.1} | enemies {} | structures {} | next wave in {:.1}s",
            self.state,
            self.wave,
            self.gold,
            self.base_health,
            self.live_enemies,
            self.structures,
            self.wave_countdown.as_secs_f32(),
        )
    }
}

/// Deterministic tower-defence session.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    state: SessionState,
    wave_director: WaveDirector,
    targeting: StructureTargeting,
    combat: StructureCombat,
    builder: Builder,
    events: Vec<Event>,
    commands: Vec<Command>,
    targets: Vec<StructureTarget>,
}

impl Simulation {
    /// Generates the map described by `config` and waits in [`SessionState::Menu`].
    pub fn new(config: &SimulationConfig) -> Result<Self, SimulationError> {
        let director_config = config.wave_director_config()?;
        let mut commands = Vec::new();
        Bootstrap.generate(&config.bootstrap, &mut commands)?;

        let mut world = World::new();
        let mut events = Vec::new();
        for command in commands {
            world::apply(&mut world, command, &mut events);
        }
        let grid = Bootstrap.tile_grid(&world);
        info!(
            banner = Bootstrap.welcome_banner(&world),
            columns = grid.columns().get(),
            rows = grid.rows().get(),
            width = grid.width(),
            height = grid.height(),
            "map generated"
        );

        Ok(Self {
            world,
            state: SessionState::Menu,
            wave_director: WaveDirector::new(director_config)?,
            targeting: StructureTargeting::new(),
            combat: StructureCombat::new(),
            builder: Builder::new(),
            events,
            commands: Vec::new(),
            targets: Vec::new(),
        })
    }

    /// Starts a fresh match from the menu or after defeat, or resumes a paused one.
    pub fn start(&mut self) {
        match self.state {
            SessionState::Menu | SessionState::GameOver => self.reset(),
            SessionState::Paused => self.state = SessionState::Playing,
            SessionState::Playing => {}
        }
    }

    /// Switches between playing and paused; other states are unaffected.
    pub fn toggle_pause(&mut self) {
        self.state = match self.state {
            SessionState::Playing => SessionState::Paused,
            SessionState::Paused => SessionState::Playing,
            other => other,
        };
        debug!(state = ?self.state, "pause toggled");
    }

    /// Restarts the match on the current terrain and begins playing.
    pub fn reset(&mut self) {
        self.events.clear();
        world::apply(&mut self.world, Command::ResetMatch, &mut self.events);
        self.builder.observe(&self.events);
        self.wave_director.restart();
        self.state = SessionState::Playing;
    }

    /// Current session state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Advances the match by `dt` and returns every event the step produced.
    ///
    /// Outside [`SessionState::Playing`] nothing happens and no events are returned.
    pub fn tick(&mut self, dt: Duration) -> &[Event] {
        self.events.clear();
        if self.state != SessionState::Playing {
            return &self.events;
        }

        trace!("structures");
        world::apply(&mut self.world, Command::Tick { dt }, &mut self.events);

        trace!("waves");
        let status = WaveStatus {
            wave: query::wave(&self.world),
            live_enemies: query::live_enemy_count(&self.world),
        };
        self.wave_director.handle(
            &self.events,
            status,
            query::tile_grid(&self.world),
            &mut self.commands,
        );
        self.flush_commands();

        trace!("structure attacks");
        let structures = query::structure_view(&self.world);
        self.targeting.handle(
            &structures,
            &query::enemy_view(&self.world),
            query::tile_grid(&self.world).tile_length(),
            &mut self.targets,
        );
        self.combat
            .handle(&structures, &self.targets, &mut self.commands);
        self.flush_commands();

        trace!("projectiles");
        world::apply(
            &mut self.world,
            Command::AdvanceProjectiles { dt },
            &mut self.events,
        );

        trace!("enemies");
        world::apply(
            &mut self.world,
            Command::AdvanceEnemies { dt },
            &mut self.events,
        );

        self.builder.observe(&self.events);
        if query::is_game_over(&self.world) {
            self.state = SessionState::GameOver;
        }
        &self.events
    }

    /// Places `kind` at `cell`, or upgrades the same kind already there.
    pub fn request_place(
        &mut self,
        cell: CellCoord,
        kind: StructureKind,
    ) -> Result<PlacementOutcome, PlacementError> {
        if self.state != SessionState::Playing {
            return Err(PlacementError::NotPlaying);
        }
        let first = self.events.len();
        world::apply(
            &mut self.world,
            Command::PlaceOrUpgrade { kind, cell },
            &mut self.events,
        );
        self.events[first..]
            .iter()
            .find_map(|event| match *event {
                Event::StructurePlaced {
                    structure, cost, ..
                } => Some(Ok(PlacementOutcome::Built { structure, cost })),
                Event::StructureUpgraded {
                    structure,
                    level,
                    cost,
                    ..
                } => Some(Ok(PlacementOutcome::Upgraded {
                    structure,
                    level,
                    cost,
                })),
                Event::PlacementRejected { reason, .. } => Some(Err(reason)),
                _ => None,
            })
            .unwrap_or(Err(PlacementError::NotPlaying))
    }

    /// Removes the structure at `cell` and returns the refunded gold.
    pub fn request_remove(&mut self, cell: CellCoord) -> Result<u32, RemovalError> {
        if self.state != SessionState::Playing {
            return Err(RemovalError::NotPlaying);
        }
        let first = self.events.len();
        world::apply(
            &mut self.world,
            Command::RemoveStructure { cell },
            &mut self.events,
        );
        self.events[first..]
            .iter()
            .find_map(|event| match *event {
                Event::StructureRemoved { refund, .. } => Some(Ok(refund)),
                Event::RemovalRejected { reason, .. } => Some(Err(reason)),
                _ => None,
            })
            .unwrap_or(Err(RemovalError::Empty))
    }

    /// Sets the building type used by [`Simulation::handle_input`].
    pub fn select_building_type(&mut self, kind: StructureKind) {
        self.builder.select(kind);
    }

    /// Building type currently selected.
    #[must_use]
    pub fn selected_building_type(&self) -> StructureKind {
        self.builder.selected()
    }

    /// Applies cursor input using the selected building type.
    ///
    /// Returns the events produced by the resulting commands. Rejections are
    /// reported as `PlacementRejected` or `RemovalRejected` events.
    pub fn handle_input(&mut self, input: BuilderInput) -> &[Event] {
        let first = self.events.len();
        if self.state != SessionState::Playing {
            return &self.events[first..];
        }
        self.builder.handle(&[], input, &mut self.commands);
        self.flush_commands();
        &self.events[first..]
    }

    /// Events produced by the latest tick and any requests made since.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Read-only access to the world for use with [`bastion_defence_world::query`].
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Time remaining before the next wave starts spawning.
    #[must_use]
    pub fn wave_countdown(&self) -> Duration {
        self.wave_director.countdown()
    }

    /// Captures the headline figures of the session.
    #[must_use]
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            state: self.state,
            wave: query::wave(&self.world),
            gold: query::gold(&self.world),
            base_health: query::base_health(&self.world),
            live_enemies: query::live_enemy_count(&self.world),
            structures: query::structure_view(&self.world).len(),
            wave_countdown: self.wave_countdown(),
        }
    }

    fn flush_commands(&mut self) {
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }
    }
}
