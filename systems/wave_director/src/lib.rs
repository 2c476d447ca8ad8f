#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic wave director responsible for emitting enemy spawn commands.
//!
//! The director counts down to each wave, spawns the wave's quota on a fixed
//! cadence along the grid edges and, once the quota is out and the field is
//! clear, asks the world to advance to the next wave.

use std::time::Duration;

use bastion_defence_core::{CellCoord, Command, EnemyKind, EnemyStats, Event, TileGrid};
use rand::{distributions::WeightedIndex, prelude::Distribution, Rng, SeedableRng};

pub use rand::distributions::WeightedError;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};

const SPAWN_INTERVAL_FLOOR: f32 = 0.25;
const BOSS_WAVE_PERIOD: u32 = 3;
const WEIGHTED_KINDS: [(EnemyKind, u32); 4] = [
    (EnemyKind::Grunt, 55),
    (EnemyKind::Scout, 17),
    (EnemyKind::Tank, 18),
    (EnemyKind::Shooter, 10),
];

/// Configuration parameters required to construct the wave director.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    first_wave_delay: Duration,
    wave_interval: Duration,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided countdowns and seed.
    #[must_use]
    pub const fn new(first_wave_delay: Duration, wave_interval: Duration, rng_seed: u64) -> Self {
        Self {
            first_wave_delay,
            wave_interval,
            rng_seed,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Duration::from_secs(8), Duration::from_secs(10), 42)
    }
}

/// Wave-level facts the director needs from the world each tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveStatus {
    /// Number of the active wave, starting at one.
    pub wave: u32,
    /// Number of enemies currently alive.
    pub live_enemies: usize,
}

/// Base statistics and schedule of a single wave before per-kind scaling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaveParameters {
    /// Base enemy health.
    pub health: f32,
    /// Base enemy speed in pixels per reference tick.
    pub speed: f32,
    /// Base enemy damage per second.
    pub damage_per_second: f32,
    /// Number of enemies spawned during the wave.
    pub count: u32,
    /// Seconds between consecutive spawns.
    pub spawn_interval: f32,
}

impl WaveParameters {
    /// Derives the parameters of the provided wave.
    #[must_use]
    pub fn for_wave(wave: u32) -> Self {
        let w = wave as f32;
        Self {
            health: 24.0 + 6.0 * w,
            speed: 1.6 + 0.06 * w,
            damage_per_second: 10.0 + 2.0 * w,
            count: 8 + 2 * wave,
            spawn_interval: (0.8 - 0.02 * w).max(SPAWN_INTERVAL_FLOOR),
        }
    }
}

/// Computes the fully scaled statistics of an enemy spawned during `wave`.
///
/// Health and damage grow by 12% per wave after the first, speed by 3%.
#[must_use]
pub fn enemy_stats(kind: EnemyKind, wave: u32) -> EnemyStats {
    let parameters = WaveParameters::for_wave(wave);
    let elapsed_waves = wave.saturating_sub(1) as f32;
    let growth = 1.0 + 0.12 * elapsed_waves;
    let speed_growth = 1.0 + 0.03 * elapsed_waves;
    EnemyStats::new(
        parameters.health * kind.health_multiplier() * growth,
        parameters.speed * kind.speed_multiplier() * speed_growth,
        parameters.damage_per_second * kind.damage_multiplier() * growth,
    )
}

/// Pure system that deterministically schedules waves and spawns.
#[derive(Debug)]
pub struct WaveDirector {
    config: Config,
    countdown: f32,
    spawn_cooldown: f32,
    spawned: u32,
    rng: ChaCha8Rng,
    kinds: WeightedIndex<u32>,
}

impl WaveDirector {
    /// Creates a new wave director using the supplied configuration.
    pub fn new(config: Config) -> Result<Self, WeightedError> {
        let kinds = WeightedIndex::new(WEIGHTED_KINDS.iter().map(|(_, weight)| *weight))?;
        Ok(Self {
            countdown: config.first_wave_delay.as_secs_f32(),
            spawn_cooldown: 0.0,
            spawned: 0,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            kinds,
            config,
        })
    }

    /// Rewinds to the first-wave countdown and reseeds the kind draw.
    pub fn restart(&mut self) {
        self.countdown = self.config.first_wave_delay.as_secs_f32();
        self.spawn_cooldown = 0.0;
        self.spawned = 0;
        self.rng = ChaCha8Rng::seed_from_u64(self.config.rng_seed);
    }

    /// Time remaining before the current wave starts spawning.
    #[must_use]
    pub fn countdown(&self) -> Duration {
        Duration::from_secs_f32(self.countdown.max(0.0))
    }

    /// Number of enemies spawned so far in the current wave.
    #[must_use]
    pub fn spawned(&self) -> u32 {
        self.spawned
    }

    /// Consumes time events and the world's wave status to emit wave commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        status: WaveStatus,
        grid: &TileGrid,
        out: &mut Vec<Command>,
    ) {
        let elapsed: f32 = events
            .iter()
            .filter_map(|event| match event {
                Event::TimeAdvanced { dt } => Some(dt.as_secs_f32()),
                _ => None,
            })
            .sum();
        if elapsed <= 0.0 {
            return;
        }

        self.countdown -= elapsed;
        if self.countdown > 0.0 {
            return;
        }

        let parameters = WaveParameters::for_wave(status.wave);
        if self.spawned < parameters.count {
            self.spawn_cooldown -= elapsed;
            if self.spawn_cooldown <= 0.0 {
                let kind = self.select_kind(status.wave);
                let cell = self.select_edge_cell(grid);
                trace!(wave = status.wave, ?kind, ?cell, "spawning enemy");
                out.push(Command::SpawnEnemy {
                    kind,
                    cell,
                    stats: enemy_stats(kind, status.wave),
                });
                self.spawned += 1;
                self.spawn_cooldown = parameters.spawn_interval;
            }
        } else if status.live_enemies == 0 {
            debug!(wave = status.wave, "wave cleared");
            out.push(Command::AdvanceWave);
            self.countdown = self.config.wave_interval.as_secs_f32();
            self.spawned = 0;
        }
    }

    fn select_edge_cell(&mut self, grid: &TileGrid) -> CellCoord {
        let columns = grid.columns().get().max(1);
        let rows = grid.rows().get().max(1);
        match self.rng.gen_range(0..4) {
            0 => CellCoord::new(self.rng.gen_range(0..columns), 0),
            1 => CellCoord::new(self.rng.gen_range(0..columns), rows - 1),
            2 => CellCoord::new(0, self.rng.gen_range(0..rows)),
            _ => CellCoord::new(columns - 1, self.rng.gen_range(0..rows)),
        }
    }

    fn select_kind(&mut self, wave: u32) -> EnemyKind {
        if wave % BOSS_WAVE_PERIOD == 0 && self.spawned == 0 {
            return EnemyKind::Boss;
        }
        WEIGHTED_KINDS[self.kinds.sample(&mut self.rng)].0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bastion_defence_core::TileCoord;

    const DT: Duration = Duration::from_nanos(16_666_667);

    fn director(config: Config) -> WaveDirector {
        WaveDirector::new(config).expect("valid kind weights")
    }

    fn grid() -> TileGrid {
        TileGrid::new(TileCoord::new(20), TileCoord::new(12), 40.0)
    }

    fn tick(director: &mut WaveDirector, status: WaveStatus, dt: Duration) -> Vec<Command> {
        let mut out = Vec::new();
        director.handle(&[Event::TimeAdvanced { dt }], status, &grid(), &mut out);
        out
    }

    #[test]
    fn wave_parameters_follow_formulas() {
        let first = WaveParameters::for_wave(1);
        assert_eq!(first.count, 10);
        assert_eq!(first.health, 30.0);
        assert!((first.spawn_interval - 0.78).abs() < 1e-6);
        assert_eq!(WaveParameters::for_wave(40).spawn_interval, 0.25);
    }

    #[test]
    fn counts_grow_and_intervals_shrink_with_waves() {
        for wave in 1..50 {
            let current = WaveParameters::for_wave(wave);
            let next = WaveParameters::for_wave(wave + 1);
            assert!(next.count > current.count);
            assert!(next.spawn_interval <= current.spawn_interval);
            assert!(next.spawn_interval >= SPAWN_INTERVAL_FLOOR);
        }
    }

    #[test]
    fn enemy_stats_apply_kind_and_wave_scaling() {
        let grunt = enemy_stats(EnemyKind::Grunt, 1);
        assert_eq!(grunt.health, 30.0);
        assert!((grunt.speed - 1.66).abs() < 1e-5);
        assert_eq!(grunt.damage_per_second, 12.0);

        let tank = enemy_stats(EnemyKind::Tank, 3);
        assert!((tank.health - 42.0 * 2.8 * 1.24).abs() < 1e-3);
        assert!((tank.speed - 1.78 * 0.55 * 1.06).abs() < 1e-4);
        assert!((tank.damage_per_second - 16.0 * 1.2 * 1.24).abs() < 1e-3);
    }

    #[test]
    fn nothing_spawns_during_the_countdown() {
        let mut director = director(Config::default());
        let status = WaveStatus { wave: 1, live_enemies: 0 };
        let out = tick(&mut director, status, Duration::from_secs(7));
        assert!(out.is_empty());
        assert!(director.countdown() > Duration::ZERO);
    }

    #[test]
    fn first_spawn_follows_the_countdown() {
        let mut director = director(Config::default());
        let status = WaveStatus { wave: 1, live_enemies: 0 };
        let out = tick(&mut director, status, Duration::from_secs(8));
        assert!(matches!(out.as_slice(), [Command::SpawnEnemy { .. }]));
        assert_eq!(director.spawned(), 1);
    }

    #[test]
    fn spawns_land_on_grid_edges() {
        let mut director = director(Config::new(Duration::ZERO, Duration::ZERO, 5));
        let status = WaveStatus { wave: 20, live_enemies: 0 };
        for _ in 0..200 {
            for command in tick(&mut director, status, Duration::from_secs(1)) {
                if let Command::SpawnEnemy { cell, .. } = command {
                    let on_edge = cell.column() == 0
                        || cell.row() == 0
                        || cell.column() == 19
                        || cell.row() == 11;
                    assert!(on_edge, "{cell:?} is not on an edge");
                }
            }
        }
    }

    #[test]
    fn third_wave_opens_with_a_boss() {
        let mut director = director(Config::new(Duration::ZERO, Duration::ZERO, 1));
        let status = WaveStatus { wave: 3, live_enemies: 0 };
        let out = tick(&mut director, status, DT);
        assert!(matches!(
            out.as_slice(),
            [Command::SpawnEnemy { kind: EnemyKind::Boss, .. }]
        ));

        let later: Vec<Command> = (0..200)
            .flat_map(|_| tick(&mut director, status, DT))
            .collect();
        assert!(later
            .iter()
            .all(|command| !matches!(command, Command::SpawnEnemy { kind: EnemyKind::Boss, .. })));
    }

    #[test]
    fn wave_advances_only_once_the_field_is_clear() {
        let mut director = director(Config::new(Duration::ZERO, Duration::from_secs(10), 3));
        let busy = WaveStatus { wave: 1, live_enemies: 4 };
        let mut spawned = 0;
        for _ in 0..20 {
            spawned += tick(&mut director, busy, Duration::from_secs(1)).len();
        }
        assert_eq!(spawned, 10);
        assert!(tick(&mut director, busy, Duration::from_secs(1)).is_empty());

        let clear = WaveStatus { wave: 1, live_enemies: 0 };
        assert_eq!(tick(&mut director, clear, DT), vec![Command::AdvanceWave]);
        assert_eq!(director.spawned(), 0);
        assert!(director.countdown() > Duration::from_secs(9));
    }

    #[test]
    fn identical_seeds_produce_identical_schedules() {
        let status = WaveStatus { wave: 2, live_enemies: 1 };
        let mut first = director(Config::default());
        let mut second = director(Config::default());
        for _ in 0..1200 {
            assert_eq!(
                tick(&mut first, status, DT),
                tick(&mut second, status, DT)
            );
        }
    }

    #[test]
    fn restart_replays_the_opening_schedule() {
        let status = WaveStatus { wave: 2, live_enemies: 1 };
        let mut director = director(Config::new(Duration::from_secs(1), Duration::ZERO, 11));
        let opening: Vec<Command> = (0..600)
            .flat_map(|_| tick(&mut director, status, DT))
            .collect();
        assert!(!opening.is_empty());

        director.restart();
        assert_eq!(director.spawned(), 0);
        assert!(director.countdown() > Duration::from_millis(900));
        let replay: Vec<Command> = (0..600)
            .flat_map(|_| tick(&mut director, status, DT))
            .collect();
        assert_eq!(replay, opening);
    }
}
