#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Bastion Defence session.

mod scenario;

use std::path::PathBuf;

use anyhow::{Context, Result};
use bastion_defence_core::{Event, StructureKind};
use bastion_defence_simulation::{SessionState, Simulation};
use bastion_defence_world::{query, World};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::scenario::Scenario;

/// Runs a scripted tower-defence match without a window and prints its outcome.
#[derive(Debug, Parser)]
#[command(name = "bastion-defence", version)]
struct CliArgs {
    /// TOML scenario describing the map, wave timings and build orders.
    #[arg(long, value_name = "PATH")]
    scenario: Option<PathBuf>,
    /// Number of ticks to simulate, overriding the scenario.
    #[arg(long)]
    ticks: Option<u32>,
    /// Seed for terrain and waves, overriding the scenario.
    #[arg(long)]
    seed: Option<u64>,
    /// Log filter such as `info` or `bastion_defence_world=debug`; defaults to `RUST_LOG`.
    #[arg(long, value_name = "FILTER")]
    log_level: Option<String>,
}

#[derive(Debug, Default)]
struct Tally {
    spawned: u32,
    killed: u32,
    bounty: u32,
    destroyed: u32,
    rejected: u32,
}

impl Tally {
    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::EnemySpawned { .. } => self.spawned += 1,
                Event::EnemyKilled { bounty, .. } => {
                    self.killed += 1;
                    self.bounty += bounty;
                }
                Event::StructureDestroyed { .. } => self.destroyed += 1,
                _ => {}
            }
        }
    }
}

/// Entry point for the Bastion Defence command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.log_level.as_deref())?;

    let mut scenario = match &args.scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::default(),
    };
    if let Some(seed) = args.seed {
        scenario = scenario.with_seed(seed);
    }
    if let Some(ticks) = args.ticks {
        scenario.ticks = ticks;
    }

    run(&scenario)
}

fn init_logging(filter: Option<&str>) -> Result<()> {
    let filter = match filter {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid log filter `{directives}`"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|error| anyhow::anyhow!(error))
        .context("failed to install log subscriber")
}

fn run(scenario: &Scenario) -> Result<()> {
    let mut simulation =
        Simulation::new(&scenario.simulation_config()).context("invalid map configuration")?;
    println!("{}", query::welcome_banner(simulation.world()));

    simulation.start();
    let dt = scenario.tick_duration();
    let mut tally = Tally::default();

    for tick in 0..scenario.ticks {
        for order in scenario.orders_at(tick) {
            match simulation.request_place(order.cell(), order.kind) {
                Ok(outcome) => info!(tick, kind = ?order.kind, cell = ?order.cell(), ?outcome, "build order"),
                Err(reason) => {
                    tally.rejected += 1;
                    warn!(tick, kind = ?order.kind, cell = ?order.cell(), %reason, "build order rejected");
                }
            }
        }
        tally.record(simulation.tick(dt));
        if simulation.state() == SessionState::GameOver {
            info!(tick, "base destroyed");
            break;
        }
    }

    println!("{}", simulation.summary());
    println!(
        "spawned {} | killed {} | bounty {} | structures lost {} | rejected orders {}",
        tally.spawned, tally.killed, tally.bounty, tally.destroyed, tally.rejected,
    );
    println!("caps: {}", cap_usage(simulation.world()));
    Ok(())
}

/// Live count against the cap for every capped structure kind.
fn cap_usage(world: &World) -> String {
    StructureKind::ALL
        .iter()
        .filter_map(|kind| {
            kind.placement_cap()
                .map(|cap| format!("{kind:?} {}/{cap}", query::placement_count(world, *kind)))
        })
        .collect::<Vec<_>>()
        .join(" | ")
}
