use std::{fs, path::Path, time::Duration};

use anyhow::{ensure, Context, Result};
use bastion_defence_core::{CellCoord, StructureKind};
use bastion_defence_simulation::{SimulationConfig, WaveConfig};
use bastion_defence_system_bootstrap::BootstrapConfig;
use serde::Deserialize;

/// Headless run description loaded from TOML.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Scenario {
    pub(crate) ticks: u32,
    pub(crate) tick_rate: f32,
    pub(crate) bootstrap: BootstrapConfig,
    pub(crate) waves: WaveConfig,
    pub(crate) build: Vec<BuildOrder>,
}

/// Structure requested at a given tick of the run.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct BuildOrder {
    pub(crate) column: u32,
    pub(crate) row: u32,
    pub(crate) kind: StructureKind,
    #[serde(default)]
    pub(crate) at_tick: u32,
}

impl BuildOrder {
    pub(crate) fn cell(&self) -> CellCoord {
        CellCoord::new(self.column, self.row)
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            ticks: 60 * 90,
            tick_rate: 60.0,
            bootstrap: BootstrapConfig::default(),
            waves: WaveConfig::default(),
            build: Vec::new(),
        }
    }
}

impl Scenario {
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid scenario {}", path.display()))
    }

    pub(crate) fn parse(text: &str) -> Result<Self> {
        let scenario: Self = toml::from_str(text).context("failed to parse TOML")?;
        ensure!(
            scenario.tick_rate.is_finite() && scenario.tick_rate > 0.0,
            "tick_rate must be positive, got {}",
            scenario.tick_rate
        );
        Ok(scenario)
    }

    pub(crate) fn with_seed(mut self, seed: u64) -> Self {
        self.bootstrap.seed = seed;
        self.waves.seed = seed;
        self
    }

    pub(crate) fn tick_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.tick_rate))
    }

    pub(crate) fn simulation_config(&self) -> SimulationConfig {
        SimulationConfig {
            bootstrap: self.bootstrap.clone(),
            waves: self.waves.clone(),
        }
    }

    pub(crate) fn orders_at(&self, tick: u32) -> impl Iterator<Item = &BuildOrder> {
        self.build.iter().filter(move |order| order.at_tick == tick)
    }
}
