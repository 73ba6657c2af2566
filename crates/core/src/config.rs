//! Tunable simulation and bot parameters.
//!
//! Every field has a default, so a TOML file only needs to name what it overrides.
//! Durations are stored as whole milliseconds to keep the file format readable and the
//! simulation free of float drift.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::flee::FleeSettings;
use crate::grid::WorldPos;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub seed: u64,
    pub tick_ms: u32,
    /// Time the discrete motion stand-in needs to cross one cell.
    pub step_interval_ms: u32,
    pub motion: MotionMode,
    pub cell_size: f32,
    pub origin: WorldPos,
    pub device: DeviceConfig,
    pub bot: BotConfig,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionMode {
    /// Agents hop one cell per `step_interval_ms` along their path queue.
    Discrete,
    /// The host engine moves agents and reports positions back.
    External,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub fuse_ms: u32,
    pub blast_radius: u32,
    pub blast_window_ms: u32,
    pub capacity: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub threat_poll_interval_ms: u32,
    pub repath_interval_ms: u32,
    pub flee_search_radius: u32,
    pub flee_safety_margin_ms: u32,
    /// Extra cells added to every blast arm when judging whether a flee target is safe.
    pub blast_margin: u32,
    pub soft_obstacle_cost: u32,
    pub strike_distance: u32,
    pub item_search_radius: u32,
    /// Opponents farther than this Manhattan distance are ignored. `None` sees the whole arena.
    pub target_search_radius: Option<u32>,
    pub stuck_timeout_ms: u32,
    pub target_policy: TargetPolicy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetPolicy {
    Nearest,
    RandomSwitch { interval_ms: u32 },
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            tick_ms: 50,
            step_interval_ms: 200,
            motion: MotionMode::Discrete,
            cell_size: 1.0,
            origin: WorldPos::default(),
            device: DeviceConfig::default(),
            bot: BotConfig::default(),
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self { fuse_ms: 2000, blast_radius: 2, blast_window_ms: 1000, capacity: 1 }
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            threat_poll_interval_ms: 100,
            repath_interval_ms: 250,
            flee_search_radius: 8,
            flee_safety_margin_ms: 250,
            blast_margin: 0,
            soft_obstacle_cost: 8,
            strike_distance: 1,
            item_search_radius: 8,
            target_search_radius: None,
            stuck_timeout_ms: 1500,
            target_policy: TargetPolicy::Nearest,
        }
    }
}

impl ArenaConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("tick_ms", self.tick_ms)?;
        require_positive("step_interval_ms", self.step_interval_ms)?;
        require_positive("device.fuse_ms", self.device.fuse_ms)?;
        require_positive("device.blast_radius", self.device.blast_radius)?;
        require_positive("device.blast_window_ms", self.device.blast_window_ms)?;
        require_positive("device.capacity", self.device.capacity)?;
        require_positive("bot.threat_poll_interval_ms", self.bot.threat_poll_interval_ms)?;
        require_positive("bot.repath_interval_ms", self.bot.repath_interval_ms)?;
        require_positive("bot.flee_search_radius", self.bot.flee_search_radius)?;
        require_positive("bot.soft_obstacle_cost", self.bot.soft_obstacle_cost)?;
        require_positive("bot.strike_distance", self.bot.strike_distance)?;
        if let TargetPolicy::RandomSwitch { interval_ms } = self.bot.target_policy {
            require_positive("bot.target_policy.interval_ms", interval_ms)?;
        }
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(ConfigError::Invalid {
                field: "cell_size",
                reason: format!("must be a positive finite number, got {}", self.cell_size),
            });
        }
        if !(self.origin.x.is_finite() && self.origin.y.is_finite()) {
            return Err(ConfigError::Invalid {
                field: "origin",
                reason: "coordinates must be finite".to_string(),
            });
        }
        Ok(())
    }

    pub fn tick(&self) -> Duration {
        millis(self.tick_ms)
    }

    pub fn step_interval(&self) -> Duration {
        millis(self.step_interval_ms)
    }
}

impl DeviceConfig {
    pub fn fuse(&self) -> Duration {
        millis(self.fuse_ms)
    }

    pub fn blast_window(&self) -> Duration {
        millis(self.blast_window_ms)
    }
}

impl BotConfig {
    pub fn flee_settings(&self) -> FleeSettings {
        FleeSettings { search_radius: self.flee_search_radius, blast_margin: self.blast_margin }
    }

    pub fn threat_poll_interval(&self) -> Duration {
        millis(self.threat_poll_interval_ms)
    }

    pub fn repath_interval(&self) -> Duration {
        millis(self.repath_interval_ms)
    }

    pub fn flee_safety_margin(&self) -> Duration {
        millis(self.flee_safety_margin_ms)
    }

    pub fn stuck_timeout(&self) -> Duration {
        millis(self.stuck_timeout_ms)
    }
}

fn millis(value: u32) -> Duration {
    Duration::from_millis(u64::from(value))
}

fn require_positive(field: &'static str, value: u32) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Invalid { field, reason: "must be greater than zero".to_string() });
    }
    Ok(())
}
