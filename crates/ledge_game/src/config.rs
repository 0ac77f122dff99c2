//! Game tunables loaded from an optional JSON file.
//!
//! Every field has a default, so a config file only needs to name what it
//! overrides: `{ "seed": 7, "player": { "max_jumps": 2 } }`.

use crate::camera::DEFAULT_CAMERA_LAG;
use crate::enemy::EnemyConfig;
use crate::physics::PhysicsConfig;
use crate::player::PlayerConfig;
use ledge_core::time::DEFAULT_TICK_HZ;
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config JSON {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("config validation failed: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub tick_hz: u32,
    /// Seed for enemy wandering; equal seeds and inputs give equal runs.
    pub seed: u64,
    pub viewport: [u32; 2],
    pub camera_lag: f32,
    pub physics: PhysicsConfig,
    pub player: PlayerConfig,
    pub enemy: EnemyConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tick_hz: DEFAULT_TICK_HZ,
            seed: 0,
            viewport: [320, 240],
            camera_lag: DEFAULT_CAMERA_LAG,
            physics: PhysicsConfig::default(),
            player: PlayerConfig::default(),
            enemy: EnemyConfig::default(),
        }
    }
}

/// Load and validate a config file. A missing file yields the defaults.
pub fn load_config_from_path(path: &Path) -> Result<GameConfig, ConfigError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(source) if source.kind() == ErrorKind::NotFound => {
            log::info!("No config at {}, using defaults", path.display());
            return Ok(GameConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    let config: GameConfig = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &GameConfig) -> Result<(), ConfigError> {
    if config.tick_hz == 0 {
        return Err(ConfigError::Invalid("tick_hz must be > 0".to_string()));
    }
    if config.viewport.contains(&0) {
        return Err(ConfigError::Invalid(format!(
            "viewport must be non-empty, got {}x{}",
            config.viewport[0], config.viewport[1]
        )));
    }
    if config.camera_lag < 1.0 {
        return Err(ConfigError::Invalid("camera_lag must be >= 1".to_string()));
    }
    if config.physics.terminal_velocity <= 0.0 {
        return Err(ConfigError::Invalid(
            "physics.terminal_velocity must be > 0".to_string(),
        ));
    }

    let player = &config.player;
    if player.dash_active < 0 || player.dash_active >= player.dash_duration {
        return Err(ConfigError::Invalid(format!(
            "player dash needs 0 <= dash_active ({}) < dash_duration ({})",
            player.dash_active, player.dash_duration
        )));
    }
    for (name, [w, h]) in [("player", player.size), ("enemy", config.enemy.size)] {
        if w <= 0.0 || h <= 0.0 {
            return Err(ConfigError::Invalid(format!("{name}.size must be positive")));
        }
    }

    let enemy = &config.enemy;
    if !(0.0..=1.0).contains(&enemy.walk_chance) {
        return Err(ConfigError::Invalid(format!(
            "enemy.walk_chance must be within 0..=1, got {}",
            enemy.walk_chance
        )));
    }
    if enemy.walk_min_ticks == 0 || enemy.walk_min_ticks > enemy.walk_max_ticks {
        return Err(ConfigError::Invalid(format!(
            "enemy walk range {}..={} is empty",
            enemy.walk_min_ticks, enemy.walk_max_ticks
        )));
    }
    Ok(())
}
