//! Coordinator configuration

use std::path::Path;
use std::time::Duration;

use arcade_infra_common::config::{load_toml_file, parse_toml_str};
use arcade_session_core::{BuiltinGames, GameKind, RegistryConfig, TableRules};
use serde::{Deserialize, Serialize};

use crate::errors::{CoordinatorError, Result};

/// Seat limits for one game kind, added to or overriding the built-in kinds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRulesConfig {
    pub kind: GameKind,
    pub min_players: usize,
    pub max_players: usize,
}

/// Configuration for the coordinator and the sessions it schedules.
///
/// Every field has a default, so an empty TOML document is a valid config:
///
/// ```toml
/// call_timeout_ms = 2000
/// stop_sessions_on_shutdown = true
///
/// [[games]]
/// kind = "trio"
/// min_players = 3
/// max_players = 3
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Upper bound for every call to a session or the registry
    pub call_timeout_ms: u64,
    pub command_channel_capacity: usize,
    pub event_channel_capacity: usize,
    pub session_mailbox_capacity: usize,
    /// Fresh identifiers tried when the registry reports a collision
    pub id_generation_attempts: u32,
    /// Stop every scheduled session when the coordinator shuts down
    pub stop_sessions_on_shutdown: bool,
    pub games: Vec<GameRulesConfig>,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            call_timeout_ms: 5000,
            command_channel_capacity: 256,
            event_channel_capacity: 1024,
            session_mailbox_capacity: 64,
            id_generation_attempts: 8,
            stop_sessions_on_shutdown: true,
            games: Vec::new(),
        }
    }
}

impl CoordinatorConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = parse_toml_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let config: Self = load_toml_file(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.call_timeout_ms == 0 {
            return Err(CoordinatorError::Config("call_timeout_ms must be greater than 0".into()));
        }
        for (name, value) in [
            ("command_channel_capacity", self.command_channel_capacity),
            ("event_channel_capacity", self.event_channel_capacity),
            ("session_mailbox_capacity", self.session_mailbox_capacity),
        ] {
            if value == 0 {
                return Err(CoordinatorError::Config(format!("{name} must be greater than 0")));
            }
        }
        if self.id_generation_attempts == 0 {
            return Err(CoordinatorError::Config(
                "id_generation_attempts must be greater than 0".into(),
            ));
        }
        for game in &self.games {
            if game.min_players == 0 || game.min_players > game.max_players {
                return Err(CoordinatorError::Config(format!(
                    "game '{}' needs 1 <= min_players <= max_players (got {}..={})",
                    game.kind, game.min_players, game.max_players
                )));
            }
        }
        Ok(())
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    /// Settings for a session registry matching this config
    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig {
            call_timeout: self.call_timeout(),
            mailbox_capacity: self.session_mailbox_capacity,
            ..RegistryConfig::default()
        }
    }

    /// Built-in games plus the configured kinds
    pub fn game_factory(&self) -> BuiltinGames {
        self.games.iter().fold(BuiltinGames::new(), |games, game| {
            games.with_rules(
                game.kind.clone(),
                TableRules::new(game.min_players, game.max_players),
            )
        })
    }
}
