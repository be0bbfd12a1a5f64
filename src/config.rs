use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::Player;

pub const DEFAULT_MAX_DEPTH: u8 = 4;
pub const DEFAULT_TIME_LIMIT_MS: u64 = 4500;

/// Search limits for the computer player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Plies searched from the root, counting the root move itself.
    pub max_depth: u8,
    /// Wall-clock budget measured from the start of the root search.
    pub time_limit_ms: u64,
}

impl SearchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::ZeroDepth);
        }
        Ok(())
    }

    pub fn time_limit(&self) -> Duration {
        Duration::from_millis(self.time_limit_ms)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            time_limit_ms: DEFAULT_TIME_LIMIT_MS,
        }
    }
}

/// Seat assignment plus search limits for a new game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Color played by the human. The computer takes the other one.
    pub human: Player,
    pub search: SearchConfig,
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.search.validate()
    }

    pub fn computer(&self) -> Player {
        self.human.opponent()
    }
}
