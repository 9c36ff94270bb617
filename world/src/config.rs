//! Tunable delays for deferred stage transitions.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

const DEFAULT_FAIL_RESET_DELAY: Duration = Duration::from_millis(2_000);
const DEFAULT_CLEAR_ADVANCE_DELAY: Duration = Duration::from_millis(3_000);

/// Timing configuration consumed by the game controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameConfig {
    /// Delay between a failure and the automatic stage reset.
    pub fail_reset_delay: Duration,
    /// Delay between a clear and loading the next stage.
    pub clear_advance_delay: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fail_reset_delay: DEFAULT_FAIL_RESET_DELAY,
            clear_advance_delay: DEFAULT_CLEAR_ADVANCE_DELAY,
        }
    }
}

impl GameConfig {
    /// Parses a TOML document; absent keys keep their defaults.
    ///
    /// ```toml
    /// fail_reset_delay_ms = 2000
    /// clear_advance_delay_ms = 3000
    /// ```
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(contents)?;
        let defaults = Self::default();
        Ok(Self {
            fail_reset_delay: raw
                .fail_reset_delay_ms
                .map_or(defaults.fail_reset_delay, Duration::from_millis),
            clear_advance_delay: raw
                .clear_advance_delay_ms
                .map_or(defaults.clear_advance_delay, Duration::from_millis),
        })
    }
}

/// Configuration document could not be read.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid TOML or has mistyped keys.
    #[error("invalid game configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    fail_reset_delay_ms: Option<u64>,
    clear_advance_delay_ms: Option<u64>,
}
