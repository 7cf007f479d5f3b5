//! Configuration and loading errors.

use thiserror::Error;

/// Problems found in an authored encounter.
///
/// Ни одна не паникует: fatal → босс остаётся Idle, остальные → warning.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("encounter has no phases")]
    NoPhases,

    #[error("max health must be positive (got {0})")]
    NonPositiveHealth(f32),

    #[error("phase '{phase}' has no attacks")]
    EmptyAttackPool { phase: String },

    #[error("phase '{phase}' has a non-finite delay bound [{min}, {max}]")]
    NonFiniteDelay { phase: String, min: f32, max: f32 },

    #[error("phase '{phase}' has inverted delay range [{min}, {max}]")]
    InvertedDelay { phase: String, min: f32, max: f32 },

    #[error("terminal phase '{phase}' has an exit condition that will never fire")]
    TerminalExitCondition { phase: String },

    #[error("attack '{attack}' has non-positive fire rate")]
    InvalidFireRate { attack: String },

    #[error("attack '{attack}' has negative timing")]
    NegativeTiming { attack: String },
}

impl ConfigError {
    /// Fatal errors leave the encounter idle.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ConfigError::NoPhases | ConfigError::NonPositiveHealth(_))
    }
}

/// Failure to load an encounter file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read encounter config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse encounter config: {0}")]
    Json(#[from] serde_json::Error),
}
