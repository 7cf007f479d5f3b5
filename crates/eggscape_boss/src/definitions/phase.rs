//! Phase definitions and the phase transition rule.

use serde::{Deserialize, Serialize};

use super::AttackDefinition;

/// One behavioral stage of the encounter.
///
/// `health_threshold` / `time_limit` = 0 → условие не используется.
/// Последняя фаза терминальная: её условия игнорируются.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseDefinition {
    pub name: String,
    pub attacks: Vec<AttackDefinition>,
    /// Inter-attack delay range (seconds)
    pub min_delay: f32,
    pub max_delay: f32,
    /// Advance when health fraction ≤ this value
    #[serde(default)]
    pub health_threshold: f32,
    /// Advance when phase-local elapsed ≥ this value (seconds)
    #[serde(default)]
    pub time_limit: f32,
}

impl PhaseDefinition {
    pub fn new(name: impl Into<String>, attacks: Vec<AttackDefinition>) -> Self {
        Self {
            name: name.into(),
            attacks,
            min_delay: 1.0,
            max_delay: 2.0,
            health_threshold: 0.0,
            time_limit: 0.0,
        }
    }

    pub fn with_delay(mut self, min_delay: f32, max_delay: f32) -> Self {
        self.min_delay = min_delay;
        self.max_delay = max_delay;
        self
    }

    pub fn until_health(mut self, threshold: f32) -> Self {
        self.health_threshold = threshold;
        self
    }

    pub fn until_elapsed(mut self, time_limit: f32) -> Self {
        self.time_limit = time_limit;
        self
    }

    pub fn has_exit_condition(&self) -> bool {
        self.health_threshold > 0.0 || self.time_limit > 0.0
    }

    /// Phase transition rule, evaluated once per tick.
    ///
    /// Fires iff (fraction ≤ threshold AND threshold > 0) OR
    /// (elapsed ≥ limit AND limit > 0). Never on the terminal phase.
    pub fn transition_due(&self, is_terminal: bool, health_fraction: f32, phase_elapsed: f32) -> bool {
        if is_terminal {
            return false;
        }

        let by_health = self.health_threshold > 0.0 && health_fraction <= self.health_threshold;
        let by_time = self.time_limit > 0.0 && phase_elapsed >= self.time_limit;

        by_health || by_time
    }
}
