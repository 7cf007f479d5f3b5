//! Encounter state owned by the state machine.

use bevy::prelude::*;

/// Top-level stage.
///
/// `Idle → Intro → Fighting{0..n} → Dead`
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Default)]
pub enum EncounterStage {
    /// Не начат (или конфиг невалиден)
    #[default]
    Idle,
    /// Invulnerable intro
    Intro { remaining: f32 },
    Fighting { phase: usize },
    /// Terminal
    Dead,
}

/// Mutable encounter state.
///
/// Инвариант: 0 ≤ health ≤ max_health
#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct EncounterState {
    pub stage: EncounterStage,
    /// Seconds since the current phase started
    pub phase_elapsed: f32,
    pub health: f32,
    pub max_health: f32,
    /// Explicit host invulnerability (cutscenes); intro is invulnerable implicitly
    pub invulnerable: bool,
    pub attack_in_progress: bool,
    /// Current attack was parried
    pub cancelled: bool,
}

impl EncounterState {
    pub fn new(max_health: f32) -> Self {
        let max_health = max_health.max(0.0);
        Self {
            stage: EncounterStage::Idle,
            phase_elapsed: 0.0,
            health: max_health,
            max_health,
            invulnerable: false,
            attack_in_progress: false,
            cancelled: false,
        }
    }

    pub fn is_dead(&self) -> bool {
        matches!(self.stage, EncounterStage::Dead)
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable || matches!(self.stage, EncounterStage::Intro { .. })
    }

    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            return 0.0;
        }
        (self.health / self.max_health).clamp(0.0, 1.0)
    }

    pub fn current_phase(&self) -> Option<usize> {
        match self.stage {
            EncounterStage::Fighting { phase } => Some(phase),
            _ => None,
        }
    }
}
