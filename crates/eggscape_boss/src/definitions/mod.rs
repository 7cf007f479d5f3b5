//! Authored encounter data: attacks, phases, whole-encounter config.
//!
//! Всё здесь конфигурация, создаётся при авторинге (код или JSON),
//! во время боя только читается.

use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod attack;
pub mod error;
pub mod phase;

pub use attack::{
    AttackDefinition, AttackKind, AttackParams, BulletHellParams, ChargeParams, JumpSmashParams,
    SuperJumpParams,
};
pub use error::{ConfigError, LoadError};
pub use phase::PhaseDefinition;

use crate::pattern::{BulletPatternSpec, PatternKind};
use crate::telegraph::Appearance;

fn default_counter_mask() -> u32 {
    crate::layers::PLAYER_ATTACK
}

/// Whole-encounter configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterConfig {
    pub boss_name: String,
    pub max_health: f32,
    /// Invulnerable intro (seconds)
    pub intro_duration: f32,
    /// Layers whose hits can parry a cancel-able attack
    #[serde(default = "default_counter_mask")]
    pub counter_mask: u32,
    /// Sprite baseline restored after every telegraph
    #[serde(default)]
    pub appearance: Appearance,
    pub phases: Vec<PhaseDefinition>,
}

impl Default for EncounterConfig {
    /// Rooster King: босс финального уровня.
    fn default() -> Self {
        let feather_ring = BulletPatternSpec::new(
            PatternKind::Radial {
                count: 12,
                start_deg: 0.0,
            },
            2.0,
        );
        let feather_spiral = BulletPatternSpec::new(
            PatternKind::Spiral {
                arms: 3,
                revolutions_per_sec: 0.35,
            },
            8.0,
        );
        let egg_volley = BulletPatternSpec::new(
            PatternKind::Aimed {
                count: 3,
                spread_deg: 24.0,
            },
            3.0,
        );

        Self {
            boss_name: "Rooster King".to_string(),
            max_health: 300.0,
            intro_duration: 2.5,
            counter_mask: default_counter_mask(),
            appearance: Appearance::default(),
            phases: vec![
                PhaseDefinition::new(
                    "Strut",
                    vec![
                        AttackDefinition::charge("Peck Rush").with_weight(3),
                        AttackDefinition::jump_smash("Belly Flop").with_weight(2),
                    ],
                )
                .with_delay(1.0, 2.0)
                .until_health(0.6),
                PhaseDefinition::new(
                    "Feathers Fly",
                    vec![
                        AttackDefinition::charge("Peck Rush").with_weight(2),
                        AttackDefinition::jump_smash("Belly Flop"),
                        AttackDefinition::bullet_hell("Feather Ring", feather_ring).with_weight(3),
                    ],
                )
                .with_delay(0.8, 1.5)
                .until_health(0.3)
                .until_elapsed(90.0),
                PhaseDefinition::new(
                    "Last Stand",
                    vec![
                        AttackDefinition::charge("Peck Rush").with_timing(0.4, 0.4).with_weight(2),
                        AttackDefinition::super_jump("Sky Drop").with_weight(2),
                        AttackDefinition::bullet_hell("Feather Spiral", feather_spiral).with_weight(2),
                        AttackDefinition::bullet_hell("Egg Volley", egg_volley),
                    ],
                )
                .with_delay(0.4, 1.0),
            ],
        }
    }
}

impl EncounterConfig {
    pub fn new(boss_name: impl Into<String>, max_health: f32, phases: Vec<PhaseDefinition>) -> Self {
        Self {
            boss_name: boss_name.into(),
            max_health,
            intro_duration: 0.0,
            counter_mask: default_counter_mask(),
            appearance: Appearance::default(),
            phases,
        }
    }

    pub fn with_intro(mut self, intro_duration: f32) -> Self {
        self.intro_duration = intro_duration;
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_pretty(&self) -> Result<String, LoadError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn is_terminal(&self, phase: usize) -> bool {
        phase + 1 >= self.phases.len()
    }

    /// Collect all authoring problems.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.phases.is_empty() {
            errors.push(ConfigError::NoPhases);
        }
        if self.max_health.is_nan() || self.max_health <= 0.0 {
            errors.push(ConfigError::NonPositiveHealth(self.max_health));
        }

        for (index, phase) in self.phases.iter().enumerate() {
            if phase.attacks.is_empty() {
                errors.push(ConfigError::EmptyAttackPool {
                    phase: phase.name.clone(),
                });
            }
            if !phase.min_delay.is_finite() || !phase.max_delay.is_finite() {
                errors.push(ConfigError::NonFiniteDelay {
                    phase: phase.name.clone(),
                    min: phase.min_delay,
                    max: phase.max_delay,
                });
            } else if phase.min_delay > phase.max_delay {
                errors.push(ConfigError::InvertedDelay {
                    phase: phase.name.clone(),
                    min: phase.min_delay,
                    max: phase.max_delay,
                });
            }
            if self.is_terminal(index) && phase.has_exit_condition() {
                errors.push(ConfigError::TerminalExitCondition {
                    phase: phase.name.clone(),
                });
            }

            for attack in &phase.attacks {
                if attack.windup < 0.0 || attack.recovery < 0.0 {
                    errors.push(ConfigError::NegativeTiming {
                        attack: attack.name.clone(),
                    });
                }
                if let AttackParams::BulletHell(params) = &attack.params {
                    if params.pattern.fire_interval().is_none() {
                        errors.push(ConfigError::InvalidFireRate {
                            attack: attack.name.clone(),
                        });
                    }
                }
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOSTER_KING_JSON: &str = include_str!("../../assets/rooster_king.json");

    #[test]
    fn test_default_config_is_valid() {
        let config = EncounterConfig::default();
        assert_eq!(config.validate(), vec![]);
        assert_eq!(config.phases.len(), 3);
        assert!(config.is_terminal(2));
        assert!(!config.is_terminal(1));
    }

    #[test]
    fn test_validate_reports_problems() {
        let config = EncounterConfig::new(
            "Broken Hen",
            0.0,
            vec![
                PhaseDefinition::new("Empty", vec![]).with_delay(2.0, 1.0),
                PhaseDefinition::new("Final", vec![AttackDefinition::jump_smash("Flop")])
                    .until_health(0.5),
            ],
        );

        let errors = config.validate();

        assert!(errors.contains(&ConfigError::NonPositiveHealth(0.0)));
        assert!(errors.contains(&ConfigError::EmptyAttackPool {
            phase: "Empty".to_string()
        }));
        assert!(errors.contains(&ConfigError::InvertedDelay {
            phase: "Empty".to_string(),
            min: 2.0,
            max: 1.0
        }));
        assert!(errors.contains(&ConfigError::TerminalExitCondition {
            phase: "Final".to_string()
        }));
        assert!(errors.iter().any(ConfigError::is_fatal));
    }

    #[test]
    fn test_non_finite_delay_is_reported() {
        let config = EncounterConfig::new(
            "Sleepy Hen",
            10.0,
            vec![PhaseDefinition::new("Only", vec![AttackDefinition::jump_smash("Flop")])
                .with_delay(0.5, f32::INFINITY)],
        );

        let errors = config.validate();

        assert_eq!(
            errors,
            vec![ConfigError::NonFiniteDelay {
                phase: "Only".to_string(),
                min: 0.5,
                max: f32::INFINITY,
            }]
        );
        assert!(!errors[0].is_fatal());
    }

    #[test]
    fn test_no_phases_is_fatal() {
        let errors = EncounterConfig::new("Nobody", 10.0, vec![]).validate();
        assert_eq!(errors, vec![ConfigError::NoPhases]);
        assert!(errors[0].is_fatal());
    }

    #[test]
    fn test_json_asset_parses() {
        let config = EncounterConfig::from_json_str(ROOSTER_KING_JSON).expect("asset must parse");

        assert_eq!(config.boss_name, "Rooster King");
        assert_eq!(config.phases.len(), 3);
        assert_eq!(config.phases[0].attacks[0].kind(), AttackKind::Charge);
        assert_eq!(config.phases[0].attacks[0].weight, 3);
        assert_eq!(config.phases[2].attacks[1].kind(), AttackKind::JumpSuperHigh);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_json_roundtrip_preserves_config() {
        let config = EncounterConfig::default();
        let json = config.to_json_pretty().expect("serialize");
        let parsed = EncounterConfig::from_json_str(&json).expect("parse");
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_json_errors_surface_as_load_error() {
        let result = EncounterConfig::from_json_str("{ \"boss_name\": 3 }");
        assert!(matches!(result, Err(LoadError::Json(_))));
    }
}
