//! Boss encounter: state machine, attack sub-machines, ECS systems.
//!
//! ECS ответственность:
//! - Encounter state: stage, health, phase, attack loop
//! - Strategic decisions: выбор атаки, telegraph, когда стрелять
//! - Events: BossSignal (intent для хоста)
//!
//! Хост ответственность:
//! - Physics: гравитация, коллизии, grounded/on_screen → `KinematicState`
//! - Rendering: применяет `TelegraphFrame`, спавнит снаряды и VFX

pub mod attacks;
pub mod machine;
pub mod signals;
pub mod state;
pub mod systems;


pub use attacks::{AttackExecution, BossSenses, StepResult};
pub use machine::{BossEncounter, DamageOutcome};
pub use signals::{
    AreaDamage, EncounterHost, EncounterSignal, MotionCommand, ProjectileSpawn, ShockwaveSpawn,
    SkipReason,
};
pub use state::{EncounterStage, EncounterState};
pub use systems::{
    apply_boss_damage, mark_defeated_bosses, process_counter_hits, process_encounter_commands,
    tick_boss_encounters, BossCounterHit, BossDamageRequest, BossSignal, Defeated, EncounterClock,
    EncounterCommand, EncounterSystems,
};
