//! Intent signals from the encounter brain to the host.
//!
//! ECS решает, хост исполняет: физика, VFX, звук, спавн снарядов.
//! Brain никогда не двигает body сам: только шлёт `MotionCommand`.

use bevy::prelude::*;

use crate::definitions::AttackKind;
use crate::telegraph::{Appearance, TelegraphFrame};

/// Motion intent for the boss body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionCommand {
    /// Turn sprite: -1 = left, 1 = right
    Face { direction: f32 },
    SetVelocity(Vec2),
    Impulse(Vec2),
    /// Teleport horizontally (lock onto tracked x)
    SnapX(f32),
    /// Freeze body (no gravity, zero velocity)
    Freeze,
    /// Undo `Freeze`
    Release,
    /// Zero horizontal velocity
    Halt,
}

/// Spawn collaborator request: one projectile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileSpawn {
    pub origin: Vec2,
    /// Unit vector
    pub direction: Vec2,
    pub speed: f32,
    pub lifetime: f32,
    pub hit_mask: u32,
}

/// Area-of-effect damage check around a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaDamage {
    pub center: Vec2,
    pub radius: f32,
    pub damage: f32,
}

/// Ground shockwave travelling horizontally.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShockwaveSpawn {
    pub origin: Vec2,
    pub direction: Vec2,
    pub speed: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Атаке нужна цель, а `BossTarget` не резолвится
    NoTarget,
}

/// Everything the brain asks the host to do or show.
#[derive(Debug, Clone, PartialEq)]
pub enum EncounterSignal {
    IntroStarted,
    PhaseStarted { index: usize, name: String },
    AttackStarted { name: String, kind: AttackKind },
    AttackSkipped { name: String, reason: SkipReason },
    Telegraph(TelegraphFrame),
    /// Sprite must return to this appearance (completion or abort)
    TelegraphRestored(Appearance),
    Motion(MotionCommand),
    SpawnProjectile(ProjectileSpawn),
    AreaDamage(AreaDamage),
    Shockwave(ShockwaveSpawn),
    /// Attack parried by a counter hit
    Cancelled { name: String },
    Damaged { amount: f32, remaining: f32 },
    Died,
}

/// Signal sink supplied by the caller of `BossEncounter`.
pub trait EncounterHost {
    fn emit(&mut self, signal: EncounterSignal);
}

impl EncounterHost for Vec<EncounterSignal> {
    fn emit(&mut self, signal: EncounterSignal) {
        self.push(signal);
    }
}
