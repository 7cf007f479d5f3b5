//! Attack execution sub-machines.
//!
//! Каждое "wait for X" из корутин: отдельное состояние enum'а с resume
//! predicate, который проверяется раз в тик в `step`.
//!
//! ```text
//! Charge:        Dashing ──(duration)──────────────────────→ Done
//!                   └──(counter hit)→ Stunned ──(stun)─────→ Done
//! JumpSmash:     Rising ──(apex)→ Falling ──(grounded)─────→ Done (AoE)
//! JumpSuperHigh: Ascending ──(off screen)→ Tracking ──(delay)→ Falling ──(grounded)→ Done (AoE + shockwaves)
//! BulletHell:    [Retreating ──(distance | timeout)→] Firing ──(duration)→ Done
//! ```

use bevy::prelude::*;

use super::signals::{
    AreaDamage, EncounterHost, EncounterSignal, MotionCommand, ProjectileSpawn, ShockwaveSpawn,
    SkipReason,
};
use crate::definitions::{
    AttackDefinition, AttackParams, BulletHellParams, ChargeParams, JumpSmashParams,
    SuperJumpParams,
};
use crate::pattern::PatternEmitter;

/// Защита от spiral of death при крошечном fire interval.
const MAX_VOLLEYS_PER_TICK: u32 = 4;

/// What the brain can see this tick (body + target), supplied by the host.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BossSenses {
    pub position: Vec2,
    pub velocity: Vec2,
    pub grounded: bool,
    pub on_screen: bool,
    /// `None` if the target reference does not resolve
    pub target: Option<Vec2>,
}

impl BossSenses {
    pub fn distance_to_target(&self) -> Option<f32> {
        self.target.map(|target| self.position.distance(target))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    Running,
    Done,
}

/// Horizontal sign towards `to`; ties face right.
fn facing(from: Vec2, to: Vec2) -> f32 {
    if to.x < from.x {
        -1.0
    } else {
        1.0
    }
}

// ============================================================================
// Charge
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum ChargeState {
    Dashing { elapsed: f32 },
    Stunned { remaining: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChargeRun {
    state: ChargeState,
    facing: f32,
}

impl ChargeRun {
    fn begin(senses: &BossSenses, target: Vec2, host: &mut dyn EncounterHost) -> Self {
        let facing = facing(senses.position, target);
        host.emit(EncounterSignal::Motion(MotionCommand::Face { direction: facing }));
        Self {
            state: ChargeState::Dashing { elapsed: 0.0 },
            facing,
        }
    }

    fn step(
        &mut self,
        params: &ChargeParams,
        senses: &BossSenses,
        dt: f32,
        host: &mut dyn EncounterHost,
    ) -> StepResult {
        match &mut self.state {
            ChargeState::Dashing { elapsed } => {
                *elapsed += dt;
                let speed = if params.acceleration > 0.0 {
                    (params.acceleration * *elapsed).min(params.dash_speed)
                } else {
                    params.dash_speed
                };
                host.emit(EncounterSignal::Motion(MotionCommand::SetVelocity(Vec2::new(
                    self.facing * speed,
                    senses.velocity.y,
                ))));

                if *elapsed >= params.dash_duration {
                    host.emit(EncounterSignal::Motion(MotionCommand::Halt));
                    return StepResult::Done;
                }
                StepResult::Running
            }
            ChargeState::Stunned { remaining } => {
                *remaining -= dt;
                if *remaining <= 0.0 {
                    StepResult::Done
                } else {
                    StepResult::Running
                }
            }
        }
    }

    fn is_dashing(&self) -> bool {
        matches!(self.state, ChargeState::Dashing { .. })
    }

    /// Parry: knockback away from facing, then stun.
    fn cancel(&mut self, params: &ChargeParams, host: &mut dyn EncounterHost) {
        host.emit(EncounterSignal::Motion(MotionCommand::Halt));
        host.emit(EncounterSignal::Motion(MotionCommand::Impulse(Vec2::new(
            -self.facing * params.knockback.x,
            params.knockback.y,
        ))));
        self.state = ChargeState::Stunned {
            remaining: params.stun_duration,
        };
    }
}

// ============================================================================
// JumpSmash
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum SmashState {
    Rising { elapsed: f32 },
    Falling { elapsed: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct JumpSmashRun {
    state: SmashState,
}

impl JumpSmashRun {
    fn begin(params: &JumpSmashParams, host: &mut dyn EncounterHost) -> Self {
        host.emit(EncounterSignal::Motion(MotionCommand::Impulse(
            Vec2::Y * params.jump_impulse,
        )));
        Self {
            state: SmashState::Rising { elapsed: 0.0 },
        }
    }

    fn step(
        &mut self,
        params: &JumpSmashParams,
        senses: &BossSenses,
        dt: f32,
        host: &mut dyn EncounterHost,
    ) -> StepResult {
        match &mut self.state {
            SmashState::Rising { elapsed } => {
                *elapsed += dt;
                if *elapsed >= params.land_timeout {
                    crate::log_warning("JumpSmash: apex wait timed out, landing anyway");
                    return Self::land(params, senses, host);
                }
                // Apex: уже в воздухе и вертикальная скорость больше не положительна
                if !senses.grounded && senses.velocity.y <= 0.0 {
                    let elapsed = *elapsed;
                    self.state = SmashState::Falling { elapsed };
                }
                StepResult::Running
            }
            SmashState::Falling { elapsed } => {
                *elapsed += dt;
                if senses.grounded {
                    return Self::land(params, senses, host);
                }
                if *elapsed >= params.land_timeout {
                    crate::log_warning("JumpSmash: landing wait timed out");
                    return Self::land(params, senses, host);
                }
                StepResult::Running
            }
        }
    }

    fn land(params: &JumpSmashParams, senses: &BossSenses, host: &mut dyn EncounterHost) -> StepResult {
        host.emit(EncounterSignal::AreaDamage(AreaDamage {
            center: senses.position,
            radius: params.area_radius,
            damage: params.area_damage,
        }));
        StepResult::Done
    }
}

// ============================================================================
// JumpSuperHigh
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum SuperJumpState {
    Ascending { elapsed: f32 },
    Tracking { remaining: f32, locked_x: f32 },
    Falling { elapsed: f32, locked_x: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SuperJumpRun {
    state: SuperJumpState,
}

impl SuperJumpRun {
    fn begin(params: &SuperJumpParams, host: &mut dyn EncounterHost) -> Self {
        host.emit(EncounterSignal::Motion(MotionCommand::Impulse(
            Vec2::Y * params.jump_impulse,
        )));
        Self {
            state: SuperJumpState::Ascending { elapsed: 0.0 },
        }
    }

    fn step(
        &mut self,
        params: &SuperJumpParams,
        senses: &BossSenses,
        dt: f32,
        host: &mut dyn EncounterHost,
    ) -> StepResult {
        match &mut self.state {
            SuperJumpState::Ascending { elapsed } => {
                *elapsed += dt;
                let timed_out = *elapsed >= params.offscreen_timeout;
                if timed_out {
                    crate::log_warning("JumpSuperHigh: off-screen wait timed out");
                }
                if !senses.on_screen || timed_out {
                    host.emit(EncounterSignal::Motion(MotionCommand::Freeze));
                    self.state = SuperJumpState::Tracking {
                        remaining: params.track_delay,
                        locked_x: senses.target.map_or(senses.position.x, |t| t.x),
                    };
                }
                StepResult::Running
            }
            SuperJumpState::Tracking { remaining, locked_x } => {
                // Цель пропала: держим последний известный x
                if let Some(target) = senses.target {
                    *locked_x = target.x;
                }
                *remaining -= dt;
                if *remaining <= 0.0 {
                    let locked_x = *locked_x;
                    host.emit(EncounterSignal::Motion(MotionCommand::SnapX(locked_x)));
                    host.emit(EncounterSignal::Motion(MotionCommand::Release));
                    host.emit(EncounterSignal::Motion(MotionCommand::SetVelocity(Vec2::new(
                        0.0,
                        -params.fall_speed,
                    ))));
                    self.state = SuperJumpState::Falling {
                        elapsed: 0.0,
                        locked_x,
                    };
                }
                StepResult::Running
            }
            SuperJumpState::Falling { elapsed, locked_x } => {
                *elapsed += dt;
                let landed = senses.grounded;
                if !landed && *elapsed < params.land_timeout {
                    return StepResult::Running;
                }
                if !landed {
                    crate::log_warning("JumpSuperHigh: landing wait timed out");
                }

                let impact = Vec2::new(*locked_x, senses.position.y);
                host.emit(EncounterSignal::AreaDamage(AreaDamage {
                    center: impact,
                    radius: params.area_radius,
                    damage: params.area_damage,
                }));
                for direction in [Vec2::NEG_X, Vec2::X] {
                    host.emit(EncounterSignal::Shockwave(ShockwaveSpawn {
                        origin: impact,
                        direction,
                        speed: params.shockwave_speed,
                    }));
                }
                StepResult::Done
            }
        }
    }

    fn is_frozen(&self) -> bool {
        matches!(self.state, SuperJumpState::Tracking { .. })
    }
}

// ============================================================================
// BulletHell
// ============================================================================

#[derive(Debug, Clone)]
enum BulletHellState {
    Retreating { elapsed: f32 },
    Firing { elapsed: f32, next_volley_at: f32 },
}

#[derive(Debug, Clone)]
pub struct BulletHellRun {
    state: BulletHellState,
    emitter: PatternEmitter,
    volleys: u32,
}

impl BulletHellRun {
    fn begin(params: &BulletHellParams, senses: &BossSenses) -> Self {
        let too_close = senses
            .distance_to_target()
            .is_some_and(|distance| distance < params.min_distance);

        let state = if too_close {
            BulletHellState::Retreating { elapsed: 0.0 }
        } else {
            BulletHellState::Firing {
                elapsed: 0.0,
                next_volley_at: 0.0,
            }
        };

        Self {
            state,
            emitter: PatternEmitter::new(params.pattern.clone()),
            volleys: 0,
        }
    }

    fn step(
        &mut self,
        params: &BulletHellParams,
        senses: &BossSenses,
        dt: f32,
        host: &mut dyn EncounterHost,
    ) -> StepResult {
        match &mut self.state {
            BulletHellState::Retreating { elapsed } => {
                *elapsed += dt;
                let far_enough = senses
                    .distance_to_target()
                    .is_none_or(|distance| distance >= params.retreat_distance);

                if far_enough || *elapsed >= params.retreat_timeout {
                    host.emit(EncounterSignal::Motion(MotionCommand::Halt));
                    self.state = BulletHellState::Firing {
                        elapsed: 0.0,
                        next_volley_at: 0.0,
                    };
                    return StepResult::Running;
                }

                let away = senses.target.map_or(1.0, |target| -facing(senses.position, target));
                host.emit(EncounterSignal::Motion(MotionCommand::SetVelocity(Vec2::new(
                    away * params.retreat_speed,
                    senses.velocity.y,
                ))));
                StepResult::Running
            }
            BulletHellState::Firing {
                elapsed,
                next_volley_at,
            } => {
                *elapsed += dt;

                let Some(interval) = params.pattern.fire_interval() else {
                    return if *elapsed >= params.fire_duration {
                        StepResult::Done
                    } else {
                        StepResult::Running
                    };
                };

                let mut fired_this_tick = 0;
                while *next_volley_at <= *elapsed
                    && *next_volley_at < params.fire_duration
                    && fired_this_tick < MAX_VOLLEYS_PER_TICK
                {
                    let volley_time = *next_volley_at;
                    let target = senses.target.unwrap_or(senses.position);
                    for direction in self.emitter.generate(volley_time, senses.position, target) {
                        host.emit(EncounterSignal::SpawnProjectile(ProjectileSpawn {
                            origin: senses.position,
                            direction,
                            speed: params.projectile_speed,
                            lifetime: params.projectile_lifetime,
                            hit_mask: params.hit_mask,
                        }));
                    }
                    self.volleys += 1;
                    fired_this_tick += 1;
                    *next_volley_at += interval;
                }

                if *elapsed >= params.fire_duration {
                    crate::log(&format!("BulletHell: {} volleys fired", self.volleys));
                    StepResult::Done
                } else {
                    StepResult::Running
                }
            }
        }
    }

    fn is_retreating(&self) -> bool {
        matches!(self.state, BulletHellState::Retreating { .. })
    }
}

// ============================================================================
// Dispatch
// ============================================================================

/// In-flight execution of one attack.
#[derive(Debug, Clone)]
pub enum AttackExecution {
    Charge(ChargeRun),
    JumpSmash(JumpSmashRun),
    SuperJump(SuperJumpRun),
    BulletHell(BulletHellRun),
}

impl AttackExecution {
    /// Start executing `attack`. Fails when a required target is missing.
    pub fn begin(
        attack: &AttackDefinition,
        senses: &BossSenses,
        host: &mut dyn EncounterHost,
    ) -> Result<Self, SkipReason> {
        if attack.requires_target() && senses.target.is_none() {
            return Err(SkipReason::NoTarget);
        }

        let execution = match &attack.params {
            AttackParams::Charge(_) => {
                let target = senses.target.ok_or(SkipReason::NoTarget)?;
                AttackExecution::Charge(ChargeRun::begin(senses, target, host))
            }
            AttackParams::JumpSmash(params) => {
                AttackExecution::JumpSmash(JumpSmashRun::begin(params, host))
            }
            AttackParams::JumpSuperHigh(params) => {
                AttackExecution::SuperJump(SuperJumpRun::begin(params, host))
            }
            AttackParams::BulletHell(params) => {
                AttackExecution::BulletHell(BulletHellRun::begin(params, senses))
            }
        };

        Ok(execution)
    }

    pub fn step(
        &mut self,
        attack: &AttackDefinition,
        senses: &BossSenses,
        dt: f32,
        host: &mut dyn EncounterHost,
    ) -> StepResult {
        match (self, &attack.params) {
            (AttackExecution::Charge(run), AttackParams::Charge(params)) => {
                run.step(params, senses, dt, host)
            }
            (AttackExecution::JumpSmash(run), AttackParams::JumpSmash(params)) => {
                run.step(params, senses, dt, host)
            }
            (AttackExecution::SuperJump(run), AttackParams::JumpSuperHigh(params)) => {
                run.step(params, senses, dt, host)
            }
            (AttackExecution::BulletHell(run), AttackParams::BulletHell(params)) => {
                run.step(params, senses, dt, host)
            }
            _ => {
                crate::log_error(&format!(
                    "Attack '{}': execution does not match its params, dropping",
                    attack.name
                ));
                StepResult::Done
            }
        }
    }

    /// True while a counter hit can abort this execution.
    pub fn is_cancelable(&self) -> bool {
        match self {
            AttackExecution::Charge(run) => run.is_dashing(),
            _ => false,
        }
    }

    /// Apply a parry. Returns false if not cancel-able right now.
    pub fn cancel(&mut self, attack: &AttackDefinition, host: &mut dyn EncounterHost) -> bool {
        match (self, &attack.params) {
            (AttackExecution::Charge(run), AttackParams::Charge(params)) if run.is_dashing() => {
                run.cancel(params, host);
                true
            }
            _ => false,
        }
    }

    /// Forced stop (phase change, death): leave the body in a sane state.
    pub fn abort(&self, host: &mut dyn EncounterHost) {
        match self {
            AttackExecution::Charge(run) if run.is_dashing() => {
                host.emit(EncounterSignal::Motion(MotionCommand::Halt));
            }
            AttackExecution::SuperJump(run) if run.is_frozen() => {
                host.emit(EncounterSignal::Motion(MotionCommand::Release));
            }
            AttackExecution::BulletHell(run) if run.is_retreating() => {
                host.emit(EncounterSignal::Motion(MotionCommand::Halt));
            }
            _ => {}
        }
    }
}
