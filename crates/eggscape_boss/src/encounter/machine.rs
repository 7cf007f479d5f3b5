//! Boss encounter state machine.
//!
//! `Idle → Intro → Fighting{0} → … → Fighting{n-1} → Dead`
//!
//! Внутри фазы крутится цикл атак:
//! `Select → Windup (telegraph) → Execute → Recovery → Delay → Select`.
//! Переход фазы проверяется каждый тик, до шага цикла.

use bevy::prelude::*;
use rand::Rng;
use std::mem;

use super::attacks::{AttackExecution, BossSenses, StepResult};
use super::signals::{EncounterHost, EncounterSignal, SkipReason};
use super::state::{EncounterStage, EncounterState};
use crate::components::KinematicState;
use crate::definitions::{AttackDefinition, AttackParams, EncounterConfig, PhaseDefinition};
use crate::telegraph::TelegraphPlayer;

/// Result of the damage entry point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageOutcome {
    /// Dead, invulnerable, disabled or a non-positive amount
    Ignored,
    Applied { remaining: f32 },
    /// This call drove health to zero
    Killed,
}

/// Attack loop step inside a phase.
#[derive(Debug, Clone, Default)]
enum LoopStep {
    /// Nothing to do (not fighting, or the phase has no attacks)
    #[default]
    Waiting,
    Select,
    Windup {
        attack: usize,
        telegraph: TelegraphPlayer,
    },
    Execute {
        attack: usize,
        run: AttackExecution,
    },
    Recovery {
        remaining: f32,
    },
    Delay {
        remaining: f32,
    },
}

/// Instant transitions (Select) continue within the same tick,
/// everything that waits on time or the host yields.
enum Flow {
    Continue,
    Yield,
}

/// Boss brain. One per boss entity.
///
/// Не трогает body напрямую: читает `BossSenses`, пишет `EncounterSignal`.
#[derive(Component, Debug, Clone)]
#[require(KinematicState)]
pub struct BossEncounter {
    config: EncounterConfig,
    state: EncounterState,
    step: LoopStep,
    /// Fatal config error → encounter never leaves Idle
    disabled: bool,
}

impl BossEncounter {
    /// Validates `config`; problems are logged as warnings.
    pub fn new(config: EncounterConfig) -> Self {
        let errors = config.validate();
        let mut disabled = false;
        for error in &errors {
            crate::log_warning(&format!("Boss '{}': {}", config.boss_name, error));
            disabled |= error.is_fatal();
        }
        if disabled {
            crate::log_warning(&format!(
                "Boss '{}': encounter disabled, it will stay idle",
                config.boss_name
            ));
        }

        Self {
            state: EncounterState::new(config.max_health),
            config,
            step: LoopStep::Waiting,
            disabled,
        }
    }

    pub fn config(&self) -> &EncounterConfig {
        &self.config
    }

    pub fn state(&self) -> &EncounterState {
        &self.state
    }

    pub fn stage(&self) -> EncounterStage {
        self.state.stage
    }

    pub fn health(&self) -> f32 {
        self.state.health
    }

    pub fn is_dead(&self) -> bool {
        self.state.is_dead()
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn current_phase(&self) -> Option<usize> {
        self.state.current_phase()
    }

    /// Name of the attack currently in windup or execution.
    pub fn current_attack(&self) -> Option<&AttackDefinition> {
        let phase = self.state.current_phase()?;
        match &self.step {
            LoopStep::Windup { attack, .. } | LoopStep::Execute { attack, .. } => {
                attack_at(&self.config, phase, *attack)
            }
            _ => None,
        }
    }

    pub fn is_attacking(&self) -> bool {
        self.state.attack_in_progress
    }

    pub fn is_telegraphing(&self) -> bool {
        matches!(self.step, LoopStep::Windup { .. })
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Idle → Intro (or straight into the first phase with no intro).
    pub fn start_intro(&mut self, host: &mut dyn EncounterHost) -> bool {
        if self.disabled {
            crate::log_warning(&format!(
                "Boss '{}': start ignored, encounter disabled",
                self.config.boss_name
            ));
            return false;
        }
        if self.state.stage != EncounterStage::Idle {
            return false;
        }

        crate::log_info(&format!("Boss '{}': intro", self.config.boss_name));
        host.emit(EncounterSignal::IntroStarted);

        if self.config.intro_duration > 0.0 {
            self.state.stage = EncounterStage::Intro {
                remaining: self.config.intro_duration,
            };
        } else {
            self.enter_phase(0, host);
        }
        true
    }

    /// Skip the intro or jump to the next phase. No-op on the terminal phase.
    pub fn force_advance_phase(&mut self, host: &mut dyn EncounterHost) -> bool {
        match self.state.stage {
            EncounterStage::Intro { .. } => {
                self.enter_phase(0, host);
                true
            }
            EncounterStage::Fighting { phase } if !self.config.is_terminal(phase) => {
                self.enter_phase(phase + 1, host);
                true
            }
            _ => false,
        }
    }

    /// Back to Idle with full health.
    ///
    /// Незавершённая атака прерывается как при смене фазы: baseline спрайта
    /// восстанавливается, замороженное тело отпускается.
    pub fn reset(&mut self, host: &mut dyn EncounterHost) {
        self.abort_in_flight(host);
        self.state = EncounterState::new(self.config.max_health);
        self.step = LoopStep::Waiting;
    }

    pub fn set_invulnerable(&mut self, invulnerable: bool) {
        self.state.invulnerable = invulnerable;
    }

    // ========================================================================
    // Damage / counter hits
    // ========================================================================

    /// Single damage entry point. Health never goes below zero, Died fires once.
    pub fn apply_damage(&mut self, amount: f32, host: &mut dyn EncounterHost) -> DamageOutcome {
        if self.disabled
            || self.state.is_dead()
            || self.state.is_invulnerable()
            || !amount.is_finite()
            || amount <= 0.0
        {
            return DamageOutcome::Ignored;
        }

        self.state.health = (self.state.health - amount).max(0.0);
        let remaining = self.state.health;
        host.emit(EncounterSignal::Damaged { amount, remaining });

        if remaining <= 0.0 {
            self.die(host);
            return DamageOutcome::Killed;
        }

        DamageOutcome::Applied { remaining }
    }

    /// Counter hit from a physics layer. True if it parried the current attack.
    ///
    /// Порядок: cleanup телеграфа → knockback + stun → counter damage.
    pub fn notify_hit(&mut self, layer: u32, host: &mut dyn EncounterHost) -> bool {
        if self.disabled || self.state.is_dead() {
            return false;
        }
        if !crate::layers::intersects(layer, self.config.counter_mask) {
            return false;
        }
        let Some(phase) = self.state.current_phase() else {
            return false;
        };

        let LoopStep::Execute { attack, run } = &mut self.step else {
            return false;
        };
        let Some(definition) = attack_at(&self.config, phase, *attack) else {
            return false;
        };
        // Тип атаки должен допускать парирование, а исполнение быть в нужной стадии
        if !definition.is_cancelable() || !run.is_cancelable() {
            return false;
        }

        host.emit(EncounterSignal::TelegraphRestored(self.config.appearance));
        if !run.cancel(definition, host) {
            return false;
        }

        let counter_damage = match &definition.params {
            AttackParams::Charge(params) => params.counter_damage,
            _ => 0.0,
        };
        crate::log(&format!(
            "Boss '{}': '{}' parried",
            self.config.boss_name, definition.name
        ));
        host.emit(EncounterSignal::Cancelled {
            name: definition.name.clone(),
        });
        self.state.cancelled = true;

        self.apply_damage(counter_damage, host);
        true
    }

    // ========================================================================
    // Tick
    // ========================================================================

    /// Advance the encounter by `dt` seconds.
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        senses: &BossSenses,
        rng: &mut R,
        host: &mut dyn EncounterHost,
    ) {
        if self.disabled || !dt.is_finite() || dt < 0.0 {
            return;
        }

        match self.state.stage {
            EncounterStage::Idle | EncounterStage::Dead => {}
            EncounterStage::Intro { remaining } => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    self.enter_phase(0, host);
                } else {
                    self.state.stage = EncounterStage::Intro { remaining };
                }
            }
            EncounterStage::Fighting { phase } => {
                self.state.phase_elapsed += dt;

                if self.transition_due(phase) {
                    self.enter_phase(phase + 1, host);
                    return;
                }

                self.step_loop(phase, dt, senses, rng, host);
            }
        }
    }

    fn transition_due(&self, phase: usize) -> bool {
        self.config.phases.get(phase).is_some_and(|definition| {
            definition.transition_due(
                self.config.is_terminal(phase),
                self.state.health_fraction(),
                self.state.phase_elapsed,
            )
        })
    }

    fn step_loop<R: Rng + ?Sized>(
        &mut self,
        phase: usize,
        dt: f32,
        senses: &BossSenses,
        rng: &mut R,
        host: &mut dyn EncounterHost,
    ) {
        let Some(definition) = self.config.phases.get(phase) else {
            return;
        };

        // Select → Windup может произойти в том же тике, дальше всегда Yield
        for _ in 0..2 {
            let step = mem::take(&mut self.step);
            let (next, flow) = match step {
                LoopStep::Waiting => (LoopStep::Waiting, Flow::Yield),
                LoopStep::Select => select(
                    &self.config,
                    &mut self.state,
                    definition,
                    senses,
                    rng,
                    host,
                ),
                LoopStep::Windup {
                    attack,
                    mut telegraph,
                } => {
                    let frame = telegraph.advance(dt);
                    let completed = match frame {
                        Some(frame) => {
                            let completed = frame.completed;
                            host.emit(EncounterSignal::Telegraph(frame));
                            completed
                        }
                        None => true,
                    };

                    if completed {
                        host.emit(EncounterSignal::TelegraphRestored(telegraph.baseline()));
                        (
                            begin_execution(
                                &self.config.boss_name,
                                &mut self.state,
                                definition,
                                attack,
                                senses,
                                rng,
                                host,
                            ),
                            Flow::Yield,
                        )
                    } else {
                        (LoopStep::Windup { attack, telegraph }, Flow::Yield)
                    }
                }
                LoopStep::Execute { attack, mut run } => {
                    let result = match definition.attacks.get(attack) {
                        Some(attack_def) => run.step(attack_def, senses, dt, host),
                        None => StepResult::Done,
                    };

                    match result {
                        StepResult::Running => (LoopStep::Execute { attack, run }, Flow::Yield),
                        StepResult::Done => {
                            self.state.attack_in_progress = false;
                            self.state.cancelled = false;
                            let recovery = definition
                                .attacks
                                .get(attack)
                                .map_or(0.0, |a| a.recovery.max(0.0));
                            (LoopStep::Recovery { remaining: recovery }, Flow::Yield)
                        }
                    }
                }
                LoopStep::Recovery { remaining } => {
                    let remaining = remaining - dt;
                    if remaining <= 0.0 {
                        (
                            LoopStep::Delay {
                                remaining: sample_delay(definition, rng),
                            },
                            Flow::Yield,
                        )
                    } else {
                        (LoopStep::Recovery { remaining }, Flow::Yield)
                    }
                }
                LoopStep::Delay { remaining } => {
                    let remaining = remaining - dt;
                    if remaining <= 0.0 {
                        (LoopStep::Select, Flow::Yield)
                    } else {
                        (LoopStep::Delay { remaining }, Flow::Yield)
                    }
                }
            };

            self.step = next;
            if let Flow::Yield = flow {
                break;
            }
        }
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    fn enter_phase(&mut self, index: usize, host: &mut dyn EncounterHost) {
        self.abort_in_flight(host);

        let Some(phase) = self.config.phases.get(index) else {
            return;
        };

        self.state.stage = EncounterStage::Fighting { phase: index };
        self.state.phase_elapsed = 0.0;

        crate::log_info(&format!(
            "Boss '{}': phase {} '{}'",
            self.config.boss_name, index, phase.name
        ));
        host.emit(EncounterSignal::PhaseStarted {
            index,
            name: phase.name.clone(),
        });

        self.step = if phase.attacks.is_empty() {
            crate::log_warning(&format!(
                "Boss '{}': phase '{}' has an empty attack pool, idling",
                self.config.boss_name, phase.name
            ));
            LoopStep::Waiting
        } else {
            LoopStep::Select
        };
    }

    fn die(&mut self, host: &mut dyn EncounterHost) {
        self.abort_in_flight(host);
        self.state.stage = EncounterStage::Dead;
        crate::log_info(&format!("Boss '{}': died", self.config.boss_name));
        host.emit(EncounterSignal::Died);
    }

    /// Drop whatever the loop was doing, leaving sprite and body sane.
    fn abort_in_flight(&mut self, host: &mut dyn EncounterHost) {
        match mem::take(&mut self.step) {
            LoopStep::Windup { mut telegraph, .. } => {
                let baseline = telegraph.cleanup();
                host.emit(EncounterSignal::TelegraphRestored(baseline));
            }
            LoopStep::Execute { run, .. } => run.abort(host),
            _ => {}
        }
        self.state.attack_in_progress = false;
        self.state.cancelled = false;
    }
}

fn select<R: Rng + ?Sized>(
    config: &EncounterConfig,
    state: &mut EncounterState,
    phase: &PhaseDefinition,
    senses: &BossSenses,
    rng: &mut R,
    host: &mut dyn EncounterHost,
) -> (LoopStep, Flow) {
    let Some(index) = crate::selector::pick_attack(&phase.attacks, rng) else {
        crate::log_warning(&format!(
            "Boss '{}': phase '{}' has no attack available",
            config.boss_name, phase.name
        ));
        return (LoopStep::Waiting, Flow::Yield);
    };
    let Some(attack) = phase.attacks.get(index) else {
        return (LoopStep::Waiting, Flow::Yield);
    };

    if attack.requires_target() && senses.target.is_none() {
        let next = skip(&config.boss_name, state, phase, attack, SkipReason::NoTarget, rng, host);
        return (next, Flow::Yield);
    }

    crate::log(&format!(
        "Boss '{}': {} '{}'",
        config.boss_name, phase.name, attack.name
    ));
    host.emit(EncounterSignal::AttackStarted {
        name: attack.name.clone(),
        kind: attack.kind(),
    });
    state.attack_in_progress = true;
    state.cancelled = false;

    let telegraph = TelegraphPlayer::play(attack.telegraph.clone(), attack.windup, config.appearance);
    (
        LoopStep::Windup {
            attack: index,
            telegraph,
        },
        Flow::Continue,
    )
}

fn begin_execution<R: Rng + ?Sized>(
    boss_name: &str,
    state: &mut EncounterState,
    phase: &PhaseDefinition,
    attack: usize,
    senses: &BossSenses,
    rng: &mut R,
    host: &mut dyn EncounterHost,
) -> LoopStep {
    let Some(definition) = phase.attacks.get(attack) else {
        state.attack_in_progress = false;
        return LoopStep::Delay {
            remaining: sample_delay(phase, rng),
        };
    };

    match AttackExecution::begin(definition, senses, host) {
        Ok(run) => LoopStep::Execute { attack, run },
        Err(reason) => skip(boss_name, state, phase, definition, reason, rng, host),
    }
}

/// Attack can't run right now: report it and fall through to the delay.
fn skip<R: Rng + ?Sized>(
    boss_name: &str,
    state: &mut EncounterState,
    phase: &PhaseDefinition,
    attack: &AttackDefinition,
    reason: SkipReason,
    rng: &mut R,
    host: &mut dyn EncounterHost,
) -> LoopStep {
    crate::log_warning(&format!(
        "Boss '{}': skipping '{}' ({:?})",
        boss_name, attack.name, reason
    ));
    host.emit(EncounterSignal::AttackSkipped {
        name: attack.name.clone(),
        reason,
    });
    state.attack_in_progress = false;
    LoopStep::Delay {
        remaining: sample_delay(phase, rng),
    }
}

fn attack_at(config: &EncounterConfig, phase: usize, attack: usize) -> Option<&AttackDefinition> {
    config.phases.get(phase)?.attacks.get(attack)
}

/// Uniform delay in `[min_delay, max_delay]`; inverted ranges collapse to `min_delay`.
///
/// NaN/inf границы считаются нулём (gen_range паникует на non-finite).
fn sample_delay<R: Rng + ?Sized>(phase: &PhaseDefinition, rng: &mut R) -> f32 {
    let bound = |delay: f32| if delay.is_finite() { delay.max(0.0) } else { 0.0 };
    let min = bound(phase.min_delay);
    let max = bound(phase.max_delay);
    if max <= min {
        return min;
    }
    rng.gen_range(min..=max)
}
