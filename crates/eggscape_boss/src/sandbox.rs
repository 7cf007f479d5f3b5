//! Toy host arena for headless runs.
//!
//! Заменяет движок там, где его нет (headless runner, интеграционные тесты):
//! - применяет `MotionCommand` из `BossSignal` к `KinematicState`
//! - ручная гравитация + пол + верх экрана (grounded / on_screen)
//! - ведёт `HostLedger`: что босс попросил заспавнить/показать
//!
//! Снаряды не симулируются, только считаются.

use bevy::prelude::*;

use crate::components::KinematicState;
use crate::encounter::{BossSignal, EncounterSignal, EncounterSystems, MotionCommand};
use crate::telegraph::TelegraphCue;

/// Arena geometry and physics constants.
#[derive(Resource, Debug, Clone, Copy)]
pub struct Arena {
    /// units/sec², вниз
    pub gravity: f32,
    pub ground_y: f32,
    /// Выше этой высоты тело считается за экраном
    pub screen_top: f32,
    /// Стены на ±half_width
    pub half_width: f32,
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            gravity: 30.0,
            ground_y: 0.0,
            screen_top: 10.0,
            half_width: 16.0,
        }
    }
}

/// Host-side body flags driven by motion commands.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct BodyControl {
    /// Freeze: гравитация и скорость отключены
    pub frozen: bool,
    /// -1 = влево, 1 = вправо
    pub facing: f32,
}

/// Everything the boss asked the host to do, summarized.
#[derive(Resource, Debug, Clone, Default)]
pub struct HostLedger {
    pub phases: Vec<String>,
    pub attacks: Vec<String>,
    pub skipped: usize,
    pub telegraph_frames: usize,
    pub cues: Vec<String>,
    pub projectiles: usize,
    pub area_hits: usize,
    pub shockwaves: usize,
    pub parries: usize,
    pub damage_taken: f32,
    pub deaths: usize,
    /// Сигналов после смерти (должно быть 0)
    pub after_death: usize,
}

impl HostLedger {
    pub fn record(&mut self, signal: &EncounterSignal) {
        if self.deaths > 0 {
            self.after_death += 1;
        }

        match signal {
            EncounterSignal::PhaseStarted { name, .. } => self.phases.push(name.clone()),
            EncounterSignal::AttackStarted { name, .. } => self.attacks.push(name.clone()),
            EncounterSignal::AttackSkipped { .. } => self.skipped += 1,
            EncounterSignal::Telegraph(frame) => {
                self.telegraph_frames += 1;
                for cue in &frame.cues {
                    match cue {
                        TelegraphCue::Sound(name) | TelegraphCue::Particle(name) => {
                            self.cues.push(name.clone())
                        }
                    }
                }
            }
            EncounterSignal::SpawnProjectile(_) => self.projectiles += 1,
            EncounterSignal::AreaDamage(_) => self.area_hits += 1,
            EncounterSignal::Shockwave(_) => self.shockwaves += 1,
            EncounterSignal::Cancelled { .. } => self.parries += 1,
            EncounterSignal::Damaged { amount, .. } => self.damage_taken += amount,
            EncounterSignal::Died => self.deaths += 1,
            _ => {}
        }
    }
}

/// Apply one motion command to a body.
pub fn apply_motion(command: MotionCommand, body: &mut KinematicState, control: &mut BodyControl) {
    match command {
        MotionCommand::Face { direction } => control.facing = direction.signum(),
        MotionCommand::SetVelocity(velocity) => body.velocity = velocity,
        MotionCommand::Impulse(impulse) => body.velocity += impulse,
        MotionCommand::SnapX(x) => body.position.x = x,
        MotionCommand::Freeze => {
            control.frozen = true;
            body.velocity = Vec2::ZERO;
        }
        MotionCommand::Release => control.frozen = false,
        MotionCommand::Halt => body.velocity.x = 0.0,
    }
}

/// One manual physics step (gravity, floor, walls, screen).
pub fn integrate_body(arena: &Arena, body: &mut KinematicState, control: &BodyControl, dt: f32) {
    if control.frozen {
        return;
    }

    if body.grounded && body.velocity.y <= 0.0 {
        body.velocity.y = 0.0;
    } else {
        body.velocity.y -= arena.gravity * dt;
    }

    body.position += body.velocity * dt;

    if body.position.y <= arena.ground_y {
        body.position.y = arena.ground_y;
        body.velocity.y = body.velocity.y.max(0.0);
        body.grounded = true;
    } else {
        body.grounded = false;
    }

    if body.position.x.abs() > arena.half_width {
        body.position.x = body.position.x.clamp(-arena.half_width, arena.half_width);
        body.velocity.x = 0.0;
    }

    body.on_screen = body.position.y <= arena.screen_top;
}

/// Система: исполнить motion intent'ы босса и записать всё в ledger
pub fn apply_boss_signals(
    mut signals: EventReader<BossSignal>,
    mut ledger: ResMut<HostLedger>,
    mut bodies: Query<(&mut KinematicState, &mut BodyControl)>,
) {
    for BossSignal { boss, signal } in signals.read() {
        ledger.record(signal);

        if let EncounterSignal::Motion(command) = signal {
            if let Ok((mut body, mut control)) = bodies.get_mut(*boss) {
                apply_motion(*command, &mut body, &mut control);
            }
        }
    }
}

/// Система: гравитация и интеграция для всех тел с `BodyControl`
pub fn integrate_bodies(
    time: Res<Time>,
    arena: Res<Arena>,
    mut bodies: Query<(&mut KinematicState, &BodyControl)>,
) {
    let dt = time.delta_secs();
    for (mut body, control) in bodies.iter_mut() {
        integrate_body(&arena, &mut body, control, dt);
    }
}

/// Toy host: motion intents + manual physics после encounter систем.
pub struct SandboxPlugin;

impl Plugin for SandboxPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Arena>()
            .init_resource::<HostLedger>()
            .add_systems(
                FixedUpdate,
                (apply_boss_signals, integrate_bodies)
                    .chain()
                    .after(EncounterSystems),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn airborne() -> KinematicState {
        KinematicState {
            position: Vec2::new(0.0, 5.0),
            velocity: Vec2::ZERO,
            grounded: false,
            on_screen: true,
        }
    }

    #[test]
    fn test_body_falls_and_lands() {
        let arena = Arena::default();
        let control = BodyControl::default();
        let mut body = airborne();

        for _ in 0..120 {
            integrate_body(&arena, &mut body, &control, 1.0 / 60.0);
        }

        assert!(body.grounded);
        assert_eq!(body.position.y, arena.ground_y);
        assert_eq!(body.velocity.y, 0.0);
    }

    #[test]
    fn test_frozen_body_hangs() {
        let arena = Arena::default();
        let mut control = BodyControl::default();
        let mut body = airborne();
        body.velocity = Vec2::new(3.0, 3.0);

        apply_motion(MotionCommand::Freeze, &mut body, &mut control);
        integrate_body(&arena, &mut body, &control, 0.5);

        assert_eq!(body.position, Vec2::new(0.0, 5.0));
        assert_eq!(body.velocity, Vec2::ZERO);

        apply_motion(MotionCommand::Release, &mut body, &mut control);
        integrate_body(&arena, &mut body, &control, 0.1);
        assert!(body.position.y < 5.0);
    }

    #[test]
    fn test_impulse_leaves_ground() {
        let arena = Arena::default();
        let mut control = BodyControl::default();
        let mut body = KinematicState::default();

        apply_motion(MotionCommand::Impulse(Vec2::Y * 12.0), &mut body, &mut control);
        integrate_body(&arena, &mut body, &control, 1.0 / 60.0);

        assert!(!body.grounded);
        assert!(body.position.y > 0.0);
    }

    #[test]
    fn test_high_body_is_off_screen() {
        let arena = Arena::default();
        let control = BodyControl::default();
        let mut body = airborne();
        body.position.y = arena.screen_top + 1.0;

        integrate_body(&arena, &mut body, &control, 1.0 / 60.0);
        assert!(!body.on_screen);
    }
}
