//! Интеграционные тесты ECS surface: команды, counter hits, маркеры

mod common;

use bevy::prelude::*;
use eggscape_boss::encounter::EncounterSignal;
use eggscape_boss::sandbox::BodyControl;
use eggscape_boss::{
    layers, AttackDefinition, BossCounterHit, BossDamageRequest, BossEncounter, Defeated,
    EncounterClock, EncounterCommand, EncounterConfig, EncounterStage, KinematicState,
    MotionCommand, PhaseDefinition,
};

use common::{arena_app, ledger, run_ticks, signals, spawn_duel, start};

fn two_phases() -> EncounterConfig {
    EncounterConfig::new(
        "Test Hen",
        100.0,
        vec![
            PhaseDefinition::new("Opening", vec![AttackDefinition::jump_smash("Flop")])
                .until_health(0.5),
            PhaseDefinition::new("Final", vec![AttackDefinition::jump_smash("Flop")]),
        ],
    )
}

fn stage(app: &App, boss: Entity) -> EncounterStage {
    app.world()
        .get::<BossEncounter>(boss)
        .expect("boss exists")
        .stage()
}

#[test]
fn test_start_and_force_advance_commands() {
    let mut app = arena_app(1);
    let (boss, _player) = spawn_duel(&mut app, two_phases(), true);

    run_ticks(&mut app, 3);
    assert_eq!(stage(&app, boss), EncounterStage::Idle);

    start(&mut app, boss);
    run_ticks(&mut app, 2);
    assert_eq!(stage(&app, boss), EncounterStage::Fighting { phase: 0 });

    app.world_mut()
        .send_event(EncounterCommand::ForceAdvancePhase { boss });
    run_ticks(&mut app, 2);
    assert_eq!(stage(&app, boss), EncounterStage::Fighting { phase: 1 });

    // Терминальная фаза: команда игнорируется
    app.world_mut()
        .send_event(EncounterCommand::ForceAdvancePhase { boss });
    run_ticks(&mut app, 2);
    assert_eq!(stage(&app, boss), EncounterStage::Fighting { phase: 1 });
}

#[test]
fn test_set_invulnerable_blocks_damage() {
    let mut app = arena_app(1);
    let (boss, _player) = spawn_duel(&mut app, two_phases(), true);
    start(&mut app, boss);
    run_ticks(&mut app, 2);

    app.world_mut().send_event(EncounterCommand::SetInvulnerable {
        boss,
        invulnerable: true,
    });
    run_ticks(&mut app, 2);
    for _ in 0..5 {
        app.world_mut().send_event(BossDamageRequest { boss, amount: 40.0 });
    }
    run_ticks(&mut app, 2);
    assert_eq!(app.world().get::<BossEncounter>(boss).expect("boss").health(), 100.0);

    app.world_mut().send_event(EncounterCommand::SetInvulnerable {
        boss,
        invulnerable: false,
    });
    app.world_mut().send_event(BossDamageRequest { boss, amount: 40.0 });
    run_ticks(&mut app, 2);
    assert_eq!(app.world().get::<BossEncounter>(boss).expect("boss").health(), 60.0);
}

#[test]
fn test_death_marks_defeated_and_reset_clears_it() {
    let mut app = arena_app(1);
    let (boss, _player) = spawn_duel(&mut app, two_phases(), true);
    start(&mut app, boss);
    run_ticks(&mut app, 2);

    app.world_mut().send_event(BossDamageRequest { boss, amount: 500.0 });
    run_ticks(&mut app, 2);
    assert!(app.world().entity(boss).contains::<Defeated>());
    assert_eq!(stage(&app, boss), EncounterStage::Dead);

    app.world_mut().send_event(EncounterCommand::Reset { boss });
    run_ticks(&mut app, 2);
    assert!(!app.world().entity(boss).contains::<Defeated>());
    assert_eq!(stage(&app, boss), EncounterStage::Idle);
    assert_eq!(app.world().get::<BossEncounter>(boss).expect("boss").health(), 100.0);
}

#[test]
fn test_counter_hit_event_parries_charge() {
    let config = EncounterConfig::new(
        "Test Hen",
        100.0,
        vec![PhaseDefinition::new(
            "Only",
            vec![AttackDefinition::charge("Peck").with_timing(0.2, 0.5)],
        )],
    );
    let mut app = arena_app(1);
    let (boss, _player) = spawn_duel(&mut app, config, true);
    start(&mut app, boss);

    // Ждём начала рывка
    let mut dashing = false;
    for _ in 0..60 {
        app.update();
        let encounter = app.world().get::<BossEncounter>(boss).expect("boss");
        if encounter.is_attacking() && !encounter.is_telegraphing() {
            dashing = true;
            break;
        }
    }
    assert!(dashing);

    // Не тот слой: ничего
    app.world_mut().send_event(BossCounterHit {
        boss,
        layer: layers::ENVIRONMENT,
    });
    run_ticks(&mut app, 1);
    assert_eq!(ledger(&app).parries, 0);

    app.world_mut().send_event(BossCounterHit {
        boss,
        layer: layers::PLAYER_ATTACK,
    });
    run_ticks(&mut app, 1);

    assert_eq!(ledger(&app).parries, 1);
    assert_eq!(app.world().get::<BossEncounter>(boss).expect("boss").health(), 92.0);
    assert!(signals(&app)
        .iter()
        .any(|s| s.signal == EncounterSignal::Cancelled { name: "Peck".into() }));
}

#[test]
fn test_paused_clock_freezes_encounter() {
    let mut app = arena_app(1);
    let (boss, _player) = spawn_duel(&mut app, two_phases().with_intro(1.0), true);
    app.world_mut().resource_mut::<EncounterClock>().time_scale = 0.0;
    start(&mut app, boss);

    run_ticks(&mut app, 120);
    assert!(matches!(stage(&app, boss), EncounterStage::Intro { .. }));

    app.world_mut().resource_mut::<EncounterClock>().time_scale = 1.0;
    run_ticks(&mut app, 70);
    assert_eq!(stage(&app, boss), EncounterStage::Fighting { phase: 0 });
}

#[test]
fn test_command_for_unknown_entity_is_ignored() {
    let mut app = arena_app(1);
    let (boss, player) = spawn_duel(&mut app, two_phases(), true);

    app.world_mut()
        .send_event(EncounterCommand::Start { boss: player });
    run_ticks(&mut app, 3);

    assert_eq!(stage(&app, boss), EncounterStage::Idle);
    assert!(signals(&app).is_empty());
}

fn single_attack(attack: AttackDefinition) -> EncounterConfig {
    EncounterConfig::new("Test Hen", 100.0, vec![PhaseDefinition::new("Only", vec![attack])])
}

#[test]
fn test_reset_mid_windup_restores_sprite() {
    let config = single_attack(AttackDefinition::charge("Peck").with_timing(1.0, 0.5));
    let mut app = arena_app(1);
    let (boss, _player) = spawn_duel(&mut app, config, true);
    start(&mut app, boss);
    run_ticks(&mut app, 10);
    assert!(app.world().get::<BossEncounter>(boss).expect("boss").is_telegraphing());

    let before = signals(&app).len();
    app.world_mut().send_event(EncounterCommand::Reset { boss });
    run_ticks(&mut app, 2);

    let baseline = app.world().get::<BossEncounter>(boss).expect("boss").config().appearance;
    assert!(signals(&app)[before..]
        .iter()
        .any(|s| s.boss == boss && s.signal == EncounterSignal::TelegraphRestored(baseline)));
    assert_eq!(stage(&app, boss), EncounterStage::Idle);
}

#[test]
fn test_reset_during_super_jump_releases_body() {
    let mut app = arena_app(1);
    let (boss, _player) = spawn_duel(&mut app, single_attack(AttackDefinition::super_jump("Sky Drop")), true);
    start(&mut app, boss);

    let frozen = |app: &App| app.world().get::<BodyControl>(boss).expect("body").frozen;
    let mut hovering = false;
    for _ in 0..240 {
        app.update();
        if frozen(&app) {
            hovering = true;
            break;
        }
    }
    assert!(hovering);

    app.world_mut().send_event(EncounterCommand::Reset { boss });
    run_ticks(&mut app, 120);

    assert!(!frozen(&app));
    assert!(signals(&app)
        .iter()
        .any(|s| s.signal == EncounterSignal::Motion(MotionCommand::Release)));
    let body = app.world().get::<KinematicState>(boss).expect("body");
    assert!(body.grounded);
    assert_eq!(stage(&app, boss), EncounterStage::Idle);
}
