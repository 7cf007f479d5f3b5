//! Общие хелперы для интеграционных тестов (headless App + toy arena)

#![allow(dead_code)]

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use eggscape_boss::sandbox::{BodyControl, HostLedger, SandboxPlugin};
use eggscape_boss::{
    create_headless_app, spawn_boss, BossSignal, EncounterCommand, EncounterConfig,
    KinematicState, Player,
};

pub const TICK_HZ: f64 = 60.0;

/// Все `BossSignal` в порядке получения
#[derive(Resource, Default)]
pub struct SignalLog(pub Vec<BossSignal>);

fn record_signals(mut reader: EventReader<BossSignal>, mut log: ResMut<SignalLog>) {
    log.0.extend(reader.read().cloned());
}

/// Headless App с фиксированным шагом 1/60 и toy arena
pub fn arena_app(seed: u64) -> App {
    let mut app = create_headless_app(seed);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
        1.0 / TICK_HZ,
    )))
    .add_plugins(SandboxPlugin)
    .init_resource::<SignalLog>()
    .add_systems(FixedPostUpdate, record_signals);
    app
}

/// Спавнит игрока справа и босса слева. Возвращает (boss, player).
pub fn spawn_duel(app: &mut App, config: EncounterConfig, with_target: bool) -> (Entity, Entity) {
    let world = app.world_mut();
    let player = world
        .spawn((
            Player,
            KinematicState::at(Vec2::new(6.0, 0.0)),
            BodyControl::default(),
        ))
        .id();
    let boss = spawn_boss(
        world,
        config,
        KinematicState::at(Vec2::new(-6.0, 0.0)),
        with_target.then_some(player),
    );
    world.entity_mut(boss).insert(BodyControl::default());
    (boss, player)
}

pub fn start(app: &mut App, boss: Entity) {
    app.world_mut().send_event(EncounterCommand::Start { boss });
}

pub fn run_ticks(app: &mut App, ticks: usize) {
    for _ in 0..ticks {
        app.update();
    }
}

pub fn ledger(app: &App) -> &HostLedger {
    app.world().resource::<HostLedger>()
}

pub fn signals(app: &App) -> &[BossSignal] {
    &app.world().resource::<SignalLog>().0
}
