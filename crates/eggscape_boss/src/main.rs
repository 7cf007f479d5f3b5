//! Headless симуляция босс-файта Eggscape
//!
//! Запускает Bevy App без рендера: toy arena вместо движка, скриптовый игрок.
//! Usage: `eggscape_boss [config.json]` (без аргумента: встроенный Rooster King)

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use eggscape_boss::encounter::EncounterSignal;
use eggscape_boss::sandbox::{BodyControl, HostLedger, SandboxPlugin};
use eggscape_boss::{
    create_headless_app, init_logger, layers, log_info, log_warning, spawn_boss, AttackKind, BossCounterHit,
    BossDamageRequest, BossEncounter, BossSignal, EncounterCommand, EncounterConfig,
    KinematicState, LoadError, Player,
};

const SEED: u64 = 42;
const TICK_HZ: f64 = 60.0;
/// 5 минут симуляции максимум
const MAX_TICKS: u32 = 60 * 60 * 5;
/// Игрок бьёт раз в N секунд
const PLAYER_HIT_INTERVAL: f32 = 1.5;
const PLAYER_HIT_DAMAGE: f32 = 9.0;
/// Парируем каждый второй Charge
const PARRY_EVERY: usize = 2;

/// Скриптовый игрок: бьёт по таймеру, иногда парирует рывок.
#[derive(Resource)]
struct ScriptedPlayer {
    boss: Entity,
    hit_timer: f32,
    charges_seen: usize,
    parry_pending: bool,
}

fn scripted_player(
    time: Res<Time>,
    mut player: ResMut<ScriptedPlayer>,
    mut signals: EventReader<BossSignal>,
    mut damage: EventWriter<BossDamageRequest>,
    mut counters: EventWriter<BossCounterHit>,
) {
    for BossSignal { signal, .. } in signals.read() {
        match signal {
            EncounterSignal::AttackStarted {
                kind: AttackKind::Charge,
                ..
            } => {
                player.charges_seen += 1;
                player.parry_pending = player.charges_seen % PARRY_EVERY == 0;
            }
            // Рывок начался → самое время парировать
            EncounterSignal::Motion(eggscape_boss::MotionCommand::Face { .. })
                if player.parry_pending =>
            {
                player.parry_pending = false;
                counters.write(BossCounterHit {
                    boss: player.boss,
                    layer: layers::PLAYER_ATTACK,
                });
            }
            _ => {}
        }
    }

    player.hit_timer -= time.delta_secs();
    if player.hit_timer <= 0.0 {
        player.hit_timer += PLAYER_HIT_INTERVAL;
        damage.write(BossDamageRequest {
            boss: player.boss,
            amount: PLAYER_HIT_DAMAGE,
        });
    }
}

fn main() -> Result<(), LoadError> {
    init_logger();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            log_info(&format!("Loading encounter config from {}", path));
            EncounterConfig::from_json_file(path)?
        }
        None => EncounterConfig::default(),
    };

    let mut app = create_headless_app(SEED);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
        1.0 / TICK_HZ,
    )))
    .add_plugins(SandboxPlugin);

    log_info(&format!(
        "Starting Eggscape headless encounter '{}' (seed: {})",
        config.boss_name, SEED
    ));

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
        Some(player),
    );
    world.entity_mut(boss).insert(BodyControl::default());

    world.insert_resource(ScriptedPlayer {
        boss,
        hit_timer: PLAYER_HIT_INTERVAL,
        charges_seen: 0,
        parry_pending: false,
    });
    world.send_event(EncounterCommand::Start { boss });

    app.add_systems(FixedPostUpdate, scripted_player);

    let mut ticks = 0;
    while ticks < MAX_TICKS {
        app.update();
        ticks += 1;

        let Some(encounter) = app.world().get::<BossEncounter>(boss) else {
            log_warning("Boss entity vanished");
            break;
        };
        if ticks % 600 == 0 {
            log_info(&format!(
                "Tick {}: stage {:?}, health {:.1}",
                ticks,
                encounter.stage(),
                encounter.health()
            ));
        }
        if encounter.is_dead() {
            break;
        }
    }

    let ledger = app.world().resource::<HostLedger>();
    log_info(&format!(
        "Encounter finished after {} ticks: phases {:?}, {} attacks ({} skipped), \
         {} projectiles, {} area hits, {} shockwaves, {} parries, {:.1} damage, died: {}",
        ticks,
        ledger.phases,
        ledger.attacks.len(),
        ledger.skipped,
        ledger.projectiles,
        ledger.area_hits,
        ledger.shockwaves,
        ledger.parries,
        ledger.damage_taken,
        ledger.deaths > 0
    ));

    Ok(())
}
