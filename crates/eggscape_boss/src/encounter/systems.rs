//! ECS surface of the encounter: events, resources, FixedUpdate systems.
//!
//! Хост → ECS: `EncounterCommand`, `BossDamageRequest`, `BossCounterHit`
//! (+ пишет `KinematicState` после своего physics step).
//! ECS → хост: `BossSignal` (intent: motion, spawn, VFX).

use bevy::prelude::*;

use super::machine::BossEncounter;
use super::signals::EncounterSignal;
use crate::components::{BossTarget, KinematicState};
use crate::DeterministicRng;

/// Damage dealt to a boss by anything (player attacks, hazards).
#[derive(Event, Debug, Clone, Copy)]
pub struct BossDamageRequest {
    pub boss: Entity,
    pub amount: f32,
}

/// Physics contact on the boss body from a collision layer.
///
/// Парирует атаку только если слой попадает в `counter_mask` и атака cancel-able.
#[derive(Event, Debug, Clone, Copy)]
pub struct BossCounterHit {
    pub boss: Entity,
    pub layer: u32,
}

/// Lifecycle commands from the host (scene scripts, cutscenes, debug).
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum EncounterCommand {
    Start { boss: Entity },
    ForceAdvancePhase { boss: Entity },
    Reset { boss: Entity },
    SetInvulnerable { boss: Entity, invulnerable: bool },
}

impl EncounterCommand {
    pub fn boss(&self) -> Entity {
        match self {
            EncounterCommand::Start { boss }
            | EncounterCommand::ForceAdvancePhase { boss }
            | EncounterCommand::Reset { boss }
            | EncounterCommand::SetInvulnerable { boss, .. } => *boss,
        }
    }
}

/// Output stream: one event per `EncounterSignal`.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct BossSignal {
    pub boss: Entity,
    pub signal: EncounterSignal,
}

/// Encounter time scale (0 = pause, 1 = realtime).
#[derive(Resource, Debug, Clone, Copy, Reflect)]
#[reflect(Resource)]
pub struct EncounterClock {
    pub time_scale: f32,
}

impl Default for EncounterClock {
    fn default() -> Self {
        Self { time_scale: 1.0 }
    }
}

/// Маркер: босс побеждён. Вешается один раз, снимается при Reset.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Defeated;

/// Encounter systems, chained in FixedUpdate.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncounterSystems;

fn flush(boss: Entity, buffer: &mut Vec<EncounterSignal>, writer: &mut EventWriter<BossSignal>) {
    for signal in buffer.drain(..) {
        writer.write(BossSignal { boss, signal });
    }
}

/// Система: lifecycle команды хоста
pub fn process_encounter_commands(
    mut commands: Commands,
    mut requests: EventReader<EncounterCommand>,
    mut bosses: Query<&mut BossEncounter>,
    mut signals: EventWriter<BossSignal>,
) {
    let mut buffer = Vec::new();

    for request in requests.read() {
        let boss = request.boss();
        let Ok(mut encounter) = bosses.get_mut(boss) else {
            crate::log_warning(&format!("EncounterCommand for {:?}: not a boss", boss));
            continue;
        };

        match *request {
            EncounterCommand::Start { .. } => {
                encounter.start_intro(&mut buffer);
            }
            EncounterCommand::ForceAdvancePhase { .. } => {
                encounter.force_advance_phase(&mut buffer);
            }
            EncounterCommand::Reset { .. } => {
                encounter.reset(&mut buffer);
                commands.entity(boss).remove::<Defeated>();
            }
            EncounterCommand::SetInvulnerable { invulnerable, .. } => {
                encounter.set_invulnerable(invulnerable);
            }
        }

        flush(boss, &mut buffer, &mut signals);
    }
}

/// Система: урон по боссу (единственная точка входа: `BossEncounter::apply_damage`)
pub fn apply_boss_damage(
    mut requests: EventReader<BossDamageRequest>,
    mut bosses: Query<&mut BossEncounter>,
    mut signals: EventWriter<BossSignal>,
) {
    let mut buffer = Vec::new();

    for request in requests.read() {
        let Ok(mut encounter) = bosses.get_mut(request.boss) else {
            continue;
        };
        encounter.apply_damage(request.amount, &mut buffer);
        flush(request.boss, &mut buffer, &mut signals);
    }
}

/// Система: counter hits (parry)
pub fn process_counter_hits(
    mut hits: EventReader<BossCounterHit>,
    mut bosses: Query<&mut BossEncounter>,
    mut signals: EventWriter<BossSignal>,
) {
    let mut buffer = Vec::new();

    for hit in hits.read() {
        let Ok(mut encounter) = bosses.get_mut(hit.boss) else {
            continue;
        };
        encounter.notify_hit(hit.layer, &mut buffer);
        flush(hit.boss, &mut buffer, &mut signals);
    }
}

/// Система: тик всех энкаунтеров
///
/// Боссы обходятся в порядке Entity (общий RNG → порядок важен для детерминизма).
pub fn tick_boss_encounters(
    time: Res<Time>,
    clock: Res<EncounterClock>,
    mut rng: ResMut<DeterministicRng>,
    mut bosses: Query<(Entity, &mut BossEncounter, &KinematicState, Option<&BossTarget>)>,
    bodies: Query<&KinematicState, Without<BossEncounter>>,
    mut signals: EventWriter<BossSignal>,
) {
    let dt = time.delta_secs() * clock.time_scale.max(0.0);
    if dt <= 0.0 {
        return;
    }

    let mut order: Vec<Entity> = bosses.iter().map(|(entity, ..)| entity).collect();
    order.sort();

    let mut buffer = Vec::new();
    for boss in order {
        let Ok((_, mut encounter, body, target)) = bosses.get_mut(boss) else {
            continue;
        };

        let target_position = target
            .and_then(|target| bodies.get(target.entity).ok())
            .map(|body| body.position);
        let senses = body.senses(target_position);

        encounter.tick(dt, &senses, &mut rng.rng, &mut buffer);
        flush(boss, &mut buffer, &mut signals);
    }
}

/// Система: повесить `Defeated` на мёртвых боссов
pub fn mark_defeated_bosses(
    mut commands: Commands,
    bosses: Query<(Entity, &BossEncounter), Without<Defeated>>,
) {
    for (entity, encounter) in bosses.iter() {
        if encounter.is_dead() {
            commands.entity(entity).insert(Defeated);
        }
    }
}
