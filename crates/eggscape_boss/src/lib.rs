//! Eggscape Boss Encounter Core
//!
//! ECS-симуляция босс-файта на Bevy 0.16 (strategic layer)
//!
//! HYBRID ARCHITECTURE:
//! - ECS = strategic layer (encounter state, attack selection, telegraphs, patterns)
//! - Host engine = tactical layer (physics, rendering, audio, projectiles)
//!
//! Хост пишет `KinematicState` и шлёт input events, читает `BossSignal`.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod components;
pub mod definitions;
pub mod encounter;
pub mod layers;
pub mod logger;
pub mod pattern;
pub mod sandbox;
pub mod selector;
pub mod telegraph;

// Re-export основных типов для удобства
pub use components::*;
pub use definitions::{
    AttackDefinition, AttackKind, AttackParams, ConfigError, EncounterConfig, LoadError,
    PhaseDefinition,
};
pub use encounter::{
    BossCounterHit, BossDamageRequest, BossEncounter, BossSenses, BossSignal, DamageOutcome,
    Defeated, EncounterClock, EncounterCommand, EncounterHost, EncounterSignal, EncounterStage,
    EncounterSystems, MotionCommand, ProjectileSpawn,
};
pub use logger::{
    init_logger, log, log_error, log_info, log_warning, log_with_level, set_log_level,
    set_logger, set_logger_if_needed, LogLevel, LogPrinter,
};
pub use pattern::{BulletPatternSpec, PatternEmitter, PatternKind};
pub use telegraph::{Appearance, Rgba, TelegraphFrame, TelegraphPlayer, TelegraphSpec};

/// Seed, если хост не вставил свой `DeterministicRng`
pub const DEFAULT_SEED: u64 = 42;

/// Главный plugin энкаунтера
pub struct EncounterPlugin;

impl Plugin for EncounterPlugin {
    fn build(&self, app: &mut App) {
        // Не перетираем seed, который уже выставил хост (create_headless_app)
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(DEFAULT_SEED));
        }

        app
            // Fixed timestep 60Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            .init_resource::<EncounterClock>()
            .register_type::<KinematicState>()
            .register_type::<BossTarget>()
            .register_type::<Defeated>()
            .register_type::<EncounterClock>();

        // Регистрация событий
        app.add_event::<EncounterCommand>()
            .add_event::<BossDamageRequest>()
            .add_event::<BossCounterHit>()
            .add_event::<BossSignal>();

        // Порядок: команды → урон → counter hits → тик → маркеры
        app.add_systems(
            FixedUpdate,
            (
                encounter::process_encounter_commands,
                encounter::apply_boss_damage,
                encounter::process_counter_hits,
                encounter::tick_boss_encounters,
                encounter::mark_defeated_bosses,
            )
                .chain()
                .in_set(EncounterSystems),
        );
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .add_plugins(EncounterPlugin);

    app
}

/// Спавнит босса (и опционально связывает с целью)
pub fn spawn_boss(
    world: &mut World,
    config: EncounterConfig,
    body: KinematicState,
    target: Option<Entity>,
) -> Entity {
    let mut boss = world.spawn((BossEncounter::new(config), body));
    if let Some(target) = target {
        boss.insert(BossTarget::new(target));
    }
    boss.id()
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();
    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    // Сериализуем в байты через Debug (простейший способ)
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
