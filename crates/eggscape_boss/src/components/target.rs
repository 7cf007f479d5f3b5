//! Target компоненты

use bevy::prelude::*;

/// Typed reference to the entity the boss fights.
///
/// Резолвится один раз при спавне (никакого поиска по тегам в рантайме).
/// Если entity исчез или у него нет `KinematicState`: цель считается
/// отсутствующей, атаки с прицеливанием пропускаются.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct BossTarget {
    pub entity: Entity,
}

impl BossTarget {
    pub fn new(entity: Entity) -> Self {
        Self { entity }
    }
}

/// Marker for the player body (the usual `BossTarget`).
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
#[require(super::KinematicState)]
pub struct Player;
