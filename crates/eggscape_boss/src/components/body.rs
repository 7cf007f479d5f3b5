//! Body компоненты: то, что хост сообщает о физическом теле босса

use bevy::prelude::*;

use crate::encounter::BossSenses;

/// Kinematic snapshot of the boss body (host authoritative).
///
/// Хост (движок) пишет сюда после своего physics step:
/// - position/velocity в мировых единицах (y вверх)
/// - grounded: контакт с землёй
/// - on_screen: тело видно камерой (нужно для JumpSuperHigh)
///
/// ECS только читает и отвечает `MotionCommand` через `BossSignal`.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct KinematicState {
    pub position: Vec2,
    pub velocity: Vec2,
    pub grounded: bool,
    pub on_screen: bool,
}

impl Default for KinematicState {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            grounded: true,
            on_screen: true,
        }
    }
}

impl KinematicState {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Combine with the resolved target position into brain input.
    pub fn senses(&self, target: Option<Vec2>) -> BossSenses {
        BossSenses {
            position: self.position,
            velocity: self.velocity,
            grounded: self.grounded,
            on_screen: self.on_screen,
            target,
        }
    }
}
