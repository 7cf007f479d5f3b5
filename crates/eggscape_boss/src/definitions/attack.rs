//! Attack definitions (authored, read-only at runtime).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::pattern::{BulletPatternSpec, PatternKind};
use crate::telegraph::{Rgba, TelegraphSpec};

/// Attack type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Reflect)]
pub enum AttackKind {
    Charge,
    JumpSmash,
    JumpSuperHigh,
    BulletHell,
}

/// Рывок по горизонтали. Единственная атака, которую можно парировать.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChargeParams {
    pub dash_speed: f32,
    /// units/sec²; 0 = мгновенно dash_speed
    pub acceleration: f32,
    pub dash_duration: f32,
    /// x: от игрока (против facing), y: вверх
    pub knockback: Vec2,
    pub stun_duration: f32,
    /// Урон, который босс получает при парировании
    pub counter_damage: f32,
}

impl Default for ChargeParams {
    fn default() -> Self {
        Self {
            dash_speed: 14.0,
            acceleration: 40.0,
            dash_duration: 1.2,
            knockback: Vec2::new(6.0, 4.0),
            stun_duration: 1.0,
            counter_damage: 8.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JumpSmashParams {
    pub jump_impulse: f32,
    pub area_radius: f32,
    pub area_damage: f32,
    /// Сдаёмся ждать приземления через N секунд
    pub land_timeout: f32,
}

impl Default for JumpSmashParams {
    fn default() -> Self {
        Self {
            jump_impulse: 12.0,
            area_radius: 3.0,
            area_damage: 1.0,
            land_timeout: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuperJumpParams {
    pub jump_impulse: f32,
    pub offscreen_timeout: f32,
    /// Сколько следим за x цели перед lock
    pub track_delay: f32,
    pub fall_speed: f32,
    pub area_radius: f32,
    pub area_damage: f32,
    pub shockwave_speed: f32,
    pub land_timeout: f32,
}

impl Default for SuperJumpParams {
    fn default() -> Self {
        Self {
            jump_impulse: 30.0,
            offscreen_timeout: 2.0,
            track_delay: 1.2,
            fall_speed: 25.0,
            area_radius: 2.5,
            area_damage: 1.0,
            shockwave_speed: 9.0,
            land_timeout: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulletHellParams {
    /// Ближе этого: сначала отходим
    pub min_distance: f32,
    pub retreat_distance: f32,
    pub retreat_speed: f32,
    pub retreat_timeout: f32,
    pub fire_duration: f32,
    pub pattern: BulletPatternSpec,
    pub projectile_speed: f32,
    pub projectile_lifetime: f32,
    /// Collision layers the projectile damages
    pub hit_mask: u32,
}

impl Default for BulletHellParams {
    fn default() -> Self {
        Self {
            min_distance: 4.0,
            retreat_distance: 8.0,
            retreat_speed: 6.0,
            retreat_timeout: 1.5,
            fire_duration: 3.0,
            pattern: BulletPatternSpec::new(
                PatternKind::Radial {
                    count: 12,
                    start_deg: 0.0,
                },
                2.0,
            ),
            projectile_speed: 7.0,
            projectile_lifetime: 4.0,
            hit_mask: crate::layers::PLAYER,
        }
    }
}

/// Type-specific parameters; the variant is the attack's type tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AttackParams {
    Charge(ChargeParams),
    JumpSmash(JumpSmashParams),
    JumpSuperHigh(SuperJumpParams),
    BulletHell(BulletHellParams),
}

impl AttackParams {
    pub fn kind(&self) -> AttackKind {
        match self {
            AttackParams::Charge(_) => AttackKind::Charge,
            AttackParams::JumpSmash(_) => AttackKind::JumpSmash,
            AttackParams::JumpSuperHigh(_) => AttackKind::JumpSuperHigh,
            AttackParams::BulletHell(_) => AttackKind::BulletHell,
        }
    }
}

fn default_weight() -> u32 {
    1
}

/// One authored attack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackDefinition {
    pub name: String,
    /// Telegraph duration (seconds)
    pub windup: f32,
    /// Pause after execution (seconds)
    pub recovery: f32,
    #[serde(default = "default_weight")]
    pub weight: u32,
    #[serde(default)]
    pub telegraph: TelegraphSpec,
    pub params: AttackParams,
}

impl AttackDefinition {
    pub fn new(name: impl Into<String>, params: AttackParams) -> Self {
        Self {
            name: name.into(),
            windup: 0.6,
            recovery: 0.5,
            weight: 1,
            telegraph: TelegraphSpec::default(),
            params,
        }
    }

    pub fn charge(name: impl Into<String>) -> Self {
        Self::new(name, AttackParams::Charge(ChargeParams::default()))
            .with_telegraph(TelegraphSpec::flash(Rgba::RED).with_sound("sfx_charge_windup"))
    }

    pub fn jump_smash(name: impl Into<String>) -> Self {
        Self::new(name, AttackParams::JumpSmash(JumpSmashParams::default()))
            .with_telegraph(TelegraphSpec::crouch(Vec2::new(1.25, 0.75)))
    }

    pub fn super_jump(name: impl Into<String>) -> Self {
        Self::new(name, AttackParams::JumpSuperHigh(SuperJumpParams::default()))
            .with_timing(0.8, 0.8)
            .with_telegraph(
                TelegraphSpec::crouch(Vec2::new(1.4, 0.6)).with_particle("fx_dust_ring"),
            )
    }

    pub fn bullet_hell(name: impl Into<String>, pattern: BulletPatternSpec) -> Self {
        Self::new(
            name,
            AttackParams::BulletHell(BulletHellParams {
                pattern,
                ..Default::default()
            }),
        )
        .with_telegraph(TelegraphSpec::flash(Rgba::ORANGE).with_pulse(0.08, 5.0))
    }

    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_timing(mut self, windup: f32, recovery: f32) -> Self {
        self.windup = windup;
        self.recovery = recovery;
        self
    }

    pub fn with_telegraph(mut self, telegraph: TelegraphSpec) -> Self {
        self.telegraph = telegraph;
        self
    }

    pub fn kind(&self) -> AttackKind {
        self.params.kind()
    }

    /// Weight used by the selector (floored to 1).
    pub fn selection_weight(&self) -> u32 {
        self.weight.max(1)
    }

    /// Нужна ли позиция цели для запуска атаки.
    pub fn requires_target(&self) -> bool {
        match &self.params {
            AttackParams::Charge(_) | AttackParams::JumpSuperHigh(_) => true,
            AttackParams::JumpSmash(_) => false,
            AttackParams::BulletHell(params) => params.pattern.needs_target(),
        }
    }

    /// Whether a counter hit can abort this attack mid-execution.
    pub fn is_cancelable(&self) -> bool {
        matches!(self.params, AttackParams::Charge(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_follows_params() {
        assert_eq!(AttackDefinition::charge("Peck Rush").kind(), AttackKind::Charge);
        assert_eq!(AttackDefinition::jump_smash("Belly Flop").kind(), AttackKind::JumpSmash);
        assert_eq!(AttackDefinition::super_jump("Sky Drop").kind(), AttackKind::JumpSuperHigh);
    }

    #[test]
    fn test_selection_weight_floors_to_one() {
        let attack = AttackDefinition::charge("Peck Rush").with_weight(0);
        assert_eq!(attack.selection_weight(), 1);
        assert_eq!(attack.with_weight(5).selection_weight(), 5);
    }

    #[test]
    fn test_requires_target() {
        assert!(AttackDefinition::charge("a").requires_target());
        assert!(!AttackDefinition::jump_smash("b").requires_target());

        let radial = BulletPatternSpec::new(PatternKind::Radial { count: 8, start_deg: 0.0 }, 2.0);
        assert!(!AttackDefinition::bullet_hell("c", radial).requires_target());

        let aimed = BulletPatternSpec::new(PatternKind::Aimed { count: 3, spread_deg: 30.0 }, 2.0);
        assert!(AttackDefinition::bullet_hell("d", aimed).requires_target());
    }

    #[test]
    fn test_only_charge_is_cancelable() {
        assert!(AttackDefinition::charge("a").is_cancelable());
        assert!(!AttackDefinition::jump_smash("b").is_cancelable());
        assert!(!AttackDefinition::super_jump("c").is_cancelable());
    }
}
