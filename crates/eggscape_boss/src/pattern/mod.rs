//! Bullet-hell pattern generator.
//!
//! Pattern = чистая функция (elapsed, emitter, target) → набор unit directions
//! на один залп. Единственное состояние: курсор у `Sequence`, он живёт в
//! `PatternEmitter`, authored `BulletPatternSpec` не мутируется.
//!
//! Углы в градусах, против часовой стрелки от +X.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

pub mod emitter;

#[cfg(test)]
mod emitter_tests;

pub use emitter::PatternEmitter;

/// Direction used by `Aimed` when the target sits on the emitter.
///
/// Раннер: по умолчанию стреляем влево.
pub const DEFAULT_AIM_DIRECTION: Vec2 = Vec2::NEG_X;

/// Pattern kind with per-kind parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum PatternKind {
    /// N directions evenly around the full circle
    Radial {
        count: u32,
        #[serde(default)]
        start_deg: f32,
    },
    /// Rotating radial: base angle advances with elapsed time
    Spiral { arms: u32, revolutions_per_sec: f32 },
    /// `count` directions across `spread_deg`, centered on `base_deg`
    Fan {
        count: u32,
        spread_deg: f32,
        base_deg: f32,
    },
    /// Fan centered on the emitter → target direction
    Aimed { count: u32, spread_deg: f32 },
    /// One direction per volley from an authored list
    Sequence {
        angles_deg: Vec<f32>,
        #[serde(default = "default_looped")]
        looped: bool,
    },
}

fn default_looped() -> bool {
    true
}

/// Authored pattern + fire rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletPatternSpec {
    pub pattern: PatternKind,
    /// Volleys per second
    pub fire_rate: f32,
}

impl BulletPatternSpec {
    pub fn new(pattern: PatternKind, fire_rate: f32) -> Self {
        Self { pattern, fire_rate }
    }

    /// Seconds between volleys. `None` for a non-positive rate (never fires).
    pub fn fire_interval(&self) -> Option<f32> {
        if self.fire_rate > 0.0 && self.fire_rate.is_finite() {
            Some(1.0 / self.fire_rate)
        } else {
            None
        }
    }

    pub fn needs_target(&self) -> bool {
        matches!(self.pattern, PatternKind::Aimed { .. })
    }
}

/// Unit vector for an angle in degrees.
pub fn direction_from_deg(deg: f32) -> Vec2 {
    let rad = deg.to_radians();
    Vec2::new(rad.cos(), rad.sin())
}

/// Angle of a vector in degrees, in (-180, 180].
pub fn deg_from_direction(direction: Vec2) -> f32 {
    direction.y.atan2(direction.x).to_degrees()
}

/// Evenly spaced full circle starting at `start_deg`.
pub(crate) fn ring(start_deg: f32, count: u32) -> Vec<Vec2> {
    if count == 0 {
        return Vec::new();
    }
    let step = 360.0 / count as f32;
    (0..count)
        .map(|i| direction_from_deg(start_deg + step * i as f32))
        .collect()
}

/// `count` directions across `spread_deg` centered on `center_deg`.
pub(crate) fn spread(center_deg: f32, spread_deg: f32, count: u32) -> Vec<Vec2> {
    match count {
        0 => Vec::new(),
        1 => vec![direction_from_deg(center_deg)],
        _ => {
            let start = center_deg - spread_deg * 0.5;
            let step = spread_deg / (count - 1) as f32;
            (0..count)
                .map(|i| direction_from_deg(start + step * i as f32))
                .collect()
        }
    }
}
