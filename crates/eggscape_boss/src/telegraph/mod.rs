//! Telegraph (windup) effects: authored spec + timed player.
//!
//! Чисто косметика: player считает прогресс `t ∈ [0, 1]` и выдаёт кадры
//! (цвет, масштаб, смещение, one-shot cues). Хост применяет их к спрайту.
//! Baseline восстанавливается всегда: и при завершении, и при отмене.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

pub mod player;


pub use player::{TelegraphCue, TelegraphFrame, TelegraphFrames, TelegraphPlayer};

/// Linear RGBA color (0..1 per channel).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);
    pub const RED: Rgba = Rgba::new(1.0, 0.15, 0.1, 1.0);
    pub const ORANGE: Rgba = Rgba::new(1.0, 0.55, 0.1, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn lerp(self, other: Rgba, t: f32) -> Rgba {
        Rgba {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Визуальное состояние спрайта босса, которое трогает telegraph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Appearance {
    pub color: Rgba,
    pub scale: Vec2,
    /// Shake displacement относительно позиции body
    #[serde(default)]
    pub offset: Vec2,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            color: Rgba::WHITE,
            scale: Vec2::ONE,
            offset: Vec2::ZERO,
        }
    }
}

/// Interpolation curve over normalized progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum Easing {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    SmoothStep,
    /// 0 → 1 → 0 (squash-and-return)
    PingPong,
    /// Piecewise-linear keyframes `(time, value)`, time ascending in [0, 1]
    Keyframes(Vec<(f32, f32)>),
}

impl Easing {
    pub fn sample(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::SmoothStep => t * t * (3.0 - 2.0 * t),
            Easing::PingPong => 1.0 - (2.0 * t - 1.0).abs(),
            Easing::Keyframes(keys) => sample_keyframes(keys, t),
        }
    }
}

fn sample_keyframes(keys: &[(f32, f32)], t: f32) -> f32 {
    let (Some(first), Some(last)) = (keys.first(), keys.last()) else {
        return t;
    };
    if t <= first.0 {
        return first.1;
    }
    if t >= last.0 {
        return last.1;
    }

    for pair in keys.windows(2) {
        let (t0, v0) = pair[0];
        let (t1, v1) = pair[1];
        if t >= t0 && t <= t1 {
            let span = t1 - t0;
            if span <= f32::EPSILON {
                return v1;
            }
            return v0 + (v1 - v0) * ((t - t0) / span);
        }
    }

    last.1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorTelegraph {
    pub target: Rgba,
    #[serde(default)]
    pub curve: Easing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SquashTelegraph {
    /// Масштаб в пике squash (например, (1.2, 0.8): присел перед прыжком)
    pub scale: Vec2,
    #[serde(default)]
    pub curve: Easing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PulseTelegraph {
    /// Относительная амплитуда (0.1 = ±10% масштаба)
    pub amplitude: f32,
    /// Hz
    pub frequency: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShakeTelegraph {
    /// World units; затухает к концу windup
    pub magnitude: f32,
    /// Hz
    pub frequency: f32,
}

/// Authored telegraph. Every channel is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TelegraphSpec {
    #[serde(default)]
    pub color: Option<ColorTelegraph>,
    #[serde(default)]
    pub squash: Option<SquashTelegraph>,
    #[serde(default)]
    pub pulse: Option<PulseTelegraph>,
    #[serde(default)]
    pub shake: Option<ShakeTelegraph>,
    /// Sound cue id (проигрывается на первом кадре)
    #[serde(default)]
    pub sound: Option<String>,
    /// Particle cue id (на первом кадре)
    #[serde(default)]
    pub particle: Option<String>,
}

impl TelegraphSpec {
    /// Красная вспышка + дрожь: стандартный windup для рывков.
    pub fn flash(color: Rgba) -> Self {
        Self {
            color: Some(ColorTelegraph {
                target: color,
                curve: Easing::EaseIn,
            }),
            shake: Some(ShakeTelegraph {
                magnitude: 0.08,
                frequency: 24.0,
            }),
            ..Default::default()
        }
    }

    /// Присед перед прыжком.
    pub fn crouch(scale: Vec2) -> Self {
        Self {
            squash: Some(SquashTelegraph {
                scale,
                curve: Easing::SmoothStep,
            }),
            ..Default::default()
        }
    }

    pub fn with_sound(mut self, cue: impl Into<String>) -> Self {
        self.sound = Some(cue.into());
        self
    }

    pub fn with_particle(mut self, cue: impl Into<String>) -> Self {
        self.particle = Some(cue.into());
        self
    }

    pub fn with_pulse(mut self, amplitude: f32, frequency: f32) -> Self {
        self.pulse = Some(PulseTelegraph {
            amplitude,
            frequency,
        });
        self
    }
}
