//! Timed telegraph playback.

use bevy::prelude::*;
use std::f32::consts::TAU;

use super::{Appearance, TelegraphSpec};

/// Допуск завершения в долях шага: остаток меньше `dt / 1000` не даёт лишнего кадра.
const COMPLETION_TOLERANCE: f64 = 1e-3;

/// One-shot cue, fired on the first frame of a windup.
#[derive(Debug, Clone, PartialEq)]
pub enum TelegraphCue {
    Sound(String),
    Particle(String),
}

/// Per-tick telegraph update for the host sprite.
#[derive(Debug, Clone, PartialEq)]
pub struct TelegraphFrame {
    /// Normalized progress in [0, 1]
    pub progress: f32,
    pub appearance: Appearance,
    pub cues: Vec<TelegraphCue>,
    /// Последний кадр; после него player уже вернул baseline
    pub completed: bool,
}

/// Telegraph playback state.
///
/// Lifecycle: `play` → `advance` каждый тик → завершение или `cleanup`.
/// После завершения/cleanup `current()` всегда равен baseline.
#[derive(Debug, Clone)]
pub struct TelegraphPlayer {
    spec: TelegraphSpec,
    duration: f32,
    /// f64, чтобы сумма шагов не дрейфовала на длинных windup'ах
    elapsed: f64,
    baseline: Appearance,
    current: Appearance,
    cues_fired: bool,
    finished: bool,
}

impl TelegraphPlayer {
    pub fn play(spec: TelegraphSpec, duration: f32, baseline: Appearance) -> Self {
        Self {
            spec,
            duration: duration.max(0.0),
            elapsed: 0.0,
            baseline,
            current: baseline,
            cues_fired: false,
            finished: false,
        }
    }

    /// Restart from t = 0. Cues fire again on the next frame.
    pub fn restart(&mut self) {
        self.elapsed = 0.0;
        self.current = self.baseline;
        self.cues_fired = false;
        self.finished = false;
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed as f32
    }

    pub fn baseline(&self) -> Appearance {
        self.baseline
    }

    pub fn current(&self) -> Appearance {
        self.current
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed() / self.duration).clamp(0.0, 1.0)
    }

    /// Advance by `dt` and produce this tick's frame. `None` once finished.
    pub fn advance(&mut self, dt: f32) -> Option<TelegraphFrame> {
        if self.finished {
            return None;
        }

        let dt = f64::from(dt.max(0.0));
        let duration = f64::from(self.duration);
        self.elapsed = (self.elapsed + dt).min(duration);
        let completed = self.elapsed >= duration - dt * COMPLETION_TOLERANCE;
        if completed {
            self.elapsed = duration;
        }

        let progress = self.progress();
        let appearance = self.sample(progress);

        let mut cues = Vec::new();
        if !self.cues_fired {
            self.cues_fired = true;
            if let Some(sound) = &self.spec.sound {
                cues.push(TelegraphCue::Sound(sound.clone()));
            }
            if let Some(particle) = &self.spec.particle {
                cues.push(TelegraphCue::Particle(particle.clone()));
            }
        }

        if completed {
            self.finished = true;
            self.current = self.baseline;
        } else {
            self.current = appearance;
        }

        Some(TelegraphFrame {
            progress,
            appearance,
            cues,
            completed,
        })
    }

    /// Forced early stop. Restores and returns the baseline.
    pub fn cleanup(&mut self) -> Appearance {
        self.finished = true;
        self.current = self.baseline;
        self.baseline
    }

    /// Lazy fixed-step sequence of the remaining frames.
    pub fn frames(&mut self, dt: f32) -> TelegraphFrames<'_> {
        TelegraphFrames { player: self, dt }
    }

    fn sample(&self, t: f32) -> Appearance {
        let mut appearance = self.baseline;

        if let Some(color) = &self.spec.color {
            appearance.color = self.baseline.color.lerp(color.target, color.curve.sample(t));
        }

        if let Some(squash) = &self.spec.squash {
            appearance.scale = self.baseline.scale.lerp(squash.scale, squash.curve.sample(t));
        }

        if let Some(pulse) = &self.spec.pulse {
            let wave = (TAU * pulse.frequency * self.elapsed()).sin();
            appearance.scale *= 1.0 + pulse.amplitude * wave;
        }

        if let Some(shake) = &self.spec.shake {
            // Детерминированный "шум": две несоизмеримые синусоиды, затухание к концу
            let phase = TAU * shake.frequency * self.elapsed();
            let falloff = 1.0 - t;
            appearance.offset = self.baseline.offset
                + Vec2::new(phase.sin(), (phase * 1.37).cos()) * shake.magnitude * falloff;
        }

        appearance
    }
}

/// Iterator over remaining telegraph frames at a fixed step.
pub struct TelegraphFrames<'a> {
    player: &'a mut TelegraphPlayer,
    dt: f32,
}

impl Iterator for TelegraphFrames<'_> {
    type Item = TelegraphFrame;

    fn next(&mut self) -> Option<Self::Item> {
        if self.dt <= 0.0 {
            return None;
        }
        self.player.advance(self.dt)
    }
}
