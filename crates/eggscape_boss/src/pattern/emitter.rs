use bevy::prelude::*;

use super::{deg_from_direction, direction_from_deg, ring, spread};
use super::{BulletPatternSpec, PatternKind, DEFAULT_AIM_DIRECTION};

/// Runtime wrapper around an authored pattern (owns the Sequence cursor).
#[derive(Debug, Clone)]
pub struct PatternEmitter {
    spec: BulletPatternSpec,
    cursor: usize,
}

impl PatternEmitter {
    pub fn new(spec: BulletPatternSpec) -> Self {
        Self { spec, cursor: 0 }
    }

    pub fn spec(&self) -> &BulletPatternSpec {
        &self.spec
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Directions for one volley.
    ///
    /// `elapsed`: время с начала стрельбы (для Spiral).
    pub fn generate(&mut self, elapsed: f32, emitter: Vec2, target: Vec2) -> Vec<Vec2> {
        match &self.spec.pattern {
            PatternKind::Radial { count, start_deg } => ring(*start_deg, *count),

            PatternKind::Spiral {
                arms,
                revolutions_per_sec,
            } => {
                let base = (elapsed * revolutions_per_sec * 360.0).rem_euclid(360.0);
                ring(base, *arms)
            }

            PatternKind::Fan {
                count,
                spread_deg,
                base_deg,
            } => spread(*base_deg, *spread_deg, *count),

            PatternKind::Aimed { count, spread_deg } => {
                let aim = (target - emitter).try_normalize().unwrap_or(DEFAULT_AIM_DIRECTION);
                spread(deg_from_direction(aim), *spread_deg, *count)
            }

            PatternKind::Sequence { angles_deg, looped } => {
                if angles_deg.is_empty() {
                    return Vec::new();
                }
                let index = self.cursor.min(angles_deg.len() - 1);
                let direction = direction_from_deg(angles_deg[index]);

                self.cursor = if *looped {
                    (index + 1) % angles_deg.len()
                } else {
                    (index + 1).min(angles_deg.len() - 1)
                };

                vec![direction]
            }
        }
    }
}
