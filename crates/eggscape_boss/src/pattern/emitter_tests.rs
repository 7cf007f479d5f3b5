//! Tests for pattern generation.

#[cfg(test)]
mod tests {
    use bevy::prelude::*;
    use crate::pattern::{
        deg_from_direction, BulletPatternSpec, PatternEmitter, PatternKind, DEFAULT_AIM_DIRECTION,
    };

    const EPS: f32 = 1e-4;

    fn emitter(pattern: PatternKind) -> PatternEmitter {
        PatternEmitter::new(BulletPatternSpec::new(pattern, 4.0))
    }

    fn angles(directions: &[Vec2]) -> Vec<f32> {
        directions
            .iter()
            .map(|d| deg_from_direction(*d).rem_euclid(360.0))
            .collect()
    }

    fn assert_angle(actual: f32, expected: f32) {
        let diff = (actual - expected).rem_euclid(360.0);
        let diff = diff.min(360.0 - diff);
        assert!(diff < 1e-3, "angle {} != {}", actual, expected);
    }

    #[test]
    fn test_radial_eight_spaced_45_degrees() {
        let mut radial = emitter(PatternKind::Radial {
            count: 8,
            start_deg: 0.0,
        });
        let dirs = radial.generate(0.0, Vec2::ZERO, Vec2::ZERO);

        assert_eq!(dirs.len(), 8);
        for (i, angle) in angles(&dirs).into_iter().enumerate() {
            assert_angle(angle, 45.0 * i as f32);
        }
        assert!(dirs.iter().all(|d| (d.length() - 1.0).abs() < EPS));
        assert!((dirs[0] - Vec2::X).length() < EPS);
    }

    #[test]
    fn test_radial_zero_count_is_empty() {
        let mut radial = emitter(PatternKind::Radial {
            count: 0,
            start_deg: 0.0,
        });
        assert!(radial.generate(1.0, Vec2::ZERO, Vec2::X).is_empty());
    }

    #[test]
    fn test_spiral_rotates_with_elapsed() {
        let mut spiral = emitter(PatternKind::Spiral {
            arms: 4,
            revolutions_per_sec: 0.25,
        });

        let at_zero = angles(&spiral.generate(0.0, Vec2::ZERO, Vec2::ZERO));
        let at_half = angles(&spiral.generate(0.5, Vec2::ZERO, Vec2::ZERO));

        assert_angle(at_zero[0], 0.0);
        assert_angle(at_zero[1], 90.0);
        // 0.5s × 0.25 rev/s × 360 = 45°
        assert_angle(at_half[0], 45.0);
        assert_angle(at_half[3], 315.0);
    }

    #[test]
    fn test_fan_centered_on_base() {
        let mut fan = emitter(PatternKind::Fan {
            count: 5,
            spread_deg: 60.0,
            base_deg: 180.0,
        });
        let dirs = angles(&fan.generate(0.0, Vec2::ZERO, Vec2::ZERO));

        assert_eq!(dirs.len(), 5);
        assert_angle(dirs[0], 150.0);
        assert_angle(dirs[2], 180.0);
        assert_angle(dirs[4], 210.0);
    }

    #[test]
    fn test_fan_single_shot_goes_along_base() {
        let mut fan = emitter(PatternKind::Fan {
            count: 1,
            spread_deg: 90.0,
            base_deg: 270.0,
        });
        let dirs = angles(&fan.generate(0.0, Vec2::ZERO, Vec2::ZERO));
        assert_eq!(dirs.len(), 1);
        assert_angle(dirs[0], 270.0);
    }

    #[test]
    fn test_aimed_points_at_target() {
        let mut aimed = emitter(PatternKind::Aimed {
            count: 3,
            spread_deg: 20.0,
        });
        let dirs = angles(&aimed.generate(0.0, Vec2::new(10.0, 0.0), Vec2::new(10.0, 5.0)));

        assert_angle(dirs[0], 80.0);
        assert_angle(dirs[1], 90.0);
        assert_angle(dirs[2], 100.0);
    }

    #[test]
    fn test_aimed_coincident_target_uses_default_direction() {
        let mut aimed = emitter(PatternKind::Aimed {
            count: 1,
            spread_deg: 0.0,
        });
        let position = Vec2::new(3.0, 4.0);
        let dirs = aimed.generate(0.0, position, position);

        assert_eq!(dirs.len(), 1);
        assert!((dirs[0] - DEFAULT_AIM_DIRECTION).length() < EPS);
    }

    #[test]
    fn test_sequence_loops() {
        let mut sequence = emitter(PatternKind::Sequence {
            angles_deg: vec![0.0, 90.0],
            looped: true,
        });

        let fired: Vec<f32> = (0..3)
            .flat_map(|_| angles(&sequence.generate(0.0, Vec2::ZERO, Vec2::ZERO)))
            .collect();

        assert_eq!(fired.len(), 3);
        assert_angle(fired[0], 0.0);
        assert_angle(fired[1], 90.0);
        assert_angle(fired[2], 0.0);
    }

    #[test]
    fn test_sequence_clamps_without_loop() {
        let mut sequence = emitter(PatternKind::Sequence {
            angles_deg: vec![0.0, 90.0, 180.0],
            looped: false,
        });

        let fired: Vec<f32> = (0..5)
            .flat_map(|_| angles(&sequence.generate(0.0, Vec2::ZERO, Vec2::ZERO)))
            .collect();

        assert_angle(fired[2], 180.0);
        assert_angle(fired[3], 180.0);
        assert_angle(fired[4], 180.0);
        assert_eq!(sequence.cursor(), 2);
    }

    #[test]
    fn test_sequence_empty_list_fires_nothing() {
        let mut sequence = emitter(PatternKind::Sequence {
            angles_deg: vec![],
            looped: true,
        });
        assert!(sequence.generate(0.0, Vec2::ZERO, Vec2::ZERO).is_empty());
    }

    #[test]
    fn test_fire_interval() {
        assert_eq!(BulletPatternSpec::new(PatternKind::Radial { count: 1, start_deg: 0.0 }, 4.0).fire_interval(), Some(0.25));
        assert_eq!(BulletPatternSpec::new(PatternKind::Radial { count: 1, start_deg: 0.0 }, 0.0).fire_interval(), None);
    }
}
