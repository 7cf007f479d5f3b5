//! Weighted attack selection.
//!
//! RNG инжектится снаружи (`DeterministicRng` в ECS, seeded ChaCha в тестах),
//! глобальный `thread_rng` здесь не используется.

use rand::Rng;

use crate::definitions::AttackDefinition;

/// Pick an index from `weights` (each floored to 1).
///
/// `None` only for an empty list.
pub fn pick_weighted_index<R: Rng + ?Sized>(weights: &[u32], rng: &mut R) -> Option<usize> {
    if weights.is_empty() {
        return None;
    }

    let total: u64 = weights.iter().map(|w| u64::from((*w).max(1))).sum();
    let roll = rng.gen_range(0..total);

    let mut running = 0u64;
    for (index, weight) in weights.iter().enumerate() {
        running += u64::from((*weight).max(1));
        if running > roll {
            return Some(index);
        }
    }

    // Недостижимо при weight >= 1
    Some(0)
}

/// Pick an attack index from a phase pool. `None` → "no attack available".
pub fn pick_attack<R: Rng + ?Sized>(attacks: &[AttackDefinition], rng: &mut R) -> Option<usize> {
    let weights: Vec<u32> = attacks.iter().map(AttackDefinition::selection_weight).collect();
    pick_weighted_index(&weights, rng)
}

/// Convenience wrapper returning the definition itself.
pub fn pick<'a, R: Rng + ?Sized>(
    attacks: &'a [AttackDefinition],
    rng: &mut R,
) -> Option<&'a AttackDefinition> {
    pick_attack(attacks, rng).and_then(|index| attacks.get(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn pool() -> Vec<AttackDefinition> {
        vec![
            AttackDefinition::charge("Peck Rush").with_weight(1),
            AttackDefinition::jump_smash("Belly Flop").with_weight(3),
            AttackDefinition::super_jump("Sky Drop").with_weight(6),
        ]
    }

    #[test]
    fn test_empty_pool_yields_none() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(pick(&[], &mut rng).is_none());
        assert!(pick_weighted_index(&[], &mut rng).is_none());
    }

    #[test]
    fn test_single_attack_always_picked() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let attacks = vec![AttackDefinition::charge("Peck Rush").with_weight(0)];
        for _ in 0..100 {
            assert_eq!(pick_attack(&attacks, &mut rng), Some(0));
        }
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let attacks = pool();
        let mut a = ChaCha8Rng::seed_from_u64(42);
        let mut b = ChaCha8Rng::seed_from_u64(42);

        let run_a: Vec<_> = (0..64).map(|_| pick_attack(&attacks, &mut a)).collect();
        let run_b: Vec<_> = (0..64).map(|_| pick_attack(&attacks, &mut b)).collect();

        assert_eq!(run_a, run_b);
    }

    #[test]
    fn test_frequencies_converge_to_weights() {
        let attacks = pool();
        let mut rng = ChaCha8Rng::seed_from_u64(12345);
        let trials = 100_000;
        let mut counts = [0usize; 3];

        for _ in 0..trials {
            if let Some(index) = pick_attack(&attacks, &mut rng) {
                counts[index] += 1;
            }
        }

        let expected = [0.1, 0.3, 0.6];
        for (count, expected) in counts.iter().zip(expected) {
            let observed = *count as f64 / trials as f64;
            assert!(
                (observed - expected).abs() < 0.01,
                "observed {} expected {}",
                observed,
                expected
            );
        }
    }

    #[test]
    fn test_zero_weights_are_treated_as_one() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut seen = [false; 2];
        for _ in 0..200 {
            if let Some(index) = pick_weighted_index(&[0, 0], &mut rng) {
                seen[index] = true;
            }
        }
        assert!(seen[0] && seen[1]);
    }
}
