//! Property-based tests for generation and scoring rules
//!
//! Invariants:
//! - Card placement stays on the board and keeps its spacing
//! - Every generated problem's answer matches its operands
//! - Shuffles are permutations
//! - Brain age is always within [20, 80] and never rises with score

use proptest::prelude::*;

use brain_age_core::math::{generate_problem, points_for, Operator};
use brain_age_core::matrix::completion_score;
use brain_age_core::memory::{generate_placements, in_exclusion_zone, target_count};
use brain_age_core::rng::{random_int, seeded_rng, shuffled};
use brain_age_core::brain_age;

proptest! {
    #[test]
    fn placement_respects_board(seed in any::<u64>(), level in 1u32..=5) {
        let mut rng = seeded_rng(Some(seed));
        let placements = generate_placements(&mut rng, target_count(level));
        prop_assert_eq!(placements.len() as u32, level + 2);

        for (i, placement) in placements.iter().enumerate() {
            let p = placement.position;
            prop_assert!((15..=85).contains(&p.x));
            prop_assert!((20..=85).contains(&p.y));
            if !placement.forced {
                prop_assert!(!in_exclusion_zone(&p));
                for earlier in &placements[..i] {
                    prop_assert!(p.distance(&earlier.position) >= 18.0);
                }
            }
        }
    }

    #[test]
    fn problems_are_consistent(seed in any::<u64>(), time_left in 0u32..=60) {
        let mut rng = seeded_rng(Some(seed));
        let p = generate_problem(&mut rng, time_left);
        match p.op {
            Operator::Add => prop_assert_eq!(p.answer, p.a + p.b),
            Operator::Sub => {
                prop_assert!(p.b < p.a);
                prop_assert_eq!(p.answer, p.a - p.b);
            }
            Operator::Mul => {
                prop_assert!(time_left <= 30);
                prop_assert_eq!(p.answer, p.a * p.b);
            }
        }
        prop_assert!(p.answer > 0 && p.answer <= 999);
        prop_assert!(matches!(points_for(time_left), 10 | 20 | 30));
    }

    #[test]
    fn shuffle_is_permutation(seed in any::<u64>(), len in 0usize..64) {
        let items: Vec<usize> = (0..len).collect();
        let mut out = shuffled(&mut seeded_rng(Some(seed)), &items);
        prop_assert_eq!(out.len(), len);
        out.sort_unstable();
        prop_assert_eq!(out, items);
    }

    #[test]
    fn random_int_is_inclusive(seed in any::<u64>(), min in 0u32..1000, span in 0u32..1000) {
        let v = random_int(&mut seeded_rng(Some(seed)), min, min + span);
        prop_assert!(v >= min && v <= min + span);
    }

    #[test]
    fn brain_age_is_bounded_and_monotone(total in 0u32..20_000, extra in 0u32..5_000) {
        let age = brain_age(total);
        prop_assert!((20..=80).contains(&age));
        prop_assert!(brain_age(total + extra) <= age);
    }

    #[test]
    fn matrix_score_never_increases_with_time(ms in 0u64..200_000, extra in 0u64..10_000) {
        let score = completion_score(ms);
        prop_assert!(score <= 1200);
        prop_assert!(completion_score(ms + extra) <= score);
    }
}
