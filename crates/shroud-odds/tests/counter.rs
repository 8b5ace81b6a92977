//! composition counts against brute force, and the exact-table partition

use num_bigint::BigUint;
use proptest::prelude::*;

use shroud_odds::exact::{count_exactly, count_total, weighted_count_exactly, Weighting};
use shroud_odds::{binomial, count_all_capped, BoundedCompositionCounter, RecoveryParams};

/// solutions with the capped bins walked explicitly and the last bin taking
/// whatever is left
fn brute_force(total: u64, caps: &[u64]) -> u64 {
    match caps.split_first() {
        None => 1,
        Some((&cap, rest)) => (0..=cap.min(total))
            .map(|x| brute_force(total - x, rest))
            .sum(),
    }
}

fn brute_force_all_capped(total: u64, caps: &[u64]) -> u64 {
    match caps.split_first() {
        None => u64::from(total == 0),
        Some((&cap, rest)) => (0..=cap.min(total))
            .map(|x| brute_force_all_capped(total - x, rest))
            .sum(),
    }
}

proptest! {
    #[test]
    fn prop_counter_matches_brute_force(
        caps in prop::collection::vec(0u64..8, 0..5),
        total in 0u64..=30,
    ) {
        let counter = BoundedCompositionCounter::new(caps.clone()).unwrap();
        prop_assert_eq!(counter.bins(), caps.len() + 1);
        prop_assert_eq!(
            counter.count(total as i64),
            BigUint::from(brute_force(total, &caps))
        );
    }

    #[test]
    fn prop_all_capped_matches_brute_force(
        caps in prop::collection::vec(0u64..8, 1..6),
        total in 0u64..=30,
    ) {
        prop_assert_eq!(
            count_all_capped(total as i64, &caps).unwrap(),
            BigUint::from(brute_force_all_capped(total, &caps))
        );
    }

    #[test]
    fn prop_exact_counts_partition_total(
        trustees in 1usize..12,
        beta in 1usize..6,
        at_frac in 0.0f64..1.0,
        th in 20u32..=100,
        reached_frac in 0.0f64..=1.0,
    ) {
        let at = 1 + ((beta - 1) as f64 * at_frac) as usize;
        let params = RecoveryParams {
            trustees,
            anonymity: trustees,
            subsecrets: beta,
            absolute_threshold: at,
            leaf_threshold_percent: th,
        };
        let reached = (trustees as f64 * reached_frac) as usize;
        let slots = reached * params.shares_per_trustee();

        let mut sum = BigUint::from(0u32);
        for j in 0..=beta {
            sum += binomial(beta as u64, j as u64) * count_exactly(&params, slots, j).unwrap();
        }
        prop_assert_eq!(sum, count_total(&params, slots).unwrap());
    }

    #[test]
    fn prop_weightings_agree_with_counts(
        trustees in 1usize..12,
        beta in 1usize..6,
        at_frac in 0.0f64..1.0,
        th in 20u32..=100,
        reached_frac in 0.0f64..=1.0,
    ) {
        let at = 1 + ((beta - 1) as f64 * at_frac) as usize;
        let params = RecoveryParams {
            trustees,
            anonymity: trustees,
            subsecrets: beta,
            absolute_threshold: at,
            leaf_threshold_percent: th,
        };
        let gamma = params.shares_per_trustee();
        let slots = (trustees as f64 * reached_frac) as usize * gamma;

        let mut weighted = BigUint::from(0u32);
        for j in 0..=beta {
            // unit weights reproduce inclusion–exclusion
            prop_assert_eq!(
                weighted_count_exactly(&params, slots, j, Weighting::Patterns).unwrap(),
                count_exactly(&params, slots, j).unwrap()
            );
            weighted += binomial(beta as u64, j as u64)
                * weighted_count_exactly(&params, slots, j, Weighting::Slots).unwrap();
        }
        // every subset of the trustees' slots lands on exactly one composition
        prop_assert_eq!(weighted, binomial((trustees * gamma) as u64, slots as u64));
    }
}

#[test]
fn test_negative_total_is_empty() {
    let counter = BoundedCompositionCounter::new(vec![3, 3]).unwrap();
    assert_eq!(counter.count(-4), BigUint::from(0u32));
    assert_eq!(count_all_capped(-1, &[3]).unwrap(), BigUint::from(0u32));
}
