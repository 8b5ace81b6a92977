//! exact recovery probability by number of responding trustees
//!
//! `nTRec` trustees together hold `M = nTRec·γ` of the `nT·γ` slots, a
//! uniformly random subset. the slots spread over β subsecret bins (m shares
//! each) and one filler bin (F slots). a composition `x` of `M` over those
//! bins is hit by
//!
//! ```text
//! C(m, x_1) ··· C(m, x_β) · C(F, x_F)
//! ```
//!
//! of the `C(nT·γ, M)` subsets, and `p(nTRec)` is the weighted share of
//! compositions in which at least k subsecrets reach AT. by symmetry the
//! count with exactly j of them is `C(β, j)` times the count for one fixed
//! choice of j subsecrets.
//!
//! the unweighted composition count comes from inclusion–exclusion by
//! shifting the j recovered bins down by AT:
//!
//! ```text
//! C(β, j) · all_capped(M − j·AT, [m−AT]^j ++ [AT−1]^(β−j) ++ [F])
//! ```

use num_bigint::BigUint;
use num_traits::{One, Zero};
use tracing::debug;

use crate::composition::{binomial, count_all_capped, ratio};
use crate::params::{RecoveryParams, Requirement, Scheme};
use crate::Result;

/// how a composition counts
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Weighting {
    /// once per composition
    Patterns,
    /// once per choice of the slots behind it
    Slots,
}

impl Weighting {
    fn weight(self, bin_size: u64, x: u64) -> BigUint {
        match self {
            Weighting::Patterns => BigUint::one(),
            Weighting::Slots => binomial(bin_size, x),
        }
    }
}

/// `Σ w(x)·z^x` for `x` in `lo..=hi`, cut at `degree`
fn series(weighting: Weighting, bin_size: u64, lo: u64, hi: u64, degree: usize) -> Vec<BigUint> {
    let top = hi.min(degree as u64);
    let mut out = vec![BigUint::zero(); top as usize + 1];
    for x in lo..=top {
        out[x as usize] = weighting.weight(bin_size, x);
    }
    out
}

fn mul_truncated(a: &[BigUint], b: &[BigUint], degree: usize) -> Vec<BigUint> {
    let len = (a.len() + b.len()).saturating_sub(1).min(degree + 1);
    let mut out = vec![BigUint::zero(); len];
    for (i, x) in a.iter().enumerate().take(len) {
        if x.is_zero() {
            continue;
        }
        for (j, y) in b.iter().enumerate().take(len - i) {
            out[i + j] += x * y;
        }
    }
    out
}

/// compositions of `total` slots in which one fixed set of `j` subsecrets
/// reaches AT and the rest stay below it, counted under `weighting`
pub fn weighted_count_exactly(
    params: &RecoveryParams,
    total: usize,
    j: usize,
    weighting: Weighting,
) -> Result<BigUint> {
    params.validate()?;
    let beta = params.subsecrets;
    if j > beta {
        return Ok(BigUint::zero());
    }
    let at = params.absolute_threshold as u64;
    let m = params.shares_per_subsecret() as u64;
    let filler = params.filler() as u64;

    let above = series(weighting, m, at, m, total);
    let below = series(weighting, m, 0, at - 1, total);
    let mut acc = series(weighting, filler, 0, filler, total);
    for _ in 0..j {
        acc = mul_truncated(&acc, &above, total);
    }
    for _ in j..beta {
        acc = mul_truncated(&acc, &below, total);
    }
    Ok(acc.get(total).cloned().unwrap_or_default())
}

/// unweighted compositions of `total` slots in which exactly `j` subsecrets
/// reach AT, before the `C(β, j)` choice of which ones
pub fn count_exactly(params: &RecoveryParams, total: usize, j: usize) -> Result<BigUint> {
    params.validate()?;
    let beta = params.subsecrets;
    let at = params.absolute_threshold as u64;
    let m = params.shares_per_subsecret() as u64;
    let filler = params.filler() as u64;
    if j > beta || m < at {
        return Ok(BigUint::zero());
    }

    let mut caps = Vec::with_capacity(beta + 1);
    caps.extend(std::iter::repeat(m - at).take(j));
    caps.extend(std::iter::repeat(at - 1).take(beta - j));
    caps.push(filler);

    let shifted = total as i64 - (j as u64 * at) as i64;
    count_all_capped(shifted, &caps)
}

/// every unweighted composition of `total` slots into β subsecret bins and
/// the filler bin
pub fn count_total(params: &RecoveryParams, total: usize) -> Result<BigUint> {
    let m = params.shares_per_subsecret() as u64;
    let mut caps = vec![m; params.subsecrets];
    caps.push(params.filler() as u64);
    count_all_capped(total as i64, &caps)
}

/// `p(nTRec)` for a subsecret requirement of `k`
fn subsecret_probability(params: &RecoveryParams, trustees: usize, k: usize) -> Result<f64> {
    let gamma = params.shares_per_trustee();
    let total = trustees * gamma;
    let denominator = binomial((params.trustees * gamma) as u64, total as u64);
    if denominator.is_zero() {
        return Ok(0.0);
    }

    let beta = params.subsecrets;
    let mut numerator = BigUint::zero();
    for j in k..=beta {
        numerator += binomial(beta as u64, j as u64) * weighted_count_exactly(params, total, j, Weighting::Slots)?;
    }
    Ok(ratio(&numerator, &denominator))
}

/// `p(nTRec)` for `nTRec` in `0..=nT`
pub fn exact_recovery_cdf(params: &RecoveryParams, scheme: &Scheme) -> Result<Vec<f64>> {
    let requirement = scheme.resolve(params)?;
    let table = (0..=params.trustees)
        .map(|t| match requirement {
            Requirement::Subsecrets(k) | Requirement::Hinted { subsecrets: k, .. } => {
                subsecret_probability(params, t, k)
            }
            Requirement::Trustees(k) => Ok(if t >= k { 1.0 } else { 0.0 }),
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(
        scheme = scheme.name(),
        trustees = params.trustees,
        subsecrets = params.subsecrets,
        "exact trustee table"
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(trustees: usize, beta: usize, at: usize, th: u32) -> RecoveryParams {
        RecoveryParams {
            trustees,
            anonymity: trustees * 3,
            subsecrets: beta,
            absolute_threshold: at,
            leaf_threshold_percent: th,
        }
    }

    #[test]
    fn test_endpoints() {
        let params = p(10, 4, 2, 50);
        let table = exact_recovery_cdf(&params, &Scheme::Additive).unwrap();
        assert_eq!(table.len(), 11);
        assert_eq!(table[0], 0.0);
        assert!((table[10] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_probabilities_in_range() {
        let params = p(12, 5, 3, 60);
        let table = exact_recovery_cdf(&params, &Scheme::Additive).unwrap();
        assert!(table.iter().all(|v| (0.0..=1.0 + 1e-12).contains(v)), "{:?}", table);
    }

    #[test]
    fn test_too_few_shares_is_zero() {
        // 3 trustees hold 6 slots, 3 subsecrets need 9 shares
        let params = RecoveryParams {
            trustees: 20,
            anonymity: 150,
            subsecrets: 6,
            absolute_threshold: 3,
            leaf_threshold_percent: 50,
        };
        let table = exact_recovery_cdf(&params, &Scheme::Additive).unwrap();
        assert_eq!(table[3], 0.0);
        assert_eq!(table[4], 0.0);
        assert!(table[5] > 0.0);
    }

    #[test]
    fn test_baseline_step() {
        let params = p(10, 4, 2, 50);
        let table = exact_recovery_cdf(&params, &Scheme::Baseline { threshold_percent: 40 }).unwrap();
        assert_eq!(&table[..4], &[0.0; 4]);
        assert!(table[4..].iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_hinted_matches_additive() {
        let params = p(8, 4, 2, 50);
        assert_eq!(
            exact_recovery_cdf(&params, &Scheme::Hinted { hints: 2 }).unwrap(),
            exact_recovery_cdf(&params, &Scheme::Additive).unwrap()
        );
    }

    #[test]
    fn test_two_pairs_by_hand() {
        // slots a a b b, one per trustee, any one complete pair recovers
        let params = p(4, 2, 2, 100);
        let table = exact_recovery_cdf(&params, &Scheme::Thresholded { upper_percent: 50 }).unwrap();
        assert_eq!(&table[..2], &[0.0, 0.0]);
        assert!((table[2] - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(&table[3..], &[1.0, 1.0]);
    }

    #[test]
    fn test_slot_weighted_table() {
        let params = RecoveryParams {
            trustees: 20,
            anonymity: 150,
            subsecrets: 6,
            absolute_threshold: 3,
            leaf_threshold_percent: 50,
        };
        let table = exact_recovery_cdf(&params, &Scheme::Additive).unwrap();
        for (t, want) in [(5, 0.004577), (6, 0.059385), (7, 0.272181), (9, 0.893055), (12, 0.999988)] {
            assert!((table[t] - want).abs() < 1e-5, "t={t}: {}", table[t]);
        }
    }

    #[test]
    fn test_weightings_differ() {
        // m = 4 shares per subsecret, so slot weights are not all one
        let params = p(10, 4, 2, 50);
        let total = 6;
        let patterns = weighted_count_exactly(&params, total, 2, Weighting::Patterns).unwrap();
        let slots = weighted_count_exactly(&params, total, 2, Weighting::Slots).unwrap();
        assert_eq!(patterns, count_exactly(&params, total, 2).unwrap());
        assert!(slots > patterns);
    }

    #[test]
    fn test_stricter_upper_threshold_is_harder() {
        let params = p(10, 6, 2, 50);
        let loose = exact_recovery_cdf(&params, &Scheme::Additive).unwrap();
        let strict = exact_recovery_cdf(&params, &Scheme::Thresholded { upper_percent: 100 }).unwrap();
        for (s, l) in strict.iter().zip(&loose) {
            assert!(s <= l);
        }
    }
}
