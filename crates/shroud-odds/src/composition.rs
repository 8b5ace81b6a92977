//! bounded composition counting
//!
//! counts integer solutions of `x_0 + ... + x_{b-1} = M` with
//! `0 ≤ x_i ≤ r_i` for the first `b − 1` bins and the last bin free, by
//! inclusion–exclusion over subsets of the capped bins:
//!
//! ```text
//! Σ_J (−1)^|J| · C(M − Σ_{i∈J}(r_i + 1) + b − 1, b − 1)
//! ```
//!
//! terms whose upper argument falls below the lower one are skipped. the cost
//! is `2^(b−1)` binomials, fine for a few dozen subsecrets at most.

use num_bigint::{BigInt, BigUint};
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::{Error, Result};

/// capped bins beyond this make inclusion–exclusion impractical
pub const MAX_CAPPED_BINS: usize = 26;

/// `C(n, k)` over big integers, zero when `k > n`
pub fn binomial(n: u64, k: u64) -> BigUint {
    if k > n {
        return BigUint::zero();
    }
    let k = k.min(n - k);
    let mut acc = BigUint::one();
    for i in 0..k {
        // product of i+1 consecutive integers is divisible by (i+1)!
        acc = acc * (n - i) / (i + 1);
    }
    acc
}

/// counter over a fixed set of capped bins plus one unconstrained bin
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundedCompositionCounter {
    caps: Vec<u64>,
}

impl BoundedCompositionCounter {
    /// `caps` are `r_0..r_{b-2}`; the unconstrained bin is implicit
    pub fn new(caps: Vec<u64>) -> Result<Self> {
        if caps.len() > MAX_CAPPED_BINS {
            return Err(Error::invalid(format!(
                "{} capped bins, at most {MAX_CAPPED_BINS} supported",
                caps.len()
            )));
        }
        Ok(Self { caps })
    }

    /// number of bins including the unconstrained one
    pub fn bins(&self) -> usize {
        self.caps.len() + 1
    }

    pub fn caps(&self) -> &[u64] {
        &self.caps
    }

    /// solutions summing to `total`; a negative total has none
    pub fn count(&self, total: i64) -> BigUint {
        if total < 0 {
            return BigUint::zero();
        }
        let lower = self.caps.len() as i64;
        let mut sum = BigInt::zero();

        for subset in 0u64..(1u64 << self.caps.len()) {
            let mut removed: i64 = 0;
            for (i, cap) in self.caps.iter().enumerate() {
                if (subset >> i) & 1 == 1 {
                    removed = removed.saturating_add(*cap as i64 + 1);
                }
            }
            let upper = total - removed + lower;
            if upper < lower {
                continue;
            }
            let term = BigInt::from(binomial(upper as u64, lower as u64));
            if subset.count_ones() % 2 == 0 {
                sum += term;
            } else {
                sum -= term;
            }
        }

        if sum.is_negative() {
            BigUint::zero()
        } else {
            sum.magnitude().clone()
        }
    }
}

/// solutions of `Σ x_i = total` with every bin capped
///
/// equals `count(total) − count(total − 1)` on a counter whose free bin sits
/// after `caps`: the difference pins the free bin at zero.
pub fn count_all_capped(total: i64, caps: &[u64]) -> Result<BigUint> {
    if total < 0 {
        return Ok(BigUint::zero());
    }
    let counter = BoundedCompositionCounter::new(caps.to_vec())?;
    let with = counter.count(total);
    let without = counter.count(total - 1);
    if with < without {
        return Ok(BigUint::zero());
    }
    Ok(with - without)
}

/// `num / den` as f64 without overflowing on huge operands
pub fn ratio(num: &BigUint, den: &BigUint) -> f64 {
    if den.is_zero() {
        return 0.0;
    }
    let shift = den.bits().max(num.bits()).saturating_sub(60);
    let n = (num >> shift).to_f64().unwrap_or(0.0);
    let d = (den >> shift).to_f64().unwrap_or(0.0);
    if d == 0.0 {
        return 0.0;
    }
    n / d
}
