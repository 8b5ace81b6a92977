//! aggregate contact model
//!
//! contacting `nRec` of the `a` members at random reaches `nTRec` trustees
//! with hypergeometric probability
//!
//! ```text
//! C(nT, nTRec) · C(a − nT, nRec − nTRec) / C(a, nRec)
//! ```
//!
//! and the recovery odds after `nRec` contacts weight the exact trustee table
//! by it. binomials are kept as factor lists so nothing overflows before the
//! final division.

use tracing::debug;

use crate::exact::exact_recovery_cdf;
use crate::params::{RecoveryParams, Requirement, Scheme};
use crate::{Error, Result};

/// a fraction kept as lists of integer factors
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FactoredRatio {
    numerators: Vec<u64>,
    denominators: Vec<u64>,
}

impl FactoredRatio {
    pub fn one() -> Self {
        Self::default()
    }

    /// `C(n, k)`, `None` when it would be zero
    pub fn binomial(n: u64, k: u64) -> Option<Self> {
        if k > n {
            return None;
        }
        let k = k.min(n - k);
        Some(Self {
            numerators: (0..k).map(|i| n - i).collect(),
            denominators: (1..=k).rev().collect(),
        })
    }

    pub fn times(mut self, other: Self) -> Self {
        self.numerators.extend(other.numerators);
        self.denominators.extend(other.denominators);
        self
    }

    pub fn over(mut self, other: Self) -> Self {
        self.numerators.extend(other.denominators);
        self.denominators.extend(other.numerators);
        self
    }

    /// evaluate, dividing whenever the running value passes 1000 so it stays
    /// in range for products of many large factors
    pub fn value(&self) -> f64 {
        let mut nums = self.numerators.iter();
        let mut dens = self.denominators.iter();
        let mut acc = 1.0f64;
        loop {
            if acc > 1000.0 {
                if let Some(&d) = dens.next() {
                    acc /= d as f64;
                    continue;
                }
            }
            let n = nums.next();
            let d = dens.next();
            if n.is_none() && d.is_none() {
                return acc;
            }
            if let Some(&n) = n {
                acc *= n as f64;
            }
            if let Some(&d) = d {
                acc /= d as f64;
            }
        }
    }
}

/// probability of reaching exactly `reached` trustees with `contacts` contacts
pub fn hypergeometric(params: &RecoveryParams, contacts: usize, reached: usize) -> f64 {
    let nt = params.trustees as u64;
    let a = params.anonymity as u64;
    let (contacts, reached) = (contacts as u64, reached as u64);
    if reached > contacts {
        return 0.0;
    }
    let hit = FactoredRatio::binomial(nt, reached);
    let miss = FactoredRatio::binomial(a - nt, contacts - reached);
    let all = FactoredRatio::binomial(a, contacts);
    match (hit, miss, all) {
        (Some(hit), Some(miss), Some(all)) => hit.times(miss).over(all).value(),
        _ => 0.0,
    }
}

/// recovery odds after `nRec` contacts, for `nRec` in `0..=a`
pub fn contact_recovery_cdf(params: &RecoveryParams, scheme: &Scheme) -> Result<Vec<f64>> {
    if let Requirement::Hinted { .. } = scheme.resolve(params)? {
        return Err(Error::AdaptiveContactOrder);
    }
    let table = exact_recovery_cdf(params, scheme)?;

    let curve: Vec<f64> = (0..=params.anonymity)
        .map(|contacts| {
            let lo = contacts.saturating_sub(params.anonymity - params.trustees);
            let hi = contacts.min(params.trustees);
            (lo..=hi)
                .map(|reached| hypergeometric(params, contacts, reached) * table[reached])
                .sum()
        })
        .collect();

    debug!(
        scheme = scheme.name(),
        anonymity = params.anonymity,
        "contact curve"
    );
    Ok(curve)
}
