//! two-layer secret splitting
//!
//! parent layer: the secret is shared (AT, β) into β subsecrets.
//! leaves layer: each subsecret is shared (AT, m) with m = floor(100·AT/TH),
//! so TH% of a subsecret's shares is about AT of them.
//!
//! every coordinate comes from one [`CoordinateLedger`] and the leaf shares are
//! spread evenly over the trustees at random.

use rand::seq::SliceRandom;
use rand::{CryptoRng, RngCore};
use tracing::debug;
use zeroize::Zeroize;

use crate::field::{lagrange_coefficients, FieldBackend, Secret};
use crate::ledger::CoordinateLedger;
use crate::shamir::{deal, Share};
use crate::{Error, Result};

/// parameters of one split
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SplitParams {
    /// number of trustees `n`
    pub trustees: usize,
    /// `AT`: subsecrets needed for the secret, and shares needed per subsecret
    pub absolute_threshold: usize,
    /// `β`: number of subsecrets
    pub subsecrets: usize,
    /// `TH`: leaf threshold as a percentage of a subsecret's shares
    pub leaf_threshold_percent: u32,
}

impl SplitParams {
    pub fn validate(&self) -> Result<()> {
        if self.trustees == 0 {
            return Err(Error::NoTrustees);
        }
        if self.subsecrets == 0 {
            return Err(Error::NoSubsecrets);
        }
        if self.absolute_threshold == 0 {
            return Err(Error::ZeroThreshold);
        }
        if self.absolute_threshold > self.subsecrets {
            return Err(Error::ThresholdExceedsSubsecrets {
                threshold: self.absolute_threshold,
                subsecrets: self.subsecrets,
            });
        }
        if self.leaf_threshold_percent == 0 || self.leaf_threshold_percent > 100 {
            return Err(Error::InvalidPercentage(self.leaf_threshold_percent));
        }
        Ok(())
    }

    /// `m = floor(100·AT / TH)`
    pub fn shares_per_subsecret(&self) -> usize {
        100 * self.absolute_threshold / self.leaf_threshold_percent as usize
    }

    pub fn total_shares(&self) -> usize {
        self.shares_per_subsecret() * self.subsecrets
    }

    /// `ceil(total / n)`, the slot count of every packet
    pub fn max_shares_per_trustee(&self) -> usize {
        self.total_shares().div_ceil(self.trustees)
    }
}

/// one parent-layer share
#[derive(Clone, Debug)]
pub struct Subsecret<F: FieldBackend> {
    /// position among the β subsecrets
    pub id: usize,
    /// parent-layer x-coordinate
    pub x: u32,
    pub value: Vec<F>,
}

impl<F: FieldBackend> Subsecret<F> {
    /// encoding used inside integrity hashes
    pub fn value_bytes(&self) -> Vec<u8> {
        self.value.iter().flat_map(|v| v.to_bytes()).collect()
    }
}

impl<F: FieldBackend> Drop for Subsecret<F> {
    fn drop(&mut self) {
        self.value.zeroize();
    }
}

/// one leaf share and where it goes
#[derive(Clone, Debug)]
pub struct LeafShare<F: FieldBackend> {
    /// id of the subsecret this share belongs to
    pub subsecret: usize,
    /// destination trustee
    pub trustee: usize,
    pub share: Share<F>,
}

/// public description of the parent layer, enough to recombine subsecrets
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParentScheme {
    /// parent x-coordinate of each subsecret, indexed by id
    pub coordinates: Vec<u32>,
    /// subsecrets needed for the secret
    pub threshold: usize,
    /// leaf shares needed for one subsecret
    pub leaf_threshold: usize,
}

impl ParentScheme {
    /// interpolation weights for combining the given subsecrets at zero
    pub fn coefficients<F: FieldBackend>(&self, ids: &[usize]) -> Result<Vec<F>> {
        if ids.len() < self.threshold {
            return Err(Error::NotEnoughPoints {
                have: ids.len(),
                need: self.threshold,
            });
        }
        let xs = ids
            .iter()
            .map(|&id| self.coordinates.get(id).copied().ok_or(Error::InvalidEncoding))
            .collect::<Result<Vec<_>>>()?;
        lagrange_coefficients(&xs)
    }
}

/// everything one split produces
#[derive(Clone, Debug)]
pub struct SplitOutput<F: FieldBackend> {
    pub params: SplitParams,
    pub subsecrets: Vec<Subsecret<F>>,
    /// leaf shares, subsecret by subsecret
    pub leaves: Vec<LeafShare<F>>,
    pub scheme: ParentScheme,
    pub ledger: CoordinateLedger,
}

/// split `secret` into subsecrets and trustee-bound leaf shares
pub fn split<F, R>(params: &SplitParams, secret: &Secret<F>, rng: &mut R) -> Result<SplitOutput<F>>
where
    F: FieldBackend,
    R: RngCore + CryptoRng,
{
    params.validate()?;
    let at = params.absolute_threshold;
    let beta = params.subsecrets;
    let m = params.shares_per_subsecret();

    let mut ledger = CoordinateLedger::new(F::COORDINATE_LIMIT);

    // parent layer
    let parent_xs = ledger.issue_many(beta, rng)?;
    let parent_shares = deal(secret.elements(), at, &parent_xs, rng)?;
    let subsecrets: Vec<Subsecret<F>> = parent_shares
        .into_iter()
        .enumerate()
        .map(|(id, s)| Subsecret {
            id,
            x: s.x,
            value: s.value,
        })
        .collect();

    // leaves layer
    let mut leaves = Vec::with_capacity(beta * m);
    for sub in &subsecrets {
        let xs = ledger.issue_many(m, rng)?;
        for share in deal(&sub.value, at, &xs, rng)? {
            leaves.push(LeafShare {
                subsecret: sub.id,
                trustee: 0,
                share,
            });
        }
    }

    assign_trustees(&mut leaves, params.trustees, rng);

    debug!(
        field = F::NAME,
        subsecrets = beta,
        shares_per_subsecret = m,
        coordinates = ledger.len(),
        "split secret"
    );

    Ok(SplitOutput {
        params: *params,
        subsecrets,
        leaves,
        scheme: ParentScheme {
            coordinates: parent_xs,
            threshold: at,
            leaf_threshold: at,
        },
        ledger,
    })
}

/// every trustee gets floor(total/n) shares; the remainder goes one each to
/// randomly chosen trustees. which shares land where is a random shuffle.
fn assign_trustees<F: FieldBackend, R: RngCore>(leaves: &mut [LeafShare<F>], trustees: usize, rng: &mut R) {
    let total = leaves.len();
    let mut counts = vec![total / trustees; trustees];

    let mut lucky: Vec<usize> = (0..trustees).collect();
    lucky.shuffle(rng);
    for &t in lucky.iter().take(total % trustees) {
        counts[t] += 1;
    }

    let mut order: Vec<usize> = (0..total).collect();
    order.shuffle(rng);

    let mut next = order.into_iter();
    for (trustee, &count) in counts.iter().enumerate() {
        for idx in next.by_ref().take(count) {
            leaves[idx].trustee = trustee;
        }
    }
}
