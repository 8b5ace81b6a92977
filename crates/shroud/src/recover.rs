//! owner-side recovery from contacted packets
//!
//! packets arrive in contact order. after each one, every combination of
//! `leaf_threshold` unused shares that touches the new packet is interpolated
//! and the candidate subsecret is checked against the hashes carried by each
//! share's own packet. a verified candidate fixes one parent coordinate; once
//! `threshold` of them are known the secret is interpolated and checked
//! against a slot-0 hash.
//!
//! the search is combinatorial in the pool size, fine for small schemes.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::field::{FieldBackend, Secret};
use crate::packet::{secret_digest, share_digest, SharePacket};
use crate::shamir::{combine, Share};
use crate::split::ParentScheme;
use crate::{Error, Result};

/// a share waiting in the pool, by packet and slot
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PoolEntry {
    packet: usize,
    slot: usize,
}

/// incremental reconstructor
#[derive(Debug)]
pub struct Reconstructor<F: FieldBackend> {
    scheme: ParentScheme,
    packets: Vec<SharePacket<F>>,
    pool: Vec<PoolEntry>,
    /// parent shares verified so far
    recovered: Vec<Share<F>>,
    recovered_xs: HashSet<u32>,
    secret: Option<Secret<F>>,
}

impl<F: FieldBackend> Reconstructor<F> {
    pub fn new(scheme: ParentScheme) -> Result<Self> {
        if scheme.threshold == 0 || scheme.leaf_threshold == 0 {
            return Err(Error::ZeroThreshold);
        }
        if scheme.threshold > scheme.coordinates.len() {
            return Err(Error::ThresholdExceedsSubsecrets {
                threshold: scheme.threshold,
                subsecrets: scheme.coordinates.len(),
            });
        }
        Ok(Self {
            scheme,
            packets: Vec::new(),
            pool: Vec::new(),
            recovered: Vec::new(),
            recovered_xs: HashSet::new(),
            secret: None,
        })
    }

    /// packets absorbed so far
    pub fn contacted(&self) -> usize {
        self.packets.len()
    }

    /// number of subsecrets verified so far
    pub fn recovered_subsecrets(&self) -> usize {
        self.recovered.len()
    }

    pub fn secret(&self) -> Option<&Secret<F>> {
        self.secret.as_ref()
    }

    /// take in one more packet; `Some` once the secret is rebuilt and verified
    pub fn absorb(&mut self, packet: SharePacket<F>) -> Result<Option<Secret<F>>> {
        if self.secret.is_some() {
            return Ok(self.secret.clone());
        }

        let newest = self.packets.len();
        self.pool
            .extend((0..packet.share_data.len()).map(|slot| PoolEntry { packet: newest, slot }));
        self.packets.push(packet);

        while self.recovered.len() < self.scheme.threshold {
            if !self.find_subsecret(newest) {
                break;
            }
        }

        if self.recovered.len() < self.scheme.threshold {
            return Ok(None);
        }
        self.finish()
    }

    /// search the pool for one new subsecret, return whether one was found
    fn find_subsecret(&mut self, newest: usize) -> bool {
        let k = self.scheme.leaf_threshold;
        let n = self.pool.len();
        if n < k {
            return false;
        }

        let mut combo: Vec<usize> = (0..k).collect();
        loop {
            if combo.iter().any(|&i| self.pool[i].packet == newest) {
                if let Some((parent_x, value)) = self.try_combination(&combo) {
                    self.accept(parent_x, value);
                    return true;
                }
            }
            if !next_combination(&mut combo, n) {
                return false;
            }
        }
    }

    fn share_at(&self, entry: PoolEntry) -> &Share<F> {
        &self.packets[entry.packet].share_data[entry.slot]
    }

    /// does `entry` carry a matching hash for this subsecret in its own packet
    fn verifies(&self, entry: PoolEntry, parent_x: u32, value: &[F]) -> bool {
        let packet = &self.packets[entry.packet];
        let digest = share_digest(&packet.salt, parent_x, value, self.share_at(entry));
        packet.relevant_hashes.iter().skip(1).any(|h| *h == digest)
    }

    fn try_combination(&self, combo: &[usize]) -> Option<(u32, Vec<F>)> {
        let shares: Vec<Share<F>> = combo
            .iter()
            .map(|&i| self.share_at(self.pool[i]).clone())
            .collect();
        // duplicate or zero coordinates cannot come from one ledger
        let value = combine(&shares).ok()?;

        self.scheme
            .coordinates
            .iter()
            .copied()
            .filter(|x| !self.recovered_xs.contains(x))
            .find(|&x| combo.iter().all(|&i| self.verifies(self.pool[i], x, &value)))
            .map(|x| (x, value))
    }

    /// record a subsecret and drop every pooled share that belongs to it
    fn accept(&mut self, parent_x: u32, value: Vec<F>) {
        let before = self.pool.len();
        let pool = std::mem::take(&mut self.pool);
        self.pool = pool
            .into_iter()
            .filter(|&e| !self.verifies(e, parent_x, &value))
            .collect();

        debug!(
            parent_x,
            shares = before - self.pool.len(),
            recovered = self.recovered.len() + 1,
            "subsecret verified"
        );

        self.recovered_xs.insert(parent_x);
        self.recovered.push(Share { x: parent_x, value });
    }

    fn finish(&mut self) -> Result<Option<Secret<F>>> {
        let elements = combine(&self.recovered[..self.scheme.threshold])?;
        let secret = Secret::from_elements(elements)?;

        let confirmed = self
            .packets
            .iter()
            .any(|p| p.relevant_hashes.first() == Some(&secret_digest(&p.salt, &secret)));
        if !confirmed {
            warn!(
                contacted = self.packets.len(),
                "recombined secret matches no slot-0 hash"
            );
            return Ok(None);
        }

        info!(contacted = self.packets.len(), "secret recovered");
        self.secret = Some(secret.clone());
        Ok(Some(secret))
    }
}

/// advance `combo` to the next k-subset of 0..n in lexicographic order
fn next_combination(combo: &mut [usize], n: usize) -> bool {
    let k = combo.len();
    let mut i = k;
    while i > 0 {
        i -= 1;
        if combo[i] < n - k + i {
            combo[i] += 1;
            for j in i + 1..k {
                combo[j] = combo[j - 1] + 1;
            }
            return true;
        }
    }
    false
}
