//! trustee share packets
//!
//! every packet has the same shape: a salt, `max_slots` shares and
//! `max_slots + 1` hashes. for a trustee, hash slot 0 is H(salt ‖ secret) and
//! hash slot `1 + j` belongs to share slot `j`. a genuine share's hash is
//!
//! H(salt ‖ parent_x ‖ subsecret ‖ x ‖ value)
//!
//! which can only be checked once the subsecret has been rebuilt, so it gives
//! nothing away about which slots are real. slots a trustee does not need are
//! filled with random values at fresh ledger coordinates and random hashes.
//!
//! a trustee dealt no leaf share at all gets a pure filler packet, slot 0
//! included, so nothing in it is relevant.
//!
//! which slots are genuine is recorded in a separate [`DiagnosticIndex`] that
//! never travels with the packets.

use rand::seq::SliceRandom;
use rand::{CryptoRng, RngCore};
use tracing::debug;

use crate::crypto::{random_bytes, random_hash, salted_hash, Digest, Salt, HASH_LEN, SALT_LEN};
use crate::field::{FieldBackend, Secret};
use crate::ledger::CoordinateLedger;
use crate::shamir::Share;
use crate::split::SplitOutput;
use crate::{Error, Result};

/// what one anonymity-set member receives
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SharePacket<F: FieldBackend> {
    pub salt: Salt,
    pub relevant_hashes: Vec<Digest>,
    pub share_data: Vec<Share<F>>,
}

impl<F: FieldBackend> SharePacket<F> {
    /// share bytes + hash bytes + salt bytes
    pub fn encoded_len(&self) -> usize {
        self.share_data.iter().map(|s| s.encoded_len()).sum::<usize>()
            + self.relevant_hashes.len() * HASH_LEN
            + SALT_LEN
    }

    /// salt, then hashes, then shares
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        out.extend_from_slice(&self.salt);
        for h in &self.relevant_hashes {
            out.extend_from_slice(h);
        }
        for s in &self.share_data {
            out.extend_from_slice(&s.to_bytes());
        }
        out
    }

    /// random salt, `slots` filler shares and `slots + 1` random hashes
    pub(crate) fn filler<R>(slots: usize, ledger: &mut CoordinateLedger, rng: &mut R) -> Result<Self>
    where
        R: RngCore + CryptoRng,
    {
        let salt = random_bytes::<SALT_LEN, _>(rng)?;
        let share_data = (0..slots)
            .map(|_| filler_share(ledger, rng))
            .collect::<Result<Vec<_>>>()?;
        let relevant_hashes = (0..=slots)
            .map(|_| random_hash(rng))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            salt,
            relevant_hashes,
            share_data,
        })
    }
}

/// integrity hash of a genuine leaf share
pub fn share_digest<F: FieldBackend>(salt: &Salt, parent_x: u32, subsecret: &[F], share: &Share<F>) -> Digest {
    let subsecret_bytes: Vec<u8> = subsecret.iter().flat_map(|v| v.to_bytes()).collect();
    let value_bytes: Vec<u8> = share.value.iter().flat_map(|v| v.to_bytes()).collect();
    salted_hash(
        salt,
        &[
            &parent_x.to_be_bytes(),
            &subsecret_bytes,
            &share.x.to_be_bytes(),
            &value_bytes,
        ],
    )
}

/// check hash for the recombined secret
pub fn secret_digest<F: FieldBackend>(salt: &Salt, secret: &Secret<F>) -> Digest {
    salted_hash(salt, &[&secret.to_bytes()])
}

/// random value of secret width at a fresh coordinate
pub(crate) fn filler_share<F, R>(ledger: &mut CoordinateLedger, rng: &mut R) -> Result<Share<F>>
where
    F: FieldBackend,
    R: RngCore + CryptoRng,
{
    let x = ledger.issue(rng)?;
    let value = (0..F::SECRET_WIDTH)
        .map(|_| F::random(rng))
        .collect::<Result<Vec<_>>>()?;
    Ok(Share { x, value })
}

/// genuine slots of one member
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SlotIndex {
    pub shares: Vec<usize>,
    pub hashes: Vec<usize>,
}

impl SlotIndex {
    /// no genuine slot at all
    pub fn is_decoy(&self) -> bool {
        self.shares.is_empty() && self.hashes.is_empty()
    }
}

/// byte accounting of one packet
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PacketSize {
    pub total: usize,
    pub relevant: usize,
    pub irrelevant: usize,
}

/// side map of genuine slots, one entry per member, for measurement only
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiagnosticIndex {
    members: Vec<SlotIndex>,
}

impl DiagnosticIndex {
    pub fn member(&self, i: usize) -> Option<&SlotIndex> {
        self.members.get(i)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SlotIndex> {
        self.members.iter()
    }

    /// members holding nothing genuine
    pub fn decoy_count(&self) -> usize {
        self.members.iter().filter(|m| m.is_decoy()).count()
    }

    pub(crate) fn push(&mut self, slots: SlotIndex) {
        self.members.push(slots);
    }

    /// split member `i`'s packet bytes into relevant and irrelevant
    pub fn measure<F: FieldBackend>(&self, i: usize, packet: &SharePacket<F>) -> PacketSize {
        let total = packet.encoded_len();
        let slots = match self.members.get(i) {
            Some(s) if !s.is_decoy() => s,
            _ => {
                return PacketSize {
                    total,
                    relevant: 0,
                    irrelevant: total,
                }
            }
        };
        let relevant = slots
            .shares
            .iter()
            .filter_map(|&j| packet.share_data.get(j))
            .map(|s| s.encoded_len())
            .sum::<usize>()
            + slots
                .hashes
                .iter()
                .filter(|&&j| j < packet.relevant_hashes.len())
                .count()
                * HASH_LEN;
        PacketSize {
            total,
            relevant,
            irrelevant: total - relevant,
        }
    }
}

/// packets for the `n` trustees plus the shared slot count
#[derive(Clone, Debug)]
pub struct TrusteePackets<F: FieldBackend> {
    pub packets: Vec<SharePacket<F>>,
    /// share slots in every packet
    pub max_slots: usize,
    pub index: DiagnosticIndex,
}

/// group leaf shares by trustee and pad every packet to `max_slots`
pub fn build_trustee_packets<F, R>(
    secret: &Secret<F>,
    split: &mut SplitOutput<F>,
    rng: &mut R,
) -> Result<TrusteePackets<F>>
where
    F: FieldBackend,
    R: RngCore + CryptoRng,
{
    let trustees = split.params.trustees;
    let max_slots = split.params.max_shares_per_trustee();

    let mut held: Vec<Vec<usize>> = vec![Vec::new(); trustees];
    for (i, leaf) in split.leaves.iter().enumerate() {
        let slot = held.get_mut(leaf.trustee).ok_or(Error::SlotOverflow {
            have: leaf.trustee + 1,
            slots: trustees,
        })?;
        slot.push(i);
    }

    let mut packets = Vec::with_capacity(trustees);
    let mut index = DiagnosticIndex::default();

    for leaf_ids in &held {
        if leaf_ids.len() > max_slots {
            return Err(Error::SlotOverflow {
                have: leaf_ids.len(),
                slots: max_slots,
            });
        }

        if leaf_ids.is_empty() {
            packets.push(SharePacket::filler(max_slots, &mut split.ledger, rng)?);
            index.push(SlotIndex::default());
            continue;
        }

        let salt = random_bytes::<SALT_LEN, _>(rng)?;

        // slot j holds either a genuine leaf or filler
        let mut layout: Vec<Option<usize>> = leaf_ids.iter().copied().map(Some).collect();
        layout.resize(max_slots, None);
        layout.shuffle(rng);

        let mut share_data = Vec::with_capacity(max_slots);
        let mut relevant_hashes = Vec::with_capacity(max_slots + 1);
        let mut slots = SlotIndex {
            shares: Vec::new(),
            hashes: vec![0],
        };
        relevant_hashes.push(secret_digest(&salt, secret));

        for (j, entry) in layout.iter().enumerate() {
            match entry {
                Some(leaf_id) => {
                    let leaf = &split.leaves[*leaf_id];
                    let parent = &split.subsecrets[leaf.subsecret];
                    relevant_hashes.push(share_digest(&salt, parent.x, &parent.value, &leaf.share));
                    share_data.push(leaf.share.clone());
                    slots.shares.push(j);
                    slots.hashes.push(j + 1);
                }
                None => {
                    share_data.push(filler_share(&mut split.ledger, rng)?);
                    relevant_hashes.push(random_hash(rng)?);
                }
            }
        }

        packets.push(SharePacket {
            salt,
            relevant_hashes,
            share_data,
        });
        index.push(slots);
    }

    debug!(
        trustees,
        max_slots,
        coordinates = split.ledger.len(),
        "built trustee packets"
    );

    Ok(TrusteePackets {
        packets,
        max_slots,
        index,
    })
}
