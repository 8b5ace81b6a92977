//! anonymity set expansion
//!
//! `n` trustee packets become `a` packets of identical shape. the extra
//! `a - n` members get decoys: every slot independently random, shares at
//! fresh ledger coordinates, hashes and salt the same length as genuine ones.

use rand::{CryptoRng, RngCore};
use tracing::info;

use crate::field::FieldBackend;
use crate::ledger::CoordinateLedger;
use crate::packet::{DiagnosticIndex, SharePacket, SlotIndex, TrusteePackets};
use crate::{Error, Result};

/// the packets handed to transport, trustees first
#[derive(Clone, Debug)]
pub struct AnonymitySet<F: FieldBackend> {
    pub packets: Vec<SharePacket<F>>,
    pub max_slots: usize,
    /// genuine slots per member, never distributed
    pub index: DiagnosticIndex,
}

impl<F: FieldBackend> AnonymitySet<F> {
    pub fn len(&self) -> usize {
        self.packets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    /// true when every packet has the same share and hash counts
    pub fn is_uniform(&self) -> bool {
        self.packets.iter().all(|p| {
            p.share_data.len() == self.max_slots && p.relevant_hashes.len() == self.max_slots + 1
        })
    }
}

/// pad the trustee packets out to an anonymity set of `anonymity` members
pub fn expand_to_anonymity_set<F, R>(
    trustees: TrusteePackets<F>,
    anonymity: usize,
    ledger: &mut CoordinateLedger,
    rng: &mut R,
) -> Result<AnonymitySet<F>>
where
    F: FieldBackend,
    R: RngCore + CryptoRng,
{
    let n = trustees.packets.len();
    if anonymity < n {
        return Err(Error::AnonymitySetTooSmall {
            anonymity,
            trustees: n,
        });
    }

    let TrusteePackets {
        mut packets,
        max_slots,
        mut index,
    } = trustees;

    let decoys = anonymity - n;
    let free = ledger.limit() as u64 - ledger.len() as u64;
    if (decoys as u64) * (max_slots as u64) > free {
        return Err(Error::CoordinateSpaceExhausted {
            limit: ledger.limit(),
        });
    }

    packets.reserve(decoys);
    for _ in 0..decoys {
        packets.push(SharePacket::filler(max_slots, ledger, rng)?);
        index.push(SlotIndex::default());
    }

    info!(
        trustees = n,
        decoys,
        max_slots,
        coordinates = ledger.len(),
        "expanded anonymity set"
    );

    Ok(AnonymitySet {
        packets,
        max_slots,
        index,
    })
}
