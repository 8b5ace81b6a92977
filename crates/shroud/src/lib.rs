//! # shroud
//!
//! two-layer threshold splitting of a secret whose shares hide inside an
//! anonymity set: a thief who steals packets cannot tell trustees from
//! decoys, and every packet looks the same on the wire.
//!
//! ## architecture
//!
//! ```text
//!                ┌──────────┐
//!                │  secret  │
//!                └────┬─────┘
//!                     │ shamir (AT, β)
//!        ┌────────────┼────────────┐
//!        ▼            ▼            ▼
//!   ┌─────────┐  ┌─────────┐  ┌─────────┐
//!   │ subsec 1│  │ subsec 2│  │ subsec β│
//!   └────┬────┘  └────┬────┘  └────┬────┘
//!        │ shamir (AT, m), m = floor(100·AT/TH)
//!        ▼            ▼            ▼
//!   ┌──────────────────────────────────────┐
//!   │  m·β leaf shares, spread over n      │
//!   │  trustees, padded to max_slots each  │
//!   └──────────────────┬───────────────────┘
//!                      │ + (a - n) decoys
//!                      ▼
//!   ┌──────────────────────────────────────┐
//!   │  a identical-shape share packets     │
//!   └──────────────────────────────────────┘
//! ```
//!
//! ## properties
//!
//! - any AT subsecrets rebuild the secret, fewer reveal nothing
//! - every x-coordinate is unique across both layers and all filler
//! - every packet has the same share count, hash count and byte length
//! - which slots are genuine lives only in a [`DiagnosticIndex`]
//!
//! ## usage
//!
//! ```rust,ignore
//! use shroud::{field::{Gf16, Secret}, split, build_trustee_packets, expand_to_anonymity_set};
//!
//! let secret = Secret::<Gf16>::random(&mut rng)?;
//! let mut out = split(&params, &secret, &mut rng)?;
//! let trustees = build_trustee_packets(&secret, &mut out, &mut rng)?;
//! let set = expand_to_anonymity_set(trustees, 30, &mut out.ledger, &mut rng)?;
//!
//! let mut rec = Reconstructor::new(out.scheme.clone())?;
//! for packet in contacted {
//!     if let Some(secret) = rec.absorb(packet)? {
//!         break;
//!     }
//! }
//! ```

pub mod anonymity;
pub mod crypto;
pub mod error;
pub mod field;
pub mod ledger;
pub mod packet;
pub mod recover;
pub mod shamir;
pub mod split;

pub use anonymity::{expand_to_anonymity_set, AnonymitySet};
pub use error::{Error, ErrorKind, Result};
pub use field::{FieldBackend, Gf16, Secret};
pub use ledger::CoordinateLedger;
pub use packet::{build_trustee_packets, DiagnosticIndex, PacketSize, SharePacket, SlotIndex, TrusteePackets};
pub use recover::Reconstructor;
pub use shamir::Share;
pub use split::{split, LeafShare, ParentScheme, SplitOutput, SplitParams, Subsecret};

#[cfg(feature = "ristretto255")]
pub use curve25519_dalek::scalar::Scalar;
