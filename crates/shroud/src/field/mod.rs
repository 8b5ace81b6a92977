//! field abstraction for shroud
//!
//! the splitter, packet builder and reconstructor are generic over a
//! [`FieldBackend`]. two backends ship:
//! - ristretto255 scalars (prime order, one element per secret)
//! - GF(2^16) with exp/log tables (sixteen elements per secret)

use core::fmt::Debug;
use rand::{CryptoRng, RngCore};
use zeroize::Zeroize;

use crate::Result;

pub mod gf16;
mod poly;

#[cfg(feature = "ristretto255")]
pub mod ristretto;

pub use gf16::Gf16;
pub use poly::{interpolate, lagrange_coefficients, Polynomial};

/// finite field element usable for shamir sharing
pub trait FieldBackend:
    Copy + Clone + Debug + PartialEq + Eq + Send + Sync + Zeroize + 'static
{
    /// short backend name for logs
    const NAME: &'static str;

    /// serialized length of one element in bytes
    const ENCODED_LEN: usize;

    /// number of elements a 32-byte secret occupies
    const SECRET_WIDTH: usize;

    /// largest x-coordinate that embeds injectively into the field
    const COORDINATE_LIMIT: u32;

    /// The zero element
    fn zero() -> Self;

    /// The one element
    fn one() -> Self;

    /// Embed an x-coordinate
    fn from_u32(v: u32) -> Self;

    fn add(&self, other: &Self) -> Self;

    fn sub(&self, other: &Self) -> Self;

    fn mul(&self, other: &Self) -> Self;

    /// Multiplicative inverse, `None` for zero
    fn invert(&self) -> Option<Self>;

    /// Uniformly random element
    fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self>;

    /// Serialize to exactly `ENCODED_LEN` bytes
    fn to_bytes(&self) -> Vec<u8>;

    /// Deserialize from exactly `ENCODED_LEN` bytes
    fn from_bytes(bytes: &[u8]) -> Option<Self>;

    fn is_zero(&self) -> bool {
        *self == Self::zero()
    }
}

/// a secret: `F::SECRET_WIDTH` field elements shared component-wise
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Secret<F: FieldBackend> {
    elements: Vec<F>,
}

impl<F: FieldBackend> Secret<F> {
    /// wrap elements, checking the width matches the backend
    pub fn from_elements(elements: Vec<F>) -> Result<Self> {
        if elements.len() != F::SECRET_WIDTH {
            return Err(crate::Error::SecretWidth {
                have: elements.len(),
                need: F::SECRET_WIDTH,
            });
        }
        Ok(Self { elements })
    }

    /// draw a uniformly random secret
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self> {
        let elements = (0..F::SECRET_WIDTH)
            .map(|_| F::random(rng))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { elements })
    }

    /// parse the concatenated element encodings
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != F::SECRET_WIDTH * F::ENCODED_LEN {
            return Err(crate::Error::InvalidEncoding);
        }
        let elements = bytes
            .chunks_exact(F::ENCODED_LEN)
            .map(|c| F::from_bytes(c).ok_or(crate::Error::InvalidEncoding))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { elements })
    }

    pub fn elements(&self) -> &[F] {
        &self.elements
    }

    /// concatenated element encodings
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(F::SECRET_WIDTH * F::ENCODED_LEN);
        for e in &self.elements {
            out.extend_from_slice(&e.to_bytes());
        }
        out
    }
}

impl<F: FieldBackend> Drop for Secret<F> {
    fn drop(&mut self) {
        self.elements.zeroize();
    }
}
