//! component-wise shamir sharing over a [`FieldBackend`]
//!
//! a value of width w is shared with w independent polynomials that are all
//! evaluated at the same x-coordinate, so one share carries w field elements.

use rand::{CryptoRng, RngCore};

use crate::field::{interpolate, FieldBackend, Polynomial};
use crate::{Error, Result};

/// a single share: x-coordinate plus one evaluation per component
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Share<F: FieldBackend> {
    /// x-coordinate (non-zero, issued by the ledger)
    pub x: u32,
    /// evaluations, same width as the shared value
    pub value: Vec<F>,
}

impl<F: FieldBackend> Share<F> {
    /// wire length of a share of the given width
    pub fn encoded_len_for(width: usize) -> usize {
        4 + width * F::ENCODED_LEN
    }

    pub fn encoded_len(&self) -> usize {
        Self::encoded_len_for(self.value.len())
    }

    /// x as 4 bytes big-endian followed by the element encodings
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        out.extend_from_slice(&self.x.to_be_bytes());
        for v in &self.value {
            out.extend_from_slice(&v.to_bytes());
        }
        out
    }

    pub fn from_bytes(bytes: &[u8], width: usize) -> Result<Self> {
        if bytes.len() != Self::encoded_len_for(width) {
            return Err(Error::InvalidEncoding);
        }
        let (head, body) = bytes.split_at(4);
        let mut x_bytes = [0u8; 4];
        x_bytes.copy_from_slice(head);
        let value = body
            .chunks_exact(F::ENCODED_LEN)
            .map(|c| F::from_bytes(c).ok_or(Error::InvalidEncoding))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            x: u32::from_be_bytes(x_bytes),
            value,
        })
    }
}

/// share `value` at the given coordinates; any `threshold` shares recombine
pub fn deal<F, R>(value: &[F], threshold: usize, xs: &[u32], rng: &mut R) -> Result<Vec<Share<F>>>
where
    F: FieldBackend,
    R: RngCore + CryptoRng,
{
    if threshold == 0 {
        return Err(Error::ZeroThreshold);
    }
    if xs.len() < threshold {
        return Err(Error::NotEnoughPoints {
            have: xs.len(),
            need: threshold,
        });
    }
    if xs.contains(&0) {
        return Err(Error::ZeroCoordinate);
    }

    let polys = value
        .iter()
        .map(|c| Polynomial::random(*c, threshold - 1, rng))
        .collect::<Result<Vec<_>>>()?;

    Ok(xs
        .iter()
        .map(|&x| Share {
            x,
            value: polys.iter().map(|p| p.evaluate(x)).collect(),
        })
        .collect())
}

/// interpolate every component at zero
pub fn combine<F: FieldBackend>(shares: &[Share<F>]) -> Result<Vec<F>> {
    let first = shares.first().ok_or(Error::NotEnoughPoints { have: 0, need: 1 })?;
    let width = first.value.len();
    if shares.iter().any(|s| s.value.len() != width) {
        return Err(Error::InvalidEncoding);
    }

    (0..width)
        .map(|i| {
            let points: Vec<(u32, F)> = shares.iter().map(|s| (s.x, s.value[i])).collect();
            interpolate(&points)
        })
        .collect()
}
