//! ristretto255 scalar field backend

use curve25519_dalek::scalar::Scalar;
use rand::{CryptoRng, RngCore};

use super::FieldBackend;
use crate::Result;

impl FieldBackend for Scalar {
    const NAME: &'static str = "ristretto255";
    const ENCODED_LEN: usize = 32;
    const SECRET_WIDTH: usize = 1;
    const COORDINATE_LIMIT: u32 = 1 << 20;

    fn zero() -> Self {
        Scalar::ZERO
    }

    fn one() -> Self {
        Scalar::ONE
    }

    fn from_u32(v: u32) -> Self {
        Scalar::from(v)
    }

    fn add(&self, other: &Self) -> Self {
        self + other
    }

    fn sub(&self, other: &Self) -> Self {
        self - other
    }

    fn mul(&self, other: &Self) -> Self {
        self * other
    }

    fn invert(&self) -> Option<Self> {
        if *self == Scalar::ZERO {
            return None;
        }
        Some(Scalar::invert(self))
    }

    fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self> {
        // wide reduction keeps the distribution uniform mod l
        let mut wide = [0u8; 64];
        rng.try_fill_bytes(&mut wide)?;
        Ok(Scalar::from_bytes_mod_order_wide(&wide))
    }

    fn to_bytes(&self) -> Vec<u8> {
        Scalar::to_bytes(self).to_vec()
    }

    fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let arr: [u8; 32] = bytes.try_into().ok()?;
        Option::from(Scalar::from_canonical_bytes(arr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn test_invert_roundtrip() {
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        for _ in 0..32 {
            let a = <Scalar as FieldBackend>::random(&mut rng).unwrap();
            if FieldBackend::is_zero(&a) {
                continue;
            }
            let inv = FieldBackend::invert(&a).unwrap();
            assert_eq!(FieldBackend::mul(&a, &inv), <Scalar as FieldBackend>::one());
        }
    }

    #[test]
    fn test_zero_has_no_inverse() {
        assert!(FieldBackend::invert(&Scalar::ZERO).is_none());
    }

    #[test]
    fn test_non_canonical_rejected() {
        assert!(<Scalar as FieldBackend>::from_bytes(&[0xff; 32]).is_none());
        assert!(<Scalar as FieldBackend>::from_bytes(&[0u8; 31]).is_none());
    }
}
