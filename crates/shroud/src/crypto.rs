//! hashing and random byte helpers for packets
//!
//! - sha256 salted hashes bind shares and the secret to a packet's salt
//! - random salts and filler hashes come from the caller's rng

use rand::RngCore;
use sha2::{Digest as _, Sha256};

use crate::Result;

/// salt length in bytes
pub const SALT_LEN: usize = 32;

/// hash output length in bytes
pub const HASH_LEN: usize = 32;

pub type Salt = [u8; SALT_LEN];
pub type Digest = [u8; HASH_LEN];

/// sha256 over salt followed by each part in order
pub fn salted_hash(salt: &Salt, parts: &[&[u8]]) -> Digest {
    let mut h = Sha256::new();
    h.update(salt);
    for p in parts {
        h.update(p);
    }
    h.finalize().into()
}

/// generate random bytes, surfacing entropy failures
pub fn random_bytes<const N: usize, R: RngCore + ?Sized>(rng: &mut R) -> Result<[u8; N]> {
    let mut bytes = [0u8; N];
    rng.try_fill_bytes(&mut bytes)?;
    Ok(bytes)
}

/// filler hash: sha256 of fresh random bytes, same length as a real one
pub fn random_hash<R: RngCore + ?Sized>(rng: &mut R) -> Result<Digest> {
    let seed: [u8; 32] = random_bytes(rng)?;
    Ok(Sha256::digest(seed).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn test_salted_hash_depends_on_salt() {
        let a = salted_hash(&[1u8; SALT_LEN], &[b"subsecret"]);
        let b = salted_hash(&[2u8; SALT_LEN], &[b"subsecret"]);
        assert_ne!(a, b);
        // part boundaries are not significant, only the byte stream
        assert_eq!(
            salted_hash(&[1u8; SALT_LEN], &[b"sub", b"secret"]),
            a
        );
    }

    #[test]
    fn test_known_vector() {
        // sha256 of 32 zero bytes
        let h = salted_hash(&[0u8; SALT_LEN], &[]);
        assert_eq!(
            hex::encode(h),
            "66687aadf862bd776c8fc18b8e9f8e20089714856ee233b3902a591d0d5f2925"
        );
    }

    #[test]
    fn test_random_hash_varies() {
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        assert_ne!(random_hash(&mut rng).unwrap(), random_hash(&mut rng).unwrap());
    }
}
