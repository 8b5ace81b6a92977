//! GF(2^16) backend using exp/log tables
//!
//! reducing polynomial x^16 + x^12 + x^3 + x + 1. the generator is the
//! smallest element of full multiplicative order, found once when the tables
//! are first built.

use rand::{CryptoRng, RngCore};
use std::sync::OnceLock;
use zeroize::Zeroize;

use super::FieldBackend;
use crate::Result;

/// reducing polynomial with the x^16 term
const REDUCING_POLY: u32 = 0x1100b;

/// size of the multiplicative group
const GROUP_ORDER: usize = 65535;

/// prime factors of 65535 = 3 * 5 * 17 * 257
const ORDER_FACTORS: [u32; 4] = [3, 5, 17, 257];

struct Tables {
    generator: u16,
    /// exp[i] = g^i, doubled so log sums never need a reduction
    exp: Vec<u16>,
    log: Vec<u16>,
}

static TABLES: OnceLock<Tables> = OnceLock::new();

fn tables() -> &'static Tables {
    TABLES.get_or_init(build_tables)
}

/// shift-and-add multiplication, only used while building the tables
fn carryless_mul(a: u16, b: u16) -> u16 {
    let mut a = a as u32;
    let mut b = b;
    let mut result = 0u32;
    while b != 0 {
        if b & 1 != 0 {
            result ^= a;
        }
        b >>= 1;
        a <<= 1;
        if a & 0x1_0000 != 0 {
            a ^= REDUCING_POLY;
        }
    }
    result as u16
}

fn carryless_pow(base: u16, mut exp: u32) -> u16 {
    let mut result = 1u16;
    let mut base = base;
    while exp > 0 {
        if exp & 1 == 1 {
            result = carryless_mul(result, base);
        }
        base = carryless_mul(base, base);
        exp >>= 1;
    }
    result
}

fn has_full_order(g: u16) -> bool {
    ORDER_FACTORS
        .iter()
        .all(|p| carryless_pow(g, GROUP_ORDER as u32 / p) != 1)
}

fn build_tables() -> Tables {
    // the reducing polynomial is primitive, so the search ends at 2
    let generator = (2..=u16::MAX)
        .find(|&g| has_full_order(g))
        .unwrap_or(2);

    let mut exp = vec![0u16; 2 * GROUP_ORDER];
    let mut log = vec![0u16; GROUP_ORDER + 1];
    let mut value = 1u16;
    for i in 0..GROUP_ORDER {
        exp[i] = value;
        exp[i + GROUP_ORDER] = value;
        log[value as usize] = i as u16;
        value = carryless_mul(value, generator);
    }

    Tables {
        generator,
        exp,
        log,
    }
}

/// element of GF(2^16)
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Gf16(u16);

impl Gf16 {
    pub const fn from_value(val: u16) -> Self {
        Self(val)
    }

    pub const fn value(&self) -> u16 {
        self.0
    }

    /// the generator the tables were built from
    pub fn generator() -> Self {
        Self(tables().generator)
    }

    pub fn pow(&self, exp: u64) -> Self {
        if self.0 == 0 {
            return if exp == 0 { Self(1) } else { Self(0) };
        }
        let t = tables();
        let log = t.log[self.0 as usize] as u64;
        let idx = (log * (exp % GROUP_ORDER as u64)) % GROUP_ORDER as u64;
        Self(t.exp[idx as usize])
    }
}

impl From<u16> for Gf16 {
    fn from(val: u16) -> Self {
        Self(val)
    }
}

impl Zeroize for Gf16 {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

impl FieldBackend for Gf16 {
    const NAME: &'static str = "gf2^16";
    const ENCODED_LEN: usize = 2;
    const SECRET_WIDTH: usize = 16;
    const COORDINATE_LIMIT: u32 = u16::MAX as u32;

    fn zero() -> Self {
        Self(0)
    }

    fn one() -> Self {
        Self(1)
    }

    fn from_u32(v: u32) -> Self {
        Self((v & 0xffff) as u16)
    }

    fn add(&self, other: &Self) -> Self {
        Self(self.0 ^ other.0)
    }

    fn sub(&self, other: &Self) -> Self {
        Self(self.0 ^ other.0)
    }

    fn mul(&self, other: &Self) -> Self {
        if self.0 == 0 || other.0 == 0 {
            return Self(0);
        }
        let t = tables();
        let idx = t.log[self.0 as usize] as usize + t.log[other.0 as usize] as usize;
        Self(t.exp[idx])
    }

    fn invert(&self) -> Option<Self> {
        if self.0 == 0 {
            return None;
        }
        let t = tables();
        Some(Self(t.exp[GROUP_ORDER - t.log[self.0 as usize] as usize]))
    }

    fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self> {
        let mut buf = [0u8; 2];
        rng.try_fill_bytes(&mut buf)?;
        Ok(Self(u16::from_be_bytes(buf)))
    }

    fn to_bytes(&self) -> Vec<u8> {
        self.0.to_be_bytes().to_vec()
    }

    fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let arr: [u8; 2] = bytes.try_into().ok()?;
        Some(Self(u16::from_be_bytes(arr)))
    }
}
