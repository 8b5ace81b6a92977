//! x-coordinate ledger
//!
//! every coordinate handed out during one distribution round goes through a
//! single ledger: parent layer, leaf shares, filler slots and decoy slots.
//! a repeated coordinate would let two unrelated polynomials be conflated, so
//! issuance takes `&mut self` and stays single-writer.

use rand::Rng;
use std::collections::HashSet;

use crate::{Error, Result};

#[derive(Clone, Debug)]
pub struct CoordinateLedger {
    limit: u32,
    issued: HashSet<u32>,
    order: Vec<u32>,
}

impl CoordinateLedger {
    /// empty ledger drawing from `1..=limit`
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            issued: HashSet::new(),
            order: Vec::new(),
        }
    }

    /// largest coordinate this ledger may issue
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// draw a fresh coordinate uniformly from the unused ones and record it
    pub fn issue<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<u32> {
        if self.issued.len() as u64 >= self.limit as u64 {
            return Err(Error::CoordinateSpaceExhausted { limit: self.limit });
        }
        loop {
            let x = rng.gen_range(1..=self.limit);
            if self.issued.insert(x) {
                self.order.push(x);
                return Ok(x);
            }
        }
    }

    /// draw `count` fresh coordinates
    pub fn issue_many<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R) -> Result<Vec<u32>> {
        let free = self.limit as u64 - self.issued.len() as u64;
        if count as u64 > free {
            return Err(Error::CoordinateSpaceExhausted { limit: self.limit });
        }
        (0..count).map(|_| self.issue(rng)).collect()
    }

    pub fn contains(&self, x: u32) -> bool {
        self.issued.contains(&x)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// coordinates in issuance order
    pub fn issued(&self) -> &[u32] {
        &self.order
    }
}
