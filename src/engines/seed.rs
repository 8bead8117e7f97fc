//! Request-scoped deterministic seeding.
//!
//! The request seed is a pure function of the multiset of winning panels and
//! the strategy name, so permuting the input draws never changes it. Each
//! stochastic strategy gets its own generator derived from that seed.

use crate::types::Draw;
use rand::rngs::StdRng;
use rand::SeedableRng;
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestSeed(u32);

impl RequestSeed {
    pub fn derive(draws: &[Draw], strategy: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(canonical_form(draws).as_bytes());
        hasher.update(strategy.as_bytes());
        let digest = hasher.finalize();
        let head = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
        RequestSeed(head & 0x7FFF_FFFF)
    }

    pub fn from_value(value: u32) -> Self {
        RequestSeed(value & 0x7FFF_FFFF)
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    /// Independent generator for one named consumer of this request.
    pub fn rng_for(&self, label: &str) -> StdRng {
        StdRng::seed_from_u64(self.stream(label))
    }

    pub fn stream(&self, label: &str) -> u64 {
        let mut hasher = Sha256::new();
        hasher.update(self.0.to_be_bytes());
        hasher.update(b":");
        hasher.update(label.as_bytes());
        let digest = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        u64::from_be_bytes(bytes)
    }
}

/// Sorted list of sorted winning tuples, duplicates kept: `[[1,2,3,4,5],...]`.
fn canonical_form(draws: &[Draw]) -> String {
    let mut tuples: Vec<Vec<u8>> = draws
        .iter()
        .map(|d| {
            let mut w = d.winning.clone();
            w.sort_unstable();
            w
        })
        .collect();
    tuples.sort();

    let body: Vec<String> = tuples
        .iter()
        .map(|t| {
            let inner: Vec<String> = t.iter().map(|n| n.to_string()).collect();
            format!("[{}]", inner.join(","))
        })
        .collect();
    format!("[{}]", body.join(","))
}
