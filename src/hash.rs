//! Seeded 32-bit hashing shared by all sketches
//!
//! Every structure in this crate maps items through xxHash32. Structures that
//! need several independent hash functions (Bloom filter bits, Count-Min rows)
//! derive them from one base seed via [`HashFamily`] instead of building
//! separate hasher objects.

use xxhash_rust::xxh32::xxh32;

#[cfg(feature = "std")]
use std::vec::Vec;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Seed used by the single-hash HyperLogLog and as the base of every
/// [`HashFamily`] created with [`HashFamily::new`].
pub const DEFAULT_SEED: u32 = 0;

/// Golden-ratio increment separating the seeds of a family
const SEED_STEP: u32 = 0x9e37_79b9;

/// Hash a byte string to 32 bits.
///
/// Deterministic for a given `(bytes, seed)` pair and defined for every
/// input, including the empty slice.
#[inline]
pub fn hash32(bytes: &[u8], seed: u32) -> u32 {
    xxh32(bytes, seed)
}

/// A fixed set of `k` seeded hash functions.
///
/// Function `i` is `hash32(item, base + i * 0x9E3779B9)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HashFamily {
    seeds: Vec<u32>,
}

impl HashFamily {
    /// Create a family of `k` functions derived from [`DEFAULT_SEED`]
    pub fn new(k: usize) -> Self {
        Self::with_base_seed(k, DEFAULT_SEED)
    }

    /// Create a family of `k` functions derived from `base`
    pub fn with_base_seed(k: usize, base: u32) -> Self {
        let seeds = (0..k as u32)
            .map(|i| base.wrapping_add(i.wrapping_mul(SEED_STEP)))
            .collect();
        Self { seeds }
    }

    /// Number of functions in the family
    pub fn len(&self) -> usize {
        self.seeds.len()
    }

    /// Whether the family holds no functions
    pub fn is_empty(&self) -> bool {
        self.seeds.is_empty()
    }

    /// Seeds backing each function
    pub fn seeds(&self) -> &[u32] {
        &self.seeds
    }

    /// Raw 32-bit output of function `i`
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.len()`
    #[inline]
    pub fn hash(&self, i: usize, bytes: &[u8]) -> u32 {
        hash32(bytes, self.seeds[i])
    }

    /// Output of function `i` reduced into `[0, modulus)`
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.len()` or `modulus == 0`
    #[inline]
    pub fn index(&self, i: usize, bytes: &[u8], modulus: usize) -> usize {
        self.hash(i, bytes) as usize % modulus
    }

    /// All `k` reduced outputs, in function order
    pub fn indices<'a>(
        &'a self,
        bytes: &'a [u8],
        modulus: usize,
    ) -> impl Iterator<Item = usize> + 'a {
        self.seeds
            .iter()
            .map(move |&seed| hash32(bytes, seed) as usize % modulus)
    }
}
