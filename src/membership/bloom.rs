//! Bloom filter for probabilistic set membership
//!
//! A Bloom filter is a space-efficient probabilistic data structure that tests
//! whether an element is a member of a set. False positives are possible, but
//! false negatives are not.

use crate::error::{Error, Result};
use crate::hash::HashFamily;
use crate::math;
use crate::traits::{MembershipSketch, Sketch};

#[cfg(feature = "std")]
use std::vec::Vec;

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

/// Upper bound on `k` chosen by the accuracy-driven constructor
const MAX_AUTO_HASHES: usize = 32;

/// Bloom filter for set membership testing
///
/// # Example
///
/// ```
/// use approxkit::membership::BloomFilter;
///
/// let mut bloom = BloomFilter::with_params(100, 3)?;
///
/// bloom.add("alice");
/// bloom.add("bob");
///
/// assert!(bloom.might_contain("alice")); // true - definitely inserted
/// assert!(bloom.might_contain("bob"));   // true - definitely inserted
///
/// // (1 - e^(-k*n/m))^k
/// let p = bloom.false_positive_probability(2);
/// assert!(p > 0.0 && p < 0.001);
/// # Ok::<(), approxkit::Error>(())
/// ```
///
/// # False Positive Rate
///
/// The false positive probability grows with the number of items inserted.
/// There is no delete and no resize: a filter with different parameters has
/// to be rebuilt, replaying its items if the caller kept them.
#[derive(Clone, Debug)]
pub struct BloomFilter {
    /// Bit array, packed little-end first into words
    bits: Vec<u64>,
    /// Number of bits (m)
    size: usize,
    /// One seeded hash per bit position set on insert (k)
    hashes: HashFamily,
    /// Number of `add` calls
    count: u64,
}

impl BloomFilter {
    /// Create a Bloom filter sized for an expected capacity and false positive rate
    ///
    /// # Arguments
    ///
    /// * `expected_items` - Expected number of items to insert
    /// * `false_positive_rate` - Desired false positive rate (e.g., 0.01 for 1%)
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if `expected_items` is 0 or
    /// `false_positive_rate` is not in (0, 1)
    pub fn new(expected_items: usize, false_positive_rate: f64) -> Result<Self> {
        if expected_items == 0 {
            return Err(Error::invalid(
                "expected_items",
                expected_items,
                "must be at least 1",
            ));
        }
        if !(false_positive_rate > 0.0 && false_positive_rate < 1.0) {
            return Err(Error::invalid(
                "false_positive_rate",
                false_positive_rate,
                "must be in (0, 1)",
            ));
        }

        // Optimal number of bits: m = -n * ln(p) / (ln(2)^2)
        let ln2_squared = core::f64::consts::LN_2 * core::f64::consts::LN_2;
        let size =
            math::ceil(-(expected_items as f64) * math::ln(false_positive_rate) / ln2_squared)
                as usize;
        let size = size.max(1);

        // Optimal number of hash functions: k = (m/n) * ln(2)
        let hash_function_count =
            math::ceil((size as f64 / expected_items as f64) * core::f64::consts::LN_2) as usize;
        let hash_function_count = hash_function_count.clamp(1, MAX_AUTO_HASHES);

        Self::with_params(size, hash_function_count)
    }

    /// Create a Bloom filter with an exact bit count and number of hash functions
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if either argument is 0
    pub fn with_params(size: usize, hash_function_count: usize) -> Result<Self> {
        if size == 0 {
            return Err(Error::invalid("size", size, "must be at least 1"));
        }
        if hash_function_count == 0 {
            return Err(Error::invalid(
                "hash_function_count",
                hash_function_count,
                "must be at least 1",
            ));
        }

        tracing::debug!(size, hash_function_count, "creating bloom filter");

        Ok(Self {
            bits: vec![0u64; size.div_ceil(64)],
            size,
            hashes: HashFamily::new(hash_function_count),
            count: 0,
        })
    }

    /// Insert an item into the filter
    pub fn add(&mut self, item: &str) {
        self.add_bytes(item.as_bytes());
    }

    /// Insert raw bytes into the filter
    pub fn add_bytes(&mut self, item: &[u8]) {
        self.count += 1;

        for bit_idx in self.hashes.indices(item, self.size) {
            self.bits[bit_idx / 64] |= 1u64 << (bit_idx % 64);
        }
    }

    /// Check if an item might be in the filter
    ///
    /// Returns `true` if the item might be in the set (possibly a false positive),
    /// or `false` if the item is definitely not in the set.
    pub fn might_contain(&self, item: &str) -> bool {
        self.might_contain_bytes(item.as_bytes())
    }

    /// Check if raw bytes might be in the filter
    pub fn might_contain_bytes(&self, item: &[u8]) -> bool {
        self.hashes
            .indices(item, self.size)
            .all(|bit_idx| self.bit(bit_idx))
    }

    /// Bit positions an item maps to, one per hash function
    ///
    /// Positions may repeat when two hash functions collide for this item.
    pub fn positions(&self, item: &str) -> Vec<usize> {
        self.hashes.indices(item.as_bytes(), self.size).collect()
    }

    /// Theoretical false positive probability after `inserted_count` insertions
    ///
    /// `p = (1 - e^(-k·n/m))^k`, a function of the filter's fixed parameters only.
    pub fn false_positive_probability(&self, inserted_count: u64) -> f64 {
        let k = self.hashes.len() as f64;
        let m = self.size as f64;
        let n = inserted_count as f64;
        math::powi(1.0 - math::exp(-k * n / m), self.hashes.len() as i32)
    }

    /// Get the number of bits in the filter
    pub fn size(&self) -> usize {
        self.size
    }

    /// Get the number of hash functions
    pub fn hash_function_count(&self) -> usize {
        self.hashes.len()
    }

    /// Whether bit `index` is set
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.size()`
    pub fn bit(&self, index: usize) -> bool {
        assert!(index < self.size, "bit index out of range");
        self.bits[index / 64] & (1u64 << (index % 64)) != 0
    }

    /// Iterate over all `size` bits in index order
    pub fn iter_bits(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.size).map(move |i| self.bits[i / 64] & (1u64 << (i % 64)) != 0)
    }

    /// Backing words; bit `i` lives at `words[i / 64] >> (i % 64)`
    ///
    /// Trailing bits past `size` in the last word are always zero.
    pub fn as_words(&self) -> &[u64] {
        &self.bits
    }

    /// Get the number of bits set to 1
    pub fn bits_set(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Estimate the current false positive rate
    ///
    /// This is based on the actual fill ratio of the filter.
    pub fn estimated_false_positive_rate(&self) -> f64 {
        let fill_ratio = self.bits_set() as f64 / self.size as f64;
        math::powi(fill_ratio, self.hashes.len() as i32)
    }

    /// Estimate the number of distinct items in the filter
    ///
    /// Uses the fill ratio to estimate cardinality.
    pub fn estimated_count(&self) -> f64 {
        let bits_set = self.bits_set() as f64;
        let m = self.size as f64;
        let k = self.hashes.len() as f64;

        if bits_set >= m {
            return f64::INFINITY;
        }

        // n ≈ -m/k * ln(1 - X/m) where X is bits set
        -(m / k) * math::ln(1.0 - bits_set / m)
    }
}

impl Sketch for BloomFilter {
    type Item = str;

    fn update(&mut self, item: &str) {
        self.add(item);
    }

    fn clear(&mut self) {
        self.bits.fill(0);
        self.count = 0;
    }

    fn count(&self) -> u64 {
        self.count
    }
}

impl MembershipSketch for BloomFilter {
    fn contains(&self, item: &str) -> bool {
        self.might_contain(item)
    }

    fn false_positive_rate(&self) -> f64 {
        self.estimated_false_positive_rate()
    }

    fn len(&self) -> usize {
        self.count as usize
    }
}
