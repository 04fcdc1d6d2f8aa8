//! Count-Min Sketch frequency estimator
//!
//! The Count-Min Sketch is a probabilistic data structure for estimating
//! the frequency of elements in a data stream.

use crate::error::{Error, Result};
use crate::hash::HashFamily;
use crate::math;
use crate::traits::{FrequencySketch, Sketch};

#[cfg(feature = "std")]
use std::vec::Vec;

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

/// A `(row, col)` cell touched by an update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellPosition {
    /// Row index, one row per hash function
    pub row: usize,
    /// Column selected by that row's hash function
    pub col: usize,
}

/// Count-Min Sketch for frequency estimation
///
/// The Count-Min Sketch provides frequency estimates with the following guarantees:
/// - Point query: `actual_count <= estimate <= actual_count + ε * N`
/// - Where ε = e/width and N is the total count
/// - Probability of exceeding the error bound: δ = 1/e^depth
///
/// Two items that collide in every row cannot be told apart by [`query`](Self::query).
///
/// # Example
///
/// ```
/// use approxkit::frequency::CountMinSketch;
///
/// let mut cms = CountMinSketch::new(20, 4)?;
///
/// for _ in 0..5 {
///     cms.add("apple");
/// }
/// cms.add("banana");
/// cms.add("banana");
///
/// assert!(cms.query("apple") >= 5);
/// assert!(cms.query("banana") >= 2);
/// # Ok::<(), approxkit::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct CountMinSketch {
    /// Width of each row
    width: usize,
    /// Counter table, `depth` rows of `width` counters
    table: Vec<Vec<u64>>,
    /// One hash function per row
    hashes: HashFamily,
    /// Total weight of all items
    total_count: u64,
    /// Number of updates
    num_updates: u64,
}

impl CountMinSketch {
    /// Create a Count-Min Sketch with specific dimensions
    ///
    /// # Arguments
    ///
    /// * `width` - Width of each row (larger = lower error)
    /// * `depth` - Number of rows (larger = lower failure probability)
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if either dimension is 0
    pub fn new(width: usize, depth: usize) -> Result<Self> {
        if width == 0 {
            return Err(Error::invalid("width", width, "must be at least 1"));
        }
        if depth == 0 {
            return Err(Error::invalid("depth", depth, "must be at least 1"));
        }

        tracing::debug!(width, depth, "creating count-min sketch");

        Ok(Self {
            width,
            table: vec![vec![0u64; width]; depth],
            hashes: HashFamily::new(depth),
            total_count: 0,
            num_updates: 0,
        })
    }

    /// Create a Count-Min Sketch from error parameters
    ///
    /// # Arguments
    ///
    /// * `epsilon` - Maximum overcount as a fraction of total (e.g., 0.01 for 1%)
    /// * `delta` - Probability of exceeding the error bound (e.g., 0.001 for 0.1%)
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if epsilon or delta are not in (0, 1)
    pub fn with_error(epsilon: f64, delta: f64) -> Result<Self> {
        if !(epsilon > 0.0 && epsilon < 1.0) {
            return Err(Error::invalid("epsilon", epsilon, "must be in (0, 1)"));
        }
        if !(delta > 0.0 && delta < 1.0) {
            return Err(Error::invalid("delta", delta, "must be in (0, 1)"));
        }

        // width = ceil(e / epsilon)
        // depth = ceil(ln(1/delta))
        let width = math::ceil(core::f64::consts::E / epsilon) as usize;
        let depth = math::ceil(math::ln(1.0 / delta)) as usize;

        Self::new(width, depth.max(1))
    }

    /// Get the width of the sketch
    pub fn width(&self) -> usize {
        self.width
    }

    /// Get the depth of the sketch
    pub fn depth(&self) -> usize {
        self.table.len()
    }

    /// Get the total count of all items
    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    /// Record one occurrence of an item
    pub fn add(&mut self, item: &str) {
        self.add_count(item.as_bytes(), 1);
    }

    /// Record one occurrence of an item and report the cells it incremented
    ///
    /// Returns one position per row, in row order.
    pub fn add_with_positions(&mut self, item: &str) -> Vec<CellPosition> {
        let positions: Vec<CellPosition> = self.positions(item.as_bytes()).collect();
        self.num_updates = self.num_updates.saturating_add(1);
        self.total_count = self.total_count.saturating_add(1);

        for pos in &positions {
            let cell = &mut self.table[pos.row][pos.col];
            *cell = cell.saturating_add(1);
        }

        positions
    }

    /// Add count to an item
    pub fn add_count(&mut self, item: &[u8], count: u64) {
        self.num_updates = self.num_updates.saturating_add(1);
        self.total_count = self.total_count.saturating_add(count);

        for (row, col) in self.hashes.indices(item, self.width).enumerate() {
            self.table[row][col] = self.table[row][col].saturating_add(count);
        }
    }

    /// Add count using conservative update
    ///
    /// Conservative update improves accuracy by only incrementing counters
    /// up to the new estimated value. This reduces over-counting.
    pub fn add_conservative(&mut self, item: &[u8], count: u64) {
        self.num_updates = self.num_updates.saturating_add(1);
        self.total_count = self.total_count.saturating_add(count);

        // First pass: find current estimate (minimum)
        let new_val = self.query_bytes(item).saturating_add(count);

        // Second pass: set all counters to at least new_val
        for (row, col) in self.hashes.indices(item, self.width).enumerate() {
            if self.table[row][col] < new_val {
                self.table[row][col] = new_val;
            }
        }
    }

    /// Estimate the frequency of an item
    ///
    /// Never less than the true number of times the item was added.
    pub fn query(&self, item: &str) -> u64 {
        self.query_bytes(item.as_bytes())
    }

    /// Estimate the frequency of raw bytes
    pub fn query_bytes(&self, item: &[u8]) -> u64 {
        self.hashes
            .indices(item, self.width)
            .enumerate()
            .map(|(row, col)| self.table[row][col])
            .min()
            .unwrap_or(0)
    }

    /// Cells an item maps to, one per row
    pub fn positions<'a>(&'a self, item: &'a [u8]) -> impl Iterator<Item = CellPosition> + 'a {
        self.hashes
            .indices(item, self.width)
            .enumerate()
            .map(|(row, col)| CellPosition { row, col })
    }

    /// Zero every counter
    ///
    /// Hash functions are stateless and unaffected.
    pub fn reset(&mut self) {
        for row in &mut self.table {
            row.fill(0);
        }
        self.total_count = 0;
        self.num_updates = 0;
    }

    /// Read-only view of one row
    pub fn row(&self, row: usize) -> Option<&[u64]> {
        self.table.get(row).map(Vec::as_slice)
    }

    /// Counter at `(row, col)`, if in range
    pub fn cell(&self, row: usize, col: usize) -> Option<u64> {
        self.table.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Iterate over all rows
    pub fn rows(&self) -> impl Iterator<Item = &[u64]> + '_ {
        self.table.iter().map(Vec::as_slice)
    }

    /// Theoretical error bound (epsilon * total_count)
    pub fn error_bound(&self) -> u64 {
        let epsilon = core::f64::consts::E / self.width as f64;
        (epsilon * self.total_count as f64) as u64
    }
}

impl Sketch for CountMinSketch {
    type Item = str;

    fn update(&mut self, item: &str) {
        self.add(item);
    }

    fn clear(&mut self) {
        self.reset();
    }

    fn count(&self) -> u64 {
        self.num_updates
    }
}

impl FrequencySketch for CountMinSketch {
    fn estimate_frequency(&self, item: &str) -> u64 {
        self.query(item)
    }
}
