//! HyperLogLog cardinality estimator
//!
//! Implementation of the HyperLogLog algorithm over a 32-bit hash, with
//! linear counting for small cardinalities and the large-range correction
//! for estimates approaching the hash space.

use core::fmt;

use crate::error::{Error, Result};
use crate::hash::{hash32, DEFAULT_SEED};
use crate::math;
use crate::traits::{z_score, CardinalitySketch, ErrorBounds, Sketch};

#[cfg(feature = "std")]
use std::vec::Vec;

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

/// Smallest accepted precision
pub const MIN_PRECISION: u8 = 1;
/// Largest accepted precision
pub const MAX_PRECISION: u8 = 16;

const TWO_POW_32: f64 = 4_294_967_296.0;
/// Raw estimates above this use the large-range correction
const LARGE_RANGE_THRESHOLD: f64 = TWO_POW_32 / 30.0;

/// Which correction an estimate went through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Regime {
    /// Raw estimate ≤ 2.5·m; linear counting while empty registers remain
    Immature,
    /// Raw estimate used as is
    Normal,
    /// Raw estimate > 2^32/30; corrected for hash collisions
    Exhausted,
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Regime::Immature => "immature",
            Regime::Normal => "normal",
            Regime::Exhausted => "exhausted",
        };
        f.write_str(label)
    }
}

/// What a single insertion did to the register array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AddDetails {
    /// 32-bit hash of the item
    pub hash: u32,
    /// Register the hash was routed to (`hash mod m`)
    pub bucket_index: usize,
    /// Leading zeros of the hash plus one
    pub run_length: u8,
    /// Register value before this insertion
    pub previous_run_length: u8,
    /// Whether the register was raised
    pub was_updated: bool,
}

/// A cardinality estimate and the regime that produced it
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CardinalityEstimate {
    /// Uncorrected harmonic-mean estimate
    pub raw: f64,
    /// Estimate after the regime's correction
    pub value: f64,
    /// Correction regime
    pub regime: Regime,
}

impl CardinalityEstimate {
    /// Estimate rounded to the nearest integer
    pub fn rounded(&self) -> u64 {
        math::round(self.value) as u64
    }
}

/// An estimate that fell outside `ground_truth · (1 ± standard_error)`
///
/// This is an expected outcome of a probabilistic estimator, not a failure.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ErrorBoundWarning {
    /// Exact distinct count supplied by the caller
    pub ground_truth: u64,
    /// Rounded estimate
    pub estimate: u64,
    /// Lower edge of the expected range
    pub lower: f64,
    /// Upper edge of the expected range
    pub upper: f64,
    /// Relative standard error the range was built from
    pub standard_error: f64,
}

impl fmt::Display for ErrorBoundWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "estimate {} is outside the expected range [{:.0}, {:.0}] for {} distinct items (standard error {:.2}%)",
            self.estimate,
            self.lower,
            self.upper,
            self.ground_truth,
            self.standard_error * 100.0
        )
    }
}

/// HyperLogLog cardinality estimator
///
/// Estimates the number of distinct elements with configurable precision.
/// Memory usage is 2^precision bytes.
///
/// # Error Rate
///
/// The relative standard error is approximately 1.04 / sqrt(m) where m = 2^precision.
///
/// | Precision | Registers | Error |
/// |-----------|-----------|-------|
/// | 4 | 16 | ~26% |
/// | 7 | 128 | ~9.2% |
/// | 10 | 1024 | ~3.25% |
/// | 12 | 4096 | ~1.63% |
/// | 14 | 16384 | ~0.81% |
/// | 16 | 65536 | ~0.41% |
///
/// # Example
///
/// ```
/// use approxkit::cardinality::{HyperLogLog, Regime};
///
/// let mut hll = HyperLogLog::new(10)?;
///
/// for i in 0..10000 {
///     hll.add(&format!("user_{}", i));
/// }
///
/// let count = hll.estimate_cardinality();
/// assert_eq!(hll.regime(), Some(Regime::Normal));
/// assert!(hll.error_percentage(10000) < 15.0, "estimate {}", count);
/// # Ok::<(), approxkit::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct HyperLogLog {
    /// Precision parameter (1-16)
    precision: u8,
    /// Registers (one byte per register)
    registers: Vec<u8>,
    /// Bias-correction constant for m
    alpha: f64,
    /// Regime of the last recorded estimate
    regime: Option<Regime>,
    /// Number of items inserted
    count: u64,
}

impl HyperLogLog {
    /// Create a new HyperLogLog with the given precision
    ///
    /// Higher precision gives better accuracy but uses more memory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if precision is not in `1..=16`
    pub fn new(precision: u8) -> Result<Self> {
        if !(MIN_PRECISION..=MAX_PRECISION).contains(&precision) {
            return Err(Error::invalid(
                "precision",
                precision,
                "must be between 1 and 16",
            ));
        }

        let m = 1usize << precision;
        let alpha = alpha_for(m);
        tracing::debug!(precision, registers = m, alpha, "creating hyperloglog");

        Ok(Self {
            precision,
            registers: vec![0u8; m],
            alpha,
            regime: None,
            count: 0,
        })
    }

    /// Create a HyperLogLog targeting a specific error rate
    ///
    /// The error rate is approximate and represents the relative standard error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if `target_error` is not in (0, 1)
    pub fn with_error(target_error: f64) -> Result<Self> {
        if !(target_error > 0.0 && target_error < 1.0) {
            return Err(Error::invalid(
                "target_error",
                target_error,
                "must be in (0, 1)",
            ));
        }
        Self::new(super::precision_for_error(target_error))
    }

    /// Get the precision parameter
    pub fn precision(&self) -> u8 {
        self.precision
    }

    /// Get the number of registers (m = 2^precision)
    pub fn num_registers(&self) -> usize {
        self.registers.len()
    }

    /// Read-only view of the registers
    pub fn registers(&self) -> &[u8] {
        &self.registers
    }

    /// Bias-correction constant
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Relative standard error, 1.04 / sqrt(m)
    pub fn standard_error(&self) -> f64 {
        1.04 / math::sqrt(self.registers.len() as f64)
    }

    /// Standard error rounded to two decimals, as shown to users
    pub fn standard_error_display(&self) -> f64 {
        math::round(self.standard_error() * 100.0) / 100.0
    }

    /// Regime of the last estimate recorded by [`estimate_cardinality`](Self::estimate_cardinality)
    ///
    /// `None` until the first recorded estimate, and again after [`clear`](Sketch::clear).
    pub fn regime(&self) -> Option<Regime> {
        self.regime
    }

    /// Count registers with value 0
    pub fn zero_registers(&self) -> usize {
        self.registers.iter().filter(|&&r| r == 0).count()
    }

    /// Insert an item
    pub fn add(&mut self, item: &str) {
        self.add_bytes(item.as_bytes());
    }

    /// Insert raw bytes
    pub fn add_bytes(&mut self, bytes: &[u8]) {
        self.insert_hash(hash32(bytes, DEFAULT_SEED));
    }

    /// Insert an item and report how it changed the registers
    pub fn add_with_details(&mut self, item: &str) -> AddDetails {
        self.insert_hash(hash32(item.as_bytes(), DEFAULT_SEED))
    }

    /// Insert a pre-computed 32-bit hash
    pub fn insert_hash(&mut self, hash: u32) -> AddDetails {
        self.count += 1;

        let bucket_index = hash as usize % self.registers.len();
        // Zero has no 1-bit: leading_zeros is the full 32
        let run_length = hash.leading_zeros() as u8 + 1;
        let previous_run_length = self.registers[bucket_index];

        let was_updated = run_length > previous_run_length;
        if was_updated {
            self.registers[bucket_index] = run_length;
            tracing::trace!(
                bucket_index,
                previous_run_length,
                run_length,
                "register raised"
            );
        }

        AddDetails {
            hash,
            bucket_index,
            run_length,
            previous_run_length,
            was_updated,
        }
    }

    /// Raw estimate using harmonic mean
    ///
    /// Every zero register contributes 2^0 = 1 to the sum, so the
    /// denominator is always positive.
    fn raw_estimate(&self) -> f64 {
        let m = self.registers.len() as f64;

        let sum: f64 = self
            .registers
            .iter()
            .map(|&r| math::powi(2.0, -(r as i32)))
            .sum();

        self.alpha * m * m / sum
    }

    /// Linear counting estimate for small cardinalities
    fn linear_counting(&self, zeros: usize) -> f64 {
        let m = self.registers.len() as f64;
        m * math::ln(m / zeros as f64)
    }

    /// Compute the estimate and classify its regime without recording it
    pub fn estimate_with_regime(&self) -> CardinalityEstimate {
        let m = self.registers.len() as f64;
        let raw = self.raw_estimate();

        let (value, regime) = if raw <= 2.5 * m {
            let zeros = self.zero_registers();
            let value = if zeros > 0 {
                self.linear_counting(zeros)
            } else {
                raw
            };
            (value, Regime::Immature)
        } else if raw <= LARGE_RANGE_THRESHOLD {
            (raw, Regime::Normal)
        } else {
            // Saturate once the raw estimate reaches the hash space
            let remaining = (1.0 - raw / TWO_POW_32).max(f64::MIN_POSITIVE);
            (-TWO_POW_32 * math::ln(remaining), Regime::Exhausted)
        };

        CardinalityEstimate { raw, value, regime }
    }

    /// Estimate the number of distinct items, recording the regime
    pub fn estimate_cardinality(&mut self) -> u64 {
        let estimate = self.estimate_with_regime();
        self.regime = Some(estimate.regime);
        estimate.rounded()
    }

    /// Compare the estimate against an exact count
    ///
    /// Returns a warning when the estimate falls outside
    /// `ground_truth · (1 ± standard_error)`. The sketch stays usable either way.
    pub fn error_bound_check(&mut self, ground_truth: u64) -> Option<ErrorBoundWarning> {
        let estimate = self.estimate_cardinality();
        let standard_error = self.standard_error();
        // ±1 standard error covers ~68% of outcomes
        let bounds = ErrorBounds::relative(ground_truth as f64, standard_error, 0.68);

        if bounds.contains(estimate as f64) {
            return None;
        }

        let warning = ErrorBoundWarning {
            ground_truth,
            estimate,
            lower: bounds.lower,
            upper: bounds.upper,
            standard_error,
        };
        tracing::warn!(
            estimate,
            ground_truth,
            lower = bounds.lower,
            upper = bounds.upper,
            "cardinality estimate outside expected error bounds"
        );
        Some(warning)
    }

    /// Signed difference between the rounded estimate and an exact count
    ///
    /// Saturates at `i64::MIN` / `i64::MAX` when the difference does not fit.
    pub fn delta(&self, ground_truth: u64) -> i64 {
        let diff = self.estimate_with_regime().rounded() as i128 - ground_truth as i128;
        diff.clamp(i64::MIN as i128, i64::MAX as i128) as i64
    }

    /// Absolute error as a percentage of an exact count
    ///
    /// Defined as 0 when `ground_truth` is 0.
    pub fn error_percentage(&self, ground_truth: u64) -> f64 {
        if ground_truth == 0 {
            return 0.0;
        }
        let diff = self.estimate_with_regime().rounded().abs_diff(ground_truth);
        diff as f64 / ground_truth as f64 * 100.0
    }
}

/// Alpha constant for given m
fn alpha_for(m: usize) -> f64 {
    match m {
        16 => 0.673,
        32 => 0.697,
        64 => 0.709,
        _ => 0.7213 / (1.0 + 1.079 / m as f64),
    }
}

impl Sketch for HyperLogLog {
    type Item = str;

    fn update(&mut self, item: &str) {
        self.add(item);
    }

    fn clear(&mut self) {
        self.registers.fill(0);
        self.regime = None;
        self.count = 0;
    }

    fn count(&self) -> u64 {
        self.count
    }
}

impl CardinalitySketch for HyperLogLog {
    fn estimate(&self) -> f64 {
        self.estimate_with_regime().value
    }

    fn error_bounds(&self, confidence: f64) -> ErrorBounds {
        let estimate = self.estimate_with_regime().value;
        let margin = z_score(confidence) * self.relative_error() * estimate;
        ErrorBounds::new(
            (estimate - margin).max(0.0),
            estimate,
            estimate + margin,
            confidence,
        )
    }

    fn relative_error(&self) -> f64 {
        self.standard_error()
    }
}
