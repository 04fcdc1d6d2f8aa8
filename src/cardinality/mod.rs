//! Cardinality (distinct count) estimation
//!
//! # Algorithms
//!
//! - [`HyperLogLog`]: HLL over a 32-bit hash with small- and large-range corrections
//!
//! # Example
//!
//! ```
//! use approxkit::cardinality::HyperLogLog;
//!
//! let mut hll = HyperLogLog::new(14)?; // ~0.8% error
//!
//! for i in 0..10000 {
//!     hll.add(&i.to_string());
//! }
//!
//! let estimate = hll.estimate_cardinality();
//! println!("estimated distinct count: {} ({:?})", estimate, hll.regime());
//! # Ok::<(), approxkit::Error>(())
//! ```

mod hyperloglog;

pub use hyperloglog::{
    AddDetails, CardinalityEstimate, ErrorBoundWarning, HyperLogLog, Regime, MAX_PRECISION,
    MIN_PRECISION,
};

use crate::math;

/// Smallest precision whose standard error `1.04 / sqrt(2^p)` is at most
/// `target_error`, clamped to the supported range
pub fn precision_for_error(target_error: f64) -> u8 {
    let m = math::powi(1.04 / target_error, 2);
    let p = math::ceil(math::ln(m) / core::f64::consts::LN_2) as u8;
    p.clamp(MIN_PRECISION, MAX_PRECISION)
}

/// Compute the memory usage for a given precision
pub fn memory_for_precision(precision: u8) -> usize {
    1usize << precision
}

/// Compute the expected error for a given precision
pub fn error_for_precision(precision: u8) -> f64 {
    let m = (1usize << precision) as f64;
    1.04 / math::sqrt(m)
}
