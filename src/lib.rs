//! # Approxkit
//!
//! Probabilistic estimators for membership, frequency and cardinality.
//!
//! Each structure hashes items into a fixed-size array and answers queries
//! approximately, with an error that is either one-sided (Bloom filter,
//! Count-Min Sketch) or statistically bounded (HyperLogLog).
//!
//! ## Features
//!
//! - **Membership**: [`BloomFilter`] with the closed-form false positive probability
//! - **Frequency**: [`CountMinSketch`] that never underestimates
//! - **Cardinality**: [`HyperLogLog`] with regime classification and error-bound diagnostics
//!
//! ## Quick Start
//!
//! ```rust
//! use approxkit::prelude::*;
//!
//! // Count distinct users
//! let mut hll = HyperLogLog::new(14)?;
//! for user_id in ["alice", "bob", "charlie", "alice"] {
//!     hll.add(user_id);
//! }
//! println!("Distinct users: ~{}", hll.estimate_cardinality());
//!
//! // Track how often each page is hit
//! let mut cms = CountMinSketch::new(20, 4)?;
//! cms.add("/index");
//! assert!(cms.query("/index") >= 1);
//!
//! // Remember which keys were seen
//! let mut bloom = BloomFilter::with_params(100, 3)?;
//! bloom.add("alice");
//! assert!(bloom.might_contain("alice"));
//! # Ok::<(), approxkit::Error>(())
//! ```
//!
//! ## Concurrency
//!
//! Sketches are plain owned values with no internal synchronization. Updates
//! take `&mut self`; share a sketch between writers by wrapping it in a lock.
//!
//! ## Feature Flags
//!
//! Estimator families (all enabled by default):
//! - `cardinality`: HyperLogLog
//! - `frequency`: Count-Min Sketch
//! - `membership`: Bloom filter
//! - `full`: Enable all families
//!
//! Platform features:
//! - `std` (default): Standard library support; without it, enable `libm`
//! - `serde`: Serialize diagnostic records (estimates, regimes, warnings)

#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(all(not(feature = "std"), not(feature = "libm")))]
compile_error!("building without `std` requires the `libm` feature");

pub mod error;
pub mod hash;
mod math;
pub mod traits;

#[cfg(feature = "cardinality")]
#[cfg_attr(docsrs, doc(cfg(feature = "cardinality")))]
pub mod cardinality;

#[cfg(feature = "frequency")]
#[cfg_attr(docsrs, doc(cfg(feature = "frequency")))]
pub mod frequency;

#[cfg(feature = "membership")]
#[cfg_attr(docsrs, doc(cfg(feature = "membership")))]
pub mod membership;

pub use error::{Error, Result};

pub mod prelude {
    pub use crate::error::Error;
    pub use crate::traits::*;

    #[cfg(feature = "cardinality")]
    pub use crate::cardinality::{HyperLogLog, Regime};

    #[cfg(feature = "frequency")]
    pub use crate::frequency::CountMinSketch;

    #[cfg(feature = "membership")]
    pub use crate::membership::BloomFilter;
}

#[cfg(feature = "cardinality")]
pub use cardinality::HyperLogLog;

#[cfg(feature = "frequency")]
pub use frequency::CountMinSketch;

#[cfg(feature = "membership")]
pub use membership::BloomFilter;
