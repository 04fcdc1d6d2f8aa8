//! Frequency estimation
//!
//! # Algorithms
//!
//! - [`CountMinSketch`]: count-min sketch with optional conservative update
//!
//! # Example
//!
//! ```
//! use approxkit::frequency::CountMinSketch;
//!
//! let mut cms = CountMinSketch::with_error(0.01, 0.001)?; // 1% error, 0.1% probability
//!
//! cms.add_count(b"item1", 5);
//! cms.add_count(b"item2", 3);
//!
//! let count = cms.query("item1");
//! println!("Estimated count: {}", count);
//! # Ok::<(), approxkit::Error>(())
//! ```

mod count_min;

pub use count_min::{CellPosition, CountMinSketch};
