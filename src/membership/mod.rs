//! Membership testing data structures
//!
//! These structures trade a small probability of false positives for significant
//! space savings compared to exact set representations.
//!
//! # Example
//!
//! ```
//! use approxkit::membership::BloomFilter;
//!
//! let mut bloom = BloomFilter::new(1000, 0.01)?;
//! bloom.add("hello");
//! assert!(bloom.might_contain("hello"));
//! # Ok::<(), approxkit::Error>(())
//! ```

mod bloom;

pub use bloom::BloomFilter;
