//! Shared interfaces of the estimators
//!
//! [`Sketch`] covers what every structure can do (absorb an item, forget
//! everything, report how many items it absorbed). Each family adds its own
//! query on top.

use core::fmt::Debug;

/// Interval around an estimate at a stated confidence
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ErrorBounds {
    pub lower: f64,
    pub estimate: f64,
    pub upper: f64,
    /// Two-sided confidence, e.g. `0.68` for one standard error
    pub confidence: f64,
}

impl ErrorBounds {
    pub fn new(lower: f64, estimate: f64, upper: f64, confidence: f64) -> Self {
        Self {
            lower,
            estimate,
            upper,
            confidence,
        }
    }

    /// `center · (1 - relative) ..= center · (1 + relative)`
    pub fn relative(center: f64, relative: f64, confidence: f64) -> Self {
        Self::new(
            center * (1.0 - relative),
            center,
            center * (1.0 + relative),
            confidence,
        )
    }

    /// Inclusive on both ends
    pub fn contains(&self, value: f64) -> bool {
        (self.lower..=self.upper).contains(&value)
    }
}

/// Fixed-size structure fed one item at a time
pub trait Sketch: Clone + Debug {
    type Item: ?Sized;

    fn update(&mut self, item: &Self::Item);

    /// Back to the freshly constructed state, keeping the dimensions
    fn clear(&mut self);

    /// Items absorbed since construction or the last clear
    fn count(&self) -> u64;
}

/// Distinct-count estimators
pub trait CardinalitySketch: Sketch {
    fn estimate(&self) -> f64;

    /// Normal-approximation interval at `confidence` (`0.0..=1.0`)
    fn error_bounds(&self, confidence: f64) -> ErrorBounds;

    /// Standard error divided by the true cardinality
    fn relative_error(&self) -> f64;
}

/// Per-item occurrence estimators
pub trait FrequencySketch: Sketch {
    /// Never below the true count of `item`
    fn estimate_frequency(&self, item: &Self::Item) -> u64;
}

/// Approximate set membership
pub trait MembershipSketch: Sketch {
    /// `false` is definite; `true` may be a false positive
    fn contains(&self, item: &Self::Item) -> bool;

    fn false_positive_rate(&self) -> f64;

    fn len(&self) -> usize;
}

/// Z-score for a two-sided normal interval at the given confidence
pub(crate) fn z_score(confidence: f64) -> f64 {
    match confidence {
        c if c >= 0.99 => 2.576,
        c if c >= 0.95 => 1.96,
        c if c >= 0.90 => 1.645,
        c if c >= 0.80 => 1.282,
        _ => 1.0,
    }
}
