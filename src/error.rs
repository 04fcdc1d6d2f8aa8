//! Error type for sketch construction
//!
//! Every operation on a constructed sketch is total, so the only failure a
//! caller can observe is an out-of-range parameter at construction time.

#[cfg(not(feature = "std"))]
use alloc::string::{String, ToString};

/// Error returned when a sketch is configured with invalid parameters
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A construction parameter is out of its accepted range
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        /// Parameter name as it appears in the constructor signature
        name: &'static str,
        /// The rejected value, rendered for display
        value: String,
        /// What the accepted range is
        reason: &'static str,
    },
}

impl Error {
    pub(crate) fn invalid(
        name: &'static str,
        value: impl core::fmt::Display,
        reason: &'static str,
    ) -> Self {
        Error::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// Name of the parameter that was rejected
    pub fn parameter(&self) -> &'static str {
        match self {
            Error::InvalidParameter { name, .. } => name,
        }
    }
}

/// Result alias used by sketch constructors
pub type Result<T> = core::result::Result<T, Error>;
