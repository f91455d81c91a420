// Copyright (c) 2022 Alexis Sellier
//
// Licensed under the MIT license.

//! Error type shared by the filter and both optimizers.

/// Result type alias for filter and optimizer operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by hashing, filter construction and parameter search.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// A size, count or bound was out of its valid range, eg. `q = 0`.
    #[error("invalid parameter `{name}`: {value}")]
    InvalidParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// The value that was rejected.
        value: usize,
    },
    /// A target false positive rate outside of `(0, 1)`.
    #[error("invalid false positive rate: {0}")]
    InvalidRate(f64),
    /// There are no keys to draw false-positive trials from.
    #[error("cannot sample trial keys from an empty key space")]
    EmptyKeySpace,
}

impl Error {
    pub(crate) fn invalid(name: &'static str, value: usize) -> Self {
        Self::InvalidParameter { name, value }
    }
}

/// Reject zero for a parameter that must be positive.
pub(crate) fn positive(name: &'static str, value: usize) -> Result<usize> {
    if value == 0 {
        Err(Error::invalid(name, value))
    } else {
        Ok(value)
    }
}
