// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error types for the evolution engine.

use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Engine error types.
///
/// `NotConfigured` and `NotFinalized` are *soft* failures: an operation was
/// called before the setup it depends on. The engine facade turns them into a
/// warning plus an unchanged result; everything else is a hard error.
#[derive(Debug, Error)]
pub enum Error {
    /// Hilbert dimension has not been set
    #[error("Hilbert dimension is not set (call set_dimension first)")]
    NotConfigured,

    /// Operator set changed since the last finalize
    #[error("Operator registry is not finalized (call finalize first)")]
    NotFinalized,

    /// Dimension is not usable
    #[error("Invalid Hilbert dimension: {0}")]
    InvalidDimension(usize),

    /// Matrix or buffer does not match the configured dimension
    #[error("Dimension mismatch for {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    /// Malformed flat buffer
    #[error("Invalid buffer: {0}")]
    InvalidBuffer(String),

    /// Pade order out of range
    #[error("Invalid Pade order {0}: must be within 3..=20")]
    InvalidPadeOrder(u32),

    /// Timestep is not a positive finite number
    #[error("Invalid timestep: {0}")]
    InvalidTimestep(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Whether this is a setup-order precondition violation.
    pub fn is_soft(&self) -> bool {
        matches!(self, Error::NotConfigured | Error::NotFinalized)
    }

    pub(crate) fn mismatch(what: impl Into<String>, expected: usize, actual: usize) -> Self {
        Error::DimensionMismatch {
            what: what.into(),
            expected,
            actual,
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    #[test]
    fn test_soft_failures_are_flagged() {
        assert!(Error::NotConfigured.is_soft());
        assert!(Error::NotFinalized.is_soft());
        assert!(!Error::InvalidDimension(0).is_soft());
        assert!(!Error::Config("x".into()).is_soft());
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            Error::NotFinalized.to_string(),
            "Operator registry is not finalized (call finalize first)"
        );
        assert_eq!(
            Error::mismatch("density matrix", 4, 9).to_string(),
            "Dimension mismatch for density matrix: expected 4, got 9"
        );
        assert_eq!(
            Error::InvalidPadeOrder(25).to_string(),
            "Invalid Pade order 25: must be within 3..=20"
        );
    }

    #[test]
    fn test_io_error_source() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing").into();
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("IO error"));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_err = serde_yaml::from_str::<Vec<u32>>("{{not yaml").unwrap_err();
        let err: Error = yaml_err.into();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
