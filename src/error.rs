//! Error types for Fileflow.
//!
//! All errors in Fileflow are represented by the `FilingError` enum.
//! The first five variants are the domain taxonomy callers map onto their
//! transport (not found, invalid state, forbidden, rule violation, defect);
//! the rest wrap ambient failures from storage, config and conversion.

use std::{io::ErrorKind, string::FromUtf8Error};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for all Fileflow operations.
#[derive(Deserialize, Serialize, Error, Debug, Clone, PartialEq)]
pub enum FilingError {
    /// A referenced workflow, node, execution, file or extension request does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The operation is not allowed in the entity's current status.
    #[error("{0}")]
    InvalidState(String),

    /// The caller is not allowed to perform the operation.
    #[error("{0}")]
    Forbidden(String),

    /// A business rule was violated (action not permitted, missing start/end, duplicate code).
    #[error("{0}")]
    DomainRule(String),

    /// An invariant that should have been guaranteed upstream does not hold.
    #[error("{0}")]
    Fatal(String),

    /// Configuration parsing or validation errors.
    #[error("{0}")]
    Config(String),

    /// Data conversion errors (JSON, TOML, schema validation).
    #[error("{0}")]
    Convert(String),

    /// Storage operation errors.
    #[error("{0}")]
    Store(String),

    /// Message queue errors.
    #[error("{0}")]
    Queue(String),

    /// I/O operation errors.
    #[error("{0}")]
    IoError(String),
}

impl FilingError {
    /// Returns true for errors caused by the caller's request rather than the engine.
    pub fn is_client_error(&self) -> bool {
        matches!(self, FilingError::NotFound(_) | FilingError::InvalidState(_) | FilingError::Forbidden(_) | FilingError::DomainRule(_))
    }
}

impl From<FilingError> for String {
    fn from(val: FilingError) -> Self {
        val.to_string()
    }
}

impl From<std::io::Error> for FilingError {
    fn from(error: std::io::Error) -> Self {
        FilingError::IoError(error.to_string())
    }
}

impl From<FilingError> for std::io::Error {
    fn from(val: FilingError) -> Self {
        #[allow(clippy::io_other_error)]
        std::io::Error::new(ErrorKind::Other, val.to_string())
    }
}

impl From<FromUtf8Error> for FilingError {
    fn from(_: FromUtf8Error) -> Self {
        FilingError::Convert("Error with utf-8 string convert".to_string())
    }
}

impl From<serde_json::Error> for FilingError {
    fn from(error: serde_json::Error) -> Self {
        FilingError::Convert(error.to_string())
    }
}

impl From<toml::de::Error> for FilingError {
    fn from(error: toml::de::Error) -> Self {
        FilingError::Config(error.to_string())
    }
}

impl From<jsonschema::ValidationError<'_>> for FilingError {
    fn from(error: jsonschema::ValidationError<'_>) -> Self {
        FilingError::Convert(error.to_string())
    }
}
