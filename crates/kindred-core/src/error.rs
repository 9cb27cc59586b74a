//! Error types for Kindred Core

use thiserror::Error;

/// Result type alias using Kindred's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Kindred error types
///
/// Every variant is a local validation failure. An operation that returns
/// one of these has left the registry exactly as it found it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid attribute: {0}")]
    InvalidAttribute(String),

    #[error("Invalid relationship: {0}")]
    InvalidRelationship(String),

    #[error("Invalid marriage: {0}")]
    InvalidMarriage(String),

    #[error("Unknown ID: {0}")]
    UnknownPerson(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Duplicate identifier: {0}")]
    DuplicateId(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Stable machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidAttribute(_) => "invalid_attribute",
            Self::InvalidRelationship(_) => "invalid_relationship",
            Self::InvalidMarriage(_) => "invalid_marriage",
            Self::UnknownPerson(_) => "unknown_person",
            Self::InvalidQuery(_) => "invalid_query",
            Self::DuplicateId(_) => "duplicate_id",
            Self::Internal(_) => "internal",
        }
    }
}
