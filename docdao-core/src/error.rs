//! Error types and result types for access-layer operations.
//!
//! Driver failures pass through unchanged in the variant naming the phase
//! that failed; nothing here retries or recovers. A missing document is not
//! an error anywhere in this workspace - lookups return `Ok(None)`.

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use std::time::Duration;
use thiserror::Error;

/// Represents all possible errors surfaced by the access layer.
#[derive(Error, Debug)]
pub enum DaoError {
    /// Resolving a database handle from the provider failed.
    #[error("Connection error: {0}")]
    Connection(String),
    /// A request document could not be built, or a model failed to
    /// (de)serialize into its document representation.
    #[error("Encoding error: {0}")]
    Encoding(String),
    /// The driver reported a failure while reading, including mid-cursor.
    #[error("Query error: {0}")]
    Query(String),
    /// The driver reported a failure while writing.
    #[error("Write error: {0}")]
    Write(String),
    /// A bounded wait elapsed before the operation completed.
    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

/// A specialized `Result` type for access-layer operations.
pub type DaoResult<T> = Result<T, DaoError>;

impl From<BsonError> for DaoError {
    fn from(err: BsonError) -> Self {
        DaoError::Encoding(err.to_string())
    }
}

impl From<SerdeJsonError> for DaoError {
    fn from(err: SerdeJsonError) -> Self {
        DaoError::Encoding(err.to_string())
    }
}
