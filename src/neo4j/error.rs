//! Errors returned by graph store operations

use std::time::Duration;
use thiserror::Error;

/// Errors from the graph store.
///
/// Callers on the HTTP side flatten every variant into a single error
/// string; the variants exist for logging and for tests.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no database connection available after {waited:?}")]
    ConnectionUnavailable { waited: Duration },

    #[error("query failed: {0}")]
    Query(#[from] neo4rs::Error),

    #[error("failed to decode row: {0}")]
    Decode(String),

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl StoreError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }
}

impl From<neo4rs::DeError> for StoreError {
    fn from(err: neo4rs::DeError) -> Self {
        Self::Decode(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
