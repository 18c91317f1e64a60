//! The module contains the errors the ledger can throw.
//!
//! The errors are:
//!
//! - [`Validation`] thrown when user input is rejected before any store call.
//! - [`StorageUnavailable`] thrown when the record store cannot be reached or
//!   refuses a request.
//! - [`PartialArchiveFailure`] thrown when a round close stops midway.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`StorageUnavailable`]: EngineError::StorageUnavailable
//!  [`PartialArchiveFailure`]: EngineError::PartialArchiveFailure
use thiserror::Error;

/// Failures reported by a [`RecordStore`](crate::RecordStore) backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("record store unreachable: {0}")]
    Unreachable(String),
    #[error("record store timed out")]
    Timeout,
    #[error("record store rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("record store returned a malformed response: {0}")]
    Malformed(String),
}

/// Ledger custom errors.
#[derive(Error, Debug, PartialEq)]
pub enum EngineError {
    #[error("{0}")]
    Validation(String),
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] StoreError),
    #[error("round close interrupted: {archived} archived, {remaining} remaining: {source}")]
    PartialArchiveFailure {
        archived: usize,
        remaining: usize,
        #[source]
        source: StoreError,
    },
}

impl EngineError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
