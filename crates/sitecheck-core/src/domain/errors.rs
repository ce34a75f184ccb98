//! Error taxonomy for the job lifecycle.
//!
//! Split by collaborator: `StoreError` for the record store,
//! `ProviderError` for the analysis provider, `JobError` for everything
//! the lifecycle controller surfaces to its caller. Provider failures
//! never appear in `JobError`: the analyzer absorbs them into the
//! fallback report.

use thiserror::Error;

use super::ids::JobId;

/// Record store failures. Fatal to the request that hit them; there is no
/// automatic retry, the worker re-submits.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store transport error: {0}")]
    Transport(String),

    #[error("store returned status {0}")]
    Status(u16),

    #[error("could not decode store row: {0}")]
    Decode(String),

    /// The row violates a lifecycle invariant (e.g. checked in but no
    /// payout on record). Surfaced rather than silently repaired.
    #[error("corrupt job record: {0}")]
    Corrupt(String),
}

/// Analysis provider failures. Always absorbed by the analyzer fallback.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider transport error: {0}")]
    Transport(String),

    #[error("provider returned status {0}")]
    Status(u16),

    #[error("provider returned an empty completion")]
    Empty,
}

/// Errors surfaced by the lifecycle controller.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("job not found: {0}")]
    NotFound(JobId),

    #[error("presented code does not match the location secret")]
    InvalidCode,

    #[error("job {0} is already checked in")]
    AlreadyCheckedIn(JobId),

    #[error("job {0} has not been checked in")]
    NotCheckedIn(JobId),

    #[error("job {0} is already completed")]
    AlreadyCompleted(JobId),

    #[error(transparent)]
    Store(#[from] StoreError),
}
