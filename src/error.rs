//! Error types for the buildgate CLI.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.
//! Lock store and issue source failures are wrapped transparently so the
//! underlying error reaches the operator unmodified.

use crate::exit_codes;
use crate::locks::StoreError;
use crate::source::SourceError;
use thiserror::Error;

/// Main error type for buildgate operations.
///
/// Each variant maps to a distinct exit code.
#[derive(Error, Debug)]
pub enum GateError {
    /// Malformed input or invalid configuration, rejected before any store interaction.
    #[error("{0}")]
    UserError(String),

    /// The lock is held by another party (contention, not a failure).
    #[error("Lock is held: {0}")]
    LockHeld(String),

    /// The lock store failed (I/O, corrupt record, unreachable backend).
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The issue source could not be read.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// One or more dispatch events could not be emitted.
    #[error("Dispatch failed: {0}")]
    DispatchError(String),
}

impl GateError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            GateError::UserError(_) => exit_codes::USER_ERROR,
            GateError::LockHeld(_) => exit_codes::LOCK_HELD,
            GateError::Store(_) => exit_codes::STORE_FAILURE,
            GateError::Source(_) => exit_codes::SOURCE_FAILURE,
            GateError::DispatchError(_) => exit_codes::DISPATCH_FAILURE,
        }
    }
}

/// Result type alias for buildgate operations.
pub type Result<T> = std::result::Result<T, GateError>;
