//! Errors raised by the inference engine.
//!
//! These are invariant violations (programmer errors). Metadata problems that
//! only degrade the output are reported as [`Diagnostic`](super::Diagnostic)s.

use thiserror::Error;

/// Result type for inference operations.
pub type InferenceResult<T> = Result<T, InferenceError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InferenceError {
    /// The one-to-one test only applies to edges whose owner holds the key.
    #[error("relation '{constraint_name}' to '{to_table}' is a backward edge; the one-to-one test requires a forward edge")]
    InvalidDirection {
        constraint_name: String,
        to_table: String,
    },
}
