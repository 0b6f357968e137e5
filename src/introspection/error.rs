//! Error types for catalog introspection.

use thiserror::Error;

use crate::config::ConnectionError;
use crate::inference::InferenceError;

/// Result type for introspection operations.
pub type IntrospectionResult<T> = Result<T, IntrospectionError>;

#[derive(Error, Debug)]
pub enum IntrospectionError {
    /// Connecting to or querying the catalog failed.
    #[error("catalog query failed: {0}")]
    Query(#[from] sqlx::Error),

    /// A catalog row could not be read into the expected shape.
    #[error("unexpected value in column '{column}': {message}")]
    Decode { column: String, message: String },

    #[error(transparent)]
    Config(#[from] ConnectionError),

    #[error(transparent)]
    Inference(#[from] InferenceError),
}
