//! Error types for the rental API client.
//!
//! # Design
//! Every non-2xx response lands in `Http` with the raw status code and body
//! text; callers that care about "does not exist" ask `is_not_found()`.
//! A body that claims to be JSON but does not parse is not an error at all
//! (the parser yields "no value"), so `Deserialization` is reserved for well-formed
//! JSON whose shape does not match the requested model.
//!
//! Validation failures are raised before any request is built and carry
//! every failing field.
//!
//! `ApiError` is `Clone` so the query cache can keep the last failure of a
//! key in its error state while also returning it to the caller.

use thiserror::Error;

use crate::validation::ValidationErrors;

/// Errors returned by the client, transport and query layers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// The server answered with a non-2xx status.
    #[error("HTTP error! status: {status}, message: {body}")]
    Http { status: u16, body: String },

    /// The request never produced a response (DNS, connect, I/O).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Well-formed JSON that does not match the expected model.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// Invalid client configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Local form validation rejected the input; nothing was sent.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// A downloaded document could not be written to disk.
    #[error("failed to save document: {0}")]
    Io(String),
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl ApiError {
    /// Status code of an `Http` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
