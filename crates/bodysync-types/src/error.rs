//! Error types for measurement parsing in bodysync-types.

use thiserror::Error;

/// Errors that can occur when decoding provider measurement payloads.
///
/// This error type is transport-agnostic: HTTP and authentication failures
/// belong to the collaborator that fetched the payload, not here.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The provider answered with a non-zero application status code.
    #[error("provider rejected the request with status {0}")]
    ProviderStatus(i64),

    /// A payload field could not be interpreted.
    #[error("invalid measurement payload: {0}")]
    InvalidPayload(String),

    /// The payload was not syntactically valid JSON.
    #[cfg(feature = "serde")]
    #[error("malformed measurement document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias using bodysync-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
