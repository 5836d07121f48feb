//! Error types for bodysync-core.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using bodysync-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by reconciliation, encoding and output routing.
///
/// Data-absence conditions (no groups, no weight, missing height) are not
/// errors anywhere in this crate; they surface as `None` fields or empty
/// sequences. This enum covers format-invariant violations and collaborator
/// failures only.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A value does not fit the binary field it must be encoded into.
    ///
    /// Raised instead of truncating: a silently wrapped value would produce a
    /// byte-valid but semantically wrong file that the consuming service
    /// cannot detect.
    #[error("{field} value {value} exceeds the encodable range of the {message} message")]
    FieldRange {
        /// Message kind the field belongs to.
        message: &'static str,
        /// Field name within the message.
        field: &'static str,
        /// The offending input value.
        value: f64,
    },

    /// A timestamp predates the container format's reference epoch.
    #[error("timestamp {0} predates the container format epoch")]
    PreEpochTimestamp(i64),

    /// The upload collaborator rejected a finalized buffer.
    ///
    /// The transport returns no further diagnostic; callers treat this as a
    /// fatal upload failure and do not retry at this layer.
    #[error("upload rejected: {0}")]
    UploadRejected(String),

    /// The provider payload could not be decoded.
    #[error(transparent)]
    Parse(#[from] bodysync_types::ParseError),

    /// The report document could not be serialized.
    #[error("failed to serialize report document: {0}")]
    Report(#[from] serde_json::Error),

    /// An input document could not be read.
    #[error("failed to read {}: {source}", path.display())]
    ReadInput {
        /// Path of the input document.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// An output artifact could not be written.
    #[error("failed to write {}: {source}", path.display())]
    WriteOutput {
        /// Destination path of the artifact.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}
