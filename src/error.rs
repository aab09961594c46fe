//! Error types for engine queries and reference parsing.

use std::time::Duration;

/// Result type alias for listing operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while querying the engine.
///
/// Listers never construct these themselves: whatever the [`EngineClient`]
/// returns is handed back to the caller untouched.
///
/// [`EngineClient`]: crate::engine::EngineClient
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // =========================================================================
    // Engine Invocation Errors
    // =========================================================================
    /// Engine binary could not be started.
    #[error("engine '{binary}' not available: {reason}")]
    EngineUnavailable { binary: String, reason: String },

    /// Engine command exited unsuccessfully.
    #[error("engine command '{command}' failed ({status}): {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    /// Engine produced more output than we are willing to buffer.
    #[error("engine command '{command}' output exceeds {limit} bytes")]
    OutputTooLarge { command: String, limit: usize },

    /// Engine reported an error through its API.
    ///
    /// [`PodmanCli`](crate::PodmanCli) never returns this; it is the variant
    /// for [`EngineClient`](crate::EngineClient) implementations that talk to
    /// an engine API directly and receive an error message back.
    #[error("engine error: {0}")]
    Remote(String),

    // =========================================================================
    // Cancellation / Timeout Errors
    // =========================================================================
    /// Operation timed out.
    #[error("operation timed out after {duration:?}: {operation}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    /// Operation cancelled by the caller.
    #[error("operation cancelled: {0}")]
    Cancelled(String),

    // =========================================================================
    // Decoding Errors
    // =========================================================================
    /// Engine output could not be decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Image reference failed to parse.
    ///
    /// Only surfaced by callers using [`Reference::parse`] directly; the
    /// image lister maps parse failures to the `<none>` sentinel.
    ///
    /// [`Reference::parse`]: crate::reference::Reference::parse
    #[error(transparent)]
    Reference(#[from] ReferenceError),

    // =========================================================================
    // I/O Errors
    // =========================================================================
    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Reasons an image reference fails to parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReferenceError {
    /// Empty input.
    #[error("repository name must have at least one component")]
    Empty,

    /// Name portion longer than [`MAX_NAME_LEN`].
    ///
    /// [`MAX_NAME_LEN`]: crate::constants::MAX_NAME_LEN
    #[error("repository name must not be more than {limit} characters: {reference}")]
    NameTooLong { reference: String, limit: usize },

    /// Input would be valid if it were lowercase.
    #[error("repository name must be lowercase: {0}")]
    ContainsUppercase(String),

    /// Input does not match the reference grammar.
    #[error("invalid reference format: {0}")]
    InvalidFormat(String),

    /// Digest part is malformed.
    #[error("invalid digest format: {0}")]
    InvalidDigest(String),
}
