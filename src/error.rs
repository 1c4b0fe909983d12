//! Error types

use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the client
#[derive(Debug, Error)]
pub enum Error {
    /// Transport error (refused, reset, timeout, truncated stream).
    ///
    /// Surfaced directly from the I/O layer, never wrapped or retried.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Server-reported error from an ERROR status response
    #[error(transparent)]
    Database(#[from] DatabaseError),

    /// Protocol violation (unrecognized status code, invalid framing).
    ///
    /// Signals a client/server version or framing mismatch.
    #[error("protocol violation: {0}")]
    Internal(String),

    /// Feature the client deliberately does not implement
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Invalid connection state transition
    #[error("invalid state: expected {expected}, got {actual}")]
    InvalidState {
        /// What the state machine allowed
        expected: String,
        /// What was requested
        actual: String,
    },

    /// Configuration error (malformed connection string)
    #[error("configuration error: {0}")]
    Config(String),
}

/// Diagnostic fields of a server ERROR status response
///
/// All fields are carried verbatim as the server sent them; nothing is
/// inferred client-side. A null string on the wire decodes to `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseError {
    /// SQLSTATE code
    pub sqlstate: Option<String>,
    /// Human-readable message
    pub message: Option<String>,
    /// The offending SQL text, if any
    pub sql: Option<String>,
    /// Numeric error code
    pub error_code: i32,
    /// Server-side stack trace
    pub stack_trace: Option<String>,
}

impl std::fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.message {
            Some(msg) => write!(f, "{}", msg)?,
            None => write!(f, "unknown server error")?,
        }
        if let Some(ref sqlstate) = self.sqlstate {
            write!(f, " [{}-{}]", sqlstate, self.error_code)?;
        }
        Ok(())
    }
}

impl std::error::Error for DatabaseError {}
