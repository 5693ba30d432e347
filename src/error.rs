//! Error types for sans-postgres.

use thiserror::Error;

/// Result type for sans-postgres operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Decoded ErrorResponse / NoticeResponse field map.
///
/// Each field corresponds to one single-letter tag on the wire. Values
/// are kept as strings; typed interpretation is left to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoticeFields {
    /// Severity: ERROR, FATAL, PANIC, WARNING, NOTICE, DEBUG, INFO, LOG (tag `S`)
    pub severity: Option<String>,
    /// SQLSTATE error code, 5 characters (tag `C`)
    pub code: Option<String>,
    /// Primary human-readable message (tag `M`)
    pub message: Option<String>,
    /// Detailed error explanation (tag `D`)
    pub detail: Option<String>,
    /// Suggestion for fixing the error (tag `H`)
    pub hint: Option<String>,
    /// Cursor position in the original query string, 1-based (tag `P`)
    pub position: Option<String>,
    /// Cursor position in an internally generated query (tag `p`)
    pub internal_position: Option<String>,
    /// Text of the failed internally generated query (tag `q`)
    pub internal_query: Option<String>,
    /// Context / call stack traceback (tag `W`)
    pub where_: Option<String>,
    /// Source file name reporting the error (tag `F`)
    pub file: Option<String>,
    /// Source line number reporting the error (tag `L`)
    pub line: Option<String>,
    /// Source routine reporting the error (tag `R`)
    pub routine: Option<String>,
}

impl NoticeFields {
    /// Returns true if the severity marks the connection as unusable.
    pub fn is_fatal(&self) -> bool {
        matches!(self.severity.as_deref(), Some("FATAL") | Some("PANIC"))
    }
}

impl std::fmt::Display for NoticeFields {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(severity) = &self.severity {
            write!(f, "{}: ", severity)?;
        }
        if let Some(message) = &self.message {
            write!(f, "{}", message)?;
        }
        if let Some(code) = &self.code {
            write!(f, " (SQLSTATE {})", code)?;
        }
        if let Some(detail) = &self.detail {
            write!(f, "\nDETAIL: {}", detail)?;
        }
        if let Some(hint) = &self.hint {
            write!(f, "\nHINT: {}", hint)?;
        }
        Ok(())
    }
}

/// Error type for sans-postgres.
#[derive(Debug, Error)]
pub enum Error {
    /// Protocol error (malformed frame, unknown type byte, framing
    /// violation). The session must not continue after one of these.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Recognized but unsupported feature (e.g. GSS authentication)
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Invalid usage (e.g. write while the backend is in error state)
    #[error("Invalid usage: {0}")]
    InvalidUsage(String),
}

impl Error {
    /// Returns true if the error means the session must be torn down.
    ///
    /// `InvalidUsage` rejects a single call and leaves the session
    /// usable; the other kinds do not.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::InvalidUsage(_))
    }
}
