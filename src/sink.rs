use std::fmt;
use std::fs;
use std::io;
use std::time::Duration;

use crate::query::{BoundQuery, Row};
use crate::{CanonicalPath, ParsedTarget, Verified};

/// Error returned when a sink fails after its input was accepted.
///
/// The message, if any, describes the failure and never the request input.
///
/// # Examples
///
/// ```
/// use input_guard::{SinkError, SinkErrorKind};
///
/// let error = SinkError::new(SinkErrorKind::Timeout);
/// assert_eq!(error.kind(), SinkErrorKind::Timeout);
/// assert_eq!(error.to_string(), "sink error (timed out)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkError {
    kind: SinkErrorKind,
    message: Option<String>,
}

impl SinkError {
    /// Creates a new sink error with the specified kind.
    pub fn new(kind: SinkErrorKind) -> Self {
        Self {
            kind,
            message: None,
        }
    }

    /// Creates a new sink error with a custom message.
    pub fn with_message(kind: SinkErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: Some(message.into()),
        }
    }

    /// Returns the error kind.
    pub fn kind(&self) -> SinkErrorKind {
        self.kind
    }

    /// Returns the error message, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(msg) = &self.message {
            write!(f, "sink error ({}): {}", self.kind, msg)
        } else {
            write!(f, "sink error ({})", self.kind)
        }
    }
}

impl std::error::Error for SinkError {}

impl From<io::Error> for SinkError {
    fn from(err: io::Error) -> Self {
        let kind = match err.kind() {
            io::ErrorKind::NotFound => SinkErrorKind::NotFound,
            io::ErrorKind::TimedOut => SinkErrorKind::Timeout,
            _ => SinkErrorKind::Io,
        };
        Self::with_message(kind, err.kind().to_string())
    }
}

/// Kind of sink error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkErrorKind {
    /// The target does not exist.
    NotFound,
    /// Local I/O failed.
    Io,
    /// The operation exceeded its timeout.
    Timeout,
    /// A remote service or query engine reported a failure.
    Upstream,
}

impl fmt::Display for SinkErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not found"),
            Self::Io => write!(f, "I/O error"),
            Self::Timeout => write!(f, "timed out"),
            Self::Upstream => write!(f, "upstream failure"),
        }
    }
}

// BREAKING CHANGE WARNING: sink methods MUST take Verified values (or a
// BoundQuery, which can only be built from one). Taking &str, &Path or &Url
// here would let unchecked request data reach the side effect.

/// Reads files the file path guard has admitted.
pub trait FileStore {
    /// Reads the whole file.
    ///
    /// # Errors
    ///
    /// `NotFound` if the file is absent, `Io` for any other failure.
    fn read(&self, path: &Verified<CanonicalPath>) -> Result<Vec<u8>, SinkError>;
}

/// Performs outbound GET requests to targets the outbound guard has admitted.
pub trait OutboundClient {
    /// Fetches the target and returns the response status.
    ///
    /// Implementations must honour `timeout` and should re-check resolved
    /// addresses with [`OutboundGuard::check_resolved`](crate::OutboundGuard::check_resolved).
    ///
    /// # Errors
    ///
    /// `Timeout` when the deadline passes, `Upstream` for connection or
    /// protocol failures.
    fn get(&self, target: &Verified<ParsedTarget>, timeout: Duration) -> Result<u16, SinkError>;
}

/// Executes parameterized queries.
pub trait QueryEngine {
    /// Runs the query, binding its parameters separately from its text.
    ///
    /// # Errors
    ///
    /// `Upstream` if the engine rejects or fails the query.
    fn select(&self, query: &BoundQuery) -> Result<Vec<Row>, SinkError>;
}

/// [`FileStore`] over the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsFileStore;

impl FileStore for FsFileStore {
    fn read(&self, path: &Verified<CanonicalPath>) -> Result<Vec<u8>, SinkError> {
        Ok(fs::read(path.as_ref().as_path())?)
    }
}
