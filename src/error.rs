use std::fmt;
use std::path::PathBuf;

/// A guard's refusal to let an input through.
///
/// Carries exactly one [`RejectionKind`] and a fixed reason. It never holds
/// any part of the rejected input, so it is safe to log and safe to turn into
/// a response.
///
/// # Examples
///
/// ```
/// use input_guard::{Rejection, RejectionKind};
///
/// let rejection = Rejection::new(RejectionKind::PathEscape, "resolved outside root");
/// assert_eq!(rejection.kind(), RejectionKind::PathEscape);
/// assert_eq!(rejection.to_string(), "rejected (path_escape): resolved outside root");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rejection {
    kind: RejectionKind,
    reason: &'static str,
}

impl Rejection {
    /// Creates a rejection. The reason must be a fixed string.
    pub const fn new(kind: RejectionKind, reason: &'static str) -> Self {
        Self { kind, reason }
    }

    /// Returns the rejection kind.
    pub fn kind(&self) -> RejectionKind {
        self.kind
    }

    /// Returns the fixed reason text.
    pub fn reason(&self) -> &'static str {
        self.reason
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rejected ({}): {}", self.kind, self.reason)
    }
}

impl std::error::Error for Rejection {}

/// Why a guard rejected its input.
///
/// Each guard reports one kind per rejection. Kinds are for server-side
/// diagnostics; routes collapse them into generic client responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectionKind {
    /// Empty, unparseable, or failing a coarse pre-filter.
    MalformedInput,
    /// Canonical path resolved outside the root directory.
    PathEscape,
    /// File extension not in the allowlist.
    DisallowedType,
    /// Redirect hostname not exactly in the allowlist.
    HostNotAllowed,
    /// Outbound URL scheme not allowed.
    SchemeNotAllowed,
    /// Outbound hostname is loopback, link-local, private or unspecified.
    HostBlocked,
    /// Identifier not in the closed allowlist.
    UnknownIdentifier,
}

impl RejectionKind {
    /// Stable snake-case name used in structured logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MalformedInput => "malformed_input",
            Self::PathEscape => "path_escape",
            Self::DisallowedType => "disallowed_type",
            Self::HostNotAllowed => "host_not_allowed",
            Self::SchemeNotAllowed => "scheme_not_allowed",
            Self::HostBlocked => "host_blocked",
            Self::UnknownIdentifier => "unknown_identifier",
        }
    }

    /// Generic client status for this kind.
    ///
    /// `PathEscape` maps to 404 so it cannot be told apart from a missing file.
    pub fn status(&self) -> u16 {
        match self {
            Self::PathEscape => 404,
            Self::HostBlocked => 403,
            _ => 400,
        }
    }
}

impl fmt::Display for RejectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Startup-time failure while building guard policies.
///
/// These never occur per request. A process that gets one should refuse to
/// start.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    /// The config file could not be read.
    #[error("failed to read policy config {path}: {source}")]
    Read {
        /// Config path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for this schema.
    #[error("invalid policy config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The file root cannot be canonicalized or is not a directory.
    #[error("root directory {path} is unusable: {reason}")]
    InvalidRoot {
        /// Root as configured.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },

    /// An allowlist that must not be empty is empty.
    #[error("{0} allowlist is empty")]
    EmptyAllowlist(&'static str),

    /// The token pattern does not compile.
    #[error("invalid token pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// The outbound timeout is zero.
    #[error("outbound timeout must be greater than zero")]
    ZeroTimeout,

    /// A blocked host class name is not recognised.
    #[error("unknown host class '{0}'")]
    UnknownHostClass(String),
}
