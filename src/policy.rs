//! Immutable guard policies, built once at startup.
//!
//! Every constructor validates its input and returns a [`PolicyError`] on
//! failure; a process that cannot build its policies should not start.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::guard::HostClass;
use crate::PolicyError;

/// Default token pattern: ASCII letters, digits and hyphen.
pub const DEFAULT_TOKEN_PATTERN: &str = "^[A-Za-z0-9-]+$";

/// Default outbound request timeout.
pub const DEFAULT_OUTBOUND_TIMEOUT: Duration = Duration::from_secs(3);

static DEFAULT_TOKEN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(&whole_input(DEFAULT_TOKEN_PATTERN)).expect("default token pattern"));

fn whole_input(pattern: &str) -> String {
    format!("^(?:{pattern})$")
}

fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_ascii_lowercase()
}

fn default_schemes() -> BTreeSet<String> {
    ["http", "https"].into_iter().map(String::from).collect()
}

fn normalize_schemes<I, S>(schemes: I) -> Result<BTreeSet<String>, PolicyError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let schemes = schemes
        .into_iter()
        .map(|s| s.as_ref().trim().trim_end_matches(':').to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .collect();
    non_empty(schemes, "scheme")
}

fn non_empty(
    set: BTreeSet<String>,
    name: &'static str,
) -> Result<BTreeSet<String>, PolicyError> {
    if set.is_empty() {
        Err(PolicyError::EmptyAllowlist(name))
    } else {
        Ok(set)
    }
}

/// Root directory and extension allowlist for file reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePathPolicy {
    root: PathBuf,
    allowed_extensions: BTreeSet<String>,
}

impl FilePathPolicy {
    /// Builds a policy, canonicalizing `root` now.
    ///
    /// Extensions are matched case-insensitively; `".PNG"`, `"png"` and
    /// `"Png"` are the same entry.
    ///
    /// # Errors
    ///
    /// [`PolicyError::InvalidRoot`] if `root` does not resolve to a directory,
    /// [`PolicyError::EmptyAllowlist`] if no usable extension is given.
    pub fn new<P, I, S>(root: P, extensions: I) -> Result<Self, PolicyError>
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let configured = root.as_ref();
        let root = configured
            .canonicalize()
            .map_err(|e| PolicyError::InvalidRoot {
                path: configured.to_path_buf(),
                reason: e.to_string(),
            })?;
        if !root.is_dir() {
            return Err(PolicyError::InvalidRoot {
                path: configured.to_path_buf(),
                reason: "not a directory".to_string(),
            });
        }

        let allowed_extensions = extensions
            .into_iter()
            .map(|ext| normalize_extension(ext.as_ref()))
            .filter(|ext| !ext.is_empty())
            .collect();

        Ok(Self {
            root,
            allowed_extensions: non_empty(allowed_extensions, "extension")?,
        })
    }

    /// Canonical root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Allowed extensions, lower-case and without the dot.
    pub fn allowed_extensions(&self) -> impl Iterator<Item = &str> {
        self.allowed_extensions.iter().map(String::as_str)
    }

    pub(crate) fn allows_extension(&self, ext: &str) -> bool {
        self.allowed_extensions.contains(ext)
    }
}

/// Exact-match hostname allowlist and scheme allowlist for redirects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectPolicy {
    allowed_schemes: BTreeSet<String>,
    allowed_hosts: BTreeSet<String>,
}

impl RedirectPolicy {
    /// Builds a policy from hostnames. Entries are lower-cased.
    ///
    /// Schemes default to `http` and `https`.
    ///
    /// # Errors
    ///
    /// [`PolicyError::EmptyAllowlist`] if no host is given.
    pub fn new<I, S>(hosts: I) -> Result<Self, PolicyError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed_hosts = hosts
            .into_iter()
            .map(|h| h.as_ref().trim().to_ascii_lowercase())
            .filter(|h| !h.is_empty())
            .collect();
        Ok(Self {
            allowed_schemes: default_schemes(),
            allowed_hosts: non_empty(allowed_hosts, "redirect host")?,
        })
    }

    /// Replaces the allowed schemes. Given without the trailing colon.
    ///
    /// # Errors
    ///
    /// [`PolicyError::EmptyAllowlist`] if no scheme is given.
    pub fn with_schemes<I, S>(mut self, schemes: I) -> Result<Self, PolicyError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed_schemes = normalize_schemes(schemes)?;
        Ok(self)
    }

    pub(crate) fn allows_scheme(&self, scheme: &str) -> bool {
        self.allowed_schemes.contains(scheme)
    }

    pub(crate) fn allows_host(&self, host: &str) -> bool {
        self.allowed_hosts.contains(host)
    }
}

/// Scheme allowlist, blocked host classes and timeout for outbound fetches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundPolicy {
    allowed_schemes: BTreeSet<String>,
    blocked_classes: BTreeSet<HostClass>,
    timeout: Duration,
}

impl Default for OutboundPolicy {
    fn default() -> Self {
        Self {
            allowed_schemes: default_schemes(),
            blocked_classes: HostClass::ALL.into_iter().collect(),
            timeout: DEFAULT_OUTBOUND_TIMEOUT,
        }
    }
}

impl OutboundPolicy {
    /// Replaces the allowed schemes. Given without the trailing colon.
    ///
    /// # Errors
    ///
    /// [`PolicyError::EmptyAllowlist`] if no scheme is given.
    pub fn with_schemes<I, S>(mut self, schemes: I) -> Result<Self, PolicyError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed_schemes = normalize_schemes(schemes)?;
        Ok(self)
    }

    /// Replaces the blocked host classes. An empty set blocks nothing.
    pub fn with_blocked_classes<I>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = HostClass>,
    {
        self.blocked_classes = classes.into_iter().collect();
        self
    }

    /// Sets the timeout handed to the outbound client.
    ///
    /// # Errors
    ///
    /// [`PolicyError::ZeroTimeout`] for a zero duration, which most clients
    /// read as "no deadline".
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, PolicyError> {
        if timeout.is_zero() {
            return Err(PolicyError::ZeroTimeout);
        }
        self.timeout = timeout;
        Ok(self)
    }

    /// Timeout for one outbound request.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Blocked host classes.
    pub fn blocked_classes(&self) -> impl Iterator<Item = HostClass> + '_ {
        self.blocked_classes.iter().copied()
    }

    pub(crate) fn allows_scheme(&self, scheme: &str) -> bool {
        self.allowed_schemes.contains(scheme)
    }

    pub(crate) fn blocks(&self, class: HostClass) -> bool {
        self.blocked_classes.contains(&class)
    }
}

/// Closed set of identifiers, such as query column names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierPolicy {
    allowed: BTreeSet<String>,
}

impl IdentifierPolicy {
    /// Builds a policy. Entries are kept verbatim; matching is exact.
    ///
    /// # Errors
    ///
    /// [`PolicyError::EmptyAllowlist`] if no identifier is given.
    pub fn new<I, S>(identifiers: I) -> Result<Self, PolicyError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowed = identifiers.into_iter().map(Into::into).collect();
        Ok(Self {
            allowed: non_empty(allowed, "identifier")?,
        })
    }

    pub(crate) fn lookup(&self, candidate: &str) -> Option<&str> {
        self.allowed.get(candidate).map(String::as_str)
    }
}

/// Character pattern a freeform token must match in full.
#[derive(Debug, Clone)]
pub struct TokenPolicy {
    pattern: Regex,
}

impl Default for TokenPolicy {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_TOKEN_REGEX.clone(),
        }
    }
}

impl TokenPolicy {
    /// Compiles a custom pattern as a whole-input match.
    ///
    /// The pattern is wrapped in `^(?:...)$`, so `a|b` accepts exactly `"a"`
    /// or `"b"` and nothing that merely contains them.
    ///
    /// # Errors
    ///
    /// [`PolicyError::Pattern`] if the pattern does not compile.
    pub fn new(pattern: &str) -> Result<Self, PolicyError> {
        Ok(Self {
            pattern: Regex::new(&whole_input(pattern))?,
        })
    }

    pub(crate) fn matches(&self, candidate: &str) -> bool {
        self.pattern.is_match(candidate)
    }
}

/// One policy per guard.
#[derive(Debug, Clone)]
pub struct GuardPolicies {
    /// File reads.
    pub files: FilePathPolicy,
    /// Redirect destinations.
    pub redirect: RedirectPolicy,
    /// Outbound fetches.
    pub outbound: OutboundPolicy,
    /// Query columns.
    pub identifiers: IdentifierPolicy,
    /// Freeform tokens.
    pub tokens: TokenPolicy,
}
