//! Guards: the checks that stand between untrusted input and a sink.
//!
//! Every guard takes a [`Tainted<String>`] plus its immutable policy and
//! returns a [`GuardResult`]: either a [`Verified`] normalized value or a
//! [`Rejection`] naming one [`RejectionKind`](crate::RejectionKind).
//!
//! | Guard | Sink | Output |
//! |---|---|---|
//! | [`FilePathGuard`] | file read | [`CanonicalPath`] |
//! | [`RedirectGuard`] | HTTP redirect | [`ParsedTarget`] |
//! | [`OutboundGuard`] | outbound HTTP | [`ParsedTarget`] |
//! | [`IdentifierGuard`] | query column | [`Identifier`] |
//! | [`TokenGuard`] | constructed URL/command | [`Token`] |
//!
//! Guards hold their policy behind an `Arc`, perform no network I/O and keep
//! no mutable state, so one instance can serve concurrent requests.

mod file_path;
pub(crate) mod host_class;
mod identifier;
mod network;
mod token;

pub use file_path::{CanonicalPath, FilePathGuard};
pub use host_class::{classify_addr, classify_host, HostClass};
pub use identifier::{Identifier, IdentifierGuard};
pub use network::{OutboundGuard, ParsedTarget, RedirectGuard};
pub use token::{Token, TokenGuard};

use crate::policy::GuardPolicies;
use crate::{Rejection, Tainted, Verified};

/// Outcome of a single guard invocation.
pub type GuardResult<T> = Result<Verified<T>, Rejection>;

/// A check that turns untrusted input into a value a sink may use.
///
/// # Invariants
///
/// Implementations MUST:
/// - Decide using only the input and their own policy
/// - Call `Verified::new_unchecked` only after every check passed
/// - Build the output from the checked value, never pass the raw input on
/// - Return a [`Rejection`] with a fixed reason that does not quote the input
///
/// # Examples
///
/// ```
/// use input_guard::{Guard, RejectionKind, Tainted, TokenGuard, TokenPolicy};
///
/// let guard = TokenGuard::new(TokenPolicy::default());
///
/// let brand = guard.check(Tainted::new("pale-ale".to_string())).unwrap();
/// assert_eq!(brand.as_ref().as_str(), "pale-ale");
///
/// let rejected = guard.check(Tainted::new("ale; rm -rf /".to_string())).unwrap_err();
/// assert_eq!(rejected.kind(), RejectionKind::MalformedInput);
/// ```
pub trait Guard {
    /// Normalized value produced on acceptance.
    type Output;

    /// Name used in logs and audit events.
    const NAME: &'static str;

    /// Checks untrusted input against this guard's policy.
    ///
    /// # Errors
    ///
    /// Returns a [`Rejection`] if the input fails the policy.
    fn check(&self, input: Tainted<String>) -> GuardResult<Self::Output>;
}

/// One instance of every guard, built from the startup policies.
///
/// Cheap to clone; each guard shares its policy through an `Arc`.
#[derive(Debug, Clone)]
pub struct Guards {
    /// File name guard.
    pub files: FilePathGuard,
    /// Redirect destination guard.
    pub redirect: RedirectGuard,
    /// Outbound fetch guard.
    pub outbound: OutboundGuard,
    /// Query column guard.
    pub identifiers: IdentifierGuard,
    /// Freeform token guard.
    pub tokens: TokenGuard,
}

impl Guards {
    /// Builds all guards from a policy bundle.
    pub fn new(policies: GuardPolicies) -> Self {
        Self {
            files: FilePathGuard::new(policies.files),
            redirect: RedirectGuard::new(policies.redirect),
            outbound: OutboundGuard::new(policies.outbound),
            identifiers: IdentifierGuard::new(policies.identifiers),
            tokens: TokenGuard::new(policies.tokens),
        }
    }
}
