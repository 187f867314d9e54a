use std::fmt;
use std::sync::Arc;

use super::{Guard, GuardResult};
use crate::policy::IdentifierPolicy;
use crate::{Rejection, RejectionKind, Tainted, Verified};

const UNKNOWN: Rejection =
    Rejection::new(RejectionKind::UnknownIdentifier, "identifier not in allowlist");

/// An identifier taken from the allowlist, never from the request.
///
/// Safe to place in a structural position of a query, such as a column
/// name, because its characters are the allowlist entry's characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(String);

impl Identifier {
    /// The allowlist entry.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Admits only members of a closed set of identifiers.
///
/// Matching is exact: no case folding, no trimming, no partial match.
#[derive(Debug, Clone)]
pub struct IdentifierGuard {
    policy: Arc<IdentifierPolicy>,
}

impl IdentifierGuard {
    /// Creates a guard over the given policy.
    pub fn new(policy: IdentifierPolicy) -> Self {
        Self {
            policy: Arc::new(policy),
        }
    }
}

impl Guard for IdentifierGuard {
    type Output = Identifier;

    const NAME: &'static str = "identifier";

    fn check(&self, input: Tainted<String>) -> GuardResult<Identifier> {
        let entry = self.policy.lookup(input.peek()).ok_or(UNKNOWN)?;
        Ok(Verified::new_unchecked(Identifier(entry.to_string())))
    }
}
