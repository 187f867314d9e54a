use std::fmt;
use std::sync::Arc;

use super::{Guard, GuardResult};
use crate::policy::TokenPolicy;
use crate::{Rejection, RejectionKind, Tainted, Verified};

const NOT_A_TOKEN: Rejection =
    Rejection::new(RejectionKind::MalformedInput, "token does not match pattern");

/// A freeform value that matched the token pattern in full.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token(String);

impl Token {
    /// The accepted characters.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Accepts freeform values only if they consist of allowed characters.
///
/// Used for values that end up inside a constructed URL or command, such as
/// a brand name. The whole input must match; `"ale; rm"` is not accepted
/// just because it starts with a valid token.
#[derive(Debug, Clone)]
pub struct TokenGuard {
    policy: Arc<TokenPolicy>,
}

impl TokenGuard {
    /// Creates a guard over the given policy.
    pub fn new(policy: TokenPolicy) -> Self {
        Self {
            policy: Arc::new(policy),
        }
    }
}

impl Guard for TokenGuard {
    type Output = Token;

    const NAME: &'static str = "token";

    fn check(&self, input: Tainted<String>) -> GuardResult<Token> {
        if !self.policy.matches(input.peek()) {
            return Err(NOT_A_TOKEN);
        }
        Ok(Verified::new_unchecked(Token(input.into_inner())))
    }
}
