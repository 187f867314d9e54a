//! Guards for URLs that leave the process: redirects and outbound fetches.
//!
//! Both parse with the `url` crate (WHATWG rules) and decide on the parsed
//! components only. The accepted [`ParsedTarget`] is re-serialized by the
//! parser, so what the sink sees is exactly what was checked.

use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use super::host_class::{classify_addr, classify_host};
use super::{Guard, GuardResult};
use crate::policy::{OutboundPolicy, RedirectPolicy};
use crate::{Rejection, RejectionKind, Tainted, Verified};

const UNPARSEABLE: Rejection = Rejection::new(RejectionKind::MalformedInput, "not an absolute URL");
const NO_HOST: Rejection = Rejection::new(RejectionKind::MalformedInput, "URL has no host");
const HOST_NOT_ALLOWED: Rejection =
    Rejection::new(RejectionKind::HostNotAllowed, "redirect host not in allowlist");
const SCHEME_NOT_ALLOWED: Rejection =
    Rejection::new(RejectionKind::SchemeNotAllowed, "scheme not allowed");
const HOST_BLOCKED: Rejection =
    Rejection::new(RejectionKind::HostBlocked, "destination is an internal address");

/// A URL that parsed and passed a network guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTarget(Url);

impl ParsedTarget {
    /// Lower-case scheme without the colon.
    pub fn scheme(&self) -> &str {
        self.0.scheme()
    }

    /// Hostname as normalized by the parser.
    pub fn host(&self) -> &str {
        self.0.host_str().unwrap_or_default()
    }

    /// Explicit port, or the scheme's default.
    pub fn port(&self) -> Option<u16> {
        self.0.port_or_known_default()
    }

    /// Path component.
    pub fn path(&self) -> &str {
        self.0.path()
    }

    /// Serialized URL.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// The parsed URL.
    pub fn as_url(&self) -> &Url {
        &self.0
    }
}

impl fmt::Display for ParsedTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

fn parse(input: &Tainted<String>) -> Result<Url, Rejection> {
    Url::parse(input.peek()).map_err(|_| UNPARSEABLE)
}

/// Admits redirect destinations with an allowed scheme whose hostname is
/// exactly allowlisted.
///
/// The scheme is checked first, so `javascript://example.com/` is refused
/// even though its host matches. No suffix or substring matching: with `example.com` allowed,
/// `evil-example.com`, `example.com.evil.org` and `sub.example.com` are all
/// rejected. Userinfo does not count as host, so
/// `https://example.com@evil.org/` is rejected too.
#[derive(Debug, Clone)]
pub struct RedirectGuard {
    policy: Arc<RedirectPolicy>,
}

impl RedirectGuard {
    /// Creates a guard over the given policy.
    pub fn new(policy: RedirectPolicy) -> Self {
        Self {
            policy: Arc::new(policy),
        }
    }
}

impl Guard for RedirectGuard {
    type Output = ParsedTarget;

    const NAME: &'static str = "redirect";

    fn check(&self, input: Tainted<String>) -> GuardResult<ParsedTarget> {
        let url = parse(&input)?;
        if !self.policy.allows_scheme(url.scheme()) {
            return Err(SCHEME_NOT_ALLOWED);
        }
        match url.host_str() {
            Some(host) if self.policy.allows_host(host) => {}
            _ => return Err(HOST_NOT_ALLOWED),
        }
        Ok(Verified::new_unchecked(ParsedTarget(url)))
    }
}

/// Admits outbound fetch targets that use an allowed scheme and do not name
/// an internal address.
///
/// Checks run in order: parse, scheme, host class. The first failure wins.
#[derive(Debug, Clone)]
pub struct OutboundGuard {
    policy: Arc<OutboundPolicy>,
}

impl OutboundGuard {
    /// Creates a guard over the given policy.
    pub fn new(policy: OutboundPolicy) -> Self {
        Self {
            policy: Arc::new(policy),
        }
    }

    /// Timeout the outbound client must apply.
    pub fn timeout(&self) -> Duration {
        self.policy.timeout()
    }

    /// Re-checks an address the accepted hostname resolved to.
    ///
    /// Clients should call this after DNS resolution and before connecting;
    /// the hostname check alone cannot see where a name points.
    ///
    /// # Errors
    ///
    /// Returns a `HostBlocked` rejection if the address is in a blocked class.
    pub fn check_resolved(&self, addr: IpAddr) -> Result<(), Rejection> {
        match classify_addr(addr) {
            Some(class) if self.policy.blocks(class) => Err(HOST_BLOCKED),
            _ => Ok(()),
        }
    }
}

impl Guard for OutboundGuard {
    type Output = ParsedTarget;

    const NAME: &'static str = "outbound";

    fn check(&self, input: Tainted<String>) -> GuardResult<ParsedTarget> {
        let url = parse(&input)?;
        if !self.policy.allows_scheme(url.scheme()) {
            return Err(SCHEME_NOT_ALLOWED);
        }
        let host = url.host_str().ok_or(NO_HOST)?;
        if let Some(class) = classify_host(host) {
            if self.policy.blocks(class) {
                return Err(HOST_BLOCKED);
            }
        }
        Ok(Verified::new_unchecked(ParsedTarget(url)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::HostClass;

    fn redirect(raw: &str) -> GuardResult<ParsedTarget> {
        RedirectGuard::new(RedirectPolicy::new(["example.com", "letmegooglethat.com"]).unwrap())
            .check(Tainted::new(raw.to_string()))
    }

    fn outbound(raw: &str) -> GuardResult<ParsedTarget> {
        OutboundGuard::new(OutboundPolicy::default()).check(Tainted::new(raw.to_string()))
    }

    fn kind<T>(result: GuardResult<T>) -> RejectionKind {
        match result {
            Ok(_) => panic!("expected rejection"),
            Err(r) => r.kind(),
        }
    }

    #[test]
    fn redirect_accepts_exact_host() {
        let target = redirect("https://example.com/path?x=1").unwrap();
        assert_eq!(target.as_ref().host(), "example.com");
        assert_eq!(target.as_ref().path(), "/path");
        assert_eq!(target.as_ref().as_str(), "https://example.com/path?x=1");
    }

    #[test]
    fn redirect_host_comparison_is_case_insensitive_via_parser() {
        let target = redirect("https://EXAMPLE.com/").unwrap();
        assert_eq!(target.as_ref().host(), "example.com");
    }

    #[test]
    fn redirect_rejects_lookalike_hosts() {
        for raw in [
            "https://evil-example.com/",
            "https://example.com.evil.org/",
            "https://sub.example.com/",
            "https://example.com@evil.org/",
            "https://evil.org/?next=example.com",
        ] {
            assert_eq!(kind(redirect(raw)), RejectionKind::HostNotAllowed, "{raw}");
        }
    }

    #[test]
    fn redirect_rejects_other_schemes_even_for_allowed_hosts() {
        for raw in [
            "javascript://example.com/%0Aalert(1)",
            "ftp://example.com/x",
            "file://example.com/etc/passwd",
            "javascript:alert(1)",
            "data:text/html,hi",
        ] {
            assert_eq!(kind(redirect(raw)), RejectionKind::SchemeNotAllowed, "{raw}");
        }
    }

    #[test]
    fn redirect_schemes_follow_policy() {
        let guard = RedirectGuard::new(
            RedirectPolicy::new(["example.com"])
                .unwrap()
                .with_schemes(["https"])
                .unwrap(),
        );

        assert!(guard
            .check(Tainted::new("https://example.com/".to_string()))
            .is_ok());
        assert_eq!(
            kind(guard.check(Tainted::new("http://example.com/".to_string()))),
            RejectionKind::SchemeNotAllowed
        );
    }

    #[test]
    fn redirect_rejects_unparseable() {
        for raw in ["", "not a url", "/relative/path", "//example.com/"] {
            assert_eq!(kind(redirect(raw)), RejectionKind::MalformedInput, "{raw:?}");
        }
    }

    #[test]
    fn outbound_accepts_public_http() {
        let target = outbound("https://letmegooglethat.com/?q=ale").unwrap();
        assert_eq!(target.as_ref().scheme(), "https");
        assert_eq!(target.as_ref().port(), Some(443));
    }

    #[test]
    fn outbound_rejects_other_schemes() {
        for raw in ["file:///etc/passwd", "gopher://example.com/", "ftp://example.com/"] {
            assert_eq!(kind(outbound(raw)), RejectionKind::SchemeNotAllowed, "{raw}");
        }
    }

    #[test]
    fn scheme_is_checked_before_host() {
        assert_eq!(
            kind(outbound("ftp://127.0.0.1/")),
            RejectionKind::SchemeNotAllowed
        );
    }

    #[test]
    fn outbound_blocks_internal_hosts() {
        for raw in [
            "http://localhost:8080/admin",
            "http://127.0.0.1/",
            "http://169.254.169.254/latest/meta-data/",
            "http://10.1.2.3/",
            "http://192.168.0.1/",
            "http://172.16.5.4/",
            "http://0.0.0.0/",
            "http://[::1]/",
            "http://[fe80::1]/",
        ] {
            assert_eq!(kind(outbound(raw)), RejectionKind::HostBlocked, "{raw}");
        }
    }

    #[test]
    fn outbound_blocks_numeric_ipv4_spellings() {
        // The parser rewrites these to 127.0.0.1 before classification.
        for raw in ["http://2130706433/", "http://0x7f.1/", "http://127.1/"] {
            assert_eq!(kind(outbound(raw)), RejectionKind::HostBlocked, "{raw}");
        }
    }

    #[test]
    fn outbound_rejects_unparseable() {
        assert_eq!(kind(outbound("")), RejectionKind::MalformedInput);
        assert_eq!(kind(outbound("http://")), RejectionKind::MalformedInput);
    }

    #[test]
    fn blocked_classes_follow_policy() {
        let guard = OutboundGuard::new(
            OutboundPolicy::default().with_blocked_classes([HostClass::LinkLocal]),
        );

        assert!(guard
            .check(Tainted::new("http://127.0.0.1/".to_string()))
            .is_ok());
        assert!(guard
            .check(Tainted::new("http://169.254.169.254/".to_string()))
            .is_err());
    }

    #[test]
    fn check_resolved_blocks_internal_addresses() {
        let guard = OutboundGuard::new(OutboundPolicy::default());

        let err = guard
            .check_resolved("10.0.0.5".parse().unwrap())
            .unwrap_err();
        assert_eq!(err.kind(), RejectionKind::HostBlocked);
        assert!(guard.check_resolved("93.184.216.34".parse().unwrap()).is_ok());
        assert_eq!(guard.timeout(), Duration::from_secs(3));
    }
}
