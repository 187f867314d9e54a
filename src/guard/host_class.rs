//! Hostname classification shared by the outbound guard.
//!
//! Hostnames are classified by their literal form after URL parsing. The
//! parser already rewrites numeric IPv4 spellings (`2130706433`, `0x7f.1`)
//! into dotted quads, so a prefix check on the parsed host covers them.
//!
//! This cannot see through DNS. A public name that later resolves to an
//! internal address passes [`classify_host`]; callers that connect should
//! run [`classify_addr`] on the resolved address as well.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use crate::PolicyError;

/// Address class that outbound requests may be barred from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HostClass {
    /// `localhost`, `127.0.0.0/8`, `::1`
    Loopback,
    /// `169.254.0.0/16`, `fe80::/10` (cloud metadata lives here)
    LinkLocal,
    /// `10/8`, `172.16/12`, `192.168/16`, `fc00::/7`
    Private,
    /// `0.0.0.0/8`, `::`
    Unspecified,
}

impl HostClass {
    /// Every class, in declaration order.
    pub const ALL: [HostClass; 4] = [
        HostClass::Loopback,
        HostClass::LinkLocal,
        HostClass::Private,
        HostClass::Unspecified,
    ];

    /// Config and log name.
    pub fn as_str(&self) -> &'static str {
        match self {
            HostClass::Loopback => "loopback",
            HostClass::LinkLocal => "link_local",
            HostClass::Private => "private",
            HostClass::Unspecified => "unspecified",
        }
    }
}

impl fmt::Display for HostClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HostClass {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HostClass::ALL
            .into_iter()
            .find(|class| class.as_str() == s)
            .ok_or_else(|| PolicyError::UnknownHostClass(s.to_string()))
    }
}

const IPV4_PREFIXES: &[(&str, HostClass)] = &[
    ("127.", HostClass::Loopback),
    ("169.254.", HostClass::LinkLocal),
    ("10.", HostClass::Private),
    ("192.168.", HostClass::Private),
    ("0.", HostClass::Unspecified),
];

/// Classifies a parsed hostname by its literal form.
///
/// Accepts the host as produced by the URL parser: domains lower-cased,
/// IPv4 in dotted-quad form, IPv6 in brackets.
///
/// # Examples
///
/// ```
/// use input_guard::{classify_host, HostClass};
///
/// assert_eq!(classify_host("localhost"), Some(HostClass::Loopback));
/// assert_eq!(classify_host("169.254.169.254"), Some(HostClass::LinkLocal));
/// assert_eq!(classify_host("[::1]"), Some(HostClass::Loopback));
/// assert_eq!(classify_host("example.com"), None);
/// ```
pub fn classify_host(host: &str) -> Option<HostClass> {
    let host = host.strip_suffix('.').unwrap_or(host);

    if host.eq_ignore_ascii_case("localhost") {
        return Some(HostClass::Loopback);
    }

    if let Some(inner) = host.strip_prefix('[').and_then(|h| h.strip_suffix(']')) {
        return inner.parse::<Ipv6Addr>().ok().and_then(classify_v6);
    }

    if let Some(&(_, class)) = IPV4_PREFIXES
        .iter()
        .find(|(prefix, _)| host.starts_with(prefix))
    {
        return Some(class);
    }

    // 172.16.0.0/12 has no single textual prefix
    let second_octet = host
        .strip_prefix("172.")
        .and_then(|rest| rest.split('.').next())
        .and_then(|octet| octet.parse::<u8>().ok());
    match second_octet {
        Some(16..=31) => Some(HostClass::Private),
        _ => None,
    }
}

/// Classifies a resolved address.
///
/// Intended for connect-time re-checks after DNS resolution.
pub fn classify_addr(addr: IpAddr) -> Option<HostClass> {
    match addr {
        IpAddr::V4(v4) => classify_v4(v4),
        IpAddr::V6(v6) => classify_v6(v6),
    }
}

fn classify_v4(ip: Ipv4Addr) -> Option<HostClass> {
    if ip.is_loopback() {
        Some(HostClass::Loopback)
    } else if ip.is_link_local() {
        Some(HostClass::LinkLocal)
    } else if ip.is_private() {
        Some(HostClass::Private)
    } else if ip.octets()[0] == 0 {
        Some(HostClass::Unspecified)
    } else {
        None
    }
}

fn classify_v6(ip: Ipv6Addr) -> Option<HostClass> {
    if let Some(v4) = ip.to_ipv4_mapped() {
        return classify_v4(v4);
    }
    let first = ip.segments()[0];
    if ip.is_loopback() {
        Some(HostClass::Loopback)
    } else if ip.is_unspecified() {
        Some(HostClass::Unspecified)
    } else if first & 0xffc0 == 0xfe80 {
        Some(HostClass::LinkLocal)
    } else if first & 0xfe00 == 0xfc00 {
        Some(HostClass::Private)
    } else {
        None
    }
}
