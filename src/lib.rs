//! Guards that mediate untrusted request input before it reaches a sink.
//!
//! This crate provides compile-time enforcement of input checks through:
//! - **Taint tracking**: request values arrive as [`Tainted<T>`] and cannot be read directly
//! - **Guards**: policy-driven checks that turn tainted input into [`Verified<T>`]
//! - **Typed sinks**: file reads, outbound fetches and queries accept only verified values
//!
//! # Core Types
//!
//! - [`Tainted<T>`]: Wrapper for untrusted data
//! - [`Verified<T>`]: Normalized value a guard accepted
//! - [`Guard`]: The check trait; see [`FilePathGuard`], [`RedirectGuard`],
//!   [`OutboundGuard`], [`IdentifierGuard`], [`TokenGuard`]
//! - [`Rejection`]: Why a guard refused, as one [`RejectionKind`]
//! - [`GuardConfig`]: TOML configuration that builds every policy
//!
//! # Examples
//!
//! ```
//! use input_guard::{Guard, OutboundGuard, OutboundPolicy, RejectionKind, Tainted};
//!
//! let guard = OutboundGuard::new(OutboundPolicy::default());
//!
//! let metadata = Tainted::new("http://169.254.169.254/latest/meta-data/".to_string());
//! let rejection = guard.check(metadata).unwrap_err();
//! assert_eq!(rejection.kind(), RejectionKind::HostBlocked);
//!
//! let public = Tainted::new("https://example.com/".to_string());
//! let target = guard.check(public).unwrap();
//! assert_eq!(target.as_ref().host(), "example.com");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod audit;
mod config;
mod error;
mod guard;
mod http;
mod logging;
mod policy;
mod query;
mod sink;
mod tainted;
mod verified;
pub mod web;

#[cfg(test)]
mod test_utils;

pub use config::{
    FilesConfig, GuardConfig, OutboundConfig, RedirectConfig, SearchConfig, TokenConfig,
};
pub use error::{PolicyError, Rejection, RejectionKind};
pub use guard::{
    classify_addr, classify_host, CanonicalPath, FilePathGuard, Guard, GuardResult, Guards,
    HostClass, Identifier, IdentifierGuard, OutboundGuard, ParsedTarget, RedirectGuard, Token,
    TokenGuard,
};
pub use http::{OutboundRequest, RecordingClient};
pub use logging::GuardLog;
pub use policy::{
    FilePathPolicy, GuardPolicies, IdentifierPolicy, OutboundPolicy, RedirectPolicy, TokenPolicy,
    DEFAULT_OUTBOUND_TIMEOUT, DEFAULT_TOKEN_PATTERN,
};
pub use query::{BoundQuery, MemoryTable, Row};
pub use sink::{FileStore, FsFileStore, OutboundClient, QueryEngine, SinkError, SinkErrorKind};
pub use tainted::Tainted;
pub use verified::Verified;
