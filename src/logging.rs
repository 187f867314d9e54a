use std::fmt;

use sha2::{Digest, Sha256};

use crate::sink::SinkError;
use crate::Rejection;

/// Hex characters of the SHA-256 digest kept in logs.
const DIGEST_HEX_LEN: usize = 16;

/// Truncated SHA-256 digest of a raw input, as lower-case hex.
///
/// Lets operators correlate repeated probes without the payload ever
/// appearing in a log line.
pub(crate) fn input_digest(raw: &str) -> String {
    let digest = Sha256::digest(raw.as_bytes());
    hex::encode(&digest[..DIGEST_HEX_LEN / 2])
}

/// A request-scoped logger for guard outcomes.
///
/// Every event carries the request id. Rejections are logged with the guard
/// name, the rejection kind and the input digest; the raw input is never a
/// field.
#[derive(Debug, Clone, Copy)]
pub struct GuardLog<'a> {
    request_id: &'a str,
}

impl<'a> GuardLog<'a> {
    /// Creates a logger bound to a request id.
    pub fn new(request_id: &'a str) -> Self {
        Self { request_id }
    }

    /// Returns the request ID associated with this logger.
    pub fn request_id(&self) -> &'a str {
        self.request_id
    }

    /// Records that a guard accepted its input.
    pub fn accepted(&self, guard: &'static str) {
        tracing::debug!(request_id = %self.request_id, guard, "input accepted");
    }

    /// Records that a guard rejected its input.
    pub fn rejected(&self, guard: &'static str, rejection: &Rejection, input_sha256: &str) {
        tracing::warn!(
            request_id = %self.request_id,
            guard,
            kind = %rejection.kind(),
            input_sha256,
            reason = rejection.reason(),
            "input rejected"
        );
    }

    /// Records that a sink failed after its input was accepted.
    pub fn sink_failed(&self, sink: &'static str, error: &SinkError) {
        tracing::error!(request_id = %self.request_id, sink, kind = %error.kind(), "{}", error);
    }

    /// Logs an info-level message with request ID.
    pub fn info(&self, args: fmt::Arguments<'_>) {
        tracing::info!(request_id = %self.request_id, "{}", args);
    }
}
