//! Guard event schema.

use std::fmt;

use crate::RejectionKind;

/// What happened to an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Guard accepted the input
    Accepted,
    /// Guard rejected the input
    Rejected,
    /// Input was accepted but the sink failed
    SinkFailed,
}

impl fmt::Display for GuardOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuardOutcome::Accepted => write!(f, "accepted"),
            GuardOutcome::Rejected => write!(f, "rejected"),
            GuardOutcome::SinkFailed => write!(f, "sink_failed"),
        }
    }
}

/// A structured guard event containing only safe metadata.
///
/// # Safety Invariants
///
/// - No raw request input is stored
/// - The only trace of the input is its truncated SHA-256 digest
///
/// # Example
///
/// ```
/// use input_guard::audit::{GuardEvent, GuardOutcome};
/// use input_guard::RejectionKind;
///
/// let event = GuardEvent::rejected("req-7", "redirect", "redirect", RejectionKind::HostNotAllowed)
///     .with_input_sha256("3f2a9c0d11b4e5f6");
///
/// assert_eq!(event.outcome(), GuardOutcome::Rejected);
/// assert_eq!(event.kind(), Some(RejectionKind::HostNotAllowed));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardEvent {
    /// Request identifier for correlation
    request_id: String,
    /// Route that invoked the guard
    route: &'static str,
    /// Guard or sink name
    stage: &'static str,
    outcome: GuardOutcome,
    /// Set only for rejections
    kind: Option<RejectionKind>,
    input_sha256: Option<String>,
}

impl GuardEvent {
    fn new(
        request_id: impl Into<String>,
        route: &'static str,
        stage: &'static str,
        outcome: GuardOutcome,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            route,
            stage,
            outcome,
            kind: None,
            input_sha256: None,
        }
    }

    /// A guard accepted its input.
    pub fn accepted(
        request_id: impl Into<String>,
        route: &'static str,
        guard: &'static str,
    ) -> Self {
        Self::new(request_id, route, guard, GuardOutcome::Accepted)
    }

    /// A guard rejected its input.
    pub fn rejected(
        request_id: impl Into<String>,
        route: &'static str,
        guard: &'static str,
        kind: RejectionKind,
    ) -> Self {
        let mut event = Self::new(request_id, route, guard, GuardOutcome::Rejected);
        event.kind = Some(kind);
        event
    }

    /// A sink failed on accepted input.
    pub fn sink_failed(
        request_id: impl Into<String>,
        route: &'static str,
        sink: &'static str,
    ) -> Self {
        Self::new(request_id, route, sink, GuardOutcome::SinkFailed)
    }

    /// Attaches the input digest.
    pub fn with_input_sha256(mut self, digest: impl Into<String>) -> Self {
        self.input_sha256 = Some(digest.into());
        self
    }

    /// Returns the request identifier.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Returns the route name.
    pub fn route(&self) -> &'static str {
        self.route
    }

    /// Returns the guard or sink name.
    pub fn stage(&self) -> &'static str {
        self.stage
    }

    /// Returns the outcome.
    pub fn outcome(&self) -> GuardOutcome {
        self.outcome
    }

    /// Returns the rejection kind, for rejections.
    pub fn kind(&self) -> Option<RejectionKind> {
        self.kind
    }

    /// Returns the input digest, if set.
    pub fn input_sha256(&self) -> Option<&str> {
        self.input_sha256.as_deref()
    }
}

impl fmt::Display for GuardEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GuardEvent[route={}, stage={}, outcome={}, request_id={}",
            self.route, self.stage, self.outcome, self.request_id
        )?;

        if let Some(kind) = self.kind {
            write!(f, ", kind={}", kind)?;
        }
        if let Some(digest) = &self.input_sha256 {
            write!(f, ", input_sha256={}", digest)?;
        }

        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_display() {
        assert_eq!(GuardOutcome::Accepted.to_string(), "accepted");
        assert_eq!(GuardOutcome::Rejected.to_string(), "rejected");
        assert_eq!(GuardOutcome::SinkFailed.to_string(), "sink_failed");
    }

    #[test]
    fn accepted_event_has_no_kind() {
        let event = GuardEvent::accepted("req-1", "search", "identifier");

        assert_eq!(event.request_id(), "req-1");
        assert_eq!(event.route(), "search");
        assert_eq!(event.stage(), "identifier");
        assert_eq!(event.outcome(), GuardOutcome::Accepted);
        assert!(event.kind().is_none());
        assert!(event.input_sha256().is_none());
    }

    #[test]
    fn rejected_event_display() {
        let event = GuardEvent::rejected(
            "req-2",
            "beer_picture",
            "file_path",
            RejectionKind::PathEscape,
        )
        .with_input_sha256("0123456789abcdef");

        assert_eq!(
            event.to_string(),
            "GuardEvent[route=beer_picture, stage=file_path, outcome=rejected, request_id=req-2, \
             kind=path_escape, input_sha256=0123456789abcdef]"
        );
    }

    #[test]
    fn sink_failure_event() {
        let event = GuardEvent::sink_failed("req-3", "brand_status", "outbound_client");

        assert_eq!(event.outcome(), GuardOutcome::SinkFailed);
        assert!(event.to_string().contains("outbound_client"));
    }
}
