use std::time::Duration;

use parking_lot::Mutex;

use crate::sink::{OutboundClient, SinkError, SinkErrorKind};
use crate::{ParsedTarget, Verified};

/// Metadata about a recorded outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    /// Serialized target URL (verified)
    pub url: String,
    /// Timeout the caller asked for
    pub timeout: Duration,
}

/// An [`OutboundClient`] that records requests instead of sending them.
///
/// Makes route tests deterministic and offline. Every call is answered with
/// the configured status, or with the configured failure.
///
/// # Examples
///
/// ```
/// use input_guard::{
///     Guard, OutboundClient, OutboundGuard, OutboundPolicy, RecordingClient, Tainted,
/// };
///
/// let guard = OutboundGuard::new(OutboundPolicy::default());
/// let client = RecordingClient::new(200);
///
/// let target = guard.check(Tainted::new("https://example.com/".to_string())).unwrap();
/// assert_eq!(client.get(&target, guard.timeout()).unwrap(), 200);
/// assert_eq!(client.requests()[0].url, "https://example.com/");
/// ```
#[derive(Debug)]
pub struct RecordingClient {
    response: Result<u16, SinkErrorKind>,
    requests: Mutex<Vec<OutboundRequest>>,
}

impl RecordingClient {
    /// Answers every request with `status`.
    pub fn new(status: u16) -> Self {
        Self {
            response: Ok(status),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Fails every request with `kind`.
    pub fn failing(kind: SinkErrorKind) -> Self {
        Self {
            response: Err(kind),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Returns all recorded requests.
    pub fn requests(&self) -> Vec<OutboundRequest> {
        self.requests.lock().clone()
    }

    /// Returns the number of recorded requests.
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

impl OutboundClient for RecordingClient {
    fn get(&self, target: &Verified<ParsedTarget>, timeout: Duration) -> Result<u16, SinkError> {
        self.requests.lock().push(OutboundRequest {
            url: target.as_ref().as_str().to_string(),
            timeout,
        });
        self.response.map_err(SinkError::new)
    }
}
