//! In-memory guard trail recorder.

use std::collections::VecDeque;

use parking_lot::Mutex;

use super::{GuardEvent, GuardOutcome};
use crate::RejectionKind;

/// Thread-safe in-memory recorder for guard events.
///
/// Keeps the most recent events in arrival order, up to a fixed capacity.
/// Once full, each new event evicts the oldest, so memory stays bounded no
/// matter how many requests pass through.
///
/// # Example
///
/// ```
/// use input_guard::audit::{GuardEvent, GuardTrail};
///
/// let trail = GuardTrail::new();
/// trail.record(GuardEvent::accepted("req-123", "redirect", "redirect"));
///
/// assert_eq!(trail.events().len(), 1);
/// ```
#[derive(Debug)]
pub struct GuardTrail {
    capacity: usize,
    events: Mutex<VecDeque<GuardEvent>>,
}

impl Default for GuardTrail {
    fn default() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }
}

impl GuardTrail {
    /// Events kept by [`GuardTrail::new`].
    pub const DEFAULT_CAPACITY: usize = 1024;

    /// Creates a new empty trail with the default capacity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a trail that keeps at most `capacity` events (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            events: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Maximum number of events retained.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Records an event, evicting the oldest one when full.
    pub fn record(&self, event: GuardEvent) {
        let mut events = self.events.lock();
        if events.len() == self.capacity {
            events.pop_front();
        }
        events.push_back(event);
    }

    /// Returns a snapshot of the retained events, oldest first.
    pub fn events(&self) -> Vec<GuardEvent> {
        self.events.lock().iter().cloned().collect()
    }

    /// Returns the number of retained rejections of the given kind.
    pub fn rejections(&self, kind: RejectionKind) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| e.outcome() == GuardOutcome::Rejected && e.kind() == Some(kind))
            .count()
    }

    /// Returns the number of retained events.
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Returns true if no events have been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Clears all recorded events.
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trail_starts_empty() {
        let trail = GuardTrail::new();
        assert!(trail.is_empty());
        assert_eq!(trail.len(), 0);
    }

    #[test]
    fn trail_records_in_order() {
        let trail = GuardTrail::new();

        trail.record(GuardEvent::accepted("req-1", "search", "identifier"));
        trail.record(GuardEvent::rejected(
            "req-2",
            "test",
            "outbound",
            RejectionKind::HostBlocked,
        ));

        let events = trail.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].request_id(), "req-1");
        assert_eq!(events[1].request_id(), "req-2");
        assert_eq!(trail.rejections(RejectionKind::HostBlocked), 1);
        assert_eq!(trail.rejections(RejectionKind::PathEscape), 0);
    }

    #[test]
    fn trail_can_be_cleared() {
        let trail = GuardTrail::new();
        trail.record(GuardEvent::sink_failed("req-1", "search", "query_engine"));

        trail.clear();

        assert!(trail.is_empty());
    }

    #[test]
    fn trail_accepts_concurrent_writers() {
        let trail = GuardTrail::new();

        std::thread::scope(|scope| {
            for i in 0..4 {
                let trail = &trail;
                scope.spawn(move || {
                    let request_id = format!("req-{i}");
                    trail.record(GuardEvent::accepted(request_id, "redirect", "redirect"));
                });
            }
        });

        assert_eq!(trail.len(), 4);
    }

    #[test]
    fn trail_is_bounded_and_keeps_newest() {
        let trail = GuardTrail::with_capacity(3);

        for i in 0..10 {
            trail.record(GuardEvent::rejected(
                format!("req-{i}"),
                "redirect",
                "redirect",
                RejectionKind::HostNotAllowed,
            ));
        }

        assert_eq!(trail.len(), 3);
        let ids: Vec<_> = trail
            .events()
            .iter()
            .map(|e| e.request_id().to_string())
            .collect();
        assert_eq!(ids, ["req-7", "req-8", "req-9"]);
        assert_eq!(trail.rejections(RejectionKind::HostNotAllowed), 3);
    }

    #[test]
    fn default_capacity_and_minimum() {
        assert_eq!(GuardTrail::new().capacity(), GuardTrail::DEFAULT_CAPACITY);
        assert_eq!(GuardTrail::with_capacity(0).capacity(), 1);
    }
}
