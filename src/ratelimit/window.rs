//! Per-identity request history for the sliding-window log.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Timestamp log of accepted requests for a single identity.
///
/// The log keeps one entry per accepted request, oldest first. Every
/// operation purges entries older than the window before it reads or
/// writes, so stale traffic is never counted against the quota.
///
/// Callers must hold the identity's exclusive lock around each call and
/// pass non-decreasing `now` values; entries are appended at the tail
/// and pruning walks from the head, which relies on the log staying in
/// chronological order.
#[derive(Debug, Default)]
pub struct RequestLog {
    /// Accepted-request timestamps, oldest first.
    history: VecDeque<Instant>,
}

impl RequestLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self {
            history: VecDeque::new(),
        }
    }

    /// Check the quota and record the request if it is allowed.
    ///
    /// Returns `false` without recording when `limit` entries already
    /// sit inside the window; rejected requests never consume quota.
    pub fn check_and_record(&mut self, now: Instant, limit: usize, window: Duration) -> bool {
        self.prune(now, window);

        if self.history.len() >= limit {
            return false;
        }

        self.history.push_back(now);
        true
    }

    /// Number of recorded requests still inside the window.
    ///
    /// Pruning happens here too, so a read compacts the log, but it
    /// never changes a later allow/deny outcome.
    pub fn count(&mut self, now: Instant, window: Duration) -> usize {
        self.prune(now, window);
        self.history.len()
    }

    /// Drop every entry at or before `now - window`.
    ///
    /// An entry aged exactly `window` is outside the window. When the
    /// window reaches back past the start of monotonic time, nothing
    /// can be stale and the log is left untouched.
    fn prune(&mut self, now: Instant, window: Duration) {
        let cutoff = match now.checked_sub(window) {
            Some(cutoff) => cutoff,
            None => return,
        };

        while let Some(&oldest) = self.history.front() {
            if oldest <= cutoff {
                self.history.pop_front();
            } else {
                break;
            }
        }
    }
}
