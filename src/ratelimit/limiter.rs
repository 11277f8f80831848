//! Core rate limiter implementation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, trace};

use super::window::RequestLog;

/// Current usage for one identity, as reported by [`RateLimiter::stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageStats {
    /// Requests recorded inside the current window.
    pub current: usize,
    /// The configured quota.
    pub limit: usize,
}

/// Sliding-window rate limiter keyed by identity.
///
/// Each identity owns a [`RequestLog`] behind its own mutex, so checks
/// for unrelated identities never contend. The registry itself is a
/// read/write-locked map that is held only long enough to find or
/// insert an entry, never across a per-identity check.
///
/// This struct is thread-safe and can be shared across multiple tasks.
pub struct RateLimiter {
    /// Per-identity request logs, created on first use and never removed.
    identities: RwLock<HashMap<String, Arc<Mutex<RequestLog>>>>,
    /// Maximum requests allowed inside the window.
    max_requests: usize,
    /// Length of the rolling window.
    window: Duration,
}

impl RateLimiter {
    /// Create a rate limiter allowing `max_requests` per `window`.
    ///
    /// A zero quota rejects every request; a zero window allows every
    /// request. Neither is an error.
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            identities: RwLock::new(HashMap::new()),
            max_requests,
            window,
        }
    }

    /// Check whether `identity` may make a request right now.
    ///
    /// Allowed requests are recorded against the quota; rejected ones
    /// are not.
    pub fn allow(&self, identity: &str) -> bool {
        let log = self.resolve_or_create(identity);

        // The registry lock is released by now; only this identity's
        // lock is held for the check itself.
        let mut log = log.lock();
        let now = Instant::now();
        let allowed = log.check_and_record(now, self.max_requests, self.window);

        if allowed {
            trace!(identity = %identity, "request allowed");
        } else {
            debug!(identity = %identity, limit = self.max_requests, "request rejected");
        }

        allowed
    }

    /// Current usage for `identity`.
    ///
    /// An identity that has never made a request reports zero usage
    /// without allocating any state for it.
    pub fn stats(&self, identity: &str) -> UsageStats {
        let log = self.identities.read().get(identity).map(Arc::clone);

        let current = match log {
            Some(log) => log.lock().count(Instant::now(), self.window),
            None => 0,
        };

        UsageStats {
            current,
            limit: self.max_requests,
        }
    }

    /// Find the log for `identity`, inserting an empty one on first use.
    ///
    /// Find-or-insert is atomic with respect to concurrent calls for the
    /// same identity: the write-lock path re-checks through the entry
    /// API, so two racing first requests share one log.
    fn resolve_or_create(&self, identity: &str) -> Arc<Mutex<RequestLog>> {
        if let Some(log) = self.identities.read().get(identity) {
            return Arc::clone(log);
        }

        let mut identities = self.identities.write();
        let log = identities.entry(identity.to_string()).or_insert_with(|| {
            debug!(identity = %identity, "creating request log for new identity");
            Arc::new(Mutex::new(RequestLog::new()))
        });
        Arc::clone(log)
    }

    /// The configured quota.
    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    /// The configured window.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Number of identities seen so far.
    pub fn identity_count(&self) -> usize {
        self.identities.read().len()
    }
}
