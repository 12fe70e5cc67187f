//! Pending negotiations, keyed by context or session id.

use indexmap::IndexMap;
use parking_lot::Mutex;
use sts_auth::Request;
use tracing::trace;

/// Bounded least-recently-used store of the first request of each pending
/// negotiation.
///
/// Once full, saving a new session drops the least recently touched one.
#[derive(Debug)]
pub struct NegotiationSessions {
    capacity: usize,
    entries: Mutex<IndexMap<String, Request>>,
}

impl NegotiationSessions {
    /// Creates a store holding at most `capacity` sessions.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(IndexMap::new()),
        }
    }

    /// Saves or replaces a session.
    pub fn save(&self, key: impl Into<String>, request: Request) {
        let key = key.into();
        let mut entries = self.entries.lock();
        entries.shift_remove(&key);
        entries.insert(key, request);
        while entries.len() > self.capacity {
            if let Some((evicted, _)) = entries.shift_remove_index(0) {
                trace!(session = %evicted, "evicted negotiation session");
            }
        }
    }

    /// Returns the saved request and marks the session as recently used.
    pub fn retrieve(&self, key: &str) -> Option<Request> {
        let mut entries = self.entries.lock();
        let index = entries.get_index_of(key)?;
        let last = entries.len() - 1;
        entries.move_index(index, last);
        entries.get_index(last).map(|(_, request)| request.clone())
    }

    /// Forgets a session.
    pub fn remove(&self, key: &str) -> Option<Request> {
        self.entries.lock().shift_remove(key)
    }

    /// Number of pending sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true when no session is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of sessions.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}
