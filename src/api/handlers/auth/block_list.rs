//! Temporary denial list for identifiers that exceeded the rate limit.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Identifiers currently denied service, with lazy expiry.
///
/// Entries are removed the first time they are checked after their unblock
/// time has passed; the list itself never schedules work.
#[derive(Debug, Default)]
pub struct BlockList {
    entries: Mutex<HashMap<String, Instant>>,
}

impl BlockList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_entries(&self) -> MutexGuard<'_, HashMap<String, Instant>> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Deny the identifier for `duration` from now, overwriting any earlier
    /// block.
    pub fn block(&self, identifier: &str, duration: Duration) {
        self.lock_entries()
            .insert(identifier.to_string(), Instant::now() + duration);
    }

    /// Whether the identifier is currently blocked. Expired entries are
    /// deleted on the way out.
    pub fn is_blocked(&self, identifier: &str) -> bool {
        let mut entries = self.lock_entries();
        match entries.get(identifier) {
            Some(&unblock_at) if Instant::now() < unblock_at => true,
            Some(_) => {
                entries.remove(identifier);
                false
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn unknown_identifier_is_not_blocked() {
        let list = BlockList::new();
        assert!(!list.is_blocked("1.2.3.4"));
    }

    #[test]
    fn blocked_identifier_stays_blocked_until_expiry() {
        let list = BlockList::new();
        list.block("1.2.3.4", Duration::from_millis(30));
        assert!(list.is_blocked("1.2.3.4"));
        sleep(Duration::from_millis(40));
        assert!(!list.is_blocked("1.2.3.4"));
        // The expired entry is gone, not just ignored.
        assert!(list.lock_entries().is_empty());
    }

    #[test]
    fn blocking_again_extends_the_deadline() {
        let list = BlockList::new();
        list.block("1.2.3.4", Duration::from_millis(10));
        list.block("1.2.3.4", Duration::from_secs(60));
        sleep(Duration::from_millis(20));
        assert!(list.is_blocked("1.2.3.4"));
    }
}
