use std::collections::HashSet;
use std::sync::Mutex;

use crate::domain::ports::IdempotencyStore;

/// Process-local dedupe set. Keys are lost on restart, and there is no
/// coordination across instances; good for exactly one server process.
#[derive(Debug, Default)]
pub struct InMemoryIdempotencyStore {
    seen: Mutex<HashSet<String>>,
}

impl IdempotencyStore for InMemoryIdempotencyStore {
    fn contains(&self, key: &str) -> bool {
        match self.seen.lock() {
            Ok(seen) => seen.contains(key),
            Err(poisoned) => poisoned.into_inner().contains(key),
        }
    }

    fn record(&self, key: &str) {
        match self.seen.lock() {
            Ok(mut seen) => {
                seen.insert(key.to_string());
            }
            Err(poisoned) => {
                poisoned.into_inner().insert(key.to_string());
            }
        }
    }
}
