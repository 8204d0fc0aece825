use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Counts only ever grow for the lifetime of the counter.
pub trait AttemptCounter: Send + Sync {
    fn record_attempt(&self, key: &str) -> u32;
    fn attempts(&self, key: &str) -> u32;
}

#[derive(Debug, Default)]
pub struct InMemoryAttemptCounter {
    counts: Mutex<HashMap<String, u32>>,
}

impl InMemoryAttemptCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AttemptCounter for InMemoryAttemptCounter {
    fn record_attempt(&self, key: &str) -> u32 {
        let mut counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
        let count = counts.entry(key.to_string()).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    fn attempts(&self, key: &str) -> u32 {
        self.counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .copied()
            .unwrap_or(0)
    }
}

impl<T: AttemptCounter + ?Sized> AttemptCounter for Arc<T> {
    fn record_attempt(&self, key: &str) -> u32 {
        (**self).record_attempt(key)
    }

    fn attempts(&self, key: &str) -> u32 {
        (**self).attempts(key)
    }
}
