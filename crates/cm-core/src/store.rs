use crate::error::StoreError;
use crate::types::StoredEventRecord;
use std::sync::{Arc, Mutex, PoisonError};

/// Destination for accepted events.
pub trait StoredEventRepository: Send + Sync {
    fn append(&self, records: Vec<StoredEventRecord>) -> Result<(), StoreError>;
    fn all(&self) -> Result<Vec<StoredEventRecord>, StoreError>;
}

impl<T: StoredEventRepository + ?Sized> StoredEventRepository for Arc<T> {
    fn append(&self, records: Vec<StoredEventRecord>) -> Result<(), StoreError> {
        (**self).append(records)
    }

    fn all(&self) -> Result<Vec<StoredEventRecord>, StoreError> {
        (**self).all()
    }
}

/// Repository kept entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryEventRepository {
    records: Mutex<Vec<StoredEventRecord>>,
}

impl InMemoryEventRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StoredEventRepository for InMemoryEventRepository {
    fn append(&self, records: Vec<StoredEventRecord>) -> Result<(), StoreError> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(records);
        Ok(())
    }

    fn all(&self) -> Result<Vec<StoredEventRecord>, StoreError> {
        Ok(self
            .records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}
