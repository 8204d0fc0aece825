use crate::error::DbError;
use crate::file_store::JsonFileStore;
use cm_core::error::StoreError;
use cm_core::store::StoredEventRepository;
use cm_core::types::StoredEventRecord;
use serde_json::Value;
use std::sync::Arc;

/// Collection that accepted events are appended to.
pub const STORED_EVENTS: &str = "stored_events";

pub struct FileEventRepository {
    store: Arc<JsonFileStore>,
}

impl FileEventRepository {
    pub fn new(store: Arc<JsonFileStore>) -> Self {
        Self { store }
    }
}

impl StoredEventRepository for FileEventRepository {
    fn append(&self, records: Vec<StoredEventRecord>) -> Result<(), StoreError> {
        let values = records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| StoreError::Encode {
                message: err.to_string(),
            })?;
        self.store
            .update(|db| {
                let slot = db
                    .entry(STORED_EVENTS)
                    .or_insert_with(|| Value::Array(Vec::new()));
                match slot {
                    Value::Array(items) => {
                        items.extend(values);
                        Ok(())
                    }
                    _ => Err(DbError::Decode {
                        message: format!("{STORED_EVENTS} is not a collection"),
                    }),
                }
            })
            .map_err(StoreError::from)
    }

    fn all(&self) -> Result<Vec<StoredEventRecord>, StoreError> {
        let db = self.store.read()?;
        match db.get(STORED_EVENTS) {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    serde_json::from_value(item.clone()).map_err(|err| StoreError::Decode {
                        message: err.to_string(),
                    })
                })
                .collect(),
            Some(_) => Err(StoreError::Decode {
                message: format!("{STORED_EVENTS} is not a collection"),
            }),
        }
    }
}
