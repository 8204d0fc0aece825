//! REST-style access to the resources of a [`JsonFileStore`].
//!
//! Array values are collections addressed by `id`; object values are
//! singular resources that are read and replaced as a whole.

use crate::error::DbError;
use crate::file_store::JsonFileStore;
use serde_json::{Map, Value};
use ulid::Ulid;

const ID_FIELD: &str = "id";

pub struct Resources<'a> {
    store: &'a JsonFileStore,
}

impl JsonFileStore {
    pub fn resources(&self) -> Resources<'_> {
        Resources { store: self }
    }
}

impl Resources<'_> {
    /// Returns a collection (optionally filtered) or a singular resource.
    ///
    /// Filters compare the text form of top-level fields; keys starting with
    /// `_` are reserved and ignored.
    pub fn list(&self, name: &str, filters: &[(String, String)]) -> Result<Value, DbError> {
        let db = self.store.read()?;
        match db.get(name) {
            Some(Value::Array(items)) => Ok(Value::Array(
                items
                    .iter()
                    .filter(|item| matches_filters(item, filters))
                    .cloned()
                    .collect(),
            )),
            Some(value @ Value::Object(_)) => Ok(value.clone()),
            _ => Err(DbError::NotFound),
        }
    }

    pub fn get(&self, name: &str, id: &str) -> Result<Value, DbError> {
        let db = self.store.read()?;
        collection(&db, name)?
            .iter()
            .find(|item| id_matches(item, id))
            .cloned()
            .ok_or(DbError::NotFound)
    }

    /// Inserts into a collection, or replaces a singular resource.
    pub fn create(&self, name: &str, body: Value) -> Result<Value, DbError> {
        let mut item = into_object(body)?;
        self.store.update(|db| match db.get_mut(name) {
            Some(Value::Array(items)) => {
                match item.get(ID_FIELD).and_then(id_text) {
                    Some(id) if items.iter().any(|existing| id_matches(existing, &id)) => {
                        return Err(DbError::DuplicateId { id });
                    }
                    Some(_) => {}
                    None => {
                        item.insert(ID_FIELD.to_string(), next_id(items));
                    }
                }
                let item = Value::Object(item);
                items.push(item.clone());
                Ok(item)
            }
            Some(slot @ Value::Object(_)) => {
                *slot = Value::Object(item);
                Ok(slot.clone())
            }
            _ => Err(DbError::NotFound),
        })
    }

    /// Replaces a collection item, keeping its id.
    pub fn replace(&self, name: &str, id: &str, body: Value) -> Result<Value, DbError> {
        let mut replacement = into_object(body)?;
        self.store.update(|db| {
            let item = find_mut(db, name, id)?;
            if let Some(existing) = item.get(ID_FIELD).cloned() {
                replacement.insert(ID_FIELD.to_string(), existing);
            }
            *item = Value::Object(replacement);
            Ok(item.clone())
        })
    }

    /// Shallow-merges `body` into a collection item. The id cannot change.
    pub fn patch(&self, name: &str, id: &str, body: Value) -> Result<Value, DbError> {
        let changes = into_object(body)?;
        self.store.update(|db| {
            let item = find_mut(db, name, id)?;
            if let Value::Object(fields) = item {
                for (key, value) in changes {
                    if key != ID_FIELD {
                        fields.insert(key, value);
                    }
                }
            }
            Ok(item.clone())
        })
    }

    pub fn replace_singular(&self, name: &str, body: Value) -> Result<Value, DbError> {
        let replacement = into_object(body)?;
        self.store.update(|db| match db.get_mut(name) {
            Some(slot @ Value::Object(_)) => {
                *slot = Value::Object(replacement);
                Ok(slot.clone())
            }
            _ => Err(DbError::NotFound),
        })
    }

    pub fn patch_singular(&self, name: &str, body: Value) -> Result<Value, DbError> {
        let changes = into_object(body)?;
        self.store.update(|db| match db.get_mut(name) {
            Some(Value::Object(fields)) => {
                fields.extend(changes);
                Ok(Value::Object(fields.clone()))
            }
            _ => Err(DbError::NotFound),
        })
    }

    pub fn delete(&self, name: &str, id: &str) -> Result<(), DbError> {
        self.store.update(|db| match db.get_mut(name) {
            Some(Value::Array(items)) => {
                let position = items
                    .iter()
                    .position(|item| id_matches(item, id))
                    .ok_or(DbError::NotFound)?;
                items.remove(position);
                Ok(())
            }
            _ => Err(DbError::NotFound),
        })
    }
}

fn collection<'d>(db: &'d Map<String, Value>, name: &str) -> Result<&'d Vec<Value>, DbError> {
    match db.get(name) {
        Some(Value::Array(items)) => Ok(items),
        _ => Err(DbError::NotFound),
    }
}

fn find_mut<'d>(db: &'d mut Map<String, Value>, name: &str, id: &str) -> Result<&'d mut Value, DbError> {
    match db.get_mut(name) {
        Some(Value::Array(items)) => items
            .iter_mut()
            .find(|item| id_matches(item, id))
            .ok_or(DbError::NotFound),
        _ => Err(DbError::NotFound),
    }
}

fn into_object(body: Value) -> Result<Map<String, Value>, DbError> {
    match body {
        Value::Object(fields) => Ok(fields),
        other => Err(DbError::InvalidBody {
            message: format!("expected a JSON object, got {}", kind_of(&other)),
        }),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Text form used when comparing ids and filter values.
fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn id_matches(item: &Value, id: &str) -> bool {
    item.get(ID_FIELD).and_then(id_text).is_some_and(|text| text == id)
}

fn matches_filters(item: &Value, filters: &[(String, String)]) -> bool {
    filters
        .iter()
        .filter(|(key, _)| !key.starts_with('_'))
        .all(|(key, expected)| item.get(key).and_then(id_text).as_deref() == Some(expected.as_str()))
}

/// Next numeric id when every existing id is an integer, otherwise a ULID.
fn next_id(items: &[Value]) -> Value {
    let ids: Option<Vec<i64>> = items
        .iter()
        .map(|item| item.get(ID_FIELD).and_then(Value::as_i64))
        .collect();
    match ids {
        Some(ids) => Value::from(ids.into_iter().max().unwrap_or(0).saturating_add(1)),
        None => Value::String(Ulid::new().to_string().to_lowercase()),
    }
}
