use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// A single event as sent by the SDK.
///
/// Only `event_id`, `name` and `attributes` are interpreted, and only when
/// they have the expected shape. Every other field is carried through
/// untouched so stored records keep the caller's shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct Event {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<Value> for Event {
    fn from(value: Value) -> Self {
        let Value::Object(mut fields) = value else {
            return Self::default();
        };
        Self {
            event_id: fields.shift_remove("event_id"),
            name: fields.shift_remove("name"),
            attributes: fields.shift_remove("attributes"),
            extra: fields,
        }
    }
}

impl Event {
    /// The name when it is a string.
    pub fn name(&self) -> Option<&str> {
        self.name.as_ref().and_then(Value::as_str)
    }

    /// Non-object `attributes` carry no values.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes
            .as_ref()
            .and_then(Value::as_object)
            .and_then(|attributes| attributes.get(key))
    }

    pub fn has_flag(&self, key: &str) -> bool {
        self.attribute(key).is_some_and(is_truthy)
    }

    /// Key used to track retry attempts for this event.
    ///
    /// The JSON text of the id keeps `"1"` and `1` apart.
    pub fn attempt_key(&self) -> String {
        self.event_id
            .as_ref()
            .map_or_else(|| Value::Null.to_string(), Value::to_string)
    }
}

/// Loose truthiness: `false`, `null`, `0`, `NaN` and `""` are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Body of `POST /mapp/events`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EventBatch {
    #[serde(default)]
    #[schema(value_type = Option<Vec<Object>>)]
    pub events: Option<Vec<Event>>,
    #[serde(default, deserialize_with = "present")]
    pub request_id: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub system_data: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub cuid: Option<Value>,
}

impl EventBatch {
    pub fn events(&self) -> &[Event] {
        self.events.as_deref().unwrap_or_default()
    }

    pub fn metadata(&self) -> RequestMetadata {
        RequestMetadata {
            request_id: self.request_id.clone(),
            system_data: self.system_data.clone(),
            cuid: self.cuid.clone(),
        }
    }
}

/// Request-level fields copied onto every stored record.
///
/// `Some(Value::Null)` is an explicit `null` and is stored as such; `None`
/// means the field was absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestMetadata {
    pub request_id: Option<Value>,
    pub system_data: Option<Value>,
    pub cuid: Option<Value>,
}

/// An accepted event as written to the `stored_events` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEventRecord {
    #[serde(flatten)]
    pub event: Event,
    #[serde(with = "iso_millis")]
    pub stored_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub request_id: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub system_data: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub cuid: Option<Value>,
}

impl StoredEventRecord {
    pub fn new(event: Event, stored_at: DateTime<Utc>, metadata: &RequestMetadata) -> Self {
        Self {
            event,
            stored_at,
            request_id: metadata.request_id.clone(),
            system_data: metadata.system_data.clone(),
            cuid: metadata.cuid.clone(),
        }
    }
}

/// Keeps an explicit `null` as `Some(Value::Null)`.
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let text = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&text)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
