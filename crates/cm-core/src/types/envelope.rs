use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Status {
    pub success: bool,
    pub code: u16,
    pub message: String,
}

impl Status {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            code: 200,
            message: message.into(),
        }
    }

    pub fn failure(code: u16, message: impl Into<String>) -> Self {
        Self {
            success: false,
            code,
            message: message.into(),
        }
    }
}

/// Outcome reported for one event of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EventResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<Value>,
    pub status: Status,
}

/// Body returned by `POST /mapp/events`.
///
/// `events` is left out entirely for error replies that carry no per-event
/// detail (missing headers, undecodable body, oversized batch).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ResponseEnvelope {
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<EventResult>>,
}

impl ResponseEnvelope {
    pub fn with_events(status: Status, events: Vec<EventResult>) -> Self {
        Self {
            status,
            events: Some(events),
        }
    }

    pub fn status_only(status: Status) -> Self {
        Self {
            status,
            events: None,
        }
    }

    pub fn code(&self) -> u16 {
        self.status.code
    }
}
