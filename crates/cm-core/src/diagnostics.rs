use crate::types::Event;
use std::fmt;

/// Substrings in an event name that mark a batch as an SDK test run.
const TEST_MARKERS: [&str; 6] = [
    "success_test",
    "partial_test",
    "batch_queue",
    "large_batch",
    "retry_test",
    "rapid_fire",
];

/// Attribute flags checked in order; the first truthy one wins.
const TEST_FLAGS: [(&str, TestType); 6] = [
    ("test_success", TestType::AllSuccess),
    ("test_partial", TestType::PartialSuccess),
    ("test_batch_queue", TestType::BatchQueue),
    ("test_large_batch", TestType::LargeBatch),
    ("test_retry", TestType::Retry),
    ("test_rapid_fire", TestType::RapidFire),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestType {
    AllSuccess,
    PartialSuccess,
    BatchQueue,
    LargeBatch,
    Retry,
    RapidFire,
    Other,
}

impl TestType {
    pub fn classify(event: &Event) -> Self {
        TEST_FLAGS
            .iter()
            .find(|(flag, _)| event.has_flag(flag))
            .map_or(Self::Other, |(_, kind)| *kind)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::AllSuccess => "ALL_SUCCESS_TEST",
            Self::PartialSuccess => "PARTIAL_SUCCESS_TEST",
            Self::BatchQueue => "BATCH_QUEUE_TEST",
            Self::LargeBatch => "LARGE_BATCH_TEST",
            Self::Retry => "RETRY_TEST",
            Self::RapidFire => "RAPID_FIRE_TEST",
            Self::Other => "OTHER",
        }
    }
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn is_test_event(event: &Event) -> bool {
    event
        .name()
        .is_some_and(|name| TEST_MARKERS.iter().any(|marker| name.contains(marker)))
}

/// Logs every event of a batch with its test type when any event carries a test marker.
pub fn log_test_events(events: &[Event]) {
    if !events.iter().any(is_test_event) {
        return;
    }
    tracing::info!(count = events.len(), "test events detected");
    for (index, event) in events.iter().enumerate() {
        tracing::info!(
            position = index + 1,
            name = event.name().unwrap_or_default(),
            test_type = %TestType::classify(event),
            "test event"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(value: serde_json::Value) -> Event {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_marker_detection() {
        assert!(is_test_event(&event(json!({"name": "sdk_rapid_fire_3"}))));
        assert!(is_test_event(&event(json!({"name": "large_batch"}))));
        assert!(!is_test_event(&event(json!({"name": "page_view"}))));
        assert!(!is_test_event(&event(json!({"event_id": "x"}))));
    }

    #[test]
    fn test_first_truthy_flag_wins() {
        let both = event(json!({"attributes": {"test_retry": true, "test_partial": true}}));
        assert_eq!(TestType::classify(&both), TestType::PartialSuccess);

        let falsy = event(json!({"attributes": {"test_success": false, "test_rapid_fire": 1}}));
        assert_eq!(TestType::classify(&falsy), TestType::RapidFire);

        let plain = event(json!({"name": "success_test"}));
        assert_eq!(TestType::classify(&plain), TestType::Other);
        assert_eq!(TestType::Other.to_string(), "OTHER");
    }
}
