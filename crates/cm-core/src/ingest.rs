use crate::attempts::AttemptCounter;
use crate::auth::{missing_headers, unauthorized};
use crate::diagnostics::log_test_events;
use crate::error::IngestError;
use crate::simulator::simulate;
use crate::store::StoredEventRepository;
use crate::types::{Event, EventBatch, RequestMetadata, ResponseEnvelope, Status, StoredEventRecord};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    Unauthorized(ResponseEnvelope),
    InvalidBody(ResponseEnvelope),
    Processed(ResponseEnvelope),
}

impl IngestOutcome {
    pub fn envelope(&self) -> &ResponseEnvelope {
        match self {
            Self::Unauthorized(envelope) | Self::InvalidBody(envelope) | Self::Processed(envelope) => {
                envelope
            }
        }
    }

    pub fn into_envelope(self) -> ResponseEnvelope {
        match self {
            Self::Unauthorized(envelope) | Self::InvalidBody(envelope) | Self::Processed(envelope) => {
                envelope
            }
        }
    }

    pub fn status_code(&self) -> u16 {
        self.envelope().code()
    }

    /// Only simulated replies are held back to emulate latency.
    pub fn is_delayed(&self) -> bool {
        matches!(self, Self::Processed(_))
    }
}

pub fn decode_batch(body: &[u8]) -> Result<EventBatch, IngestError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(EventBatch::default());
    }
    Ok(serde_json::from_slice(body)?)
}

pub struct EventIngestor<R, C> {
    repository: R,
    attempts: C,
}

impl<R: StoredEventRepository, C: AttemptCounter> EventIngestor<R, C> {
    pub fn new(repository: R, attempts: C) -> Self {
        Self {
            repository,
            attempts,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn attempts(&self) -> &C {
        &self.attempts
    }

    pub fn ingest<'a, F>(&self, lookup: F, body: &[u8]) -> IngestOutcome
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        self.ingest_at(lookup, body, Utc::now())
    }

    pub fn ingest_at<'a, F>(&self, lookup: F, body: &[u8], now: DateTime<Utc>) -> IngestOutcome
    where
        F: Fn(&str) -> Option<&'a str>,
    {
        let missing = missing_headers(lookup);
        if !missing.is_empty() {
            tracing::warn!(missing = ?missing, "missing authentication headers");
            return IngestOutcome::Unauthorized(unauthorized(&missing));
        }

        let batch = match decode_batch(body) {
            Ok(batch) => batch,
            Err(err) => {
                tracing::warn!(error = %err, "rejecting events body");
                return IngestOutcome::InvalidBody(ResponseEnvelope::status_only(Status::failure(
                    400,
                    err.to_string(),
                )));
            }
        };

        let events = batch.events();
        let simulation = simulate(events, &self.attempts);
        self.persist(simulation.accepted, &batch.metadata(), events.len(), now);
        log_test_events(events);

        tracing::debug!(
            class = ?simulation.class,
            envelope = %serde_json::to_string(&simulation.envelope).unwrap_or_default(),
            "events response"
        );
        IngestOutcome::Processed(simulation.envelope)
    }

    fn persist(&self, accepted: Vec<Event>, metadata: &RequestMetadata, total: usize, now: DateTime<Utc>) {
        if accepted.is_empty() {
            if total > 0 {
                tracing::warn!(total, "no events stored, all events failed processing");
            }
            return;
        }

        let stored = accepted.len();
        let records = accepted
            .into_iter()
            .map(|event| StoredEventRecord::new(event, now, metadata))
            .collect();
        match self.repository.append(records) {
            Ok(()) => tracing::info!(stored, total, "stored successful events"),
            Err(err) => tracing::error!(error = %err, stored, "failed to store events"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attempts::InMemoryAttemptCounter;
    use crate::auth::REQUIRED_HEADERS;
    use crate::error::StoreError;
    use crate::store::InMemoryEventRepository;
    use chrono::TimeZone;
    use serde_json::{Value, json};

    struct BrokenRepository;

    impl StoredEventRepository for BrokenRepository {
        fn append(&self, _records: Vec<StoredEventRecord>) -> Result<(), StoreError> {
            Err(StoreError::Io {
                message: "disk full".to_string(),
            })
        }

        fn all(&self) -> Result<Vec<StoredEventRecord>, StoreError> {
            Ok(Vec::new())
        }
    }

    fn all_headers(_name: &str) -> Option<&'static str> {
        Some("value")
    }

    fn no_signature(name: &str) -> Option<&'static str> {
        (name != "x-cap-signature").then_some("value")
    }

    fn body(n: usize) -> Vec<u8> {
        let events: Vec<Value> = (0..n)
            .map(|i| json!({"event_id": format!("e{i}"), "name": "tap"}))
            .collect();
        serde_json::to_vec(&json!({
            "events": events,
            "request_id": "req-42",
            "system_data": {"os": "ios"},
            "cuid": "cu-1"
        }))
        .unwrap()
    }

    fn ingestor() -> EventIngestor<InMemoryEventRepository, InMemoryAttemptCounter> {
        EventIngestor::new(InMemoryEventRepository::new(), InMemoryAttemptCounter::new())
    }

    #[test]
    fn test_missing_header_rejects_before_anything_else() {
        let ingestor = ingestor();
        let outcome = ingestor.ingest(no_signature, &body(3));

        assert!(matches!(outcome, IngestOutcome::Unauthorized(_)));
        assert!(!outcome.is_delayed());
        assert_eq!(outcome.status_code(), 401);
        assert_eq!(
            outcome.envelope().status.message,
            "Missing authentication headers: x-cap-signature"
        );
        assert!(ingestor.repository().all().unwrap().is_empty());
    }

    #[test]
    fn test_no_headers_lists_all_four() {
        let outcome = ingestor().ingest(|_| None, b"");
        assert_eq!(
            outcome.envelope().status.message,
            format!("Missing authentication headers: {}", REQUIRED_HEADERS.join(", "))
        );
    }

    #[test]
    fn test_missing_header_does_not_touch_attempts() {
        let ingestor = ingestor();
        let retry = br#"{"events":[{"event_id":"r","attributes":{"test_retry":true}}]}"#;
        ingestor.ingest(|_| None, retry);
        assert!(ingestor.attempts().is_empty());
    }

    #[test]
    fn test_persists_exactly_first_seven_of_eight() {
        let ingestor = ingestor();
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 8, 0, 0).unwrap();
        let outcome = ingestor.ingest_at(all_headers, &body(8), now);

        assert_eq!(outcome.status_code(), 201);
        let stored = ingestor.repository().all().unwrap();
        let ids: Vec<_> = stored.iter().map(|r| r.event.event_id.clone().unwrap()).collect();
        let expected: Vec<_> = (0..7).map(|i| json!(format!("e{i}"))).collect();
        assert_eq!(ids, expected);
        assert!(stored.iter().all(|r| r.stored_at == now));
        assert_eq!(stored[0].request_id, Some(json!("req-42")));
        assert_eq!(stored[0].system_data, Some(json!({"os": "ios"})));
        assert_eq!(stored[0].cuid, Some(json!("cu-1")));
    }

    #[test]
    fn test_empty_body_is_empty_batch() {
        let ingestor = ingestor();
        let outcome = ingestor.ingest(all_headers, b"");

        assert!(outcome.is_delayed());
        assert_eq!(outcome.status_code(), 200);
        assert_eq!(outcome.envelope().events, Some(Vec::new()));
        assert!(ingestor.repository().all().unwrap().is_empty());
    }

    #[test]
    fn test_oversized_batch_persists_nothing() {
        let ingestor = ingestor();
        let outcome = ingestor.ingest(all_headers, &body(51));
        assert_eq!(outcome.status_code(), 500);
        assert!(ingestor.repository().all().unwrap().is_empty());
    }

    #[test]
    fn test_invalid_body_is_rejected() {
        let outcome = ingestor().ingest(all_headers, b"{not json");
        assert!(matches!(outcome, IngestOutcome::InvalidBody(_)));
        assert_eq!(outcome.status_code(), 400);
        assert!(outcome.envelope().status.message.starts_with("Invalid request body:"));

        let outcome = ingestor().ingest(all_headers, br#"{"events": 5}"#);
        assert_eq!(outcome.status_code(), 400);
    }

    #[test]
    fn test_odd_event_shapes_still_process_the_batch() {
        let ingestor = ingestor();
        let body = br#"{"events":[{"event_id":"a","name":"x","attributes":"plain"},{"event_id":"b","name":42}]}"#;

        let outcome = ingestor.ingest(all_headers, body);

        assert_eq!(outcome.status_code(), 200);
        let stored = ingestor.repository().all().unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].event.attributes, Some(json!("plain")));
        assert_eq!(stored[1].event.name, Some(json!(42)));
    }

    #[test]
    fn test_storage_failure_keeps_response() {
        let ingestor = EventIngestor::new(BrokenRepository, InMemoryAttemptCounter::new());
        let outcome = ingestor.ingest(all_headers, &body(2));
        assert_eq!(outcome.status_code(), 200);
        assert_eq!(
            outcome.into_envelope().status.message,
            "All events processed successfully"
        );
    }

    #[test]
    fn test_retry_events_stored_on_third_attempt() {
        let ingestor = ingestor();
        let retry = br#"{"events":[{"event_id":"r","name":"retry_test","attributes":{"test_retry":true}}]}"#;

        for _ in 0..2 {
            let outcome = ingestor.ingest(all_headers, retry);
            assert_eq!(outcome.status_code(), 201);
        }
        assert!(ingestor.repository().all().unwrap().is_empty());

        let outcome = ingestor.ingest(all_headers, retry);
        assert_eq!(outcome.status_code(), 200);
        assert_eq!(ingestor.repository().all().unwrap().len(), 1);
    }
}
