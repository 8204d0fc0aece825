use crate::attempts::AttemptCounter;
use crate::types::{Event, EventResult, ResponseEnvelope, Status};

pub const RETRY_FLAG: &str = "test_retry";
pub const RETRY_SUCCESS_ATTEMPT: u32 = 3;

const SMALL_BATCH_MAX: usize = 5;
const PARTIAL_BATCH_MAX: usize = 10;
const PARTIAL_ACCEPT_LIMIT: usize = 7;
const LARGE_BATCH_MAX: usize = 50;

const EVENT_OK: &str = "Event processed successfully";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchClass {
    Retry,
    Empty,
    Small,
    Partial,
    Large,
    TooLarge,
}

impl BatchClass {
    pub fn of(events: &[Event]) -> Self {
        if events.iter().any(|event| event.has_flag(RETRY_FLAG)) {
            return Self::Retry;
        }
        match events.len() {
            0 => Self::Empty,
            n if n <= SMALL_BATCH_MAX => Self::Small,
            n if n <= PARTIAL_BATCH_MAX => Self::Partial,
            n if n <= LARGE_BATCH_MAX => Self::Large,
            _ => Self::TooLarge,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Simulation {
    pub class: BatchClass,
    pub envelope: ResponseEnvelope,
    /// Events to persist, in input order.
    pub accepted: Vec<Event>,
}

pub fn simulate<C: AttemptCounter + ?Sized>(events: &[Event], attempts: &C) -> Simulation {
    let class = BatchClass::of(events);
    let (envelope, accepted) = match class {
        BatchClass::Retry => simulate_retry(events, attempts),
        BatchClass::Empty => (
            ResponseEnvelope::with_events(Status::ok("No events to process"), Vec::new()),
            Vec::new(),
        ),
        BatchClass::Small => (
            ResponseEnvelope::with_events(
                Status::ok("All events processed successfully"),
                events.iter().map(accepted_result).collect(),
            ),
            events.to_vec(),
        ),
        // The first seven always succeed, so six or seven events still come back
        // as a 201 "partial" reply with nothing rejected.
        BatchClass::Partial => (
            ResponseEnvelope::with_events(
                Status::failure(201, "Partial success - some events failed"),
                events
                    .iter()
                    .enumerate()
                    .map(|(index, event)| {
                        if index < PARTIAL_ACCEPT_LIMIT {
                            accepted_result(event)
                        } else {
                            EventResult {
                                event_id: event.event_id.clone(),
                                status: Status::failure(429, "Rate limit exceeded - retry later"),
                            }
                        }
                    })
                    .collect(),
            ),
            events.iter().take(PARTIAL_ACCEPT_LIMIT).cloned().collect(),
        ),
        BatchClass::Large => (
            ResponseEnvelope::with_events(
                Status::ok("Large batch processed successfully"),
                events.iter().map(accepted_result).collect(),
            ),
            events.to_vec(),
        ),
        BatchClass::TooLarge => (
            ResponseEnvelope::status_only(Status::failure(
                500,
                "Batch size too large - please retry with smaller batches",
            )),
            Vec::new(),
        ),
    };

    Simulation {
        class,
        envelope,
        accepted,
    }
}

fn simulate_retry<C: AttemptCounter + ?Sized>(
    events: &[Event],
    attempts: &C,
) -> (ResponseEnvelope, Vec<Event>) {
    tracing::info!(count = events.len(), "retry scenario detected");

    let mut results = Vec::with_capacity(events.len());
    let mut accepted = Vec::new();
    for event in events {
        let attempt = attempts.record_attempt(&event.attempt_key());
        tracing::info!(
            name = event.name().unwrap_or_default(),
            attempt,
            "retry attempt"
        );
        let status = if attempt < RETRY_SUCCESS_ATTEMPT {
            Status::failure(
                500,
                format!("Simulated failure - attempt {attempt}/{RETRY_SUCCESS_ATTEMPT}"),
            )
        } else {
            accepted.push(event.clone());
            Status::ok(format!("Success after {attempt} attempts"))
        };
        results.push(EventResult {
            event_id: event.event_id.clone(),
            status,
        });
    }

    let status = if accepted.len() == events.len() {
        Status::ok("All retry events eventually succeeded")
    } else {
        Status::failure(201, "Partial success - some events still failing")
    };

    (ResponseEnvelope::with_events(status, results), accepted)
}

fn accepted_result(event: &Event) -> EventResult {
    EventResult {
        event_id: event.event_id.clone(),
        status: Status::ok(EVENT_OK),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attempts::InMemoryAttemptCounter;
    use serde_json::json;

    fn plain_events(n: usize) -> Vec<Event> {
        (0..n)
            .map(|i| Event {
                event_id: Some(json!(format!("evt-{i}"))),
                name: Some(json!("page_view")),
                ..Event::default()
            })
            .collect()
    }

    fn retry_event(id: &str) -> Event {
        serde_json::from_value(json!({
            "event_id": id,
            "name": "retry_test",
            "attributes": {"test_retry": true}
        }))
        .unwrap()
    }

    fn successes(simulation: &Simulation) -> usize {
        simulation
            .envelope
            .events
            .as_ref()
            .map_or(0, |events| events.iter().filter(|e| e.status.success).count())
    }

    #[test]
    fn test_classification_thresholds() {
        let cases = [
            (0, BatchClass::Empty),
            (1, BatchClass::Small),
            (5, BatchClass::Small),
            (6, BatchClass::Partial),
            (10, BatchClass::Partial),
            (11, BatchClass::Large),
            (50, BatchClass::Large),
            (51, BatchClass::TooLarge),
        ];
        for (n, expected) in cases {
            assert_eq!(BatchClass::of(&plain_events(n)), expected, "n = {n}");
        }
    }

    #[test]
    fn test_empty_batch() {
        let simulation = simulate(&[], &InMemoryAttemptCounter::new());
        assert_eq!(simulation.envelope.status, Status::ok("No events to process"));
        assert_eq!(simulation.envelope.events, Some(Vec::new()));
        assert!(simulation.accepted.is_empty());
    }

    #[test]
    fn test_all_success_buckets() {
        for n in [1, 3, 5, 11, 30, 50] {
            let events = plain_events(n);
            let simulation = simulate(&events, &InMemoryAttemptCounter::new());
            assert!(simulation.envelope.status.success, "n = {n}");
            assert_eq!(simulation.envelope.code(), 200);
            assert_eq!(successes(&simulation), n);
            assert_eq!(simulation.accepted, events);
        }
    }

    #[test]
    fn test_large_batch_message() {
        let simulation = simulate(&plain_events(20), &InMemoryAttemptCounter::new());
        assert_eq!(
            simulation.envelope.status.message,
            "Large batch processed successfully"
        );
    }

    #[test]
    fn test_partial_bucket_accepts_first_seven() {
        for n in 6..=10 {
            let events = plain_events(n);
            let simulation = simulate(&events, &InMemoryAttemptCounter::new());
            let results = simulation.envelope.events.as_ref().unwrap();

            assert_eq!(simulation.envelope.status.code, 201, "n = {n}");
            assert!(!simulation.envelope.status.success);
            assert_eq!(results.len(), n);
            assert_eq!(successes(&simulation), n.min(7));
            for (index, result) in results.iter().enumerate() {
                assert_eq!(result.event_id, events[index].event_id);
                if index < 7 {
                    assert_eq!(result.status.code, 200);
                } else {
                    assert_eq!(result.status.code, 429);
                    assert_eq!(result.status.message, "Rate limit exceeded - retry later");
                }
            }
            assert_eq!(simulation.accepted, events[..n.min(7)].to_vec());
        }
    }

    #[test]
    fn test_six_events_still_report_partial() {
        let simulation = simulate(&plain_events(6), &InMemoryAttemptCounter::new());
        assert_eq!(successes(&simulation), 6);
        assert_eq!(simulation.accepted.len(), 6);
        assert_eq!(
            simulation.envelope.status,
            Status::failure(201, "Partial success - some events failed")
        );
    }

    #[test]
    fn test_too_large_batch_omits_events() {
        let simulation = simulate(&plain_events(51), &InMemoryAttemptCounter::new());
        assert_eq!(simulation.envelope.code(), 500);
        assert!(simulation.envelope.events.is_none());
        assert!(simulation.accepted.is_empty());
        let json = serde_json::to_value(&simulation.envelope).unwrap();
        assert!(json.get("events").is_none());
    }

    #[test]
    fn test_retry_sequence_fails_twice_then_succeeds() {
        let attempts = InMemoryAttemptCounter::new();
        let events = vec![retry_event("r-1")];

        let first = simulate(&events, &attempts);
        let second = simulate(&events, &attempts);
        let third = simulate(&events, &attempts);
        let fourth = simulate(&events, &attempts);

        for (simulation, attempt) in [(&first, 1), (&second, 2)] {
            let result = &simulation.envelope.events.as_ref().unwrap()[0];
            assert_eq!(
                result.status,
                Status::failure(500, format!("Simulated failure - attempt {attempt}/3"))
            );
            assert_eq!(
                simulation.envelope.status,
                Status::failure(201, "Partial success - some events still failing")
            );
            assert!(simulation.accepted.is_empty());
        }

        let result = &third.envelope.events.as_ref().unwrap()[0];
        assert_eq!(result.status, Status::ok("Success after 3 attempts"));
        assert_eq!(
            third.envelope.status,
            Status::ok("All retry events eventually succeeded")
        );
        assert_eq!(third.accepted, events);

        let result = &fourth.envelope.events.as_ref().unwrap()[0];
        assert_eq!(result.status, Status::ok("Success after 4 attempts"));
        assert_eq!(attempts.attempts(&events[0].attempt_key()), 4);
    }

    #[test]
    fn test_retry_flag_overrides_batch_size() {
        let mut events = plain_events(60);
        events.push(retry_event("r-big"));
        let simulation = simulate(&events, &InMemoryAttemptCounter::new());

        assert_eq!(simulation.class, BatchClass::Retry);
        assert_eq!(simulation.envelope.events.as_ref().unwrap().len(), 61);
        assert!(simulation.accepted.is_empty());
    }

    #[test]
    fn test_retry_counts_each_event_independently() {
        let attempts = InMemoryAttemptCounter::new();
        simulate(&[retry_event("seen")], &attempts);
        simulate(&[retry_event("seen")], &attempts);

        let batch = vec![retry_event("seen"), retry_event("fresh")];
        let simulation = simulate(&batch, &attempts);
        let results = simulation.envelope.events.as_ref().unwrap();

        assert!(results[0].status.success);
        assert!(!results[1].status.success);
        assert_eq!(simulation.envelope.status.code, 201);
        assert_eq!(simulation.accepted, vec![batch[0].clone()]);
    }

    #[test]
    fn test_falsy_retry_flag_is_ignored() {
        let event: Event = serde_json::from_value(json!({
            "event_id": "e",
            "attributes": {"test_retry": false}
        }))
        .unwrap();
        assert_eq!(BatchClass::of(&[event]), BatchClass::Small);
    }
}
