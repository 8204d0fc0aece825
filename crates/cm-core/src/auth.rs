use crate::types::{ResponseEnvelope, Status};

pub const NONCE_HEADER: &str = "x-cap-nonce";
pub const CHALLENGE_ID_HEADER: &str = "x-cap-challenge-id";
pub const SIGNATURE_HEADER: &str = "x-cap-signature";
pub const DEVICE_ID_HEADER: &str = "x-cap-device-id";

/// Headers every `POST /mapp/events` must carry, in reporting order.
pub const REQUIRED_HEADERS: [&str; 4] = [
    NONCE_HEADER,
    CHALLENGE_ID_HEADER,
    SIGNATURE_HEADER,
    DEVICE_ID_HEADER,
];

/// Returns the required headers that `lookup` cannot produce a non-empty value for.
///
/// `lookup` receives lowercase header names.
pub fn missing_headers<'a, F>(lookup: F) -> Vec<&'static str>
where
    F: Fn(&str) -> Option<&'a str>,
{
    REQUIRED_HEADERS
        .iter()
        .copied()
        .filter(|name| lookup(name).is_none_or(str::is_empty))
        .collect()
}

pub fn unauthorized(missing: &[&str]) -> ResponseEnvelope {
    ResponseEnvelope::status_only(Status::failure(
        401,
        format!("Missing authentication headers: {}", missing.join(", ")),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_in(headers: &HashMap<&'static str, &'static str>) -> impl Fn(&str) -> Option<&'static str> {
        move |name: &str| headers.get(name).copied()
    }

    #[test]
    fn test_all_present() {
        let headers: HashMap<_, _> = REQUIRED_HEADERS.iter().map(|name| (*name, "v")).collect();
        assert!(missing_headers(lookup_in(&headers)).is_empty());
    }

    #[test]
    fn test_reports_missing_in_order() {
        let headers = HashMap::from([(CHALLENGE_ID_HEADER, "c"), (DEVICE_ID_HEADER, "d")]);
        assert_eq!(
            missing_headers(lookup_in(&headers)),
            vec![NONCE_HEADER, SIGNATURE_HEADER]
        );
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let headers = HashMap::from([
            (NONCE_HEADER, ""),
            (CHALLENGE_ID_HEADER, "c"),
            (SIGNATURE_HEADER, "s"),
            (DEVICE_ID_HEADER, "d"),
        ]);
        assert_eq!(missing_headers(lookup_in(&headers)), vec![NONCE_HEADER]);
    }

    #[test]
    fn test_unauthorized_envelope() {
        let envelope = unauthorized(&[NONCE_HEADER, DEVICE_ID_HEADER]);
        assert_eq!(envelope.code(), 401);
        assert!(!envelope.status.success);
        assert_eq!(
            envelope.status.message,
            "Missing authentication headers: x-cap-nonce, x-cap-device-id"
        );
        assert!(envelope.events.is_none());
    }
}
