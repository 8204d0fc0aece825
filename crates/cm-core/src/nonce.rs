use crate::types::NonceGrant;
use chrono::{DateTime, Utc};
use rand::Rng;
use std::time::Duration;

pub const DEFAULT_NONCE_TTL: Duration = Duration::from_millis(300_000);

const SUFFIX_LEN: usize = 9;
const SUFFIX_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Issues nonce / challenge pairs. Nothing is remembered between calls.
#[derive(Debug, Clone)]
pub struct NonceIssuer {
    ttl_ms: i64,
}

impl Default for NonceIssuer {
    fn default() -> Self {
        Self::new(DEFAULT_NONCE_TTL)
    }
}

impl NonceIssuer {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl_ms: i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX),
        }
    }

    pub fn issue(&self) -> NonceGrant {
        self.issue_at(Utc::now(), &mut rand::thread_rng())
    }

    pub fn issue_at<R: Rng + ?Sized>(&self, now: DateTime<Utc>, rng: &mut R) -> NonceGrant {
        let millis = now.timestamp_millis();
        NonceGrant {
            nonce: format!("nonce-{millis}-{}", random_suffix(rng)),
            challenge_id: format!("challenge-{millis}-{}", random_suffix(rng)),
            expires_at: millis.saturating_add(self.ttl_ms),
        }
    }
}

fn random_suffix<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..SUFFIX_LEN)
        .map(|_| char::from(SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())]))
        .collect()
}
