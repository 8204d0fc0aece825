pub mod attempts;
pub mod auth;
pub mod diagnostics;
pub mod error;
pub mod ingest;
pub mod nonce;
pub mod simulator;
pub mod store;

pub mod types;

pub use crate::attempts::{AttemptCounter, InMemoryAttemptCounter};
pub use crate::error::{IngestError, StoreError};
pub use crate::ingest::{EventIngestor, IngestOutcome};
pub use crate::nonce::NonceIssuer;
pub use crate::store::{InMemoryEventRepository, StoredEventRepository};
