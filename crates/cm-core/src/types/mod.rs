pub mod envelope;
pub mod event;
pub mod nonce;

pub use envelope::{EventResult, ResponseEnvelope, Status};
pub use event::{Event, EventBatch, RequestMetadata, StoredEventRecord};
pub use nonce::NonceGrant;
