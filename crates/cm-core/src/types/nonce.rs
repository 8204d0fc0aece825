use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Token pair handed out by `POST /auth/nonce`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NonceGrant {
    pub nonce: String,
    pub challenge_id: String,
    /// Expiry as milliseconds since the Unix epoch.
    pub expires_at: i64,
}
