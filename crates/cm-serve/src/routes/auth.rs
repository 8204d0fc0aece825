use crate::AppState;
use axum::Json;
use axum::extract::State;
use cm_core::types::NonceGrant;

#[utoipa::path(
    post,
    path = "/auth/nonce",
    responses((status = 200, body = NonceGrant))
)]
pub(crate) async fn issue_nonce(State(state): State<AppState>) -> Json<NonceGrant> {
    let grant = state.nonces.issue();
    tracing::info!(
        nonce = %grant.nonce,
        challenge_id = %grant.challenge_id,
        expires_at = grant.expires_at,
        "issued nonce"
    );
    Json(grant)
}
