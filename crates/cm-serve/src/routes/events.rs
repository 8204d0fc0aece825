use crate::AppState;
use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use cm_core::types::{EventBatch, ResponseEnvelope};

#[utoipa::path(
    post,
    path = "/mapp/events",
    request_body = EventBatch,
    params(
        ("x-cap-nonce" = String, Header, description = "Nonce from /auth/nonce"),
        ("x-cap-challenge-id" = String, Header, description = "Challenge id from /auth/nonce"),
        ("x-cap-signature" = String, Header, description = "Request signature (not verified)"),
        ("x-cap-device-id" = String, Header, description = "Device identifier")
    ),
    responses(
        (status = 200, body = ResponseEnvelope, description = "All events accepted"),
        (status = 201, body = ResponseEnvelope, description = "Some events failed"),
        (status = 400, body = ResponseEnvelope, description = "Body could not be decoded"),
        (status = 401, body = ResponseEnvelope, description = "Authentication headers missing"),
        (status = 500, body = ResponseEnvelope, description = "Batch too large")
    )
)]
pub(crate) async fn ingest_events(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let outcome = state.ingestor.ingest(
        |name| headers.get(name).and_then(|value| value.to_str().ok()),
        &body,
    );

    if outcome.is_delayed() && !state.response_delay.is_zero() {
        tokio::time::sleep(state.response_delay).await;
    }

    let status =
        StatusCode::from_u16(outcome.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(outcome.into_envelope())).into_response()
}
