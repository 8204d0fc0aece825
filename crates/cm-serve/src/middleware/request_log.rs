use axum::Json;
use axum::body::Body;
use axum::extract::Request;
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use cm_core::auth::{CHALLENGE_ID_HEADER, DEVICE_ID_HEADER, NONCE_HEADER, SIGNATURE_HEADER};
use cm_core::types::{ResponseEnvelope, Status};

/// Logs method, URI, the auth headers and the body, then hands the request on untouched.
pub async fn request_log_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(method = %parts.method, uri = %parts.uri, error = %err, "failed to read request body");
            let envelope = ResponseEnvelope::status_only(Status::failure(
                400,
                format!("Failed to read request body: {err}"),
            ));
            return (StatusCode::BAD_REQUEST, Json(envelope)).into_response();
        }
    };

    tracing::info!(
        method = %parts.method,
        uri = %parts.uri,
        nonce = header_text(&parts.headers, NONCE_HEADER),
        challenge_id = header_text(&parts.headers, CHALLENGE_ID_HEADER),
        signature = header_text(&parts.headers, SIGNATURE_HEADER),
        device_id = header_text(&parts.headers, DEVICE_ID_HEADER),
        "mock server request"
    );
    if !body_bytes.is_empty() {
        tracing::info!(body = %String::from_utf8_lossy(&body_bytes), "request body");
    }

    next.run(Request::from_parts(parts, Body::from(body_bytes))).await
}

fn header_text<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-")
}
