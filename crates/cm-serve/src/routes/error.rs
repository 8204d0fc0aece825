use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cm_db::DbError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub code: &'static str,
    pub message: String,
}

/// Missing resources answer with an empty object, everything else with an [`ErrorEnvelope`].
pub fn map_error(err: &DbError) -> Response {
    let (status, code) = match err {
        DbError::NotFound => return not_found(),
        DbError::DuplicateId { .. } => (StatusCode::CONFLICT, "conflict"),
        DbError::InvalidBody { .. } => (StatusCode::BAD_REQUEST, "invalid_input"),
        DbError::Io { .. } | DbError::Decode { .. } | DbError::Encode { .. } => {
            tracing::error!(error = %err, "database request failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
        }
    };
    (
        status,
        Json(ErrorEnvelope {
            code,
            message: err.to_string(),
        }),
    )
        .into_response()
}

pub fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(serde_json::json!({}))).into_response()
}
