use crate::AppState;
use crate::routes::error::{map_error, not_found};
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use cm_db::DbError;
use serde_json::Value;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/{resource}",
            get(list)
                .post(create)
                .put(replace_singular)
                .patch(patch_singular),
        )
        .route(
            "/{resource}/{id}",
            get(get_item).put(replace).patch(patch).delete(delete),
        )
        .fallback(unknown_route)
        .with_state(state)
}

async fn list(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    Query(filters): Query<Vec<(String, String)>>,
) -> Response {
    respond(StatusCode::OK, state.store.resources().list(&resource, &filters))
}

async fn get_item(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
) -> Response {
    respond(StatusCode::OK, state.store.resources().get(&resource, &id))
}

async fn create(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    body: Bytes,
) -> Response {
    let result = parse_body(&body).and_then(|body| state.store.resources().create(&resource, body));
    respond(StatusCode::CREATED, result)
}

async fn replace(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
    body: Bytes,
) -> Response {
    let result =
        parse_body(&body).and_then(|body| state.store.resources().replace(&resource, &id, body));
    respond(StatusCode::OK, result)
}

async fn patch(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
    body: Bytes,
) -> Response {
    let result =
        parse_body(&body).and_then(|body| state.store.resources().patch(&resource, &id, body));
    respond(StatusCode::OK, result)
}

async fn replace_singular(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    body: Bytes,
) -> Response {
    let result =
        parse_body(&body).and_then(|body| state.store.resources().replace_singular(&resource, body));
    respond(StatusCode::OK, result)
}

async fn patch_singular(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    body: Bytes,
) -> Response {
    let result =
        parse_body(&body).and_then(|body| state.store.resources().patch_singular(&resource, body));
    respond(StatusCode::OK, result)
}

async fn delete(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
) -> Response {
    let result = state
        .store
        .resources()
        .delete(&resource, &id)
        .map(|()| Value::Object(serde_json::Map::new()));
    respond(StatusCode::OK, result)
}

async fn unknown_route() -> Response {
    not_found()
}

/// An empty body counts as `{}`.
fn parse_body(body: &[u8]) -> Result<Value, DbError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    serde_json::from_slice(body).map_err(|err| DbError::InvalidBody {
        message: err.to_string(),
    })
}

fn respond(status: StatusCode, result: Result<Value, DbError>) -> Response {
    match result {
        Ok(value) => (status, Json(value)).into_response(),
        Err(err) => map_error(&err),
    }
}
