pub mod auth;
pub mod error;
pub mod events;
pub mod resources;

use crate::AppState;
use axum::Router;
use axum::routing::post;

/// The two simulated endpoints sit in front of the flat-file resource router.
/// Any other path, or any other method on those two paths, falls through to it.
pub fn router(state: AppState) -> Router {
    let fallback = resources::router(state.clone());
    Router::new()
        .route(
            "/auth/nonce",
            post(auth::issue_nonce).fallback_service(fallback.clone()),
        )
        .route(
            "/mapp/events",
            post(events::ingest_events).fallback_service(fallback.clone()),
        )
        .with_state(state)
        .fallback_service(fallback)
}
