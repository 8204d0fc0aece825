use cm_core::types::{EventBatch, EventResult, NonceGrant, ResponseEnvelope, Status};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::auth::issue_nonce,
        crate::routes::events::ingest_events,
    ),
    components(schemas(NonceGrant, EventBatch, ResponseEnvelope, Status, EventResult)),
    info(
        title = "capmock",
        description = "Mock auth and event-ingestion backend for SDK development"
    )
)]
struct ApiDoc;

pub fn generate_spec() -> String {
    ApiDoc::openapi()
        .to_pretty_json()
        .unwrap_or_else(|_| "{}".to_string())
}
