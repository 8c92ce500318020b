use crate::middleware::correlation::CorrelationId;
use crate::routes::error::map_error;
use crate::{AppState, build_frontloop};
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use fl_core::types::{AddKnowledgeInput, KnowledgeEntry};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/knowledge-base", get(list_entries).post(add_entry))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/knowledge-base",
    responses((status = 200, body = Vec<KnowledgeEntry>))
)]
pub(crate) async fn list_entries(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
) -> Response {
    let frontloop = match build_frontloop(&state) {
        Ok(frontloop) => frontloop,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    match frontloop.knowledge().list() {
        Ok(entries) => Json(entries).into_response(),
        Err(err) => map_error(&err, Some(correlation.0)).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/knowledge-base",
    request_body = AddKnowledgeInput,
    responses((status = 200, body = KnowledgeEntry))
)]
pub(crate) async fn add_entry(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Json(input): Json<AddKnowledgeInput>,
) -> Response {
    let frontloop = match build_frontloop(&state) {
        Ok(frontloop) => frontloop,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    match frontloop.knowledge().add(input) {
        Ok(entry) => Json(entry).into_response(),
        Err(err) => map_error(&err, Some(correlation.0)).into_response(),
    }
}
