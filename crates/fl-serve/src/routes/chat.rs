use crate::middleware::correlation::CorrelationId;
use crate::routes::error::map_error;
use crate::{AppState, build_frontloop};
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Extension, Json, Router};
use fl_core::types::{ChatInput, ChatReply};

pub fn router(state: AppState) -> Router {
    Router::new().route("/chat", post(chat)).with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/chat",
    request_body = ChatInput,
    responses((status = 200, body = ChatReply))
)]
pub(crate) async fn chat(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Json(input): Json<ChatInput>,
) -> Response {
    let frontloop = match build_frontloop(&state) {
        Ok(frontloop) => frontloop,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    match frontloop.agent().converse(input) {
        Ok(reply) => Json(reply).into_response(),
        Err(err) => map_error(&err, Some(correlation.0)).into_response(),
    }
}
