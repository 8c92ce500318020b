use crate::middleware::correlation::CorrelationId;
use crate::routes::error::map_error;
use crate::{AppState, build_frontloop};
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use fl_core::types::{
    CreateHelpRequestInput, HelpRequest, HelpRequestCreated, RequestFilter, ResolveRequestInput,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/requests", get(list_requests))
        .route("/help-request", post(create_request))
        .route("/respond", post(respond))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/requests",
    params(RequestFilter),
    responses((status = 200, body = Vec<HelpRequest>))
)]
pub(crate) async fn list_requests(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Query(filter): Query<RequestFilter>,
) -> Response {
    let frontloop = match build_frontloop(&state) {
        Ok(frontloop) => frontloop,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    match frontloop.help().list(&filter) {
        Ok(requests) => Json(requests).into_response(),
        Err(err) => map_error(&err, Some(correlation.0)).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/help-request",
    request_body = CreateHelpRequestInput,
    responses((status = 200, body = HelpRequestCreated))
)]
pub(crate) async fn create_request(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Json(input): Json<CreateHelpRequestInput>,
) -> Response {
    let frontloop = match build_frontloop(&state) {
        Ok(frontloop) => frontloop,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    match frontloop.help().request(input) {
        Ok(request) => Json(HelpRequestCreated {
            status: request.status,
            request_id: request.id,
        })
        .into_response(),
        Err(err) => map_error(&err, Some(correlation.0)).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/respond",
    request_body = ResolveRequestInput,
    responses(
        (status = 200, body = HelpRequest),
        (status = 404, description = "Unknown request"),
        (status = 409, description = "Request already resolved")
    )
)]
pub(crate) async fn respond(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Json(input): Json<ResolveRequestInput>,
) -> Response {
    let frontloop = match build_frontloop(&state) {
        Ok(frontloop) => frontloop,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    match frontloop.help().resolve(input) {
        Ok(request) => Json(request).into_response(),
        Err(err) => map_error(&err, Some(correlation.0)).into_response(),
    }
}
