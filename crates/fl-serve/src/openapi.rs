use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use fl_core::types::{
    AddKnowledgeInput, ChatInput, ChatReply, CreateHelpRequestInput, HelpRequest,
    HelpRequestCreated, HelpRequestId, KnowledgeEntry, RequestFilter, RequestStatus,
    ResolveRequestInput,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(title = "FrontLoop API"),
    paths(
        crate::routes::requests::list_requests,
        crate::routes::requests::create_request,
        crate::routes::requests::respond,
        crate::routes::knowledge::list_entries,
        crate::routes::knowledge::add_entry,
        crate::routes::chat::chat
    ),
    components(schemas(
        HelpRequest,
        HelpRequestId,
        RequestStatus,
        RequestFilter,
        CreateHelpRequestInput,
        HelpRequestCreated,
        ResolveRequestInput,
        KnowledgeEntry,
        AddKnowledgeInput,
        ChatInput,
        ChatReply
    ))
)]
struct ApiDoc;

pub fn generate_spec() -> String {
    ApiDoc::openapi()
        .to_pretty_json()
        .unwrap_or_else(|_| "{}".to_string())
}

pub fn router() -> Router {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
