use axum::Json;
use axum::http::StatusCode;
use fl_core::error::{FrontloopError, HelpError, KnowledgeError, ValidationError};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub code: &'static str,
    pub message: String,
    pub correlation_id: Option<String>,
}

pub fn map_error(
    err: &FrontloopError,
    correlation_id: Option<String>,
) -> (StatusCode, Json<ErrorEnvelope>) {
    let (status, code, message) = match err {
        FrontloopError::Help(help) => map_help_error(help),
        FrontloopError::Knowledge(knowledge) => map_knowledge_error(knowledge),
        FrontloopError::Internal { message } => {
            tracing::error!(%message, "internal error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                message.clone(),
            )
        }
    };

    (
        status,
        Json(ErrorEnvelope {
            code,
            message,
            correlation_id,
        }),
    )
}

fn map_help_error(err: &HelpError) -> (StatusCode, &'static str, String) {
    match err {
        HelpError::HelpNotFound => (StatusCode::NOT_FOUND, "not_found", err.to_string()),
        HelpError::Validation(ValidationError::AlreadyResolved) => {
            (StatusCode::CONFLICT, "conflict", err.to_string())
        }
        HelpError::Validation(_) | HelpError::InvalidInput { .. } => {
            (StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
    }
}

fn map_knowledge_error(err: &KnowledgeError) -> (StatusCode, &'static str, String) {
    match err {
        KnowledgeError::InvalidInput { .. } => {
            (StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
    }
}
