pub mod middleware;
pub mod openapi;
pub mod routes;

use axum::Router;
use fl_core::{Frontloop, FrontloopError};
use fl_db::schema;
use fl_db::store::DbStore;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub db_path: String,
}

/// One connection per request; SQLite serializes writers.
pub fn build_frontloop(state: &AppState) -> Result<Frontloop<DbStore>, FrontloopError> {
    let conn = schema::open_and_migrate(&state.db_path).map_err(|err| FrontloopError::Internal {
        message: err.to_string(),
    })?;
    Ok(Frontloop::new(DbStore::new(conn)))
}

pub fn app(state: AppState) -> Router {
    routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, db_path = %state.db_path, "listening");
    axum::serve(listener, app(state)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::correlation::HEADER_NAME;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use serde_json::{Value, json};
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn test_app() -> (TempDir, Router) {
        let dir = tempfile::tempdir().expect("tempdir");
        let db_path = dir.path().join("frontloop.db").display().to_string();
        (dir, app(AppState { db_path }))
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");
        let response = app.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, value)
    }

    #[tokio::test]
    async fn help_request_lifecycle_over_http() {
        let (_dir, app) = test_app();
        let (status, created) = call(
            &app,
            "POST",
            "/api/help-request",
            Some(json!({"customer_name": "Dana", "question": "Do you do perms?"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["status"], "pending");
        let id = created["request_id"].as_str().expect("id").to_string();

        let (_, pending) = call(&app, "GET", "/api/requests?status=pending", None).await;
        assert_eq!(pending.as_array().expect("list").len(), 1);

        let (status, resolved) = call(
            &app,
            "POST",
            "/api/respond",
            Some(json!({"request_id": id, "answer": "Try option B"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(resolved["status"], "resolved");
        assert_eq!(resolved["answer"], "Try option B");
        assert!(resolved["resolved_at"].is_string());

        let (status, conflict) = call(
            &app,
            "POST",
            "/api/respond",
            Some(json!({"request_id": id, "answer": "Option C"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(conflict["code"], "conflict");
        assert!(conflict["correlation_id"].as_str().expect("corr").starts_with("corr_"));

        let (_, by_id) = call(&app, "GET", &format!("/api/requests?id={id}"), None).await;
        assert_eq!(by_id[0]["answer"], "Try option B");
    }

    #[tokio::test]
    async fn respond_rejects_blank_answers_and_unknown_ids() {
        let (_dir, app) = test_app();
        let (status, body) = call(
            &app,
            "POST",
            "/api/respond",
            Some(json!({"request_id": "help_missing", "answer": "  "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_input");

        let (status, body) = call(
            &app,
            "POST",
            "/api/respond",
            Some(json!({"request_id": "help_missing", "answer": "hello"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "not_found");
    }

    #[tokio::test]
    async fn chat_answers_known_questions_and_escalates_others() {
        let (_dir, app) = test_app();
        let (_, known) = call(
            &app,
            "POST",
            "/api/chat",
            Some(json!({"message": "What are your working hours?", "customer_name": "Dana"})),
        )
        .await;
        assert_eq!(known["response"], "We're open from 9 AM to 7 PM every day.");
        assert!(known.get("request_id").is_none());

        let (_, escalated) = call(
            &app,
            "POST",
            "/api/chat",
            Some(json!({"message": "Can I bring my cat?", "customer_name": "Dana"})),
        )
        .await;
        assert_eq!(
            escalated["response"],
            "Let me check with my supervisor and get back to you."
        );
        assert!(escalated["request_id"].is_string());
    }

    #[tokio::test]
    async fn knowledge_base_accepts_new_entries() {
        let (_dir, app) = test_app();
        let (status, entry) = call(
            &app,
            "POST",
            "/api/knowledge-base",
            Some(json!({"question": "Is parking free?", "answer": "Yes."})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(entry["question"], "is parking free");

        let (_, entries) = call(&app, "GET", "/api/knowledge-base", None).await;
        assert_eq!(entries.as_array().expect("list").len(), 4);
    }

    #[tokio::test]
    async fn correlation_id_is_echoed() {
        let (_dir, app) = test_app();
        let request = Request::builder()
            .uri("/api/requests")
            .header(HEADER_NAME, "corr_test")
            .body(Body::empty())
            .expect("request");
        let response = app.oneshot(request).await.expect("response");
        assert_eq!(
            response.headers().get(HEADER_NAME).and_then(|v| v.to_str().ok()),
            Some("corr_test")
        );
    }
}
