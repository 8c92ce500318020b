pub mod chat;
pub mod error;
pub mod knowledge;
pub mod requests;

use crate::middleware::correlation::correlation_middleware;
use crate::{AppState, openapi};
use axum::Router;
use axum::middleware;

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .merge(requests::router(state.clone()))
        .merge(knowledge::router(state.clone()))
        .merge(chat::router(state))
        .merge(openapi::router())
        .route_layer(middleware::from_fn(correlation_middleware));

    Router::new().nest("/api", api)
}
