use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::app::AppState;

pub mod accounts;
pub mod classify;
pub mod events;
pub mod messages;
pub mod notify;
pub mod sync;

/// Assemble the HTTP surface. Every response is JSON; CORS is permissive so
/// the browser UI can call the stage endpoints directly (OPTIONS preflights
/// are answered by the layer).
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route("/sync", post(sync::sync_account))
        .route("/classify", post(classify::classify_message))
        .route("/notify", post(notify::notify_message))
        .route("/accounts", post(accounts::add_account))
        .route("/accounts", get(accounts::list_accounts))
        .route("/messages/:id", get(messages::get_messages))
        .route("/messages/:id/read", patch(messages::set_read_flag))
        .route("/events", get(events::change_events))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
