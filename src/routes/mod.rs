pub mod health;
pub mod history;
pub mod requests;

use crate::history::SharedStore;
use crate::proxy::RequestExecutor;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Handles shared by every route; the store is passed in explicitly.
#[derive(Clone)]
pub struct AppState {
    pub executor: Arc<RequestExecutor>,
    pub store: SharedStore,
}

impl AppState {
    pub fn new(executor: RequestExecutor, store: SharedStore) -> Self {
        Self {
            executor: Arc::new(executor),
            store,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/requests/send", post(requests::send_request))
        .route("/api/history", get(history::list_history))
        .route("/api/history/:id", get(history::get_history_item))
        .with_state(state)
}
