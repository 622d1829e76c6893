//! HTTP surface for the form.
//!
//! - `GET /` renders the empty form
//! - `POST /roast` runs one submission and renders the result
//! - `GET /health` reports liveness

pub mod handlers;
pub mod markdown;
pub mod templates;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::form::PromptForm;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub form: Arc<PromptForm>,
}

impl AppState {
    pub fn new(form: PromptForm) -> Self {
        Self {
            form: Arc::new(form),
        }
    }
}

/// Create the form router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/roast", post(handlers::roast))
        .route("/health", get(handlers::health_check))
        .with_state(state)
}
