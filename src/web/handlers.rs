//! Form HTTP handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Form, Json};
use serde::{Deserialize, Serialize};

use super::markdown::render_markdown;
use super::templates::{IndexTemplate, ProfileCard};
use super::AppState;
use crate::form::FormOutcome;

/// GET / - Show the empty form
pub async fn index() -> impl IntoResponse {
    IndexTemplate::empty()
}

#[derive(Debug, Deserialize)]
pub struct RoastForm {
    #[serde(default)]
    pub username: String,
}

/// POST /roast - Run one submission
pub async fn roast(
    State(state): State<AppState>,
    Form(form): Form<RoastForm>,
) -> impl IntoResponse {
    let outcome = state.form.submit(&form.username).await;

    let mut page = IndexTemplate {
        username: form.username,
        ..IndexTemplate::empty()
    };
    let status = match outcome {
        FormOutcome::Response { text, profile } => {
            page.response = Some(render_markdown(&text));
            page.profile = profile.as_ref().map(ProfileCard::from);
            StatusCode::OK
        }
        FormOutcome::Invalid { message } => {
            page.error = Some(message);
            StatusCode::UNPROCESSABLE_ENTITY
        }
        FormOutcome::Failed { message } => {
            page.error = Some(message);
            StatusCode::BAD_GATEWAY
        }
    };
    (status, page)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
