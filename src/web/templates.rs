//! Askama templates for the form page

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::github::GitHubProfile;

/// Helper function to convert Askama templates to Axum responses
fn render_template<T: Template>(template: T) -> Response {
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Template rendering error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Template error: {}", e),
            )
                .into_response()
        }
    }
}

/// Profile card shown above the roast when enrichment is enabled.
#[derive(Debug, Clone)]
pub struct ProfileCard {
    pub username: String,
    pub name: String,
    pub bio: String,
    pub location: String,
    pub public_repos: u64,
    pub member_since: String,
    pub avatar_url: String,
}

impl From<&GitHubProfile> for ProfileCard {
    fn from(p: &GitHubProfile) -> Self {
        Self {
            username: p.username.clone(),
            name: p.name.clone(),
            bio: p.bio.clone(),
            location: p.location.clone(),
            public_repos: p.public_repos,
            member_since: p.member_since().to_string(),
            avatar_url: p.avatar_url.clone(),
        }
    }
}

/// The single form page
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub username: String,
    /// Sanitized HTML from `render_markdown`; emitted unescaped.
    pub response: Option<String>,
    pub error: Option<String>,
    pub profile: Option<ProfileCard>,
}

impl IndexTemplate {
    pub fn empty() -> Self {
        Self {
            username: String::new(),
            response: None,
            error: None,
            profile: None,
        }
    }
}

impl IntoResponse for IndexTemplate {
    fn into_response(self) -> Response {
        render_template(self)
    }
}
