//! The prompt form: validate, build the prompt, call the model once, display.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::Settings;
use crate::github::{GitHubClient, GitHubProfile};
use crate::llm::{GeminiClient, TextGenerator};
use crate::prompt::{PromptRequest, PromptTemplate};
use crate::Result;

pub const EMPTY_IDENTIFIER_MESSAGE: &str = "Please enter a GitHub username";
pub const UNKNOWN_USER_MESSAGE: &str = "The username provided does not exist.";
pub const GENERIC_FAILURE_MESSAGE: &str =
    "Something went wrong while generating the roast. Please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Idle,
    /// A submission is waiting on the model.
    Waiting,
}

/// What the page shows after a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    Response {
        text: String,
        profile: Option<GitHubProfile>,
    },
    /// Rejected locally; nothing was sent.
    Invalid { message: String },
    Failed { message: String },
}

impl FormOutcome {
    pub fn text(&self) -> &str {
        match self {
            FormOutcome::Response { text, .. } => text,
            FormOutcome::Invalid { message } | FormOutcome::Failed { message } => message,
        }
    }

    pub fn is_response(&self) -> bool {
        matches!(self, FormOutcome::Response { .. })
    }

    fn failed(message: &str) -> Self {
        FormOutcome::Failed {
            message: message.to_string(),
        }
    }
}

/// Single-request-at-a-time form. Each submission is independent; the only
/// shared state is the gate that serializes calls to the model.
#[derive(Debug)]
pub struct PromptForm {
    generator: Arc<dyn TextGenerator>,
    template: PromptTemplate,
    github: Option<GitHubClient>,
    gate: Mutex<()>,
}

impl PromptForm {
    pub fn new(generator: Arc<dyn TextGenerator>, template: PromptTemplate) -> Self {
        Self {
            generator,
            template,
            github: None,
            gate: Mutex::new(()),
        }
    }

    /// Enrich prompts with the user's public GitHub profile.
    pub fn with_github(mut self, client: GitHubClient) -> Self {
        self.github = Some(client);
        self
    }

    /// Build the form described by `settings` with the Gemini backend.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let generator = Arc::new(GeminiClient::from_settings(settings)?);
        let form = Self::new(generator, settings.template.clone());
        if settings.github.enabled {
            Ok(form.with_github(GitHubClient::from_settings(&settings.github)?))
        } else {
            Ok(form)
        }
    }

    pub fn template(&self) -> &PromptTemplate {
        &self.template
    }

    pub fn state(&self) -> FormState {
        match self.gate.try_lock() {
            Ok(_) => FormState::Idle,
            Err(_) => FormState::Waiting,
        }
    }

    /// Validate and interpolate without touching the network. `{date}` is
    /// today's local date.
    pub fn build_prompt(&self, identifier: &str, profile: &str) -> Result<PromptRequest> {
        let today = chrono::Local::now().format("%Y-%m-%d").to_string();
        PromptRequest::build(&self.template, identifier, profile, &today)
    }

    /// Run one submission. Never returns an error: failures become a
    /// displayable outcome.
    pub async fn submit(&self, identifier: &str) -> FormOutcome {
        let request = match self.build_prompt(identifier, "") {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!(error = %e, "rejected submission");
                return FormOutcome::Invalid {
                    message: EMPTY_IDENTIFIER_MESSAGE.to_string(),
                };
            }
        };

        let span = tracing::info_span!(
            "submission",
            request_id = %Uuid::new_v4(),
            username = %request.user_identifier
        );
        async move {
            let _busy = self.gate.lock().await;
            tracing::info!(model = %self.generator.model(), "generating roast");

            let (request, profile) = match &self.github {
                None => (request, None),
                Some(github) => match github.lookup(&request.user_identifier).await {
                    Ok(Some(snapshot)) => {
                        let request = match self
                            .build_prompt(&request.user_identifier, &snapshot.summary())
                        {
                            Ok(r) => r,
                            Err(e) => {
                                tracing::warn!(error = %e, "failed to build enriched prompt");
                                return FormOutcome::failed(GENERIC_FAILURE_MESSAGE);
                            }
                        };
                        (request, Some(snapshot.profile))
                    }
                    Ok(None) => {
                        tracing::info!("GitHub user not found");
                        return FormOutcome::failed(UNKNOWN_USER_MESSAGE);
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, class = ?e.class(), "GitHub lookup failed");
                        return FormOutcome::failed(GENERIC_FAILURE_MESSAGE);
                    }
                },
            };

            match self.generator.generate(&request.text).await {
                Ok(text) => {
                    tracing::info!(output_len = text.len(), "roast generated");
                    FormOutcome::Response { text, profile }
                }
                Err(e) => {
                    tracing::warn!(error = %e, class = ?e.class(), "model call failed");
                    FormOutcome::failed(GENERIC_FAILURE_MESSAGE)
                }
            }
        }
        .instrument(span)
        .await
    }
}
