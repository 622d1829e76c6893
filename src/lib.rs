//! # github-roaster
//!
//! A single-page web form that turns a GitHub username into an
//! AI-generated roast.
//!
//! ## Overview
//!
//! A submission goes through three steps:
//!
//! 1. the username is validated locally (empty input never reaches the network),
//! 2. it is interpolated into a fixed [`prompt::PromptTemplate`],
//! 3. the prompt is sent to Google Gemini in one request and the returned
//!    text is displayed verbatim.
//!
//! Upstream failures of any kind are shown as a generic message; nothing is
//! retried. Optionally the user's public GitHub profile is fetched first and
//! fed into the prompt.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use github_roaster::{config::Settings, form::PromptForm};
//!
//! #[tokio::main]
//! async fn main() -> github_roaster::Result<()> {
//!     let settings = Settings::load(None)?;
//!     let form = PromptForm::from_settings(&settings)?;
//!     let outcome = form.submit("octocat").await;
//!     println!("{}", outcome.text());
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Layered startup settings (defaults, secrets file, environment) |
//! | [`prompt`] | Prompt template parsing and interpolation |
//! | [`llm`] | The [`llm::TextGenerator`] seam and the Gemini client |
//! | [`github`] | Optional GitHub profile lookup |
//! | [`form`] | The submit operation and its state |
//! | [`web`] | axum router and HTML rendering |

pub mod config;
pub mod error_class;
pub mod form;
pub mod github;
pub mod llm;
pub mod prompt;
pub mod web;

pub use config::Settings;
pub use error_class::ErrorClass;
pub use form::{FormOutcome, FormState, PromptForm};
pub use llm::{GeminiClient, TextGenerator};
pub use prompt::{PromptRequest, PromptTemplate};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
