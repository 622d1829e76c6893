//! Text generation backends.
//!
//! The form talks to the hosted model through [`TextGenerator`] so tests can
//! substitute a stub for the network.

pub mod gemini;

use async_trait::async_trait;

use crate::Result;

pub use gemini::{GeminiClient, GeminiClientBuilder};

/// One prompt in, one text blob out.
#[async_trait]
pub trait TextGenerator: Send + Sync + std::fmt::Debug {
    /// Model identifier, for logging.
    fn model(&self) -> &str;

    /// Issue exactly one request for `prompt`. Implementations must not retry.
    async fn generate(&self, prompt: &str) -> Result<String>;
}
