//! Prompt template and per-submission prompt construction.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::{Error, ErrorContext, Result};

/// Placeholder for the submitted username. Every template must contain it.
pub const USERNAME_PLACEHOLDER: &str = "username";
/// Placeholder for the optional GitHub profile summary.
pub const PROFILE_PLACEHOLDER: &str = "profile";
/// Placeholder for the submission date, `YYYY-MM-DD` in local time.
pub const DATE_PLACEHOLDER: &str = "date";

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder regex"));

/// Template used when the configuration does not supply one.
pub const DEFAULT_TEMPLATE: &str = "\
Current date: {date}
You are a tech comedian who roasts software developers based on their GitHub presence.
Write a funny but insightful roast of the GitHub user {username}.

{profile}

Guidelines:
1. Open with a short introduction, follow with 3-5 specific roasts, and close with a conclusion.
2. Joke about their languages, project choices and coding habits.
3. Use humour that developers will appreciate, including a few backhanded compliments.
4. Keep it playful, never cruel or offensive.
5. Use plenty of emojis and Markdown formatting.
";

/// A fixed prompt template with `{name}` placeholders.
///
/// Only `{username}`, `{profile}` and `{date}` are recognised; anything else is
/// rejected when the template is parsed so typos surface at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    source: String,
}

impl PromptTemplate {
    pub fn parse(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let mut has_username = false;
        for caps in PLACEHOLDER.captures_iter(&source) {
            match &caps[1] {
                USERNAME_PLACEHOLDER => has_username = true,
                PROFILE_PLACEHOLDER | DATE_PLACEHOLDER => {}
                other => {
                    return Err(Error::configuration_with_context(
                        format!("unknown template placeholder {{{}}}", other),
                        ErrorContext::new()
                            .with_field_path("template")
                            .with_details("supported placeholders: {username}, {profile}, {date}"),
                    ));
                }
            }
        }
        if !has_username {
            return Err(Error::configuration_with_context(
                "template must contain the {username} placeholder",
                ErrorContext::new().with_field_path("template"),
            ));
        }
        Ok(Self { source })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Substitute placeholders in a single pass, so placeholder-like text
    /// inside `username` or `profile` is inserted verbatim.
    pub fn render(&self, username: &str, profile: &str, date: &str) -> String {
        PLACEHOLDER
            .replace_all(&self.source, |caps: &Captures<'_>| match &caps[1] {
                USERNAME_PLACEHOLDER => username.to_string(),
                PROFILE_PLACEHOLDER => profile.to_string(),
                DATE_PLACEHOLDER => date.to_string(),
                _ => caps[0].to_string(),
            })
            .into_owned()
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            source: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

/// Validate a raw form value. Surrounding whitespace is dropped; anything
/// left must be non-empty.
pub fn parse_identifier(raw: &str) -> Result<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::validation_with_context(
            "identifier is empty",
            ErrorContext::new().with_field_path("username"),
        ));
    }
    Ok(trimmed)
}

/// A prompt built for exactly one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    pub user_identifier: String,
    pub text: String,
}

impl PromptRequest {
    pub fn build(
        template: &PromptTemplate,
        raw_identifier: &str,
        profile: &str,
        date: &str,
    ) -> Result<Self> {
        let identifier = parse_identifier(raw_identifier)?;
        Ok(Self {
            user_identifier: identifier.to_string(),
            text: template.render(identifier, profile, date),
        })
    }
}
