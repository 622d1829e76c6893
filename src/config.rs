//! Startup configuration.
//!
//! Settings are resolved once, in layers: built-in defaults, then an optional
//! YAML secrets file, then environment variables. The API key is mandatory;
//! a missing key is a configuration error and the form is never built.

use serde::Deserialize;
use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::prompt::PromptTemplate;
use crate::{Error, ErrorContext, Result};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_BIND: &str = "127.0.0.1:8501";
pub const DEFAULT_GITHUB_API: &str = "https://api.github.com";
pub const DEFAULT_SECRETS_FILE: &str = "secrets.yaml";

/// A secret that never shows up in `Debug` output or logs.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(****)")
    }
}

/// On-disk shape of the secrets file. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileSettings {
    pub gemini_api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub template: Option<String>,
    pub temperature: Option<f64>,
    pub max_output_tokens: Option<u32>,
    pub timeout_secs: Option<u64>,
    pub bind: Option<String>,
    pub github: FileGitHubSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileGitHubSettings {
    pub enabled: Option<bool>,
    pub api_base: Option<String>,
    pub token: Option<String>,
}

impl FileSettings {
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration_with_context(
                format!("cannot read config file: {}", e),
                ErrorContext::new()
                    .with_details(path.display().to_string())
                    .with_source("settings"),
            )
        })?;
        Self::from_yaml(&text)
    }
}

#[derive(Debug, Clone)]
pub struct GitHubSettings {
    /// Look up the profile before prompting. Off by default so each
    /// submission makes a single outbound call.
    pub enabled: bool,
    pub api_base: String,
    pub token: Option<ApiKey>,
}

/// Fully resolved process-wide configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: ApiKey,
    pub model: String,
    pub base_url: String,
    pub template: PromptTemplate,
    pub temperature: Option<f64>,
    pub max_output_tokens: Option<u32>,
    /// `None` keeps the HTTP client's default.
    pub timeout: Option<Duration>,
    pub bind: SocketAddr,
    pub github: GitHubSettings,
}

impl Settings {
    /// Load from the process environment and the secrets file.
    ///
    /// File lookup order: `config_path`, then `ROASTER_CONFIG`, then
    /// `./secrets.yaml` when it exists. An explicitly named file that cannot
    /// be read is an error; a missing default file is not.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let explicit = config_path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os("ROASTER_CONFIG").map(PathBuf::from));

        let file = match explicit {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading config file");
                FileSettings::from_path(&path)?
            }
            None if Path::new(DEFAULT_SECRETS_FILE).is_file() => {
                tracing::debug!(path = DEFAULT_SECRETS_FILE, "loading default secrets file");
                FileSettings::from_path(Path::new(DEFAULT_SECRETS_FILE))?
            }
            None => FileSettings::default(),
        };

        Self::resolve(file, |name| std::env::var(name).ok())
    }

    /// Merge file settings with an environment lookup. Environment wins.
    pub fn resolve<F>(file: FileSettings, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset in both layers.
        let env = |name: &str| env(name).filter(|v| !v.trim().is_empty());
        let non_blank = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

        let api_key = env("GEMINI_API_KEY")
            .or_else(|| non_blank(file.gemini_api_key))
            .map(|k| ApiKey::new(k.trim()))
            .ok_or_else(|| {
                Error::configuration_with_context(
                    "Gemini API key is missing",
                    ErrorContext::new()
                        .with_field_path("gemini_api_key")
                        .with_details(format!(
                            "set GEMINI_API_KEY or gemini_api_key in {}",
                            DEFAULT_SECRETS_FILE
                        ))
                        .with_source("settings"),
                )
            })?;

        let model = env("GEMINI_MODEL")
            .or_else(|| non_blank(file.model))
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let base_url = env("GEMINI_BASE_URL")
            .or_else(|| non_blank(file.base_url))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let template = match non_blank(file.template) {
            Some(source) => PromptTemplate::parse(source)?,
            None => PromptTemplate::default(),
        };

        let timeout_secs = match env("ROASTER_TIMEOUT_SECS") {
            Some(raw) => Some(raw.trim().parse::<u64>().map_err(|_| {
                Error::configuration_with_context(
                    "timeout must be a whole number of seconds",
                    ErrorContext::new()
                        .with_field_path("ROASTER_TIMEOUT_SECS")
                        .with_details(raw.clone()),
                )
            })?),
            None => file.timeout_secs,
        };

        let bind_raw = env("ROASTER_BIND")
            .or_else(|| non_blank(file.bind))
            .unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_raw.trim().parse::<SocketAddr>().map_err(|e| {
            Error::configuration_with_context(
                format!("invalid bind address: {}", e),
                ErrorContext::new()
                    .with_field_path("bind")
                    .with_details(bind_raw.clone()),
            )
        })?;

        let github_enabled = match env("ROASTER_GITHUB_PROFILE") {
            Some(raw) => parse_flag(&raw).ok_or_else(|| {
                Error::configuration_with_context(
                    "expected a boolean flag",
                    ErrorContext::new()
                        .with_field_path("ROASTER_GITHUB_PROFILE")
                        .with_details(raw.clone()),
                )
            })?,
            None => file.github.enabled.unwrap_or(false),
        };

        let github = GitHubSettings {
            enabled: github_enabled,
            api_base: non_blank(file.github.api_base)
                .unwrap_or_else(|| DEFAULT_GITHUB_API.to_string()),
            token: env("GITHUB_TOKEN")
                .or_else(|| non_blank(file.github.token))
                .map(ApiKey::new),
        };

        Ok(Self {
            api_key,
            model,
            base_url,
            template,
            temperature: file.temperature,
            max_output_tokens: file.max_output_tokens,
            timeout: timeout_secs.filter(|s| *s > 0).map(Duration::from_secs),
            bind,
            github,
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn missing_key_is_a_configuration_error() {
        let err = Settings::resolve(FileSettings::default(), env_of(&[])).unwrap_err();
        assert!(err.is_configuration());
        assert_eq!(
            err.context().and_then(|c| c.field_path.as_deref()),
            Some("gemini_api_key")
        );
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let file = FileSettings {
            gemini_api_key: Some("   ".into()),
            ..Default::default()
        };
        let err = Settings::resolve(file, env_of(&[("GEMINI_API_KEY", "")])).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn defaults_apply_when_only_key_is_set() {
        let settings =
            Settings::resolve(FileSettings::default(), env_of(&[("GEMINI_API_KEY", "k")]))
                .unwrap();
        assert_eq!(settings.api_key.expose(), "k");
        assert_eq!(settings.model, DEFAULT_MODEL);
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.bind, DEFAULT_BIND.parse::<SocketAddr>().unwrap());
        assert_eq!(settings.template, PromptTemplate::default());
        assert!(settings.timeout.is_none());
        assert!(!settings.github.enabled);
        assert_eq!(settings.github.api_base, DEFAULT_GITHUB_API);
    }

    #[test]
    fn environment_overrides_file() {
        let file = FileSettings::from_yaml(
            "gemini_api_key: from-file\nmodel: gemini-1.5-pro\nbind: 0.0.0.0:9000\ngithub:\n  enabled: true\n",
        )
        .unwrap();
        let settings = Settings::resolve(
            file,
            env_of(&[
                ("GEMINI_API_KEY", "from-env"),
                ("ROASTER_GITHUB_PROFILE", "off"),
            ]),
        )
        .unwrap();
        assert_eq!(settings.api_key.expose(), "from-env");
        assert_eq!(settings.model, "gemini-1.5-pro");
        assert_eq!(settings.bind.port(), 9000);
        assert!(!settings.github.enabled);
    }

    #[test]
    fn file_template_is_validated() {
        let file = FileSettings {
            gemini_api_key: Some("k".into()),
            template: Some("Roast {user}".into()),
            ..Default::default()
        };
        let err = Settings::resolve(file, env_of(&[])).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        assert!(FileSettings::from_yaml("gemini_key: typo\n").is_err());
    }

    #[test]
    fn bad_bind_and_timeout_are_rejected() {
        let key = ("GEMINI_API_KEY", "k");
        assert!(
            Settings::resolve(FileSettings::default(), env_of(&[key, ("ROASTER_BIND", "nope")]))
                .is_err()
        );
        assert!(Settings::resolve(
            FileSettings::default(),
            env_of(&[key, ("ROASTER_TIMEOUT_SECS", "soon")])
        )
        .is_err());
        let settings = Settings::resolve(
            FileSettings::default(),
            env_of(&[key, ("ROASTER_TIMEOUT_SECS", "45")]),
        )
        .unwrap();
        assert_eq!(settings.timeout, Some(Duration::from_secs(45)));
    }

    #[test]
    fn api_key_is_redacted_in_debug() {
        let settings =
            Settings::resolve(FileSettings::default(), env_of(&[("GEMINI_API_KEY", "s3cret")]))
                .unwrap();
        assert!(!format!("{:?}", settings).contains("s3cret"));
    }
}
