//! GitHub profile lookup used to enrich the prompt.
//!
//! Only public, unauthenticated-friendly endpoints are used. A token, when
//! configured, just raises the rate limit.

use serde::Deserialize;
use url::Url;

use crate::config::{ApiKey, GitHubSettings};
use crate::error_class::ErrorClass;
use crate::{Error, ErrorContext, Result};

const NOT_PROVIDED: &str = "Not provided";

/// Public profile fields, with placeholders for anything the user left blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubProfile {
    pub username: String,
    pub name: String,
    pub bio: String,
    pub followers: u64,
    pub following: u64,
    pub public_repos: u64,
    pub location: String,
    pub company: String,
    pub blog: String,
    pub created_at: String,
    pub avatar_url: String,
}

impl GitHubProfile {
    /// `YYYY-MM-DD` part of the account creation timestamp.
    pub fn member_since(&self) -> &str {
        self.created_at.get(..10).unwrap_or(&self.created_at)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubRepo {
    pub name: String,
    pub description: String,
    pub language: String,
    pub stars: u64,
    pub forks: u64,
    pub issues: u64,
    pub created_at: String,
    pub updated_at: String,
    pub topics: Vec<String>,
    pub is_fork: bool,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    login: String,
    name: Option<String>,
    bio: Option<String>,
    #[serde(default)]
    followers: u64,
    #[serde(default)]
    following: u64,
    #[serde(default)]
    public_repos: u64,
    location: Option<String>,
    company: Option<String>,
    blog: Option<String>,
    #[serde(default)]
    created_at: String,
    #[serde(default)]
    avatar_url: String,
}

#[derive(Debug, Deserialize)]
struct RawRepo {
    name: String,
    description: Option<String>,
    language: Option<String>,
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    forks_count: u64,
    #[serde(default)]
    open_issues_count: u64,
    #[serde(default)]
    created_at: String,
    #[serde(default)]
    updated_at: String,
    #[serde(default)]
    topics: Vec<String>,
    #[serde(default)]
    fork: bool,
}

fn or_placeholder(value: Option<String>, placeholder: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| placeholder.to_string())
}

impl From<RawUser> for GitHubProfile {
    fn from(raw: RawUser) -> Self {
        Self {
            username: raw.login,
            name: or_placeholder(raw.name, NOT_PROVIDED),
            bio: or_placeholder(raw.bio, "No bio provided"),
            followers: raw.followers,
            following: raw.following,
            public_repos: raw.public_repos,
            location: or_placeholder(raw.location, NOT_PROVIDED),
            company: or_placeholder(raw.company, NOT_PROVIDED),
            blog: or_placeholder(raw.blog, NOT_PROVIDED),
            created_at: raw.created_at,
            avatar_url: raw.avatar_url,
        }
    }
}

impl From<RawRepo> for GitHubRepo {
    fn from(raw: RawRepo) -> Self {
        Self {
            name: raw.name,
            description: or_placeholder(raw.description, "No description provided"),
            language: or_placeholder(raw.language, "Not specified"),
            stars: raw.stargazers_count,
            forks: raw.forks_count,
            issues: raw.open_issues_count,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
            topics: raw.topics,
            is_fork: raw.fork,
        }
    }
}

/// Profile plus repositories, fetched together for one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSnapshot {
    pub profile: GitHubProfile,
    pub repos: Vec<GitHubRepo>,
}

impl ProfileSnapshot {
    /// Plain-text rendering for the `{profile}` template placeholder.
    pub fn summary(&self) -> String {
        let p = &self.profile;
        let mut lines = vec![
            "User profile:".to_string(),
            format!("- Username: {}", p.username),
            format!("- Name: {}", p.name),
            format!("- Bio: {}", p.bio),
            format!("- Followers: {}", p.followers),
            format!("- Following: {}", p.following),
            format!("- Public repos: {}", p.public_repos),
            format!("- Location: {}", p.location),
            format!("- Company: {}", p.company),
            format!("- Blog: {}", p.blog),
            format!("- Member since: {}", p.member_since()),
            String::new(),
        ];

        if self.repos.is_empty() {
            lines.push("Repositories: none".to_string());
        } else {
            lines.push("Repositories:".to_string());
            for r in &self.repos {
                lines.push(format!(
                    "- {} ({}, {} stars, {} forks{}): {}",
                    r.name,
                    r.language,
                    r.stars,
                    r.forks,
                    if r.is_fork { ", fork" } else { "" },
                    r.description
                ));
                if !r.topics.is_empty() {
                    lines.push(format!("  topics: {}", r.topics.join(", ")));
                }
                lines.push(format!("  created {}, updated {}", r.created_at, r.updated_at));
            }
        }

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

#[derive(Debug, Clone)]
pub struct GitHubClient {
    http_client: reqwest::Client,
    api_base: Url,
    token: Option<ApiKey>,
}

impl GitHubClient {
    pub fn new(api_base: &str, token: Option<ApiKey>) -> Result<Self> {
        let api_base = Url::parse(api_base).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid GitHub API base: {}", e),
                ErrorContext::new()
                    .with_field_path("github.api_base")
                    .with_details(api_base.to_string()),
            )
        })?;
        if api_base.cannot_be_a_base() {
            return Err(Error::configuration_with_context(
                "GitHub API base must be a hierarchical URL",
                ErrorContext::new().with_field_path("github.api_base"),
            ));
        }
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("github-roaster/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::configuration(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            http_client,
            api_base,
            token,
        })
    }

    pub fn from_settings(settings: &GitHubSettings) -> Result<Self> {
        Self::new(&settings.api_base, settings.token.clone())
    }

    /// `{api_base}/users/{username}[/repos]` with the username percent-encoded.
    fn user_url(&self, username: &str, repos: bool) -> Url {
        let mut url = self.api_base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("users").push(username);
            if repos {
                segments.push("repos");
            }
        }
        url
    }

    async fn get(&self, url: Url) -> Result<reqwest::Response> {
        let mut request = self
            .http_client
            .get(url)
            .header("accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose());
        }
        Ok(request.send().await?)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let class = ErrorClass::from_status(status.as_u16(), &body);
        Err(Error::remote(
            status.as_u16(),
            class,
            body.chars().take(200).collect::<String>(),
        ))
    }

    /// `Ok(None)` when the user does not exist.
    pub async fn fetch_profile(&self, username: &str) -> Result<Option<GitHubProfile>> {
        let response = self.get(self.user_url(username, false)).await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let raw: RawUser = Self::check(response).await?.json().await?;
        Ok(Some(raw.into()))
    }

    pub async fn fetch_repos(&self, username: &str) -> Result<Vec<GitHubRepo>> {
        let mut url = self.user_url(username, true);
        url.query_pairs_mut()
            .append_pair("per_page", "100")
            .append_pair("sort", "updated");
        let response = self.get(url).await?;
        let raw: Vec<RawRepo> = Self::check(response).await?.json().await?;
        Ok(raw.into_iter().map(GitHubRepo::from).collect())
    }

    /// Fetch profile and repositories concurrently. `Ok(None)` when the user
    /// does not exist.
    pub async fn lookup(&self, username: &str) -> Result<Option<ProfileSnapshot>> {
        let (profile, repos) =
            tokio::join!(self.fetch_profile(username), self.fetch_repos(username));
        let Some(profile) = profile? else {
            return Ok(None);
        };
        let repos = repos?;
        tracing::debug!(
            username = %profile.username,
            repos = repos.len(),
            "fetched GitHub profile"
        );
        Ok(Some(ProfileSnapshot { profile, repos }))
    }
}
