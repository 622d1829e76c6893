//! Mock HTTP server setup for integration tests

#![allow(dead_code)]

use github_roaster::config::ApiKey;
use github_roaster::github::GitHubClient;
use github_roaster::GeminiClient;
use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::json;

pub const TEST_KEY: &str = "test-key";
pub const GENERATE_PATH: &str = "/v1beta/models/gemini-2.0-flash:generateContent";

/// Test fixture that manages a mock server
pub struct MockServerFixture {
    pub server: ServerGuard,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = server.url();
        Self { server, base_url }
    }

    /// Gemini client pointed at the mock server
    pub fn gemini_client(&self) -> GeminiClient {
        GeminiClient::builder()
            .api_key(ApiKey::new(TEST_KEY))
            .base_url(&self.base_url)
            .build()
            .expect("client builds")
    }

    /// GitHub client pointed at the mock server
    pub fn github_client(&self) -> GitHubClient {
        GitHubClient::new(&self.base_url, None).expect("client builds")
    }

    /// Create a mock for a successful generateContent response
    pub async fn mock_generate_text(&mut self, text: &str) -> Mock {
        let body = json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "promptTokenCount": 10, "candidatesTokenCount": 5, "totalTokenCount": 15 }
        });
        self.server
            .mock("POST", GENERATE_PATH)
            .match_header("x-goog-api-key", TEST_KEY)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await
    }

    /// Create a mock for an error response
    pub async fn mock_generate_error(&mut self, status: usize, error_body: &str) -> Mock {
        self.server
            .mock("POST", GENERATE_PATH)
            .match_query(Matcher::Any)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(error_body)
            .create_async()
            .await
    }

    /// Mock `GET /users/{username}`
    pub async fn mock_github_user(&mut self, username: &str, status: usize, body: &str) -> Mock {
        self.server
            .mock("GET", format!("/users/{}", username).as_str())
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    /// Mock `GET /users/{username}/repos`
    pub async fn mock_github_repos(&mut self, username: &str, status: usize, body: &str) -> Mock {
        self.server
            .mock("GET", format!("/users/{}/repos", username).as_str())
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("per_page".into(), "100".into()),
                Matcher::UrlEncoded("sort".into(), "updated".into()),
            ]))
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }
}

/// A client whose every request fails at the connection level.
pub fn unreachable_gemini_client() -> GeminiClient {
    GeminiClient::builder()
        .api_key(ApiKey::new(TEST_KEY))
        .base_url("http://127.0.0.1:1")
        .build()
        .expect("client builds")
}

pub const OCTOCAT_USER: &str = r#"{
  "login": "octocat",
  "name": "The Octocat",
  "bio": null,
  "followers": 9000,
  "following": 9,
  "public_repos": 8,
  "location": "San Francisco",
  "company": "@github",
  "blog": "https://github.blog",
  "created_at": "2011-01-25T18:44:36Z",
  "avatar_url": "https://avatars.githubusercontent.com/u/583231?v=4"
}"#;

pub const OCTOCAT_REPOS: &str = r#"[
  {
    "name": "Spoon-Knife",
    "description": "This repo is for demonstration purposes only.",
    "language": "HTML",
    "stargazers_count": 12000,
    "forks_count": 140000,
    "open_issues_count": 5000,
    "created_at": "2011-01-27T19:30:43Z",
    "updated_at": "2024-05-01T00:00:00Z",
    "topics": [],
    "fork": false
  },
  {
    "name": "hello-worId",
    "description": null,
    "language": null,
    "stargazers_count": 1,
    "forks_count": 0,
    "open_issues_count": 0,
    "created_at": "2014-06-18T21:26:19Z",
    "updated_at": "2024-01-01T00:00:00Z",
    "topics": ["demo", "test"],
    "fork": true
  }
]"#;
