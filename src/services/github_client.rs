//! GitHub API client.
//!
//! Provides an HTTP client for the GitHub REST API covering the issue
//! operations the approval workflow needs, with authentication and
//! pagination.

use crate::error::AppError;
use crate::models::Comment;
use chrono::{DateTime, Utc};
use reqwest::{header, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Default GitHub REST API base URL.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Maximum page size accepted by the GitHub API.
const PER_PAGE: usize = 100;

/// GitHub API client configuration.
#[derive(Debug, Clone)]
pub struct GitHubClientConfig {
    /// Base URL of the REST API (e.g., `https://api.github.com`).
    pub base_url: String,

    /// Token for authentication.
    pub token: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GitHubClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            token: String::new(),
            timeout_secs: 30,
        }
    }
}

/// GitHub API client.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    config: GitHubClientConfig,
}

/// GitHub user from API.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubUser {
    pub id: i64,
    pub login: String,
}

/// GitHub issue from API.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubIssue {
    pub id: i64,
    pub number: u64,
    pub title: String,
    pub state: String,
    pub html_url: String,
    #[serde(default)]
    pub assignees: Vec<GitHubUser>,
}

/// GitHub issue comment from API.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubIssueComment {
    pub id: i64,
    pub body: Option<String>,
    /// `None` for comments by deleted accounts.
    pub user: Option<GitHubUser>,
    pub created_at: DateTime<Utc>,
}

impl From<GitHubIssueComment> for Comment {
    fn from(comment: GitHubIssueComment) -> Self {
        Comment {
            author: comment.user.map(|u| u.login).unwrap_or_default(),
            body: comment.body.unwrap_or_default(),
        }
    }
}

/// Timestamp of the most recent comment in a thread.
pub fn latest_comment_at(comments: &[GitHubIssueComment]) -> Option<DateTime<Utc>> {
    comments.iter().map(|c| c.created_at).max()
}

/// Request body for creating an issue.
#[derive(Debug, Clone, Serialize)]
pub struct NewIssue {
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub assignees: Vec<String>,
}

impl GitHubClient {
    /// Create a new GitHub client.
    pub fn new(config: GitHubClientConfig) -> Result<Self, AppError> {
        let mut headers = header::HeaderMap::new();

        let token_value = header::HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|_| AppError::authentication("Invalid token format"))?;
        headers.insert(header::AUTHORIZATION, token_value);
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            header::HeaderValue::from_static("2022-11-28"),
        );

        // GitHub rejects requests without a user agent
        let client = Client::builder()
            .default_headers(headers)
            .user_agent(concat!("manual-approval/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Get the full URL for an API path.
    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Path of a repository's issues collection.
    fn issues_path(owner: &str, repo: &str) -> String {
        format!(
            "/repos/{}/{}/issues",
            urlencoding::encode(owner),
            urlencoding::encode(repo)
        )
    }

    /// Handle API response errors.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
        endpoint: &str,
    ) -> Result<T, AppError> {
        let status = response.status();

        if status.is_success() {
            response
                .json::<T>()
                .await
                .map_err(|e| AppError::internal(format!("Failed to parse response: {}", e)))
        } else if status == StatusCode::UNAUTHORIZED {
            Err(AppError::authentication(
                "GitHub token is invalid or lacks access to this repository",
            ))
        } else {
            let status_code = status.as_u16();
            let body = response.text().await.unwrap_or_default();
            // GitHub returns errors as {"message": "...", "documentation_url": "..."}
            let body_message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("message")?.as_str().map(String::from));

            let message = match (status, &body_message) {
                (StatusCode::NOT_FOUND, _) => "Resource not found".to_string(),
                (StatusCode::TOO_MANY_REQUESTS, _) => "Rate limit exceeded".to_string(),
                (_, Some(msg)) => msg.clone(),
                _ => format!("Request failed ({}): {}", status_code, body),
            };

            Err(AppError::github_api_full(message, status_code, endpoint))
        }
    }

    /// Fetch all pages of a list endpoint.
    ///
    /// Pages are requested until one comes back shorter than the page size.
    pub async fn get_all_pages<T: DeserializeOwned>(
        &self,
        endpoint: &str,
    ) -> Result<Vec<T>, AppError> {
        let url = self.api_url(endpoint);
        let mut all_data = Vec::new();
        let mut page = 1u32;

        loop {
            let response = self
                .client
                .get(&url)
                .query(&[("page", page.to_string()), ("per_page", PER_PAGE.to_string())])
                .send()
                .await?;
            let data = self.handle_response::<Vec<T>>(response, endpoint).await?;
            let fetched = data.len();
            all_data.extend(data);

            if fetched < PER_PAGE {
                break;
            }
            page += 1;
        }

        Ok(all_data)
    }

    /// Open a new issue.
    pub async fn create_issue(
        &self,
        owner: &str,
        repo: &str,
        issue: &NewIssue,
    ) -> Result<GitHubIssue, AppError> {
        let endpoint = Self::issues_path(owner, repo);
        let url = self.api_url(&endpoint);
        let response = self.client.post(&url).json(issue).send().await?;
        self.handle_response(response, &endpoint).await
    }

    /// List all comments on an issue, oldest first.
    pub async fn list_issue_comments(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
    ) -> Result<Vec<GitHubIssueComment>, AppError> {
        let endpoint = format!("{}/{}/comments", Self::issues_path(owner, repo), issue_number);
        self.get_all_pages(&endpoint).await
    }

    /// Add a comment to an issue.
    pub async fn add_comment(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        body: &str,
    ) -> Result<GitHubIssueComment, AppError> {
        let endpoint = format!("{}/{}/comments", Self::issues_path(owner, repo), issue_number);
        let url = self.api_url(&endpoint);

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "body": body }))
            .send()
            .await?;

        self.handle_response(response, &endpoint).await
    }

    /// Close an issue.
    pub async fn close_issue(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
    ) -> Result<GitHubIssue, AppError> {
        let endpoint = format!("{}/{}", Self::issues_path(owner, repo), issue_number);
        let url = self.api_url(&endpoint);

        let response = self
            .client
            .patch(&url)
            .json(&serde_json::json!({ "state": "closed" }))
            .send()
            .await?;

        self.handle_response(response, &endpoint).await
    }
}
