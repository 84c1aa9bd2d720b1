//! Application error types.
//!
//! `ApprovalError` covers the two ways a vote comment can be impossible to
//! interpret. `AppError` wraps it together with the failures of the
//! surrounding I/O (GitHub API, network, configuration).

use thiserror::Error;

/// A vote comment whose deployment target cannot be interpreted.
///
/// Both variants abort the evaluation of the current poll tick.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApprovalError {
    /// A `[` is present but the rest of the comment is not a single
    /// bracketed, comma-separated list.
    #[error("Malformed deployment syntax: {body:?}")]
    MalformedDeploymentSyntax { body: String },

    /// A bracketed name is not in the configured allow-list.
    #[error("Unknown deployment name {name:?}, expected one of {allowed:?}")]
    UnknownDeploymentName { name: String, allowed: Vec<String> },
}

impl ApprovalError {
    /// Create a malformed deployment syntax error for a comment body.
    pub fn malformed(body: impl Into<String>) -> Self {
        Self::MalformedDeploymentSyntax { body: body.into() }
    }

    /// Create an unknown deployment name error.
    pub fn unknown_name(name: impl Into<String>, allowed: &[String]) -> Self {
        Self::UnknownDeploymentName {
            name: name.into(),
            allowed: allowed.to_vec(),
        }
    }
}

/// Application-level errors.
#[derive(Debug, Error)]
pub enum AppError {
    /// GitHub API request failed.
    #[error("GitHub API error: {message}")]
    GitHubApi {
        message: String,
        status_code: Option<u16>,
        endpoint: Option<String>,
    },

    /// Network request failed.
    #[error("Network error: {message}")]
    Network { message: String },

    /// Authentication failed or credentials invalid.
    #[error("Authentication error: {message}")]
    Authentication { message: String },

    /// Invalid input provided.
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        field: Option<String>,
    },

    /// A comment in the approval thread could not be interpreted.
    #[error("Approval error: {0}")]
    Approval(ApprovalError),

    /// Internal application error.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AppError {
    /// Create a GitHub API error.
    pub fn github_api(message: impl Into<String>) -> Self {
        Self::GitHubApi {
            message: message.into(),
            status_code: None,
            endpoint: None,
        }
    }

    /// Create a GitHub API error with status code and endpoint.
    pub fn github_api_full(
        message: impl Into<String>,
        status_code: u16,
        endpoint: impl Into<String>,
    ) -> Self {
        Self::GitHubApi {
            message: message.into(),
            status_code: Some(status_code),
            endpoint: Some(endpoint.into()),
        }
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Create an invalid input error with field name.
    pub fn invalid_input_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// The engine error, if this error came from interpreting a comment.
    pub fn as_approval_error(&self) -> Option<&ApprovalError> {
        match self {
            Self::Approval(err) => Some(err),
            _ => None,
        }
    }
}

// Conversions from common error types

impl From<ApprovalError> for AppError {
    fn from(err: ApprovalError) -> Self {
        Self::Approval(err)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::network("Request timed out")
        } else if err.is_connect() {
            Self::network("Failed to connect to server")
        } else if err.is_status() {
            Self::github_api(format!("HTTP error: {}", err))
        } else {
            Self::network(err.to_string())
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::internal(format!("IO error: {}", err))
    }
}
