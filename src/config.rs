//! Approval workflow configuration.
//!
//! Settings are read from the environment variables a GitHub Actions runner
//! provides (`GITHUB_*`) and from the action inputs (`INPUT_*`).

use crate::error::AppError;
use crate::services::github_client::DEFAULT_API_URL;
use std::time::Duration;

/// Default delay between two reads of the approval thread.
pub const DEFAULT_POLLING_INTERVAL: Duration = Duration::from_secs(10);

/// Default web URL of the GitHub server.
pub const DEFAULT_SERVER_URL: &str = "https://github.com";

pub const ENV_REPO_FULL_NAME: &str = "GITHUB_REPOSITORY";
pub const ENV_RUN_ID: &str = "GITHUB_RUN_ID";
pub const ENV_REPO_OWNER: &str = "GITHUB_REPOSITORY_OWNER";
pub const ENV_API_URL: &str = "GITHUB_API_URL";
pub const ENV_SERVER_URL: &str = "GITHUB_SERVER_URL";
pub const ENV_TOKEN: &str = "INPUT_SECRET";
pub const ENV_APPROVERS: &str = "INPUT_APPROVERS";
pub const ENV_MINIMUM_APPROVALS: &str = "INPUT_MINIMUM-APPROVALS";
pub const ENV_DEPLOYMENT_NAMES: &str = "INPUT_MULTIPLE-DEPLOYMENT-NAMES";
pub const ENV_ISSUE_TITLE: &str = "INPUT_ISSUE-TITLE";
pub const ENV_ISSUE_BODY: &str = "INPUT_ISSUE-BODY";

/// Everything needed to open and watch one approval issue.
#[derive(Debug, Clone)]
pub struct ApprovalConfig {
    /// Repository as `owner/name`.
    pub repo_full_name: String,

    /// Owner under which the issue is created.
    pub repo_owner: String,

    /// Workflow run waiting for approval.
    pub run_id: u64,

    /// API token.
    pub token: String,

    /// Required approver logins, in configured order.
    pub approvers: Vec<String>,

    /// Approvals needed; `0` means every approver.
    pub minimum_approvals: usize,

    /// Targets an approval may select, empty if unused.
    pub deployment_names: Vec<String>,

    /// Overrides the generated issue title.
    pub issue_title: Option<String>,

    /// Extra text placed above the generated issue body.
    pub issue_body: Option<String>,

    /// REST API base URL.
    pub api_url: String,

    /// Web URL used for the workflow run link.
    pub server_url: String,

    /// Delay between two reads of the approval thread.
    pub polling_interval: Duration,
}

impl ApprovalConfig {
    /// Load the configuration from the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |key: &str| {
            optional(key).ok_or_else(|| {
                AppError::invalid_input_field(format!("{} is not set", key), key)
            })
        };

        let run_id = required(ENV_RUN_ID)?.parse::<u64>().map_err(|e| {
            AppError::invalid_input_field(format!("invalid run id: {}", e), ENV_RUN_ID)
        })?;

        let approvers = split_list(&required(ENV_APPROVERS)?);
        if approvers.is_empty() {
            return Err(AppError::invalid_input_field(
                "at least one approver is required",
                ENV_APPROVERS,
            ));
        }

        let minimum_approvals = match optional(ENV_MINIMUM_APPROVALS) {
            Some(raw) => raw.parse::<usize>().map_err(|e| {
                AppError::invalid_input_field(
                    format!("invalid minimum approvals {:?}: {}", raw, e),
                    ENV_MINIMUM_APPROVALS,
                )
            })?,
            None => 0,
        };
        if minimum_approvals > approvers.len() {
            return Err(AppError::invalid_input_field(
                format!(
                    "minimum approvals ({}) exceeds the number of approvers ({})",
                    minimum_approvals,
                    approvers.len()
                ),
                ENV_MINIMUM_APPROVALS,
            ));
        }

        let config = Self {
            repo_full_name: required(ENV_REPO_FULL_NAME)?,
            repo_owner: required(ENV_REPO_OWNER)?,
            run_id,
            token: required(ENV_TOKEN)?,
            approvers,
            minimum_approvals,
            deployment_names: optional(ENV_DEPLOYMENT_NAMES)
                .map(|raw| split_list(&raw))
                .unwrap_or_default(),
            issue_title: optional(ENV_ISSUE_TITLE),
            issue_body: optional(ENV_ISSUE_BODY),
            api_url: optional(ENV_API_URL).unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            server_url: optional(ENV_SERVER_URL).unwrap_or_else(|| DEFAULT_SERVER_URL.to_string()),
            polling_interval: DEFAULT_POLLING_INTERVAL,
        };

        Ok(config)
    }

    /// Approvals actually required, resolving the `0` shorthand.
    pub fn required_approvals(&self) -> usize {
        if self.minimum_approvals == 0 {
            self.approvers.len()
        } else {
            self.minimum_approvals
        }
    }
}

/// Split a comma-separated input, dropping blank entries.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            (ENV_REPO_FULL_NAME, "octo/hello-world"),
            (ENV_REPO_OWNER, "octo"),
            (ENV_RUN_ID, "4242"),
            (ENV_TOKEN, "secret"),
            (ENV_APPROVERS, "alice, bob,,carol "),
        ])
    }

    fn load(env: &HashMap<&'static str, &'static str>) -> Result<ApprovalConfig, AppError> {
        ApprovalConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn test_defaults() {
        let config = load(&base_env()).unwrap();
        assert_eq!(config.approvers, vec!["alice", "bob", "carol"]);
        assert_eq!(config.minimum_approvals, 0);
        assert_eq!(config.required_approvals(), 3);
        assert!(config.deployment_names.is_empty());
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
        assert_eq!(config.polling_interval, DEFAULT_POLLING_INTERVAL);
        assert_eq!(config.run_id, 4242);
    }

    #[test]
    fn test_optional_inputs() {
        let mut env = base_env();
        env.insert(ENV_MINIMUM_APPROVALS, "2");
        env.insert(ENV_DEPLOYMENT_NAMES, "blue,green");
        env.insert(ENV_ISSUE_TITLE, "Deploy to prod?");
        env.insert(ENV_API_URL, "http://127.0.0.1:8080");
        let config = load(&env).unwrap();
        assert_eq!(config.required_approvals(), 2);
        assert_eq!(config.deployment_names, vec!["blue", "green"]);
        assert_eq!(config.issue_title.as_deref(), Some("Deploy to prod?"));
        assert_eq!(config.issue_body, None);
        assert_eq!(config.api_url, "http://127.0.0.1:8080");
    }

    #[test]
    fn test_blank_minimum_means_all() {
        let mut env = base_env();
        env.insert(ENV_MINIMUM_APPROVALS, "  ");
        assert_eq!(load(&env).unwrap().minimum_approvals, 0);
    }

    #[test]
    fn test_missing_required_field() {
        let mut env = base_env();
        env.remove(ENV_TOKEN);
        match load(&env) {
            Err(AppError::InvalidInput { field, .. }) => {
                assert_eq!(field.as_deref(), Some(ENV_TOKEN))
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_minimum_above_approver_count() {
        let mut env = base_env();
        env.insert(ENV_MINIMUM_APPROVALS, "4");
        assert!(matches!(load(&env), Err(AppError::InvalidInput { .. })));
    }

    #[test]
    fn test_invalid_numbers() {
        let mut env = base_env();
        env.insert(ENV_RUN_ID, "abc");
        assert!(load(&env).is_err());

        let mut env = base_env();
        env.insert(ENV_MINIMUM_APPROVALS, "-1");
        assert!(load(&env).is_err());
    }

    #[test]
    fn test_no_approvers() {
        let mut env = base_env();
        env.insert(ENV_APPROVERS, " , ");
        assert!(load(&env).is_err());
    }
}
