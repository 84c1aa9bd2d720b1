//! The approval issue: its text, and creating it on GitHub.

use crate::config::ApprovalConfig;
use crate::error::AppError;
use crate::services::github_client::{GitHubClient, GitHubIssue, NewIssue};
use crate::services::vote_classifier::{format_accepted_words, APPROVED_WORDS, DENIED_WORDS};

/// One approval round for a workflow run.
#[derive(Debug, Clone)]
pub struct ApprovalEnvironment {
    /// Repository as `owner/name`.
    pub repo_full_name: String,

    /// Repository name without the owner.
    pub repo: String,

    /// Owner under which the issue is created.
    pub repo_owner: String,

    pub run_id: u64,
    pub approvers: Vec<String>,
    pub minimum_approvals: usize,
    pub deployment_names: Vec<String>,
    pub issue_title: Option<String>,
    pub issue_body: Option<String>,
    pub server_url: String,

    /// Issue number, once the issue has been created.
    pub issue_number: Option<u64>,
}

impl ApprovalEnvironment {
    /// Build the environment from configuration.
    ///
    /// Fails if the repository name is not of the form `owner/name`.
    pub fn new(config: &ApprovalConfig) -> Result<Self, AppError> {
        let repo = match config.repo_full_name.split('/').collect::<Vec<_>>().as_slice() {
            [owner, name] if !owner.is_empty() && !name.is_empty() => name.to_string(),
            _ => {
                return Err(AppError::invalid_input_field(
                    format!(
                        "repo owner and name in unexpected format: {}",
                        config.repo_full_name
                    ),
                    "repo_full_name",
                ))
            }
        };

        Ok(Self {
            repo_full_name: config.repo_full_name.clone(),
            repo,
            repo_owner: config.repo_owner.clone(),
            run_id: config.run_id,
            approvers: config.approvers.clone(),
            minimum_approvals: config.minimum_approvals,
            deployment_names: config.deployment_names.clone(),
            issue_title: config.issue_title.clone(),
            issue_body: config.issue_body.clone(),
            server_url: config.server_url.clone(),
            issue_number: None,
        })
    }

    /// Link to the workflow run waiting for approval.
    pub fn run_url(&self) -> String {
        format!(
            "{}/{}/actions/runs/{}",
            self.server_url.trim_end_matches('/'),
            self.repo_full_name,
            self.run_id
        )
    }

    /// Title of the approval issue.
    pub fn title(&self) -> String {
        self.issue_title
            .clone()
            .unwrap_or_else(|| format!("Manual approval required for workflow run {}", self.run_id))
    }

    /// Body of the approval issue, documenting the vote syntax.
    pub fn body(&self) -> String {
        let deployments = if self.deployment_names.is_empty() {
            "-".to_string()
        } else {
            self.deployment_names.join(", ")
        };

        let generated = format!(
            "Workflow is pending manual review.\n\
             URL: {}\n\n\
             Required approvers: {}\n\n\
             Multiple deployment: {}\n\n\
             Respond {} to continue workflow or {} to cancel.",
            self.run_url(),
            self.approvers.join(", "),
            deployments,
            format_accepted_words(APPROVED_WORDS, &self.deployment_names),
            format_accepted_words(DENIED_WORDS, &[]),
        );

        match &self.issue_body {
            Some(custom) => format!("{}\n\n{}", custom, generated),
            None => generated,
        }
    }

    /// Create the approval issue, assigned to the approvers.
    pub async fn create_approval_issue(
        &mut self,
        client: &GitHubClient,
    ) -> Result<GitHubIssue, AppError> {
        let issue = NewIssue {
            title: self.title(),
            body: self.body(),
            assignees: self.approvers.clone(),
        };

        log::info!(
            "[approval] Creating issue in repo {}/{}: {}",
            self.repo_owner,
            self.repo,
            issue.title
        );
        log::debug!("[approval] Issue body:\n{}", issue.body);

        let created = client
            .create_issue(&self.repo_owner, &self.repo, &issue)
            .await?;
        log::info!("[approval] Approval issue created: {}", created.html_url);

        self.issue_number = Some(created.number);
        Ok(created)
    }
}
