//! Poll loop that waits for the approval issue to be decided.
//!
//! Every tick re-reads the whole comment thread and evaluates it from
//! scratch. The loop ends when the thread approves or denies the run, when
//! a comment cannot be interpreted, when the GitHub API fails, or when the
//! cancellation token fires. In every case except an API failure the issue
//! is closed with an explanatory comment.

use crate::error::AppError;
use crate::models::{ApprovalStatus, Comment, Verdict};
use crate::services::approval_aggregator;
use crate::services::approval_issue::ApprovalEnvironment;
use crate::services::github_client::{self, GitHubClient};
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

pub const APPROVED_COMMENT: &str =
    "All required approvals received, continuing workflow and closing this issue.";
pub const DENIED_COMMENT: &str = "Request denied. Closing issue and failing workflow.";
pub const CANCELLED_COMMENT: &str = "Workflow cancelled, closing issue.";

/// How the wait for approval ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Quorum reached; the workflow may continue.
    Approved {
        /// Targets selected by the decisive approval, empty if none.
        deployment_names: Vec<String>,
    },

    /// A required approver denied the run.
    Denied,

    /// Polling was cancelled before a decision.
    Cancelled,
}

impl PollOutcome {
    /// The engine status this outcome corresponds to.
    pub fn status(&self) -> ApprovalStatus {
        match self {
            Self::Approved { .. } => ApprovalStatus::Approved,
            Self::Denied => ApprovalStatus::Denied,
            Self::Cancelled => ApprovalStatus::Pending,
        }
    }
}

/// Watches one approval issue until it is decided.
pub struct ApprovalPoller {
    client: GitHubClient,
    environment: ApprovalEnvironment,
    issue_number: u64,
    interval: Duration,
}

impl ApprovalPoller {
    /// Create a poller for an environment whose issue has been created.
    pub fn new(
        client: GitHubClient,
        environment: ApprovalEnvironment,
        interval: Duration,
    ) -> Result<Self, AppError> {
        let issue_number = environment
            .issue_number
            .ok_or_else(|| AppError::internal("Approval issue has not been created"))?;

        Ok(Self {
            client,
            environment,
            issue_number,
            interval,
        })
    }

    /// Read the thread once and evaluate it.
    pub async fn poll_once(&self) -> Result<Verdict, AppError> {
        let raw = self
            .client
            .list_issue_comments(
                &self.environment.repo_owner,
                &self.environment.repo,
                self.issue_number,
            )
            .await?;

        match github_client::latest_comment_at(&raw) {
            Some(at) => log::debug!(
                "[poll] Evaluating {} comment(s) on issue #{}, latest at {}",
                raw.len(),
                self.issue_number,
                at.to_rfc3339()
            ),
            None => log::debug!("[poll] No comments yet on issue #{}", self.issue_number),
        }

        let comments: Vec<Comment> = raw.into_iter().map(Comment::from).collect();

        let verdict = approval_aggregator::evaluate(
            &comments,
            &self.environment.approvers,
            self.environment.minimum_approvals,
            &self.environment.deployment_names,
        )?;
        Ok(verdict)
    }

    /// Poll until the issue is decided or `cancel` fires.
    ///
    /// The first read happens immediately.
    pub async fn run(&self, cancel: CancellationToken) -> Result<PollOutcome, AppError> {
        let mut interval = time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        log::info!(
            "[poll] Waiting for approval on issue #{} (every {}s)",
            self.issue_number,
            self.interval.as_secs()
        );

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    log::info!("[poll] Cancelled, closing issue #{}", self.issue_number);
                    self.close_with_comment(CANCELLED_COMMENT).await?;
                    return Ok(PollOutcome::Cancelled);
                }
                _ = interval.tick() => {
                    let verdict = match self.poll_once().await {
                        Ok(verdict) => verdict,
                        Err(AppError::Approval(err)) => {
                            log::error!("[poll] Cannot interpret approval thread: {}", err);
                            let message = format!(
                                "Could not interpret a vote: {}. Closing issue and failing workflow.",
                                err
                            );
                            if let Err(e) = self.close_with_comment(&message).await {
                                log::warn!("[poll] Failed to close issue #{}: {}", self.issue_number, e);
                            }
                            return Err(AppError::Approval(err));
                        }
                        Err(e) => return Err(e),
                    };

                    match verdict.status {
                        ApprovalStatus::Pending => {
                            log::debug!("[poll] Issue #{} still pending", self.issue_number);
                        }
                        ApprovalStatus::Approved => {
                            log::info!("[poll] Workflow approved");
                            self.close_with_comment(&approved_comment(&verdict.deployment_names))
                                .await?;
                            return Ok(PollOutcome::Approved {
                                deployment_names: verdict.deployment_names,
                            });
                        }
                        ApprovalStatus::Denied => {
                            log::info!("[poll] Workflow denied");
                            self.close_with_comment(DENIED_COMMENT).await?;
                            return Ok(PollOutcome::Denied);
                        }
                    }
                }
            }
        }
    }

    /// Post a final comment and close the issue.
    async fn close_with_comment(&self, body: &str) -> Result<(), AppError> {
        let owner = &self.environment.repo_owner;
        let repo = &self.environment.repo;

        self.client
            .add_comment(owner, repo, self.issue_number, body)
            .await?;
        self.client.close_issue(owner, repo, self.issue_number).await?;
        Ok(())
    }
}

fn approved_comment(deployment_names: &[String]) -> String {
    if deployment_names.is_empty() {
        APPROVED_COMMENT.to_string()
    } else {
        format!(
            "{}\n\nSelected deployments: {}",
            APPROVED_COMMENT,
            deployment_names.join(", ")
        )
    }
}
