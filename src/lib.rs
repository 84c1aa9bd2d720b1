//! Manual approval - pause a workflow until named reviewers approve it.
//!
//! Opens a GitHub issue asking the approvers to vote, then re-reads the
//! issue's comment thread until quorum is reached, an approver denies, or
//! the wait is cancelled.

pub mod config;
pub mod error;
pub mod models;
pub mod services;

use config::ApprovalConfig;
use error::AppError;
use services::github_client::GitHubClientConfig;
use services::{ApprovalEnvironment, ApprovalPoller, GitHubClient, PollOutcome};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Install the log subscriber.
///
/// Honours `RUST_LOG`, defaulting to `info`. Records emitted through the
/// `log` facade are forwarded to the subscriber.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
    {
        eprintln!("Failed to initialize logging: {}", e);
    }
}

/// Create the approval issue and wait for it to be decided.
pub async fn run(
    config: ApprovalConfig,
    cancel: CancellationToken,
) -> Result<PollOutcome, AppError> {
    let client = GitHubClient::new(GitHubClientConfig {
        base_url: config.api_url.clone(),
        token: config.token.clone(),
        timeout_secs: 30,
    })?;

    let mut environment = ApprovalEnvironment::new(&config)?;
    log::info!(
        "[approval] Run {} needs {} of {} approver(s): {}",
        config.run_id,
        config.required_approvals(),
        config.approvers.len(),
        config.approvers.join(", ")
    );
    environment.create_approval_issue(&client).await?;

    let poller = ApprovalPoller::new(client, environment, config.polling_interval)?;
    poller.run(cancel).await
}
