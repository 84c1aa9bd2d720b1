//! Business logic services.
//!
//! `vote_classifier` and `approval_aggregator` form the approval engine and
//! perform no I/O. The remaining services wrap the GitHub API around it.

pub mod approval_aggregator;
pub mod approval_issue;
pub mod approval_poller;
pub mod github_client;
pub mod step_outputs;
pub mod vote_classifier;

pub use approval_aggregator::evaluate;
pub use approval_issue::ApprovalEnvironment;
pub use approval_poller::{ApprovalPoller, PollOutcome};
pub use github_client::GitHubClient;
