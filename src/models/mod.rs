//! Data models for the approval engine.
//!
//! These models are independent of the GitHub API types; the client
//! converts its responses into them before evaluation.

pub mod approval;
pub mod comment;

// Re-exports for convenient access
pub use approval::{ApprovalStatus, Verdict};
pub use comment::Comment;
