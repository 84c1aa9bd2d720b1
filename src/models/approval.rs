//! Approval status and verdict models.

use serde::{Deserialize, Serialize};

/// Outcome of evaluating the approval thread.
///
/// `Approved` and `Denied` are terminal. `Pending` means no decisive
/// comment has been seen yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Denied,
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Approved => write!(f, "approved"),
            Self::Denied => write!(f, "denied"),
        }
    }
}

/// Result of one evaluation of the approval thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Current status.
    pub status: ApprovalStatus,

    /// Deployment targets named by the decisive approval comment.
    ///
    /// Always empty unless `status` is `Approved`.
    pub deployment_names: Vec<String>,
}

impl Verdict {
    /// No decisive comment yet.
    pub fn pending() -> Self {
        Self {
            status: ApprovalStatus::Pending,
            deployment_names: Vec::new(),
        }
    }

    /// Quorum reached, optionally with selected deployment targets.
    pub fn approved(deployment_names: Vec<String>) -> Self {
        Self {
            status: ApprovalStatus::Approved,
            deployment_names,
        }
    }

    /// A required approver vetoed.
    pub fn denied() -> Self {
        Self {
            status: ApprovalStatus::Denied,
            deployment_names: Vec::new(),
        }
    }
}
