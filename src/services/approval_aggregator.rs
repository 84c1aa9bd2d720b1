//! Approval quorum evaluation.
//!
//! Turns the ordered comment thread of an approval issue into a verdict.
//! Evaluation is a single pass and the first decisive comment wins: a
//! denial from any required approver stops the pass, and the approval that
//! completes the quorum approves with its own deployment targets.

use crate::error::ApprovalError;
use crate::models::{Comment, Verdict};
use crate::services::vote_classifier::{self, Vote};

/// Evaluate the approval thread.
///
/// # Arguments
/// * `comments` - Thread comments, oldest first
/// * `approvers` - Required approver logins
/// * `minimum_approvals` - Approvals needed for quorum; `0` means all approvers
/// * `allowed_deployment_names` - Valid targets for `approve[...]`, empty if unused
///
/// # Returns
/// The verdict, or the error from the first comment whose deployment
/// targets could not be interpreted. An error means the status is still
/// pending and no targets were selected.
pub fn evaluate(
    comments: &[Comment],
    approvers: &[String],
    minimum_approvals: usize,
    allowed_deployment_names: &[String],
) -> Result<Verdict, ApprovalError> {
    let minimum_approvals = if minimum_approvals == 0 {
        approvers.len()
    } else {
        minimum_approvals
    };

    let mut remaining: Vec<String> = approvers.to_vec();

    for comment in comments {
        let Some(idx) = remaining.iter().position(|a| comment.is_by(a)) else {
            continue;
        };

        let (vote_word, deployment_names) =
            vote_classifier::extract_deployment_names(&comment.body, allowed_deployment_names)?;

        match vote_classifier::classify(vote_word) {
            Some(Vote::Deny) => {
                log::debug!("[approval] {} denied", comment.author);
                return Ok(Verdict::denied());
            }
            Some(Vote::Approve) => {
                let consumed = approvers.len() - remaining.len() + 1;
                log::debug!(
                    "[approval] {} approved ({}/{})",
                    comment.author,
                    consumed,
                    minimum_approvals
                );
                if consumed == minimum_approvals {
                    return Ok(Verdict::approved(deployment_names));
                }
                remaining.swap_remove(idx);
            }
            None => {}
        }
    }

    Ok(Verdict::pending())
}
