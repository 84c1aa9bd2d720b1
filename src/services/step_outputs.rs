//! GitHub Actions step outputs.
//!
//! The runner exposes a file through `GITHUB_OUTPUT`; each `key=value` line
//! appended to it becomes an output of the step.

use crate::error::AppError;
use crate::services::approval_poller::PollOutcome;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Environment variable naming the step output file.
pub const ENV_GITHUB_OUTPUT: &str = "GITHUB_OUTPUT";

/// Render the output lines for an outcome.
pub fn render(outcome: &PollOutcome) -> String {
    let names = match outcome {
        PollOutcome::Approved { deployment_names } => deployment_names.join(","),
        _ => String::new(),
    };
    format!(
        "approval-status={}\ndeployment-names={}\n",
        outcome.status(),
        names
    )
}

/// Append the outputs for `outcome` to the file at `path`.
pub fn write(path: &Path, outcome: &PollOutcome) -> Result<(), AppError> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(render(outcome).as_bytes())?;
    Ok(())
}

/// Append the outputs to the runner's output file, if there is one.
pub fn write_from_env(outcome: &PollOutcome) -> Result<(), AppError> {
    match std::env::var_os(ENV_GITHUB_OUTPUT) {
        Some(path) => write(Path::new(&path), outcome),
        None => {
            log::debug!("[outputs] {} not set, skipping step outputs", ENV_GITHUB_OUTPUT);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_render() {
        let outcome = PollOutcome::Approved {
            deployment_names: vec!["blue".to_string(), "green".to_string()],
        };
        assert_eq!(
            render(&outcome),
            "approval-status=approved\ndeployment-names=blue,green\n"
        );
        assert_eq!(
            render(&PollOutcome::Denied),
            "approval-status=denied\ndeployment-names=\n"
        );
    }

    #[test]
    fn test_write_appends() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("output");
        std::fs::write(&path, "earlier=1\n").unwrap();

        write(&path, &PollOutcome::Cancelled).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "earlier=1\napproval-status=pending\ndeployment-names=\n"
        );
    }
}
