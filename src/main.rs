use manual_approval_lib::config::ApprovalConfig;
use manual_approval_lib::services::{step_outputs, PollOutcome};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> ExitCode {
    manual_approval_lib::init_logging();

    let config = match ApprovalConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("[approval] {}", e);
            return ExitCode::FAILURE;
        }
    };

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        log::info!("[approval] Shutdown signal received");
        on_signal.cancel();
    });

    let outcome = match manual_approval_lib::run(config, cancel).await {
        Ok(outcome) => outcome,
        Err(e) => {
            log::error!("[approval] {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = step_outputs::write_from_env(&outcome) {
        log::warn!("[approval] Failed to write step outputs: {}", e);
    }

    match outcome {
        PollOutcome::Approved { .. } => ExitCode::SUCCESS,
        PollOutcome::Denied | PollOutcome::Cancelled => ExitCode::FAILURE,
    }
}

/// Resolve on Ctrl-C, or on SIGTERM where available.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("[approval] Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::warn!("[approval] Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
