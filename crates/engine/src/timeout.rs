//! Running one exec under a deadline.

use std::time::Duration;

use recovery_execs::{ExecError, ExecInfo, ExecRegistry};
use tokio::sync::oneshot;

use crate::error::EngineError;

/// Run the exec described by `info` with a deadline of `info.action_timeout`.
///
/// The exec runs on its own task and reports back over a oneshot channel. The
/// call returns as soon as the first of three things happens:
///
/// - the exec finishes: its result is returned unchanged
/// - the deadline passes: [`EngineError::Timeout`]
/// - the run is cancelled: [`EngineError::Cancelled`]
///
/// In the last two cases the exec's token is cancelled and the task is left to
/// wind down on its own; it is never aborted. An empty exec name is a pass and
/// an unregistered one fails before anything is spawned.
pub async fn run_exec(registry: &ExecRegistry, info: ExecInfo) -> Result<(), EngineError> {
    if info.exec_name.is_empty() {
        return Ok(());
    }
    let exec = registry.get(&info.exec_name).map_err(|source| EngineError::Exec {
        action: info.action_name.clone(),
        source,
    })?;

    let deadline = info.action_timeout;
    let run_token = info.run_args.cancellation.clone();
    let exec_token = info.cancellation.clone();
    let action = info.action_name.clone();
    let exec_name = info.exec_name.clone();

    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        let result = exec.run(&info).await;
        let _ = tx.send(result);
    });

    let raced = tokio::time::timeout(deadline, async {
        tokio::select! {
            biased;
            result = rx => Some(result),
            () = run_token.cancelled() => None,
        }
    })
    .await;

    match raced {
        Ok(Some(Ok(Ok(())))) => Ok(()),
        // The exec token is a child of the run token, so an exec may observe
        // run cancellation before the race does.
        Ok(Some(Ok(Err(_)))) if run_token.is_cancelled() => Err(EngineError::Cancelled { action }),
        Ok(Some(Ok(Err(source)))) => Err(EngineError::Exec { action, source }),
        Ok(Some(Err(_))) => Err(EngineError::Exec {
            action,
            source: ExecError::failed(exec_name, "exec task ended without reporting a result"),
        }),
        Ok(None) => {
            exec_token.cancel();
            tracing::info!(action = %action, exec = %exec_name, "exec interrupted by run cancellation");
            Err(EngineError::Cancelled { action })
        }
        Err(_) => {
            exec_token.cancel();
            tracing::info!(
                action = %action,
                exec = %exec_name,
                timeout_ms = deadline.as_millis() as u64,
                "exec exceeded timeout"
            );
            Err(EngineError::Timeout {
                action,
                exec: exec_name,
                timeout: deadline,
            })
        }
    }
}

/// Deadline for an action: its own `exec_timeout`, or `default`.
#[must_use]
pub fn exec_timeout(action: &recovery_plan::Action, default: Duration) -> Duration {
    action.exec_timeout.unwrap_or(default)
}
