//! Completion Policies
//!
//! One coordinator runs per distinct `TaskId`. It receives the results of
//! every attempt of its task from the task's buffered channel and decides
//! which of them reach the shared output stream, and when the remaining
//! attempts get cancelled.

use super::engine::TaskIdContext;
use super::types::{Mode, TaskResult};

use tokio::sync::mpsc;

/// Runs the coordinator of `mode` until the task is resolved.
pub(crate) async fn coordinate<R: TaskResult>(mode: Mode, tidctx: TaskIdContext<R>, out: mpsc::Sender<R>) {
    tracing::trace!("Coordinator for task {} started ({})", tidctx.task_id, mode);

    match mode {
        Mode::FirstSuccessOrLastError => first_success_or_last_error(tidctx, out).await,
        Mode::FirstSuccessThenCancel => first_success_then_cancel(tidctx, out).await,
        Mode::All => all_results(tidctx, out).await,
    }
}

/// Emits exactly one result: the first success, or the result received when
/// only one attempt was outstanding. Cancels the task once the winner is known.
async fn first_success_or_last_error<R: TaskResult>(mut tidctx: TaskIdContext<R>, out: mpsc::Sender<R>) {
    let mut remaining = tidctx.workers;

    while remaining > 0 {
        tokio::select! {
            biased;

            res = tidctx.results.recv() => {
                let Some(res) = res else { break };

                if res.success() || remaining == 1 {
                    tracing::debug!(
                        "Task {} resolved (success={}, pending={})",
                        tidctx.task_id,
                        res.success(),
                        remaining - 1
                    );
                    tidctx.token.cancel();
                    if out.send(res).await.is_err() {
                        tracing::warn!("Output closed before task {} was delivered", tidctx.task_id);
                    }
                    return;
                }
            }
            _ = tidctx.token.cancelled() => {
                tracing::debug!("Task {} cancelled before a result was chosen", tidctx.task_id);
                return;
            }
        }
        remaining -= 1;
    }
}

/// Emits every result, cancelling the task at the first success. Outstanding
/// attempts still report in, usually as cancellation failures.
async fn first_success_then_cancel<R: TaskResult>(mut tidctx: TaskIdContext<R>, out: mpsc::Sender<R>) {
    let mut cancelled = false;

    for _ in 0..tidctx.workers {
        let Some(res) = tidctx.results.recv().await else {
            break;
        };

        if !cancelled && res.success() {
            tracing::debug!("Task {} succeeded, cancelling other attempts", tidctx.task_id);
            cancelled = true;
            tidctx.token.cancel();
        }
        if out.send(res).await.is_err() {
            tracing::warn!("Output closed while forwarding task {}", tidctx.task_id);
            return;
        }
    }
}

/// Emits every result. Only the task or parent token ending stops early.
async fn all_results<R: TaskResult>(mut tidctx: TaskIdContext<R>, out: mpsc::Sender<R>) {
    for _ in 0..tidctx.workers {
        tokio::select! {
            biased;

            res = tidctx.results.recv() => {
                let Some(res) = res else { break };
                if out.send(res).await.is_err() {
                    tracing::warn!("Output closed while forwarding task {}", tidctx.task_id);
                    return;
                }
            }
            _ = tidctx.token.cancelled() => {
                tracing::debug!("Task {} cancelled, dropping unreceived results", tidctx.task_id);
                return;
            }
        }
    }
}
