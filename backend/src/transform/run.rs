//! Run lifecycle and cooperative cancellation.
//!
//! Each reconciliation run gets a [`RunToken`]. Operations call
//! [`RunToken::checkpoint`] after every suspension point, after each vendor
//! and after each record; the first checkpoint that sees a cancellation
//! aborts the run with [`ReconcileError::Cancelled`] and no output.
//!
//! [`RunControl`] owns the `Idle → Running → Completed | Cancelled | Failed`
//! state for the whole process and refuses a second concurrent run.

use std::future::Future;
use std::sync::{Mutex, MutexGuard};

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::api::logs::{log_info, log_warning};
use crate::error::{ReconcileError, ReconcileResult};

/// Lifecycle of the current (or last) run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Idle,
    Running,
    Completed,
    Cancelled,
    Failed,
}

/// Cancellation handle for one run.
#[derive(Debug, Clone)]
pub struct RunToken {
    id: Uuid,
    cancel: CancellationToken,
}

impl RunToken {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// `Err(Cancelled)` once cancellation was requested.
    pub fn checkpoint(&self) -> ReconcileResult<()> {
        if self.is_cancelled() {
            Err(ReconcileError::Cancelled)
        } else {
            Ok(())
        }
    }
}

impl Default for RunToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of the run state for status endpoints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStatus {
    pub state: RunState,
    pub run_id: Option<Uuid>,
    pub operation: Option<String>,
}

struct Inner {
    state: RunState,
    token: Option<RunToken>,
    operation: Option<String>,
}

/// Process-wide run state. One run at a time.
pub struct RunControl {
    inner: Mutex<Inner>,
}

impl RunControl {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: RunState::Idle,
                token: None,
                operation: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Move to `Running` and hand out a fresh token, unless a run is active.
    pub fn begin(&self, operation: &str) -> ReconcileResult<RunToken> {
        let mut inner = self.lock();
        if inner.state == RunState::Running {
            return Err(ReconcileError::Busy);
        }
        let token = RunToken::new();
        inner.state = RunState::Running;
        inner.token = Some(token.clone());
        inner.operation = Some(operation.to_string());
        log_info(format!("Run {} started: {}", token.id(), operation));
        Ok(token)
    }

    /// Record how the run identified by `token` ended.
    pub fn finish<T>(&self, token: &RunToken, result: &ReconcileResult<T>) {
        let mut inner = self.lock();
        if inner.token.as_ref().map(RunToken::id) != Some(token.id()) {
            return;
        }
        inner.state = match result {
            Ok(_) => RunState::Completed,
            Err(ReconcileError::Cancelled) => RunState::Cancelled,
            Err(_) => RunState::Failed,
        };
        inner.token = None;
    }

    /// Request cancellation of the active run. Returns whether one was active.
    pub fn cancel(&self) -> bool {
        let inner = self.lock();
        match &inner.token {
            Some(token) => {
                log_warning(format!("Cancelling run {}", token.id()));
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn status(&self) -> RunStatus {
        let inner = self.lock();
        RunStatus {
            state: inner.state,
            run_id: inner.token.as_ref().map(RunToken::id),
            operation: inner.operation.clone(),
        }
    }

    /// Run `op` under a fresh token and record its outcome.
    pub async fn run<T, F, Fut>(&self, operation: &str, op: F) -> ReconcileResult<T>
    where
        F: FnOnce(RunToken) -> Fut,
        Fut: Future<Output = ReconcileResult<T>>,
    {
        let token = self.begin(operation)?;
        let result = op(token.clone()).await;
        self.finish(&token, &result);
        result
    }
}

impl Default for RunControl {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkpoint_after_cancel() {
        let token = RunToken::new();
        assert!(token.checkpoint().is_ok());
        token.clone().cancel();
        assert!(matches!(token.checkpoint(), Err(ReconcileError::Cancelled)));
    }

    #[test]
    fn test_second_run_is_busy() {
        let control = RunControl::new();
        let first = control.begin("inventory").unwrap();
        assert!(matches!(control.begin("products"), Err(ReconcileError::Busy)));

        control.finish(&first, &Ok::<(), ReconcileError>(()));
        assert_eq!(control.status().state, RunState::Completed);
        assert!(control.begin("products").is_ok());
    }

    #[test]
    fn test_cancel_marks_cancelled() {
        let control = RunControl::new();
        assert!(!control.cancel());

        let token = control.begin("inventory").unwrap();
        assert!(control.cancel());
        assert!(token.is_cancelled());

        control.finish(&token, &token.checkpoint());
        let status = control.status();
        assert_eq!(status.state, RunState::Cancelled);
        assert!(status.run_id.is_none());
    }

    #[tokio::test]
    async fn test_run_records_failure() {
        let control = RunControl::new();
        let result: ReconcileResult<()> = control
            .run("add", |_token| async { Err(ReconcileError::Internal("boom".into())) })
            .await;
        assert!(result.is_err());
        assert_eq!(control.status().state, RunState::Failed);
    }
}
