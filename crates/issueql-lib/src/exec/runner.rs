//! Per-cell run lifecycle.
//!
//! Each query cell owns a [`CellRunner`]. Starting a run cancels the cell's
//! previous one; a superseded run's results are dropped, never committed.
//! The runner's status only moves forward for the newest run - a cancelled
//! run restores whatever status the cell showed before it started.

use std::sync::{Mutex, MutexGuard};

use crate::compile::CompiledQuery;

use super::aggregate::status_line;
use super::{CancelToken, ExecError, Item, SearchClient, execute_unit};

/// Externally visible state of one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Idle,
    Running,
    Done {
        count: usize,
        truncated: bool,
    },
    Failed(String),
}

/// Results committed by a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellRun {
    pub items: Vec<Item>,
    pub truncated: bool,
    /// Result count line, e.g. `42 results` or `1000+ results`.
    pub summary: String,
}

#[derive(Debug)]
struct RunnerState {
    /// Monotonic run counter; a finishing run commits only when its
    /// generation is still current.
    generation: u64,
    cancel: Option<CancelToken>,
    status: RunStatus,
}

#[derive(Debug)]
pub struct CellRunner {
    state: Mutex<RunnerState>,
}

impl CellRunner {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RunnerState {
                generation: 0,
                cancel: None,
                status: RunStatus::Idle,
            }),
        }
    }

    pub fn status(&self) -> RunStatus {
        self.lock().status.clone()
    }

    /// Cancels the in-flight run, if any. The cancelled run restores the
    /// cell's previous status on its way out.
    pub fn cancel(&self) {
        if let Some(token) = self.lock().cancel.as_ref() {
            token.cancel();
        }
    }

    /// Executes `queries` as this cell's newest run.
    ///
    /// Returns `None` when the run was cancelled or superseded by a newer
    /// one; only the returned `Some` carries committed results.
    pub async fn run(
        &self,
        client: &dyn SearchClient,
        queries: &[CompiledQuery],
    ) -> Option<CellRun> {
        let (generation, cancel, previous_status) = {
            let mut state = self.lock();
            if let Some(token) = state.cancel.take() {
                token.cancel();
            }
            state.generation += 1;
            let cancel = CancelToken::new();
            state.cancel = Some(cancel.clone());
            let previous = std::mem::replace(&mut state.status, RunStatus::Running);
            (state.generation, cancel, previous)
        };

        let outcome = execute_unit(client, queries, &cancel).await;

        let mut state = self.lock();
        if state.generation != generation {
            tracing::debug!(generation, "dropping superseded run result");
            return None;
        }
        state.cancel = None;

        match outcome {
            Ok(aggregated) => {
                state.status = RunStatus::Done {
                    count: aggregated.items.len(),
                    truncated: aggregated.truncated,
                };
                let summary = status_line(&aggregated);
                Some(CellRun {
                    items: aggregated.items,
                    truncated: aggregated.truncated,
                    summary,
                })
            }
            Err(ExecError::Cancelled) => {
                tracing::debug!(generation, "run cancelled");
                state.status = previous_status;
                None
            }
            Err(ExecError::Search(error)) => {
                tracing::debug!(generation, %error, "run failed");
                state.status = RunStatus::Failed(error.to_string());
                None
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, RunnerState> {
        // Held only for field updates; no await point ever sees the guard.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for CellRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs every cell of a document in order, one at a time. Observing
/// `cancel` between cells stops scheduling; the cell that is currently
/// running is left to its own token.
pub async fn run_all<'a, I>(client: &dyn SearchClient, cells: I, cancel: &CancelToken)
where
    I: IntoIterator<Item = (&'a CellRunner, &'a [CompiledQuery])>,
{
    for (runner, queries) in cells {
        if cancel.is_cancelled() {
            tracing::debug!("document run cancelled before completion");
            break;
        }
        let _ = runner.run(client, queries).await;
    }
}
