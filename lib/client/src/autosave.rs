//! Debounced auto-save.
//!
//! Graph edits arrive much faster than the backend wants writes. The
//! autosaver coalesces them: each scheduled document replaces the pending
//! one and restarts the debounce window; when the window elapses, only the
//! latest state is written. A forced flush bypasses the window entirely.
//!
//! Persistence goes through the `WorkflowSink` trait so the loop is
//! testable without a backend; `WorkflowStore` is the real sink.

use crate::error::ClientError;
use crate::store::WorkflowStore;
use async_trait::async_trait;
use flowboard_core::WorkflowId;
use flowboard_workflow::WorkflowDocument;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

/// Destination for auto-saved documents.
#[async_trait]
pub trait WorkflowSink: Send + Sync {
    /// Persists the latest document for a workflow.
    async fn persist(&self, id: WorkflowId, document: &WorkflowDocument)
    -> Result<(), ClientError>;
}

#[async_trait]
impl WorkflowSink for WorkflowStore {
    async fn persist(
        &self,
        id: WorkflowId,
        document: &WorkflowDocument,
    ) -> Result<(), ClientError> {
        self.update(id, document).await
    }
}

enum Command {
    Schedule(WorkflowId, WorkflowDocument),
    Flush(oneshot::Sender<()>),
}

/// Debounced, coalescing writer of workflow documents.
pub struct Autosaver {
    tx: mpsc::UnboundedSender<Command>,
}

impl Autosaver {
    /// Spawns the save loop with the given debounce window.
    #[must_use]
    pub fn spawn(sink: Arc<dyn WorkflowSink>, debounce: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(sink, rx, debounce));
        Self { tx }
    }

    /// Schedules a save of the latest document state.
    ///
    /// Replaces any not-yet-written document and restarts the debounce
    /// window. Dropped silently if the save loop has stopped.
    pub fn schedule(&self, id: WorkflowId, document: WorkflowDocument) {
        let _ = self.tx.send(Command::Schedule(id, document));
    }

    /// Writes any pending document immediately, bypassing the window.
    ///
    /// Completes once the write (if any) has finished.
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.tx.send(Command::Flush(ack)).is_ok() {
            let _ = done.await;
        }
    }
}

async fn run(
    sink: Arc<dyn WorkflowSink>,
    mut rx: mpsc::UnboundedReceiver<Command>,
    debounce: Duration,
) {
    let mut pending: Option<(WorkflowId, WorkflowDocument)> = None;
    let mut deadline: Option<Instant> = None;

    loop {
        tokio::select! {
            command = rx.recv() => match command {
                Some(Command::Schedule(id, document)) => {
                    pending = Some((id, document));
                    deadline = Some(Instant::now() + debounce);
                }
                Some(Command::Flush(ack)) => {
                    write_pending(&sink, &mut pending).await;
                    deadline = None;
                    let _ = ack.send(());
                }
                None => {
                    // Owner dropped; write what's left and stop.
                    write_pending(&sink, &mut pending).await;
                    break;
                }
            },
            () = sleep_until_deadline(deadline), if deadline.is_some() => {
                write_pending(&sink, &mut pending).await;
                deadline = None;
            }
        }
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    // Guarded by `if deadline.is_some()` in the select.
    if let Some(deadline) = deadline {
        tokio::time::sleep_until(deadline).await;
    }
}

async fn write_pending(
    sink: &Arc<dyn WorkflowSink>,
    pending: &mut Option<(WorkflowId, WorkflowDocument)>,
) {
    let Some((id, document)) = pending.take() else {
        return;
    };
    if let Err(error) = sink.persist(id, &document).await {
        // Auto-save failures are logged, never fatal; the next edit
        // schedules another attempt.
        tracing::warn!(workflow_id = %id, error = %error, "auto-save failed");
    } else {
        tracing::debug!(workflow_id = %id, "auto-saved workflow");
    }
}
