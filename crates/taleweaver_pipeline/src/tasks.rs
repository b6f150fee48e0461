//! Supervised background tasks.

use futures::FutureExt;
use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use taleweaver_error::TaleweaverResult;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, error, info, info_span, instrument};

/// Spawns background work and keeps its handles.
///
/// Failures and panics are logged and never reach the spawner. Handles of
/// finished tasks are pruned on every spawn.
#[derive(Debug, Clone, Default)]
pub struct TaskRunner {
    tasks: Arc<RwLock<HashMap<String, JoinHandle<()>>>>,
}

/// Panic payload as text.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl TaskRunner {
    /// Create an empty runner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` on the runtime under `name`.
    ///
    /// A task spawned under a name that is still running replaces the old
    /// handle; the old task keeps running.
    #[instrument(skip(self, task))]
    pub async fn spawn<F>(&self, name: String, task: F)
    where
        F: Future<Output = TaleweaverResult<()>> + Send + 'static,
    {
        let span = info_span!("task", name = %name);
        let task_name = name.clone();
        let handle = tokio::spawn(
            async move {
                match AssertUnwindSafe(task).catch_unwind().await {
                    Ok(Ok(())) => debug!("Task finished"),
                    Ok(Err(e)) => error!(error = %e, "Task execution failed"),
                    Err(payload) => {
                        error!(task = %task_name, panic = %panic_message(payload.as_ref()), "Task panicked")
                    }
                }
            }
            .instrument(span),
        );

        let mut tasks = self.tasks.write().await;
        tasks.retain(|_, handle| !handle.is_finished());
        tasks.insert(name, handle);
        info!(active = tasks.len(), "Task spawned");
    }

    /// Names of tasks that have not finished.
    pub async fn active(&self) -> Vec<String> {
        self.tasks
            .read()
            .await
            .iter()
            .filter(|(_, handle)| !handle.is_finished())
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Wait for every task spawned so far.
    ///
    /// Used by tests and on shutdown.
    pub async fn join_all(&self) {
        let handles: Vec<(String, JoinHandle<()>)> = self.tasks.write().await.drain().collect();
        for (name, handle) in handles {
            if let Err(e) = handle.await {
                error!(task = %name, error = %e, "Task join failed");
            }
        }
    }
}
