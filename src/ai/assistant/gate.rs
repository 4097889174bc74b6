//! Concurrency Gate
//!
//! Bounds in-flight service calls across every refinement run sharing one
//! service handle. Each call holds a permit only for its own duration, so a
//! long poll loop never starves other runs between checks.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{Semaphore, SemaphorePermit};

use super::{AssistantService, RunHandle, RunState, SharedAssistant, ThreadHandle};
use crate::types::{FileId, ForecastError, Result};

pub struct GatedAssistant {
    inner: SharedAssistant,
    permits: Arc<Semaphore>,
}

impl GatedAssistant {
    pub fn new(inner: SharedAssistant, max_concurrent: usize) -> Self {
        Self {
            inner,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    async fn permit(&self) -> Result<SemaphorePermit<'_>> {
        self.permits
            .acquire()
            .await
            .map_err(|_| ForecastError::ServiceUnavailable("request gate closed".to_string()))
    }
}

#[async_trait]
impl AssistantService for GatedAssistant {
    async fn create_thread(&self, label: &str) -> Result<ThreadHandle> {
        let _permit = self.permit().await?;
        self.inner.create_thread(label).await
    }

    async fn post_message(
        &self,
        thread: &ThreadHandle,
        text: &str,
        attachments: &[FileId],
    ) -> Result<()> {
        let _permit = self.permit().await?;
        self.inner.post_message(thread, text, attachments).await
    }

    async fn create_run(&self, thread: &ThreadHandle, assistant_id: &str) -> Result<RunHandle> {
        let _permit = self.permit().await?;
        self.inner.create_run(thread, assistant_id).await
    }

    async fn run_state(&self, run: &RunHandle) -> Result<RunState> {
        let _permit = self.permit().await?;
        self.inner.run_state(run).await
    }

    async fn latest_assistant_message(&self, thread: &ThreadHandle) -> Result<Option<String>> {
        let _permit = self.permit().await?;
        self.inner.latest_assistant_message(thread).await
    }

    async fn delete_thread(&self, thread: &ThreadHandle) -> Result<()> {
        let _permit = self.permit().await?;
        self.inner.delete_thread(thread).await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Counts concurrent `create_thread` calls
    #[derive(Default)]
    struct SlowService {
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl AssistantService for SlowService {
        async fn create_thread(&self, label: &str) -> Result<ThreadHandle> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok(ThreadHandle {
                id: format!("thread_{}", label),
                label: label.to_string(),
            })
        }

        async fn post_message(&self, _: &ThreadHandle, _: &str, _: &[FileId]) -> Result<()> {
            Ok(())
        }

        async fn create_run(&self, thread: &ThreadHandle, _: &str) -> Result<RunHandle> {
            Ok(RunHandle {
                id: "run".to_string(),
                thread_id: thread.id.clone(),
            })
        }

        async fn run_state(&self, _: &RunHandle) -> Result<RunState> {
            Ok(RunState::new(super::super::RunStatus::Completed))
        }

        async fn latest_assistant_message(&self, _: &ThreadHandle) -> Result<Option<String>> {
            Ok(None)
        }

        async fn delete_thread(&self, _: &ThreadHandle) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "slow"
        }
    }

    #[tokio::test]
    async fn test_gate_bounds_concurrency() {
        let inner = Arc::new(SlowService::default());
        let gated = Arc::new(GatedAssistant::new(inner.clone(), 2));

        let tasks: Vec<_> = (0..6)
            .map(|i| {
                let gated = gated.clone();
                tokio::spawn(async move { gated.create_thread(&i.to_string()).await })
            })
            .collect();

        for task in futures::future::join_all(tasks).await {
            assert!(task.unwrap().is_ok());
        }

        assert!(inner.peak.load(Ordering::SeqCst) <= 2);
        assert_eq!(gated.name(), "slow");
    }

    #[tokio::test]
    async fn test_zero_limit_still_admits_calls() {
        let gated = GatedAssistant::new(Arc::new(SlowService::default()), 0);
        assert!(gated.create_thread("solo").await.is_ok());
    }
}
