//! Conversation Threads
//!
//! A `ConversationThread` owns one remote thread. Callers drive it through
//! post → run → await → read, then hand it back with `destroy`, which is
//! best-effort and never fails the caller.
//!
//! A thread dropped without `destroy` (its owning future was abandoned) is
//! deleted in the background on the current tokio runtime.

use tracing::{debug, warn};

use super::assistant::{Agent, RunHandle, RunStatus, SharedAssistant, ThreadHandle};
use super::batching::MessageBatch;
use super::timeout::{PollPolicy, with_timeout};
use crate::types::{FileId, ForecastError, Result};

pub struct ConversationThread {
    service: SharedAssistant,
    handle: ThreadHandle,
    released: bool,
}

impl std::fmt::Debug for ConversationThread {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationThread")
            .field("service", &self.service.name())
            .field("handle", &self.handle)
            .finish()
    }
}

impl ConversationThread {
    /// Allocate a new remote thread
    pub async fn create(service: SharedAssistant, label: &str) -> Result<Self> {
        let handle = service.create_thread(label).await?;
        debug!(thread = %handle.id, label, "thread created");
        Ok(Self {
            service,
            handle,
            released: false,
        })
    }

    pub fn id(&self) -> &str {
        &self.handle.id
    }

    pub fn label(&self) -> &str {
        &self.handle.label
    }

    pub async fn post_message(&self, text: &str, attachments: &[FileId]) -> Result<()> {
        self.service
            .post_message(&self.handle, text, attachments)
            .await
    }

    /// Post a planned sequence of messages in order
    pub async fn post_batched(&self, batches: &[MessageBatch]) -> Result<()> {
        for (i, batch) in batches.iter().enumerate() {
            debug!(
                thread = %self.handle.id,
                batch = i + 1,
                attachments = batch.attachments.len(),
                "posting message"
            );
            self.post_message(&batch.text, &batch.attachments).await?;
        }
        Ok(())
    }

    /// Start `agent` on this thread's accumulated context
    pub async fn run_agent(&self, agent: &Agent) -> Result<RunHandle> {
        debug!(thread = %self.handle.id, role = %agent.role, "starting run");
        self.service
            .create_run(&self.handle, &agent.assistant_id)
            .await
    }

    /// Poll until the run reaches a terminal status or the policy budget runs out.
    ///
    /// `completed` returns `Ok`; any other terminal status becomes
    /// `ForecastError::RunFailed` carrying the provider's error detail.
    pub async fn await_completion(&self, run: &RunHandle, policy: PollPolicy) -> Result<()> {
        let operation = format!("run {} on thread {}", run.id, run.thread_id);

        let terminal = with_timeout(
            policy.timeout,
            async {
                loop {
                    let state = self.service.run_state(run).await?;
                    if state.status.is_terminal() {
                        return Ok(state);
                    }
                    debug!(run = %run.id, status = %state.status, "run pending");
                    tokio::time::sleep(policy.interval).await;
                }
            },
            &operation,
        )
        .await?;

        match terminal.status {
            RunStatus::Completed => Ok(()),
            status => Err(ForecastError::RunFailed {
                run_id: run.id.clone(),
                status: status.to_string(),
                detail: terminal
                    .last_error
                    .unwrap_or_else(|| "no error detail provided".to_string()),
            }),
        }
    }

    /// Text of the latest assistant message; absence after a completed run is
    /// a contract break
    pub async fn latest_reply(&self) -> Result<String> {
        self.service
            .latest_assistant_message(&self.handle)
            .await?
            .ok_or_else(|| ForecastError::NoReply {
                thread_id: self.handle.id.clone(),
            })
    }

    /// Run `agent`, wait for it, and return its reply
    pub async fn run_and_reply(&self, agent: &Agent, policy: PollPolicy) -> Result<String> {
        let run = self.run_agent(agent).await?;
        self.await_completion(&run, policy).await?;
        self.latest_reply().await
    }

    /// Delete the remote thread. Failures are logged, never returned.
    pub async fn destroy(mut self) {
        self.released = true;
        release(&self.service, &self.handle).await;
    }
}

impl Drop for ConversationThread {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(
                "Thread {} ({}) abandoned outside a runtime; not deleted",
                self.handle.id, self.handle.label
            );
            return;
        };

        debug!(thread = %self.handle.id, "thread abandoned, deleting in background");
        let service = self.service.clone();
        let handle = self.handle.clone();
        runtime.spawn(async move {
            release(&service, &handle).await;
        });
    }
}

async fn release(service: &SharedAssistant, handle: &ThreadHandle) {
    match service.delete_thread(handle).await {
        Ok(()) => debug!(thread = %handle.id, "thread deleted"),
        Err(e) => warn!(
            "Failed to delete thread {} ({}): {}",
            handle.id, handle.label, e
        ),
    }
}
