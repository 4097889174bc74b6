//! In-memory assistants service for tests.
//!
//! Replies are queued per assistant id and appended to the thread when a run
//! completes. Every call is recorded so tests can assert on thread lifecycle.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use super::{AssistantService, RunHandle, RunState, RunStatus, ThreadHandle};
use crate::types::{FileId, ForecastError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PostedMessage {
    pub thread_id: String,
    pub text: String,
    pub attachments: Vec<FileId>,
}

#[derive(Debug, Clone)]
struct RunRecord {
    thread_id: String,
    assistant_id: String,
    /// 1-based order in which the run was created
    ordinal: usize,
    polls: usize,
    delivered: bool,
}

#[derive(Default)]
struct State {
    next_id: usize,
    threads: Vec<ThreadHandle>,
    thread_replies: HashMap<String, Vec<String>>,
    messages: Vec<PostedMessage>,
    runs: HashMap<String, RunRecord>,
    run_order: Vec<(String, String)>,
    deleted: Vec<String>,
}

#[derive(Default)]
pub(crate) struct ScriptedAssistant {
    state: Mutex<State>,
    replies: Mutex<HashMap<String, VecDeque<String>>>,
    polls_before_complete: usize,
    hang_assistant: Option<String>,
    fail_run: Option<(usize, RunStatus, String)>,
    fail_deletes: bool,
    fail_create_thread: bool,
}

impl ScriptedAssistant {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for the next completed run of `assistant_id`
    pub fn with_reply(self, assistant_id: &str, text: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .entry(assistant_id.to_string())
            .or_default()
            .push_back(text.to_string());
        self
    }

    /// Report `in_progress` this many times before completing
    pub fn with_polls_before_complete(mut self, polls: usize) -> Self {
        self.polls_before_complete = polls;
        self
    }

    /// Runs of `assistant_id` never leave `in_progress`
    pub fn hanging(mut self, assistant_id: &str) -> Self {
        self.hang_assistant = Some(assistant_id.to_string());
        self
    }

    /// The `nth` run created (1-based) ends with `status`
    pub fn failing_run(mut self, nth: usize, status: RunStatus, detail: &str) -> Self {
        self.fail_run = Some((nth, status, detail.to_string()));
        self
    }

    /// Every `delete_thread` call errors
    pub fn failing_deletes(mut self) -> Self {
        self.fail_deletes = true;
        self
    }

    /// Every `create_thread` call errors
    pub fn failing_thread_creation(mut self) -> Self {
        self.fail_create_thread = true;
        self
    }

    pub fn created_threads(&self) -> Vec<ThreadHandle> {
        self.state.lock().unwrap().threads.clone()
    }

    pub fn deleted_threads(&self) -> Vec<String> {
        self.state.lock().unwrap().deleted.clone()
    }

    pub fn messages(&self) -> Vec<PostedMessage> {
        self.state.lock().unwrap().messages.clone()
    }

    pub fn messages_in(&self, thread_id: &str) -> Vec<PostedMessage> {
        self.messages()
            .into_iter()
            .filter(|m| m.thread_id == thread_id)
            .collect()
    }

    /// `(thread_id, assistant_id)` per run, in creation order
    pub fn runs(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().run_order.clone()
    }

    /// Threads created but never deleted
    pub fn live_threads(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state
            .threads
            .iter()
            .map(|t| t.id.clone())
            .filter(|id| !state.deleted.contains(id))
            .collect()
    }
}

#[async_trait]
impl AssistantService for ScriptedAssistant {
    async fn create_thread(&self, label: &str) -> Result<ThreadHandle> {
        if self.fail_create_thread {
            return Err(ForecastError::ServiceUnavailable(
                "scripted thread creation failure".to_string(),
            ));
        }
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let handle = ThreadHandle {
            id: format!("thread_{}", state.next_id),
            label: label.to_string(),
        };
        state.threads.push(handle.clone());
        Ok(handle)
    }

    async fn post_message(
        &self,
        thread: &ThreadHandle,
        text: &str,
        attachments: &[FileId],
    ) -> Result<()> {
        self.state.lock().unwrap().messages.push(PostedMessage {
            thread_id: thread.id.clone(),
            text: text.to_string(),
            attachments: attachments.to_vec(),
        });
        Ok(())
    }

    async fn create_run(&self, thread: &ThreadHandle, assistant_id: &str) -> Result<RunHandle> {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = format!("run_{}", state.next_id);
        let ordinal = state.run_order.len() + 1;
        state
            .run_order
            .push((thread.id.clone(), assistant_id.to_string()));
        state.runs.insert(
            id.clone(),
            RunRecord {
                thread_id: thread.id.clone(),
                assistant_id: assistant_id.to_string(),
                ordinal,
                polls: 0,
                delivered: false,
            },
        );
        Ok(RunHandle {
            id,
            thread_id: thread.id.clone(),
        })
    }

    async fn run_state(&self, run: &RunHandle) -> Result<RunState> {
        let mut state = self.state.lock().unwrap();
        let record = state
            .runs
            .get_mut(&run.id)
            .ok_or_else(|| ForecastError::Api {
                status: 404,
                message: format!("no such run {}", run.id),
            })?;

        if self.hang_assistant.as_deref() == Some(record.assistant_id.as_str()) {
            return Ok(RunState::new(RunStatus::InProgress));
        }

        if let Some((nth, status, detail)) = &self.fail_run
            && record.ordinal == *nth
        {
            return Ok(RunState {
                status: *status,
                last_error: Some(detail.clone()),
            });
        }

        if record.polls < self.polls_before_complete {
            record.polls += 1;
            return Ok(RunState::new(RunStatus::InProgress));
        }

        if !record.delivered {
            record.delivered = true;
            let thread_id = record.thread_id.clone();
            let assistant_id = record.assistant_id.clone();
            let reply = self
                .replies
                .lock()
                .unwrap()
                .get_mut(&assistant_id)
                .and_then(|q| q.pop_front());
            if let Some(reply) = reply {
                state.thread_replies.entry(thread_id).or_default().push(reply);
            }
        }

        Ok(RunState::new(RunStatus::Completed))
    }

    async fn latest_assistant_message(&self, thread: &ThreadHandle) -> Result<Option<String>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .thread_replies
            .get(&thread.id)
            .and_then(|r| r.last().cloned()))
    }

    async fn delete_thread(&self, thread: &ThreadHandle) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.deleted.push(thread.id.clone());
        if self.fail_deletes {
            return Err(ForecastError::ServiceUnavailable(
                "scripted delete failure".to_string(),
            ));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
