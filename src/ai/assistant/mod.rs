//! Assistants Service Abstraction
//!
//! Defines the `AssistantService` trait: the thread / message / run primitives
//! of a hosted, stateful LLM assistant service. Everything above this layer
//! talks to the service only through this trait.
//!
//! ## Modules
//!
//! - `openai`: OpenAI Assistants v2 HTTP client
//! - `gate`: semaphore wrapper bounding outbound concurrency across runs

mod gate;
mod openai;
#[cfg(test)]
pub(crate) mod scripted;

pub use gate::GatedAssistant;
pub use openai::OpenAiAssistant;

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::config::AssistantConfig;
use crate::types::{FileId, Result};

// =============================================================================
// Handles
// =============================================================================

/// Remote conversation context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadHandle {
    pub id: String,
    /// Advisory label for diagnostics only
    pub label: String,
}

/// One invocation of an assistant against a thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunHandle {
    pub id: String,
    pub thread_id: String,
}

/// Remote run lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Completed,
    Failed,
    Cancelled,
    Expired,
    Incomplete,
}

impl RunStatus {
    /// No further transitions will happen
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Failed | Self::Cancelled | Self::Expired | Self::Incomplete
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::InProgress => "in_progress",
            Self::RequiresAction => "requires_action",
            Self::Cancelling => "cancelling",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
            Self::Incomplete => "incomplete",
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a run as reported by the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunState {
    pub status: RunStatus,
    /// Provider-supplied failure detail
    pub last_error: Option<String>,
}

impl RunState {
    pub fn new(status: RunStatus) -> Self {
        Self {
            status,
            last_error: None,
        }
    }
}

// =============================================================================
// Roles
// =============================================================================

/// LLM persona invoked on a thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentRole {
    /// Drafts and revises the forecast
    Forecaster,
    /// Reviews a draft in isolation
    Critic,
    /// Reviews evidence data quality
    Assessor,
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Forecaster => write!(f, "forecaster"),
            Self::Critic => write!(f, "critic"),
            Self::Assessor => write!(f, "assessor"),
        }
    }
}

/// A role bound to the remote assistant that plays it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agent {
    pub role: AgentRole,
    pub assistant_id: String,
}

impl Agent {
    pub fn new(role: AgentRole, assistant_id: impl Into<String>) -> Self {
        Self {
            role,
            assistant_id: assistant_id.into(),
        }
    }
}

// =============================================================================
// Service Trait
// =============================================================================

/// Thread/message/run primitives of the hosted assistants service
#[async_trait]
pub trait AssistantService: Send + Sync {
    /// Allocate a new conversation thread
    async fn create_thread(&self, label: &str) -> Result<ThreadHandle>;

    /// Append a user message; `attachments` must respect the service cap
    async fn post_message(
        &self,
        thread: &ThreadHandle,
        text: &str,
        attachments: &[FileId],
    ) -> Result<()>;

    /// Start an assistant run against the thread's accumulated context
    async fn create_run(&self, thread: &ThreadHandle, assistant_id: &str) -> Result<RunHandle>;

    /// Current status of a run
    async fn run_state(&self, run: &RunHandle) -> Result<RunState>;

    /// Text of the most recent assistant-authored message, if any
    async fn latest_assistant_message(&self, thread: &ThreadHandle) -> Result<Option<String>>;

    /// Delete a thread
    async fn delete_thread(&self, thread: &ThreadHandle) -> Result<()>;

    /// Service name for logging
    fn name(&self) -> &str;
}

/// Shared service handle for concurrent runs
pub type SharedAssistant = Arc<dyn AssistantService>;

/// Build the gated HTTP service from configuration
pub fn create_service(config: &AssistantConfig) -> Result<SharedAssistant> {
    let client = OpenAiAssistant::new(config)?;
    Ok(Arc::new(GatedAssistant::new(
        Arc::new(client),
        config.max_concurrent_requests,
    )))
}
