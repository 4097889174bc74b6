//! Assistant Integration Layer
//!
//! Everything between the refinement engine and the hosted assistants
//! service: the service boundary, thread lifecycle, attachment batching,
//! polling budgets and prompt construction.

pub mod assistant;
pub mod batching;
pub mod prompt;
pub mod thread;
pub mod timeout;

pub use assistant::{
    Agent, AgentRole, AssistantService, GatedAssistant, OpenAiAssistant, RunHandle, RunState,
    RunStatus, SharedAssistant, ThreadHandle, create_service,
};
pub use batching::{MessageBatch, plan_batches};
pub use prompt::{PromptBuilder, PromptSection};
pub use thread::ConversationThread;
pub use timeout::{PollPolicy, with_timeout};
