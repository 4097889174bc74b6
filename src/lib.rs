//! Swellcast - LLM-Driven Surf Forecast Refinement
//!
//! Orchestrates a hosted assistants service to draft a regional surf
//! forecast from uploaded evidence files, then improves it through isolated
//! critique and revision cycles. Every draft and critique is kept in the
//! persisted artifact.
//!
//! ## Core Features
//!
//! - **Refinement Loop**: draft → (critique → revise)* with per-cycle critic isolation
//! - **Scoped Threads**: every remote thread is released on every exit path
//! - **Attachment Batching**: evidence split across messages within the service cap
//! - **Phase-Attributed Errors**: failures name the phase and cycle they came from
//! - **Bounded Concurrency**: regional runs share one semaphore-gated client
//!
//! ## Quick Start
//!
//! ```ignore
//! use swellcast::{ArtifactWriter, ConfigLoader, ForecastEngine, ForecastRequest};
//! use swellcast::ai::create_service;
//!
//! let config = ConfigLoader::load()?;
//! let service = create_service(&config.assistant)?;
//! let engine = ForecastEngine::from_config(service, &config)?;
//! let request = ForecastRequest::new("North Shore", file_ids);
//! let (result, path) = engine
//!     .run_and_persist(&request, &ArtifactWriter::new("output"))
//!     .await?;
//! ```
//!
//! ## Modules
//!
//! - [`ai`]: assistants service boundary, threads, batching, polling, prompts
//! - [`forecast`]: refinement engine, prompt assembly, persistence
//! - [`config`]: layered configuration
//! - [`types`]: error taxonomy and forecast data model

pub mod ai;
pub mod cli;
pub mod config;
pub mod constants;
pub mod forecast;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{AssistantConfig, Config, ConfigLoader, ForecastConfig};

// Error Types
pub use types::error::{ErrorCategory, ForecastError, Result};

// Data Model
pub use types::{FileId, ForecastRequest, ForecastResult, RefinementCycle, RefinementPhase};

// =============================================================================
// Engine Re-exports
// =============================================================================

pub use forecast::{
    ArtifactWriter, DataAssessment, EngineConfig, EvidenceBundle, ForecastEngine, PromptOptions,
};

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{
    AssistantService, ConversationThread, GatedAssistant, OpenAiAssistant, PollPolicy,
    SharedAssistant, plan_batches, with_timeout,
};
