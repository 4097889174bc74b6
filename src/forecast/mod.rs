//! Forecast Refinement
//!
//! - `engine`: draft → critique → revise state machine
//! - `prompts`: role prompt assembly
//! - `persistence`: JSON (and Markdown) artifact writer
//! - `assessment`: optional data-quality pre-pass
//! - `bundle`: collector bundle metadata

pub mod assessment;
pub mod bundle;
pub mod engine;
pub mod persistence;
pub mod prompts;
pub mod render;

pub use assessment::DataAssessment;
pub use bundle::EvidenceBundle;
pub use engine::{EngineConfig, ForecastEngine};
pub use persistence::{ArtifactWriter, artifact_stem, region_slug};
pub use prompts::{
    PromptOptions, ShoreEmphasis, build_critique_prompt, build_initial_prompt,
    build_revision_prompt,
};
pub use render::render_markdown;
