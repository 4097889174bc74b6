//! Forecast Data Model
//!
//! Inputs and outputs of a single refinement run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque reference to an evidence file already uploaded to the assistants service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(String);

impl FileId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FileId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for FileId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// =============================================================================
// Request
// =============================================================================

/// Immutable input to one refinement run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastRequest {
    target_region: String,
    evidence_file_ids: Vec<FileId>,
    assessment_report: Option<String>,
}

impl ForecastRequest {
    pub fn new(target_region: impl Into<String>, evidence_file_ids: Vec<FileId>) -> Self {
        Self {
            target_region: target_region.into(),
            evidence_file_ids,
            assessment_report: None,
        }
    }

    /// Attach a prior data-quality assessment narrative
    pub fn with_assessment(mut self, report: impl Into<String>) -> Self {
        self.assessment_report = Some(report.into());
        self
    }

    pub fn target_region(&self) -> &str {
        &self.target_region
    }

    pub fn evidence_file_ids(&self) -> &[FileId] {
        &self.evidence_file_ids
    }

    pub fn assessment_report(&self) -> Option<&str> {
        self.assessment_report.as_deref()
    }
}

// =============================================================================
// Refinement Phases
// =============================================================================

/// States of the refinement state machine.
///
/// ```text
/// Drafting -> Critiquing -> Revising -> (Critiquing | Persisting)
/// ```
///
/// `Assessing` precedes `Drafting` only when a data assessment is requested.
/// A run that leaves `Persisting` without error is done; errors carry the
/// phase they were raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefinementPhase {
    Assessing,
    Drafting,
    Critiquing,
    Revising,
    Persisting,
}

impl RefinementPhase {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Assessing => "Assessing",
            Self::Drafting => "Drafting",
            Self::Critiquing => "Critiquing",
            Self::Revising => "Revising",
            Self::Persisting => "Persisting",
        }
    }
}

impl std::fmt::Display for RefinementPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Result
// =============================================================================

/// One critique -> revision pair, numbered from 1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefinementCycle {
    pub cycle_index: usize,
    pub critique: String,
    pub revised_forecast: String,
}

/// Terminal artifact of a refinement run, with full provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastResult {
    pub run_id: Uuid,
    pub region: String,
    pub initial_forecast: String,
    pub final_forecast: String,
    pub cycles: Vec<RefinementCycle>,
    pub cycle_count: usize,
    pub generated_at: DateTime<Utc>,
    pub evidence_file_count: usize,
}

impl ForecastResult {
    /// Assemble the final artifact.
    ///
    /// `final_forecast` is the last revision, or the initial draft when no
    /// cycles ran; `cycle_count` always equals `cycles.len()`.
    pub fn assemble(
        run_id: Uuid,
        region: impl Into<String>,
        initial_forecast: String,
        cycles: Vec<RefinementCycle>,
        evidence_file_count: usize,
    ) -> Self {
        let final_forecast = cycles
            .last()
            .map(|c| c.revised_forecast.clone())
            .unwrap_or_else(|| initial_forecast.clone());

        Self {
            run_id,
            region: region.into(),
            initial_forecast,
            final_forecast,
            cycle_count: cycles.len(),
            cycles,
            generated_at: Utc::now(),
            evidence_file_count,
        }
    }

    /// Check the provenance invariants
    pub fn is_consistent(&self) -> bool {
        let indices_ok = self
            .cycles
            .iter()
            .enumerate()
            .all(|(i, c)| c.cycle_index == i + 1);
        let final_ok = match self.cycles.last() {
            Some(last) => self.final_forecast == last.revised_forecast,
            None => self.final_forecast == self.initial_forecast,
        };
        self.cycles.len() == self.cycle_count && indices_ok && final_ok
    }
}
