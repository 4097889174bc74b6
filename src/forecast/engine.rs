//! Refinement State Machine
//!
//! Drives one forecast through draft → (critique → revision)* on the hosted
//! assistants service.
//!
//! ## Thread ownership
//!
//! - One forecast thread per run, created in `Drafting` and reused for every
//!   revision so the forecaster keeps its context.
//! - One critique thread per cycle, created and destroyed inside that cycle.
//!   The critic only ever sees the current forecast text.
//!
//! Every thread is destroyed on every exit path, including a caller dropping
//! the `run` future mid-flight. Destruction failures are logged and never
//! replace the run's own outcome.
//!
//! ## Failure
//!
//! Any error aborts the run. Partial cycles are dropped and the caller gets
//! a `ForecastError::Phase` naming where it happened; `root()` yields the
//! unchanged cause.

use std::path::PathBuf;

use tracing::{info, instrument};
use uuid::Uuid;

use super::persistence::{ArtifactWriter, region_slug};
use super::prompts::{
    PromptOptions, build_critique_prompt, build_initial_prompt, build_revision_prompt,
};
use crate::ai::assistant::{Agent, AgentRole, SharedAssistant};
use crate::ai::batching::plan_batches;
use crate::ai::thread::ConversationThread;
use crate::ai::timeout::PollPolicy;
use crate::config::Config;
use crate::types::{ForecastRequest, ForecastResult, RefinementCycle, RefinementPhase, Result};

/// Engine tuning, resolved from `Config`
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub refinement_cycles: usize,
    pub max_attachments_per_message: usize,
    pub poll: PollPolicy,
    pub structure_template: Option<Vec<String>>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl EngineConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            refinement_cycles: config.forecast.refinement_cycles,
            max_attachments_per_message: config.assistant.max_attachments_per_message,
            poll: config.assistant.poll_policy(),
            structure_template: config.forecast.structure_template.clone(),
        }
    }
}

pub struct ForecastEngine {
    service: SharedAssistant,
    forecaster: Agent,
    critic: Agent,
    config: EngineConfig,
}

impl ForecastEngine {
    pub fn new(
        service: SharedAssistant,
        forecaster: Agent,
        critic: Agent,
        config: EngineConfig,
    ) -> Self {
        Self {
            service,
            forecaster,
            critic,
            config,
        }
    }

    /// Build an engine whose roles come from `[assistant]` config
    pub fn from_config(service: SharedAssistant, config: &Config) -> Result<Self> {
        let forecaster = Agent::new(
            AgentRole::Forecaster,
            config.assistant.require_id(AgentRole::Forecaster)?,
        );
        let critic = Agent::new(
            AgentRole::Critic,
            config.assistant.require_id(AgentRole::Critic)?,
        );
        Ok(Self::new(
            service,
            forecaster,
            critic,
            EngineConfig::from_config(config),
        ))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run the full refinement loop for one request.
    ///
    /// The forecast thread is released before this returns, on success and
    /// on failure alike.
    #[instrument(skip(self, request), fields(region = %request.target_region(), evidence = request.evidence_file_ids().len()))]
    pub async fn run(&self, request: &ForecastRequest) -> Result<ForecastResult> {
        let run_id = Uuid::new_v4();
        let label = format!("forecast_{}", region_slug(request.target_region()));

        let thread = ConversationThread::create(self.service.clone(), &label)
            .await
            .map_err(|e| e.in_phase(RefinementPhase::Drafting, None))?;

        let outcome = self.refine(&thread, request, run_id).await;
        thread.destroy().await;

        if let Ok(result) = &outcome {
            info!(
                "Forecast {} for {} complete after {} cycle(s)",
                result.run_id, result.region, result.cycle_count
            );
        }
        outcome
    }

    /// Run, then write the artifact. A persistence failure still carries the
    /// finished result so the caller can save it elsewhere.
    pub async fn run_and_persist(
        &self,
        request: &ForecastRequest,
        writer: &ArtifactWriter,
    ) -> Result<(ForecastResult, PathBuf)> {
        let result = self.run(request).await?;

        match writer.persist(&result).await {
            Ok(path) => Ok((result, path)),
            Err(e) => Err(e
                .with_unsaved(result)
                .in_phase(RefinementPhase::Persisting, None)),
        }
    }

    async fn refine(
        &self,
        thread: &ConversationThread,
        request: &ForecastRequest,
        run_id: Uuid,
    ) -> Result<ForecastResult> {
        let region = request.target_region();
        let poll = self.config.poll;

        info!("Drafting: {} evidence file(s)", request.evidence_file_ids().len());
        let options = PromptOptions::new(region)
            .with_assessment(request.assessment_report())
            .with_structure(self.config.structure_template.clone());
        let batches = plan_batches(
            &build_initial_prompt(&options),
            request.evidence_file_ids(),
            self.config.max_attachments_per_message,
        );

        let initial = async {
            thread.post_batched(&batches).await?;
            thread.run_and_reply(&self.forecaster, poll).await
        }
        .await
        .map_err(|e| e.in_phase(RefinementPhase::Drafting, None))?;

        let mut current = initial.clone();
        let mut cycles = Vec::with_capacity(self.config.refinement_cycles);

        for cycle_index in 1..=self.config.refinement_cycles {
            info!(
                "Critiquing: cycle {}/{}",
                cycle_index, self.config.refinement_cycles
            );
            let critique = self
                .critique(&current, region, poll)
                .await
                .map_err(|e| e.in_phase(RefinementPhase::Critiquing, Some(cycle_index)))?;

            info!(
                "Revising: cycle {}/{}",
                cycle_index, self.config.refinement_cycles
            );
            let revised = async {
                thread
                    .post_message(&build_revision_prompt(&current, &critique), &[])
                    .await?;
                thread.run_and_reply(&self.forecaster, poll).await
            }
            .await
            .map_err(|e| e.in_phase(RefinementPhase::Revising, Some(cycle_index)))?;

            cycles.push(RefinementCycle {
                cycle_index,
                critique,
                revised_forecast: revised.clone(),
            });
            current = revised;
        }

        Ok(ForecastResult::assemble(
            run_id,
            region,
            initial,
            cycles,
            request.evidence_file_ids().len(),
        ))
    }

    /// One isolated critique on a throwaway thread
    async fn critique(&self, forecast: &str, region: &str, poll: PollPolicy) -> Result<String> {
        let thread = ConversationThread::create(self.service.clone(), "forecast_critique").await?;

        let outcome = async {
            thread
                .post_message(&build_critique_prompt(forecast, region), &[])
                .await?;
            thread.run_and_reply(&self.critic, poll).await
        }
        .await;

        thread.destroy().await;
        outcome
    }
}
