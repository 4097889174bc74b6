//! Data Assessment
//!
//! Optional pre-pass: the assessor role reviews the whole evidence set once
//! and its report is folded into every region's drafting prompt.

use tracing::{info, instrument};

use super::bundle::EvidenceBundle;
use super::prompts::build_assessment_prompt;
use crate::ai::assistant::{Agent, AgentRole, SharedAssistant};
use crate::ai::batching::plan_batches;
use crate::ai::thread::ConversationThread;
use crate::ai::timeout::PollPolicy;
use crate::config::Config;
use crate::types::{RefinementPhase, Result};

pub struct DataAssessment {
    service: SharedAssistant,
    assessor: Agent,
    max_attachments_per_message: usize,
    poll: PollPolicy,
}

impl DataAssessment {
    pub fn new(
        service: SharedAssistant,
        assessor: Agent,
        max_attachments_per_message: usize,
        poll: PollPolicy,
    ) -> Self {
        Self {
            service,
            assessor,
            max_attachments_per_message,
            poll,
        }
    }

    /// `None` when assessment is disabled or no assessor is configured
    pub fn from_config(service: SharedAssistant, config: &Config) -> Option<Self> {
        if !config.forecast.assess_data {
            return None;
        }
        let assessor_id = config.assistant.require_id(AgentRole::Assessor).ok()?;
        Some(Self::new(
            service,
            Agent::new(AgentRole::Assessor, assessor_id),
            config.assistant.max_attachments_per_message,
            config.assistant.poll_policy(),
        ))
    }

    /// Assess the bundle's evidence on a scoped thread and return the report
    #[instrument(skip(self, bundle), fields(bundle = %bundle.bundle_id, files = bundle.uploaded_file_ids.len()))]
    pub async fn assess(&self, bundle: &EvidenceBundle) -> Result<String> {
        let label = format!("assessment_{}", bundle.bundle_id);
        let thread = ConversationThread::create(self.service.clone(), &label)
            .await
            .map_err(|e| e.in_phase(RefinementPhase::Assessing, None))?;

        let batches = plan_batches(
            &build_assessment_prompt(bundle.uploaded_file_ids.len()),
            &bundle.uploaded_file_ids,
            self.max_attachments_per_message,
        );

        let outcome = async {
            thread.post_batched(&batches).await?;
            thread.run_and_reply(&self.assessor, self.poll).await
        }
        .await;

        thread.destroy().await;

        let report = outcome.map_err(|e| e.in_phase(RefinementPhase::Assessing, None))?;
        info!("Data assessment complete ({} chars)", report.len());
        Ok(report)
    }
}
