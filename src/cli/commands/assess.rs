//! Assess Command
//!
//! Runs only the data assessment role over an evidence set. The report can be
//! saved and later passed to `forecast --assessment-file`.

use std::path::PathBuf;

use tokio::runtime::Runtime;

use crate::ai::assistant::{Agent, AgentRole, create_service};
use crate::cli::ui::output::Output;
use crate::cli::util::{load_config, resolve_evidence};
use crate::forecast::DataAssessment;
use crate::types::{ForecastError, Result};

pub fn run(
    bundle: Option<PathBuf>,
    file_ids: Vec<String>,
    save_to: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(config_path.as_deref())?;
    let evidence = resolve_evidence(bundle.as_ref(), &file_ids)?;
    let output = Output::new();

    if evidence.is_empty() {
        return Err(ForecastError::Config(
            "Nothing to assess: pass --bundle or --file-id".to_string(),
        ));
    }

    // Explicit command: a missing assessor id is an error, not a skip
    let assessor_id = config.assistant.require_id(AgentRole::Assessor)?;

    let rt = Runtime::new()?;
    let report = rt.block_on(async {
        let service = create_service(&config.assistant)?;
        let assessment = DataAssessment::new(
            service,
            Agent::new(AgentRole::Assessor, assessor_id),
            config.assistant.max_attachments_per_message,
            config.assistant.poll_policy(),
        );
        output.info(&format!(
            "Assessing {} file(s) from bundle {}...",
            evidence.uploaded_file_ids.len(),
            evidence.bundle_id
        ));
        assessment.assess(&evidence).await
    })?;

    match save_to {
        Some(path) => {
            std::fs::write(&path, &report)
                .map_err(|e| ForecastError::persistence(&path, e))?;
            output.success(&format!("Assessment saved to {}", path.display()));
        }
        None => {
            output.section("Data Assessment");
            println!("{}", report);
        }
    }

    Ok(())
}
