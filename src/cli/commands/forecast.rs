//! Forecast Command
//!
//! Runs the refinement engine for one or more regions over a shared evidence
//! set.
//!
//! Usage:
//!   swellcast forecast --bundle data/<id>/bundle_metadata.json
//!   swellcast forecast --file-id file-abc --file-id file-def --region "North Shore"
//!   swellcast forecast --bundle meta.json --cycles 3 --output out/

use std::path::PathBuf;
use std::sync::Arc;

use futures::future::join_all;
use tokio::runtime::Runtime;
use tracing::{error, info, warn};

use crate::ai::assistant::{SharedAssistant, create_service};
use crate::cli::ui::output::Output;
use crate::cli::util::{load_config, resolve_evidence};
use crate::config::Config;
use crate::forecast::{ArtifactWriter, DataAssessment, EvidenceBundle, ForecastEngine};
use crate::types::{ForecastError, ForecastRequest, Result};

/// Forecast run options (consolidated CLI parameters)
#[derive(Debug, Clone, Default)]
pub struct ForecastRunOptions {
    /// Regions to forecast; empty means every configured region
    pub regions: Vec<String>,
    /// Collector bundle metadata
    pub bundle: Option<PathBuf>,
    /// Extra evidence file ids
    pub file_ids: Vec<String>,
    /// Pre-written assessment report, used instead of an assessor run
    pub assessment_file: Option<PathBuf>,
    /// Skip the assessor run
    pub skip_assessment: bool,
    /// Refinement cycle override
    pub cycles: Option<usize>,
    /// Output directory override
    pub output: Option<PathBuf>,
    /// Disable the Markdown rendering
    pub no_markdown: bool,
    /// Explicit config file
    pub config_path: Option<PathBuf>,
}

/// Per-region outcome of a forecast command
#[derive(Debug, Default)]
pub struct ForecastSummary {
    pub saved: Vec<(String, PathBuf)>,
    pub failed: Vec<(String, ForecastError)>,
}

impl ForecastSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Apply CLI overrides on top of the resolved configuration
pub fn apply_overrides(config: &mut Config, options: &ForecastRunOptions) -> Result<()> {
    if let Some(cycles) = options.cycles {
        config.forecast.refinement_cycles = cycles;
    }
    if let Some(output) = &options.output {
        config.forecast.output_dir = output.clone();
    }
    if options.no_markdown {
        config.forecast.write_markdown = false;
    }
    if options.skip_assessment {
        config.forecast.assess_data = false;
    }
    if !options.regions.is_empty() {
        config.forecast.regions = options.regions.clone();
    }
    config.validate()
}

pub fn run(options: ForecastRunOptions) -> Result<ForecastSummary> {
    let mut config = load_config(options.config_path.as_deref())?;
    apply_overrides(&mut config, &options)?;

    let evidence = resolve_evidence(options.bundle.as_ref(), &options.file_ids)?;
    let output = Output::new();

    if evidence.is_empty() {
        output.warning("No evidence files given; the forecaster will work without attachments");
    }

    let explicit_report = match &options.assessment_file {
        Some(path) => Some(std::fs::read_to_string(path).map_err(|e| {
            ForecastError::Config(format!(
                "Cannot read assessment {}: {}",
                path.display(),
                e
            ))
        })?),
        None => None,
    };

    let rt = Runtime::new()?;
    rt.block_on(run_async(&config, evidence, explicit_report, &output))
}

async fn run_async(
    config: &Config,
    evidence: EvidenceBundle,
    explicit_report: Option<String>,
    output: &Output,
) -> Result<ForecastSummary> {
    let service = create_service(&config.assistant)?;
    let engine = Arc::new(ForecastEngine::from_config(service.clone(), config)?);
    let writer = ArtifactWriter::new(&config.forecast.output_dir)
        .with_markdown(config.forecast.write_markdown);

    output.header(&format!(
        "Forecasting {} region(s) from bundle {}",
        config.forecast.regions.len(),
        evidence.bundle_id
    ));
    output.info(&format!(
        "{} evidence file(s), {} refinement cycle(s), output → {}",
        evidence.uploaded_file_ids.len(),
        engine.config().refinement_cycles,
        writer.output_dir().display()
    ));

    let report = match explicit_report {
        Some(report) => Some(report),
        None => assess(service.clone(), config, &evidence, output).await,
    };

    // Regions are independent; one failure never cancels the others
    let runs = config.forecast.regions.iter().map(|region| {
        let mut request = ForecastRequest::new(region.clone(), evidence.uploaded_file_ids.clone());
        if let Some(report) = &report {
            request = request.with_assessment(report.clone());
        }
        let engine = engine.clone();
        let writer = writer.clone();
        async move {
            let outcome = engine.run_and_persist(&request, &writer).await;
            (request.target_region().to_string(), outcome)
        }
    });

    let mut summary = ForecastSummary::default();
    for (region, outcome) in join_all(runs).await {
        match outcome {
            Ok((result, path)) => {
                output.forecast_saved(&result, &path);
                summary.saved.push((region, path));
            }
            Err(e) => {
                error!("Forecast for {} failed: {}", region, e);
                output.forecast_failed(&region, &e);
                rescue_unsaved(&e, output).await;
                summary.failed.push((region, e));
            }
        }
    }

    info!(
        "Forecast run finished: {} saved, {} failed",
        summary.saved.len(),
        summary.failed.len()
    );
    Ok(summary)
}

/// Run the assessor if configured; a failed assessment only loses the report
async fn assess(
    service: SharedAssistant,
    config: &Config,
    evidence: &EvidenceBundle,
    output: &Output,
) -> Option<String> {
    let assessment = DataAssessment::from_config(service, config)?;
    if evidence.is_empty() {
        return None;
    }

    output.info("Assessing evidence quality...");
    match assessment.assess(evidence).await {
        Ok(report) => Some(report),
        Err(e) => {
            warn!("Data assessment failed, continuing without it: {}", e);
            output.warning(&format!("Data assessment skipped: {}", e));
            None
        }
    }
}

/// Save a finished-but-unpersisted result to the temp directory
async fn rescue_unsaved(error: &ForecastError, output: &Output) {
    let Some(result) = error.unsaved() else {
        return;
    };

    let fallback = ArtifactWriter::new(std::env::temp_dir().join("swellcast"));
    match fallback.persist(result).await {
        Ok(path) => output.warning(&format!(
            "Forecast for {} saved to fallback location {}",
            result.region,
            path.display()
        )),
        Err(e) => output.error(&format!("Fallback save failed: {}", e)),
    }
}
