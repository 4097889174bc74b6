//! Configuration Types
//!
//! All configuration structures with sensible defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::ai::assistant::AgentRole;
use crate::ai::timeout::PollPolicy;
use crate::constants::{assistant, forecast, network, polling};
use crate::types::{ForecastError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Assistants service settings
    pub assistant: AssistantConfig,

    /// Forecast workflow settings
    pub forecast: ForecastConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            assistant: AssistantConfig::default(),
            forecast: ForecastConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `ForecastError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        let a = &self.assistant;

        if a.max_attachments_per_message == 0 {
            return Err(ForecastError::Config(
                "assistant.max_attachments_per_message must be greater than 0".to_string(),
            ));
        }

        if a.poll_interval_secs == 0 {
            return Err(ForecastError::Config(
                "assistant.poll_interval_secs must be greater than 0".to_string(),
            ));
        }

        if a.poll_interval_secs >= a.run_timeout_secs {
            return Err(ForecastError::Config(format!(
                "assistant.poll_interval_secs ({}) must be less than run_timeout_secs ({})",
                a.poll_interval_secs, a.run_timeout_secs
            )));
        }

        if a.max_concurrent_requests == 0 {
            return Err(ForecastError::Config(
                "assistant.max_concurrent_requests must be greater than 0".to_string(),
            ));
        }

        url::Url::parse(&a.api_base).map_err(|e| {
            ForecastError::Config(format!("assistant.api_base '{}' is invalid: {}", a.api_base, e))
        })?;

        if self.forecast.regions.is_empty() {
            return Err(ForecastError::Config(
                "forecast.regions must name at least one region".to_string(),
            ));
        }

        if self.forecast.regions.iter().any(|r| r.trim().is_empty()) {
            return Err(ForecastError::Config(
                "forecast.regions must not contain blank entries".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// Assistant Configuration
// =============================================================================

/// Assistants service connection and run settings
///
/// The API key is never serialized and is redacted in debug output.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// API base URL
    pub api_base: String,

    /// API key (falls back to OPENAI_API_KEY)
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Per-request HTTP timeout in seconds
    pub request_timeout_secs: u64,

    /// Service-imposed attachment cap per message
    pub max_attachments_per_message: usize,

    /// Wall-clock budget for one run in seconds
    pub run_timeout_secs: u64,

    /// Seconds between run status polls
    pub poll_interval_secs: u64,

    /// Outbound request concurrency shared by all runs
    pub max_concurrent_requests: usize,

    /// Assistant id of the forecaster role
    pub forecaster_id: Option<String>,

    /// Assistant id of the critic role
    pub critic_id: Option<String>,

    /// Assistant id of the data assessment role
    pub assessor_id: Option<String>,
}

impl std::fmt::Debug for AssistantConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssistantConfig")
            .field("api_base", &self.api_base)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field(
                "max_attachments_per_message",
                &self.max_attachments_per_message,
            )
            .field("run_timeout_secs", &self.run_timeout_secs)
            .field("poll_interval_secs", &self.poll_interval_secs)
            .field("max_concurrent_requests", &self.max_concurrent_requests)
            .field("forecaster_id", &self.forecaster_id)
            .field("critic_id", &self.critic_id)
            .field("assessor_id", &self.assessor_id)
            .finish()
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            api_base: assistant::DEFAULT_API_BASE.to_string(),
            api_key: None,
            request_timeout_secs: network::REQUEST_TIMEOUT_SECS,
            max_attachments_per_message: assistant::MAX_ATTACHMENTS_PER_MESSAGE,
            run_timeout_secs: polling::RUN_TIMEOUT_SECS,
            poll_interval_secs: polling::POLL_INTERVAL_SECS,
            max_concurrent_requests: assistant::MAX_CONCURRENT_REQUESTS,
            forecaster_id: None,
            critic_id: None,
            assessor_id: None,
        }
    }
}

impl AssistantConfig {
    /// Polling policy for awaiting runs
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy::new(
            Duration::from_secs(self.run_timeout_secs),
            Duration::from_secs(self.poll_interval_secs),
        )
    }

    /// Resolve the assistant id configured for `role`, naming the missing key on failure
    pub fn require_id(&self, role: AgentRole) -> Result<String> {
        let (key, value) = match role {
            AgentRole::Forecaster => ("forecaster_id", &self.forecaster_id),
            AgentRole::Critic => ("critic_id", &self.critic_id),
            AgentRole::Assessor => ("assessor_id", &self.assessor_id),
        };
        value.clone().filter(|id| !id.is_empty()).ok_or_else(|| {
            ForecastError::Config(format!(
                "assistant.{} is not set (config file or SWELLCAST_ASSISTANT__{})",
                key,
                key.to_uppercase()
            ))
        })
    }
}

// =============================================================================
// Forecast Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Critique/revision cycles per run
    pub refinement_cycles: usize,

    /// Regions forecast when none is given on the command line
    pub regions: Vec<String>,

    /// Artifact output directory
    pub output_dir: PathBuf,

    /// Override of the forecast's section headings
    pub structure_template: Option<Vec<String>>,

    /// Also write a Markdown rendering next to the JSON artifact
    pub write_markdown: bool,

    /// Run the data assessment role before forecasting
    pub assess_data: bool,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            refinement_cycles: forecast::DEFAULT_REFINEMENT_CYCLES,
            regions: vec!["North Shore".to_string(), "South Shore".to_string()],
            output_dir: PathBuf::from(forecast::DEFAULT_OUTPUT_DIR),
            structure_template: None,
            write_markdown: true,
            assess_data: true,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.assistant.max_attachments_per_message, 10);
        assert_eq!(config.assistant.poll_interval_secs, 5);
        assert_eq!(config.forecast.refinement_cycles, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_attachment_cap() {
        let mut config = Config::default();
        config.assistant.max_attachments_per_message = 0;
        assert!(matches!(config.validate(), Err(ForecastError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_interval_not_below_timeout() {
        let mut config = Config::default();
        config.assistant.poll_interval_secs = 300;
        config.assistant.run_timeout_secs = 300;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_api_base() {
        let mut config = Config::default();
        config.assistant.api_base = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_regions() {
        let mut config = Config::default();
        config.forecast.regions = vec!["  ".to_string()];
        assert!(config.validate().is_err());

        config.forecast.regions.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_blank_region_among_named() {
        let mut config = Config::default();
        config.forecast.regions = vec!["North Shore".to_string(), String::new()];
        assert!(matches!(config.validate(), Err(ForecastError::Config(_))));
    }

    #[test]
    fn test_api_key_redacted_and_not_serialized() {
        let config = AssistantConfig {
            api_key: Some("sk-secret".to_string()),
            ..AssistantConfig::default()
        };
        assert!(!format!("{:?}", config).contains("sk-secret"));
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("sk-secret"));
    }

    #[test]
    fn test_require_id() {
        let config = AssistantConfig {
            forecaster_id: Some("asst_f".to_string()),
            critic_id: Some(String::new()),
            ..AssistantConfig::default()
        };
        assert_eq!(config.require_id(AgentRole::Forecaster).unwrap(), "asst_f");
        assert!(config.require_id(AgentRole::Critic).is_err());

        let err = config.require_id(AgentRole::Assessor).unwrap_err();
        assert!(err.to_string().contains("assistant.assessor_id"));
        assert!(err.to_string().contains("SWELLCAST_ASSISTANT__ASSESSOR_ID"));
    }

    #[test]
    fn test_poll_policy_from_config() {
        let policy = AssistantConfig::default().poll_policy();
        assert_eq!(policy.timeout, Duration::from_secs(300));
        assert_eq!(policy.interval, Duration::from_secs(5));
    }
}
