//! Unified Error Type System
//!
//! Centralized error types for the entire application.
//! Every failure a refinement run can produce maps onto one `ForecastError`
//! variant, and every variant maps onto one `ErrorCategory` for retry decisions.
//!
//! ## Error Categories
//!
//! - **Auth**: Credentials rejected (fail fast, never retry)
//! - **Transient**: Service unreachable or overloaded (caller may retry the run)
//! - **Timeout**: Run exceeded its wall-clock budget (retry with a longer budget)
//! - **RunFailure**: Remote run failed, was cancelled or expired
//! - **Contract**: Service broke its own contract (completed run, no reply)
//! - **Persistence**: Artifact could not be written
//! - **BadRequest**: Upstream rejected the request as malformed
//! - **Config**: Local configuration problem

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use super::forecast::{ForecastResult, RefinementPhase};

// =============================================================================
// Error Categories
// =============================================================================

/// Error categories for retry and alerting decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Authentication failed - fail fast, don't retry
    Auth,
    /// Service unreachable, rate limited or 5xx - whole run may be retried
    Transient,
    /// Run exceeded its allotted wall-clock time
    Timeout,
    /// Remote run reported failed/cancelled/expired
    RunFailure,
    /// Invariant break on the service side (e.g. no assistant reply)
    Contract,
    /// Output could not be written
    Persistence,
    /// Invalid request - don't retry, fix request
    BadRequest,
    /// Local configuration or I/O problem
    Config,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auth => write!(f, "AUTH"),
            Self::Transient => write!(f, "TRANSIENT"),
            Self::Timeout => write!(f, "TIMEOUT"),
            Self::RunFailure => write!(f, "RUN_FAILURE"),
            Self::Contract => write!(f, "CONTRACT"),
            Self::Persistence => write!(f, "PERSISTENCE"),
            Self::BadRequest => write!(f, "BAD_REQUEST"),
            Self::Config => write!(f, "CONFIG"),
        }
    }
}

impl ErrorCategory {
    /// Check if a whole run may be retried after this category of failure
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient | Self::Timeout)
    }

    /// Check if this category signals a broken upstream contract worth alerting on
    pub fn is_invariant_break(&self) -> bool {
        matches!(self, Self::Contract)
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum ForecastError {
    // -------------------------------------------------------------------------
    // Upstream Service Errors
    // -------------------------------------------------------------------------
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Upstream rejected the request (4xx other than auth)
    #[error("Assistant API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Operation timeout with context
    #[error("Timeout after {duration:?}: {operation}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    /// Remote run reached a terminal non-success status
    #[error("Run {run_id} {status}: {detail}")]
    RunFailed {
        run_id: String,
        status: String,
        detail: String,
    },

    /// Run completed but the thread holds no assistant message
    #[error("No assistant reply in thread {thread_id}")]
    NoReply { thread_id: String },

    // -------------------------------------------------------------------------
    // Engine Errors
    // -------------------------------------------------------------------------
    /// Failure attributed to a refinement phase; `source` is the unchanged cause
    #[error("{phase} failed{}: {source}", cycle_suffix(.cycle))]
    Phase {
        phase: RefinementPhase,
        cycle: Option<usize>,
        #[source]
        source: Box<ForecastError>,
    },

    /// Artifact could not be written. `unsaved` holds the in-memory result
    /// when the forecast itself was produced, so callers can persist elsewhere.
    #[error("Failed to persist forecast to {}: {reason}", .path.display())]
    Persistence {
        path: PathBuf,
        reason: String,
        unsaved: Option<Box<ForecastResult>>,
    },

    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn cycle_suffix(cycle: &Option<usize>) -> String {
    cycle.map(|c| format!(" (cycle {})", c)).unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, ForecastError>;

// =============================================================================
// Helper Functions
// =============================================================================

impl ForecastError {
    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a persistence error without an attached result
    pub fn persistence(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        Self::Persistence {
            path: path.into(),
            reason: reason.to_string(),
            unsaved: None,
        }
    }

    /// Attribute this error to a refinement phase
    pub fn in_phase(self, phase: RefinementPhase, cycle: Option<usize>) -> Self {
        Self::Phase {
            phase,
            cycle,
            source: Box::new(self),
        }
    }

    /// Innermost error, unwrapping phase attribution
    pub fn root(&self) -> &ForecastError {
        match self {
            Self::Phase { source, .. } => source.root(),
            other => other,
        }
    }

    /// Phase the error was raised in, if attributed
    pub fn phase(&self) -> Option<RefinementPhase> {
        match self {
            Self::Phase { phase, .. } => Some(*phase),
            _ => None,
        }
    }

    /// Classify this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Phase { source, .. } => source.category(),
            Self::Auth(_) => ErrorCategory::Auth,
            Self::ServiceUnavailable(_) => ErrorCategory::Transient,
            Self::Api { .. } => ErrorCategory::BadRequest,
            Self::Timeout { .. } => ErrorCategory::Timeout,
            Self::RunFailed { .. } => ErrorCategory::RunFailure,
            Self::NoReply { .. } => ErrorCategory::Contract,
            Self::Persistence { .. } => ErrorCategory::Persistence,
            Self::Config(_) | Self::Io(_) | Self::Json(_) => ErrorCategory::Config,
        }
    }

    /// Check if the whole run may be retried
    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }

    /// Attach the unsaved result to a persistence failure; other errors pass through
    pub fn with_unsaved(self, result: ForecastResult) -> Self {
        match self {
            Self::Persistence { path, reason, .. } => Self::Persistence {
                path,
                reason,
                unsaved: Some(Box::new(result)),
            },
            other => other,
        }
    }

    /// In-memory result carried by a persistence failure
    pub fn unsaved(&self) -> Option<&ForecastResult> {
        match self {
            Self::Persistence { unsaved, .. } => unsaved.as_deref(),
            Self::Phase { source, .. } => source.unsaved(),
            _ => None,
        }
    }

    /// Take the in-memory result out of a persistence failure
    pub fn into_unsaved(self) -> Option<ForecastResult> {
        match self {
            Self::Persistence { unsaved, .. } => unsaved.map(|r| *r),
            Self::Phase { source, .. } => source.into_unsaved(),
            _ => None,
        }
    }
}

// =============================================================================
// HTTP Classification
// =============================================================================

/// Classify a non-success HTTP status from the assistants service
pub fn classify_http_status(status: u16, message: &str) -> ForecastError {
    match status {
        401 | 403 => ForecastError::Auth(message.to_string()),
        // Rate limiting and server-side issues are transient
        429 | 500 | 502 | 503 | 504 => {
            ForecastError::ServiceUnavailable(format!("HTTP {}: {}", status, message))
        }
        _ => ForecastError::Api {
            status,
            message: message.to_string(),
        },
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::Auth.to_string(), "AUTH");
        assert_eq!(ErrorCategory::RunFailure.to_string(), "RUN_FAILURE");
        assert_eq!(ErrorCategory::Contract.to_string(), "CONTRACT");
    }

    #[test]
    fn test_error_category_retryable() {
        assert!(ErrorCategory::Transient.is_retryable());
        assert!(ErrorCategory::Timeout.is_retryable());
        assert!(!ErrorCategory::Auth.is_retryable());
        assert!(!ErrorCategory::RunFailure.is_retryable());
        assert!(!ErrorCategory::Contract.is_retryable());
        assert!(ErrorCategory::Contract.is_invariant_break());
    }

    #[test]
    fn test_classify_http_status() {
        assert!(matches!(
            classify_http_status(401, "bad key"),
            ForecastError::Auth(_)
        ));
        assert!(matches!(
            classify_http_status(403, "forbidden"),
            ForecastError::Auth(_)
        ));
        assert!(matches!(
            classify_http_status(429, "slow down"),
            ForecastError::ServiceUnavailable(_)
        ));
        assert!(matches!(
            classify_http_status(503, "overloaded"),
            ForecastError::ServiceUnavailable(_)
        ));
        assert!(matches!(
            classify_http_status(404, "no such thread"),
            ForecastError::Api { status: 404, .. }
        ));
    }

    #[test]
    fn test_phase_wrapping_preserves_root() {
        let err = ForecastError::timeout("run_1", Duration::from_secs(300))
            .in_phase(RefinementPhase::Revising, Some(2));

        assert_eq!(err.phase(), Some(RefinementPhase::Revising));
        assert!(matches!(err.root(), ForecastError::Timeout { .. }));
        assert_eq!(err.category(), ErrorCategory::Timeout);
        assert!(err.is_retryable());
        assert!(err.to_string().contains("cycle 2"));
    }

    #[test]
    fn test_run_failed_display() {
        let err = ForecastError::RunFailed {
            run_id: "run_9".to_string(),
            status: "expired".to_string(),
            detail: "no capacity".to_string(),
        };
        assert_eq!(err.to_string(), "Run run_9 expired: no capacity");
        assert_eq!(err.category(), ErrorCategory::RunFailure);
    }
}
