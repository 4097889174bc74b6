//! Run Polling and Timeouts
//!
//! Remote runs complete asynchronously, so awaiting one means polling its
//! status at a fixed interval inside a wall-clock budget. Both values are
//! explicit configuration carried by `PollPolicy`.
//!
//! ## Usage
//!
//! ```ignore
//! use crate::ai::timeout::{PollPolicy, with_timeout};
//!
//! let policy = PollPolicy::default();
//! let status = with_timeout(
//!     policy.timeout,
//!     async { /* poll loop */ },
//!     "run run_abc"
//! ).await?;
//! ```

use std::future::Future;
use std::time::Duration;

use crate::constants::polling;
use crate::types::{ForecastError, Result};

/// How long to wait for a run and how often to check on it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Wall-clock budget for the whole wait (default: 5 minutes)
    pub timeout: Duration,
    /// Delay between status checks (default: 5 seconds)
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(polling::RUN_TIMEOUT_SECS),
            interval: Duration::from_secs(polling::POLL_INTERVAL_SECS),
        }
    }
}

impl PollPolicy {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }
}

/// Execute an async operation with a timeout
///
/// Returns `ForecastError::Timeout` if the operation doesn't complete within
/// the specified duration. The inner future is dropped on expiry.
pub async fn with_timeout<T, F>(timeout: Duration, future: F, operation_name: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(ForecastError::timeout(operation_name, timeout)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_policy_defaults() {
        let policy = PollPolicy::default();
        assert_eq!(policy.timeout.as_secs(), 300);
        assert_eq!(policy.interval.as_secs(), 5);
    }

    #[tokio::test]
    async fn test_with_timeout_success() {
        let result = with_timeout(
            Duration::from_secs(1),
            async { Ok::<_, ForecastError>(42) },
            "test operation",
        )
        .await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_with_timeout_expires() {
        let result = with_timeout(
            Duration::from_millis(10),
            async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok::<_, ForecastError>(42)
            },
            "slow operation",
        )
        .await;
        assert!(matches!(result, Err(ForecastError::Timeout { .. })));
    }
}
