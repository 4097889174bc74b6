//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Assistants service constants
pub mod assistant {
    /// Default API base URL
    pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

    /// Beta header value required by the threads/runs endpoints
    pub const BETA_HEADER: &str = "assistants=v2";

    /// Service-imposed cap on attachments per message
    pub const MAX_ATTACHMENTS_PER_MESSAGE: usize = 10;

    /// Messages fetched when looking for the latest assistant reply
    pub const MESSAGE_PAGE_SIZE: usize = 20;

    /// Maximum concurrent outbound requests across all runs
    pub const MAX_CONCURRENT_REQUESTS: usize = 4;
}

/// Run polling constants
pub mod polling {
    /// Wall-clock budget for a single run (seconds)
    pub const RUN_TIMEOUT_SECS: u64 = 300;

    /// Interval between status polls (seconds)
    pub const POLL_INTERVAL_SECS: u64 = 5;
}

/// HTTP/Network constants
pub mod network {
    /// Per-request timeout (seconds)
    pub const REQUEST_TIMEOUT_SECS: u64 = 60;

    /// Connection timeout (seconds)
    pub const CONNECTION_TIMEOUT_SECS: u64 = 30;
}

/// Forecast workflow constants
pub mod forecast {
    /// Default number of critique/revision cycles
    pub const DEFAULT_REFINEMENT_CYCLES: usize = 2;

    /// Default output directory for artifacts
    pub const DEFAULT_OUTPUT_DIR: &str = "output";

    /// Upper bound on a run's filename collision suffix
    pub const MAX_FILENAME_SUFFIX: usize = 1000;
}
