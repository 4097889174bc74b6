//! Core Types
//!
//! Error taxonomy and the forecast data model shared across the crate.

pub mod error;
pub mod forecast;

pub use error::{ErrorCategory, ForecastError, Result, classify_http_status};
pub use forecast::{FileId, ForecastRequest, ForecastResult, RefinementCycle, RefinementPhase};
