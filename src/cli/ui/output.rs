use console::style;
use std::path::Path;

use crate::types::{ForecastError, ForecastResult};

pub struct Output;

impl Output {
    pub fn new() -> Self {
        Self
    }

    pub fn success(&self, message: &str) {
        println!("{} {}", style("✓").green(), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✗").red(), message);
    }

    pub fn warning(&self, message: &str) {
        println!("{} {}", style("⚠").yellow(), message);
    }

    pub fn info(&self, message: &str) {
        println!("{} {}", style("ℹ").blue(), message);
    }

    pub fn header(&self, message: &str) {
        println!("\n{}", style(message).bold().underlined());
    }

    pub fn section(&self, message: &str) {
        println!("\n{}", style(message).bold());
        println!("{}", "─".repeat(40));
    }

    /// One line per finished region
    pub fn forecast_saved(&self, result: &ForecastResult, path: &Path) {
        self.success(&format!(
            "{}: {} cycle(s), {} evidence file(s) → {}",
            style(&result.region).cyan(),
            result.cycle_count,
            result.evidence_file_count,
            path.display()
        ));
    }

    /// Failure line with category and phase so retry decisions are obvious
    pub fn forecast_failed(&self, region: &str, error: &ForecastError) {
        let category = error.category();
        let hint = if category.is_retryable() {
            style("retryable").yellow()
        } else {
            style("not retryable").dim()
        };
        self.error(&format!(
            "{}: [{}] {} ({})",
            style(region).cyan(),
            category,
            error,
            hint
        ));
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
