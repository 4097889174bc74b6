//! Config Command
//!
//! Manage swellcast configuration.
//!
//! Usage:
//!   swellcast config show [-g] [-f json]
//!   swellcast config path
//!   swellcast config init [-g] [--force]

use crate::cli::ui::output::Output;
use crate::config::ConfigLoader;
use crate::types::{ForecastError, Result};

/// Show configuration
pub fn show(global: bool, format: &str) -> Result<()> {
    let as_json = format == "json";

    if global {
        if let Some(global_path) = ConfigLoader::global_config_path() {
            if global_path.exists() {
                let content = std::fs::read_to_string(&global_path)?;
                println!("# Global Config: {}\n", global_path.display());
                println!("{}", content);
            } else {
                println!("No global config found.");
                println!("Run 'swellcast config init --global' to create one.");
            }
        } else {
            println!("Cannot determine global config directory.");
        }
    } else {
        // Show merged effective config
        ConfigLoader::show_config(as_json)?;
    }
    Ok(())
}

/// Show configuration paths
pub fn path() -> Result<()> {
    ConfigLoader::show_path();
    Ok(())
}

/// Write a default config file (project `./swellcast.toml`, or global)
pub fn init(global: bool, force: bool) -> Result<()> {
    let target = if global {
        ConfigLoader::global_config_path().ok_or_else(|| {
            ForecastError::Config("Cannot determine global config directory".to_string())
        })?
    } else {
        ConfigLoader::project_config_path()
    };

    let output = Output::new();
    if ConfigLoader::init_at(&target, force)? {
        output.success(&format!("Created {}", target.display()));
        output.info("Set forecaster_id and critic_id before running 'swellcast forecast'");
    } else {
        output.warning(&format!(
            "{} already exists (use --force to overwrite)",
            target.display()
        ));
    }
    Ok(())
}
