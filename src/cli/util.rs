//! CLI Common Utilities
//!
//! Shared initialization for command handlers: config resolution and
//! evidence selection.

use std::path::{Path, PathBuf};

use crate::config::{Config, ConfigLoader};
use crate::forecast::EvidenceBundle;
use crate::types::{FileId, ForecastError, Result};

/// Load configuration, honouring an explicit `--config` file.
///
/// An explicit file replaces the project file in the resolution chain; the
/// global file and environment still apply.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    match explicit {
        Some(path) if !path.exists() => Err(ForecastError::Config(format!(
            "Config file not found: {}",
            path.display()
        ))),
        Some(path) => ConfigLoader::load_with(ConfigLoader::global_config_path(), path),
        None => ConfigLoader::load(),
    }
}

/// Merge `--bundle` metadata with repeated `--file-id` flags
pub fn resolve_evidence(bundle: Option<&PathBuf>, file_ids: &[String]) -> Result<EvidenceBundle> {
    let extra = file_ids
        .iter()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty())
        .map(FileId::from);

    match bundle {
        Some(path) => {
            let mut bundle = EvidenceBundle::load(path)?;
            bundle.extend(extra);
            Ok(bundle)
        }
        None => Ok(EvidenceBundle::from_file_ids(extra.collect())),
    }
}
