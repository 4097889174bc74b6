//! Evidence Bundles
//!
//! The collector writes a `bundle_metadata.json` once its files are uploaded.
//! Only the bundle id and the uploaded file ids matter here; every other
//! field is ignored.

use serde::Deserialize;
use std::path::Path;

use crate::types::{FileId, ForecastError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EvidenceBundle {
    #[serde(default = "unknown_bundle")]
    pub bundle_id: String,
    #[serde(default)]
    pub uploaded_file_ids: Vec<FileId>,
}

fn unknown_bundle() -> String {
    "unknown".to_string()
}

impl EvidenceBundle {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ForecastError::Config(format!("Cannot read bundle {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            ForecastError::Config(format!("Invalid bundle {}: {}", path.display(), e))
        })
    }

    /// Ad-hoc bundle from explicit file ids
    pub fn from_file_ids(file_ids: Vec<FileId>) -> Self {
        Self {
            bundle_id: "manual".to_string(),
            uploaded_file_ids: file_ids,
        }
    }

    /// Append ids not already present, keeping first-seen order
    pub fn extend(&mut self, extra: impl IntoIterator<Item = FileId>) {
        for id in extra {
            if !self.uploaded_file_ids.contains(&id) {
                self.uploaded_file_ids.push(id);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.uploaded_file_ids.is_empty()
    }
}
