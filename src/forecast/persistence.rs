//! Artifact Persistence
//!
//! Writes a `ForecastResult` as `{region_slug}_forecast_{YYYYMMDD_HHMMSS}.json`
//! (plus an optional Markdown rendering with the same stem). Files are
//! opened create-new, so a retry can never clobber an earlier artifact: a
//! same-second collision gets a `_2`, `_3`, ... suffix instead. A file whose
//! content could not be written is removed again.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use super::render::render_markdown;
use crate::constants::forecast::MAX_FILENAME_SUFFIX;
use crate::types::{ForecastError, ForecastResult, Result};

#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    output_dir: PathBuf,
    write_markdown: bool,
}

impl ArtifactWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            write_markdown: false,
        }
    }

    pub fn with_markdown(mut self, enabled: bool) -> Self {
        self.write_markdown = enabled;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Persist `result` and return the JSON artifact path.
    ///
    /// The Markdown rendering is secondary: failing to write it is logged and
    /// does not fail the call.
    pub async fn persist(&self, result: &ForecastResult) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| ForecastError::persistence(&self.output_dir, e))?;

        let content = serde_json::to_string_pretty(result)
            .map_err(|e| ForecastError::persistence(&self.output_dir, e))?;

        let stem = artifact_stem(result);
        let (path, file) = self.create_unique(&stem, "json").await?;

        fill_claimed(&path, file, content.as_bytes())
            .await
            .map_err(|e| ForecastError::persistence(&path, e))?;

        info!("Saved forecast to {}", path.display());

        if self.write_markdown {
            let md_path = path.with_extension("md");
            if let Err(e) = write_new(&md_path, &render_markdown(result)).await {
                warn!("Failed to write {}: {}", md_path.display(), e);
            } else {
                debug!("Saved markdown rendering to {}", md_path.display());
            }
        }

        Ok(path)
    }

    /// Open `{stem}.{ext}` create-new, falling back to numbered suffixes
    async fn create_unique(&self, stem: &str, ext: &str) -> Result<(PathBuf, tokio::fs::File)> {
        for n in 1..=MAX_FILENAME_SUFFIX {
            let name = if n == 1 {
                format!("{}.{}", stem, ext)
            } else {
                format!("{}_{}.{}", stem, n, ext)
            };
            let path = self.output_dir.join(name);

            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(ForecastError::persistence(&path, e)),
            }
        }

        Err(ForecastError::persistence(
            self.output_dir.join(format!("{}.{}", stem, ext)),
            format!("no free file name after {} attempts", MAX_FILENAME_SUFFIX),
        ))
    }
}

async fn write_new(path: &Path, content: &str) -> std::io::Result<()> {
    let file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    fill_claimed(path, file, content.as_bytes()).await
}

/// Write into a file this call just created; on failure the partial file is deleted
async fn fill_claimed<W>(path: &Path, mut file: W, content: &[u8]) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let written = async {
        file.write_all(content).await?;
        file.flush().await
    }
    .await;

    if let Err(e) = written {
        drop(file);
        if let Err(remove_err) = tokio::fs::remove_file(path).await {
            warn!("Failed to remove partial {}: {}", path.display(), remove_err);
        }
        return Err(e);
    }
    Ok(())
}

/// `{region_slug}_forecast_{YYYYMMDD_HHMMSS}` in UTC
pub fn artifact_stem(result: &ForecastResult) -> String {
    format!(
        "{}_forecast_{}",
        region_slug(&result.region),
        result.generated_at.format("%Y%m%d_%H%M%S")
    )
}

/// Lowercase, with every run of non-alphanumerics collapsed to `_`
pub fn region_slug(region: &str) -> String {
    let mut slug = String::with_capacity(region.len());
    let mut pending_sep = false;

    for c in region.chars() {
        if c.is_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('_');
            }
            pending_sep = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_sep = true;
        }
    }

    if slug.is_empty() {
        "region".to_string()
    } else {
        slug
    }
}
