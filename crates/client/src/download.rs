//! Per-asset downloads.
//!
//! [`AssetDownloader`] fetches one asset's download URL and hands the
//! bytes to an injected [`SaveTarget`]. Downloads are independent of the
//! generation lifecycle and of each other; any number may run at once.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thumbforge_core::types::ThumbnailAsset;

use crate::config::ForgeConfig;

/// Platform capability that persists a downloaded file under a name.
#[async_trait]
pub trait SaveTarget: Send + Sync {
    async fn save_binary_as_file(&self, bytes: &[u8], filename: &str) -> io::Result<()>;
}

/// Errors from a single asset download.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("invalid download URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The request failed before a response, or while reading the body.
    #[error("{0}")]
    Request(#[from] reqwest::Error),

    /// Non-2xx response; `reason` is the status text.
    #[error("{reason}")]
    Status { status: u16, reason: String },

    #[error("could not save {filename}: {source}")]
    Save {
        filename: String,
        #[source]
        source: io::Error,
    },
}

/// What was saved by a successful download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadReceipt {
    pub filename: String,
    pub size_bytes: usize,
}

/// Fetches assets and passes them to a [`SaveTarget`].
#[derive(Debug, Clone)]
pub struct AssetDownloader {
    client: reqwest::Client,
    config: ForgeConfig,
}

impl AssetDownloader {
    pub fn new(config: ForgeConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: ForgeConfig) -> Self {
        Self { client, config }
    }

    /// Download `asset` and save it as `suggested_filename`, or as the
    /// asset's fallback name when none is suggested.
    pub async fn download(
        &self,
        asset: &ThumbnailAsset,
        suggested_filename: Option<&str>,
        target: &dyn SaveTarget,
    ) -> Result<DownloadReceipt, DownloadError> {
        let url = self
            .config
            .resolve(&asset.download_url)
            .map_err(|source| DownloadError::InvalidUrl {
                url: asset.download_url.clone(),
                source,
            })?;
        let filename = save_name(asset, suggested_filename);

        tracing::debug!(url = %url, filename = %filename, "Downloading thumbnail");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status {
                status: status.as_u16(),
                reason: status
                    .canonical_reason()
                    .map(str::to_string)
                    .unwrap_or_else(|| status.as_str().to_string()),
            });
        }

        let payload = response.bytes().await?;
        let size_bytes = payload.len();
        let saved = target.save_binary_as_file(&payload, &filename).await;
        drop(payload);

        saved.map_err(|source| DownloadError::Save {
            filename: filename.clone(),
            source,
        })?;

        tracing::info!(filename = %filename, size_bytes, "Thumbnail saved");
        Ok(DownloadReceipt {
            filename,
            size_bytes,
        })
    }
}

/// Choose the file name for a download.
///
/// Uses the suggestion when it leaves a usable final path component,
/// otherwise [`ThumbnailAsset::fallback_filename`].
pub fn save_name(asset: &ThumbnailAsset, suggested: Option<&str>) -> String {
    suggested
        .and_then(sanitize_filename)
        .unwrap_or_else(|| asset.fallback_filename())
}

/// Reduce a name to its final path component, dropping control characters.
///
/// Returns `None` when nothing usable is left (`""`, `.`, `..`).
pub fn sanitize_filename(name: &str) -> Option<String> {
    let last = name.rsplit(['/', '\\']).next().unwrap_or("");
    let cleaned: String = last.chars().filter(|c| !c.is_control()).collect();
    let cleaned = cleaned.trim();

    match cleaned {
        "" | "." | ".." => None,
        _ => Some(cleaned.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Directory save target
// ---------------------------------------------------------------------------

/// Saves files into a local directory.
///
/// Bytes are written to a uniquely named staging file first and renamed
/// into place; the staging file never outlives the call.
#[derive(Debug, Clone)]
pub struct DirectorySaveTarget {
    dir: PathBuf,
}

impl DirectorySaveTarget {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where a file saved under `filename` ends up.
    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }
}

#[async_trait]
impl SaveTarget for DirectorySaveTarget {
    async fn save_binary_as_file(&self, bytes: &[u8], filename: &str) -> io::Result<()> {
        let filename = sanitize_filename(filename).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, format!("unusable file name '{filename}'"))
        })?;

        tokio::fs::create_dir_all(&self.dir).await?;

        let staged = StagedFile::new(self.dir.join(format!(".{}.part", uuid::Uuid::new_v4())));
        tokio::fs::write(staged.path(), bytes).await?;
        staged.persist(&self.path_for(&filename)).await
    }
}

/// A temporary file removed on drop unless persisted.
struct StagedFile {
    path: PathBuf,
    persisted: bool,
}

impl StagedFile {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            persisted: false,
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(mut self, dest: &Path) -> io::Result<()> {
        tokio::fs::rename(&self.path, dest).await?;
        self.persisted = true;
        Ok(())
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if self.persisted {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to remove staged file");
            }
        }
    }
}
