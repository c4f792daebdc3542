//! Streaming acquisition of local and remote sources
//!
//! Remote payloads are streamed to disk in bounded buffers under a hard size
//! ceiling; the whole payload is never held in memory. Any failure removes the
//! partially written destination so later phases never see a torn file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::StreamExt;
use reqwest::header::CONTENT_LENGTH;
use reqwest::{Client, Response};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::AcquireError;
use crate::progress::{Phase, ProgressReporter};
use crate::source::{drive, MediaSource, SourceKind};
use crate::utils::format_size;

/// Hard ceiling on remote source size: 5 GiB
pub const DEFAULT_SIZE_LIMIT: u64 = 5 * 1024 * 1024 * 1024;

/// Abandon a transfer when no chunk arrives for this long
const IDLE_READ_TIMEOUT: Duration = Duration::from_secs(60);

const DRIVE_ENDPOINT: &str = "https://drive.google.com";

/// Resolves a [`MediaSource`] into a local, readable media file.
pub struct Acquirer {
    client: Client,
    size_limit: u64,
    drive_endpoint: String,
    cancel: CancellationToken,
}

impl Acquirer {
    pub fn new(size_limit: u64, cancel: CancellationToken) -> Result<Self, AcquireError> {
        let client = Client::builder()
            .user_agent(concat!("splitx/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            size_limit,
            drive_endpoint: DRIVE_ENDPOINT.to_string(),
            cancel,
        })
    }

    /// Override the Drive endpoint; used by tests and proxy setups.
    pub fn with_drive_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.drive_endpoint = endpoint.into();
        self
    }

    /// Resolve `source` into a local path, downloading into `dest_dir` for
    /// remote kinds. Assigns `source.local_path` on success.
    pub async fn acquire(
        &self,
        source: &mut MediaSource,
        dest_dir: &Path,
        progress: &dyn ProgressReporter,
    ) -> Result<PathBuf, AcquireError> {
        let path = match source.kind {
            SourceKind::Local => {
                let path = PathBuf::from(&source.locator);
                if !path.is_file() {
                    return Err(AcquireError::SourceNotFound {
                        path: source.locator.clone(),
                    });
                }
                info!("Using local source in place: {}", path.display());
                path
            }
            SourceKind::DirectUrl => {
                let dest = dest_dir.join(source.file_name());
                self.download_url(&source.locator, &dest, progress).await?;
                dest
            }
            SourceKind::DriveShare => {
                let file_id = drive::extract_file_id(&source.locator)?;
                info!("Resolved Drive share link to file id {}", file_id);
                let dest = dest_dir.join(format!("{}.mp4", file_id));
                self.download_drive(&file_id, &dest, progress).await?;
                dest
            }
        };

        source.local_path = Some(path.clone());
        Ok(path)
    }

    /// Fetch a direct URL with an advisory HEAD preflight for the size guard.
    async fn download_url(
        &self,
        url: &str,
        dest: &Path,
        progress: &dyn ProgressReporter,
    ) -> Result<u64, AcquireError> {
        // Advisory: servers may omit or lie about the length, so a preflight
        // failure is not fatal. An honest oversized answer fails fast before
        // any payload byte is transferred.
        if let Ok(head) = self.client.head(url).send().await {
            if let Some(size) = content_length_of(&head) {
                if size > self.size_limit {
                    return Err(AcquireError::TooLarge {
                        size,
                        limit: self.size_limit,
                    });
                }
            }
        }

        let response = self.client.get(url).send().await?.error_for_status()?;
        self.stream_to_file(response, dest, progress).await
    }

    /// Fetch a Drive-hosted file, handling the oversized-file confirmation
    /// interstitial transparently.
    async fn download_drive(
        &self,
        file_id: &str,
        dest: &Path,
        progress: &dyn ProgressReporter,
    ) -> Result<u64, AcquireError> {
        let url = drive::export_url(&self.drive_endpoint, file_id);
        let response = self.client.get(&url).send().await?.error_for_status()?;

        let response = if is_html(&response) {
            // Large files come back as an HTML confirmation page instead of
            // the binary; retry once with the embedded confirm token.
            let body = response.text().await?;
            let token =
                drive::confirm_token(&body).ok_or_else(|| AcquireError::UnexpectedContentType {
                    content_type: "text/html".to_string(),
                })?;
            warn!("Drive returned a confirmation page, retrying with token");

            let retry_url = drive::confirm_url(&self.drive_endpoint, file_id, &token);
            let retry = self
                .client
                .get(&retry_url)
                .send()
                .await?
                .error_for_status()?;
            if is_html(&retry) {
                return Err(AcquireError::UnexpectedContentType {
                    content_type: "text/html".to_string(),
                });
            }
            retry
        } else {
            response
        };

        if let Some(size) = content_length_of(&response) {
            if size > self.size_limit {
                return Err(AcquireError::TooLarge {
                    size,
                    limit: self.size_limit,
                });
            }
        }

        self.stream_to_file(response, dest, progress).await
    }

    /// Stream a response body to `dest`, removing the partial file on any
    /// failure so no torn output survives.
    async fn stream_to_file(
        &self,
        response: Response,
        dest: &Path,
        progress: &dyn ProgressReporter,
    ) -> Result<u64, AcquireError> {
        match self.stream_to_file_inner(response, dest, progress).await {
            Ok(written) => Ok(written),
            Err(e) => {
                let _ = fs::remove_file(dest).await;
                Err(e)
            }
        }
    }

    async fn stream_to_file_inner(
        &self,
        response: Response,
        dest: &Path,
        progress: &dyn ProgressReporter,
    ) -> Result<u64, AcquireError> {
        let total = content_length_of(&response);
        let mut file = fs::File::create(dest).await?;
        let mut stream = response.bytes_stream();
        let mut downloaded: u64 = 0;

        loop {
            if self.cancel.is_cancelled() {
                return Err(AcquireError::Cancelled);
            }

            let chunk = match tokio::time::timeout(IDLE_READ_TIMEOUT, stream.next()).await {
                Err(_) => {
                    return Err(AcquireError::IdleTimeout {
                        seconds: IDLE_READ_TIMEOUT.as_secs(),
                    })
                }
                Ok(None) => break,
                Ok(Some(chunk)) => chunk?,
            };

            file.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;

            if downloaded > self.size_limit {
                return Err(AcquireError::SizeLimitExceeded {
                    received: downloaded,
                    limit: self.size_limit,
                });
            }

            let fraction = total.map(|t| downloaded as f64 / t as f64);
            let label = match total {
                Some(t) => format!("{} / {}", format_size(downloaded), format_size(t)),
                None => format_size(downloaded),
            };
            progress.report(Phase::Downloading, fraction, &label);
        }

        file.flush().await?;
        info!(
            "Downloaded {} to {}",
            format_size(downloaded),
            dest.display()
        );
        Ok(downloaded)
    }
}

/// Parsed Content-Length header, if present and honest-looking
fn content_length_of(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|&v| v > 0)
}

fn is_html(response: &Response) -> bool {
    response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("text/html"))
        .unwrap_or(false)
}
