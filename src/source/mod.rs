//! Media source resolution and acquisition

use std::path::PathBuf;

pub mod acquire;
pub mod drive;

pub use acquire::{Acquirer, DEFAULT_SIZE_LIMIT};

/// How a user-supplied locator should be fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Filesystem path, used in place
    Local,
    /// Plain HTTP(S) URL pointing at the bytes themselves
    DirectUrl,
    /// Google Drive share link requiring id extraction first
    DriveShare,
}

/// A reference to input media, resolved to a local file by acquisition
#[derive(Debug, Clone)]
pub struct MediaSource {
    /// The locator exactly as the user supplied it
    pub locator: String,
    pub kind: SourceKind,
    /// Assigned once when acquisition completes
    pub local_path: Option<PathBuf>,
}

impl MediaSource {
    /// Classify a user-supplied locator.
    pub fn classify(locator: &str) -> Self {
        let kind = if locator.starts_with("http://") || locator.starts_with("https://") {
            if drive::is_share_link(locator) {
                SourceKind::DriveShare
            } else {
                SourceKind::DirectUrl
            }
        } else {
            SourceKind::Local
        };

        Self {
            locator: locator.to_string(),
            kind,
            local_path: None,
        }
    }

    /// File name to store a remote source under, derived from the last path
    /// segment of the locator.
    pub fn file_name(&self) -> String {
        let trimmed = self.locator.split(['?', '#']).next().unwrap_or_default();
        let candidate = trimmed.rsplit('/').next().unwrap_or_default();
        if candidate.is_empty() || !candidate.contains('.') {
            "video_from_url.mp4".to_string()
        } else {
            candidate.to_string()
        }
    }
}
