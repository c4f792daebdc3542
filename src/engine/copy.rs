//! Lossless stream-copy splitting via the ffmpeg CLI
//!
//! Compressed streams are repackaged into a new container without a
//! decode/encode cycle, so quality is preserved and cutting is fast. Cut
//! points land on the nearest preceding keyframe for formats without
//! frame-accurate stream copy; that imprecision is accepted behavior.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::engine::{SplitStrategy, StrategyKind};
use crate::error::SegmentError;
use crate::planner::SegmentSpec;

/// Stream-copy splitter shelling out to ffmpeg once per segment
pub struct StreamCopySplitter {
    ffmpeg_bin: String,
}

impl StreamCopySplitter {
    pub fn new() -> Self {
        Self {
            ffmpeg_bin: "ffmpeg".to_string(),
        }
    }

    /// Point at a specific ffmpeg binary; used by tests and portable installs.
    pub fn with_binary(mut self, bin: impl Into<String>) -> Self {
        self.ffmpeg_bin = bin.into();
        self
    }
}

impl Default for StreamCopySplitter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SplitStrategy for StreamCopySplitter {
    fn kind(&self) -> StrategyKind {
        StrategyKind::StreamCopy
    }

    async fn split_segment(
        &self,
        input: &Path,
        spec: &SegmentSpec,
        output: &Path,
    ) -> Result<(), SegmentError> {
        debug!(
            "Stream-copying segment {} ({:.3}s + {:.3}s)",
            spec.index, spec.start, spec.duration
        );

        // -avoid_negative_ts make_zero rebases timestamps so the new segment
        // starts at zero instead of carrying seek artifacts.
        let result = Command::new(&self.ffmpeg_bin)
            .arg("-i")
            .arg(input)
            .args(["-ss", &spec.start.to_string()])
            .args(["-t", &spec.duration.to_string()])
            .args(["-c", "copy"])
            .args(["-avoid_negative_ts", "make_zero"])
            .arg("-y")
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await?;

        if !result.status.success() {
            return Err(SegmentError::ToolFailed {
                code: result.status.code(),
                stderr: stderr_tail(&result.stderr),
            });
        }

        Ok(())
    }
}

/// Last few lines of ffmpeg's stderr; the full log is noise
fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().rev().take(4).collect();
    lines.into_iter().rev().collect::<Vec<_>>().join("\n")
}
