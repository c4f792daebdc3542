//! Media probing via ffprobe
//!
//! Metadata-only inspection: extract the container-level duration without
//! decoding any content. The primary path shells out to ffprobe and parses
//! its JSON output; when ffprobe is absent the caller can fall back to the
//! libav container API via [`container_duration`].

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::ProbeError;

/// Bounded wait for an ffprobe invocation
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Bounded wait for the ffmpeg capability check
const CAPABILITY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: Option<FfprobeFormat>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

/// Probe the container-level duration of a media file, in seconds.
///
/// Spawns `ffprobe` with machine-parseable JSON output and a 10-second bound.
/// No retries; a failure is surfaced to the caller, who may fall back to
/// [`container_duration`].
pub async fn probe_duration(path: &Path) -> Result<f64, ProbeError> {
    debug!("Probing duration of {}", path.display());

    let child = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path)
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .output();

    let output = match tokio::time::timeout(PROBE_TIMEOUT, child).await {
        Err(_) => {
            return Err(ProbeError::Timeout {
                seconds: PROBE_TIMEOUT.as_secs(),
            })
        }
        Ok(Err(e)) => {
            return Err(ProbeError::ToolMissing {
                message: e.to_string(),
            })
        }
        Ok(Ok(output)) => output,
    };

    if !output.status.success() {
        return Err(ProbeError::ParseFailure {
            message: format!("ffprobe exited with status {}", output.status),
        });
    }

    let duration = parse_duration(&output.stdout)?;
    info!("Probed duration: {:.3}s for {}", duration, path.display());
    Ok(duration)
}

/// Parse the `format.duration` field out of ffprobe's JSON output.
fn parse_duration(stdout: &[u8]) -> Result<f64, ProbeError> {
    let parsed: FfprobeOutput =
        serde_json::from_slice(stdout).map_err(|e| ProbeError::ParseFailure {
            message: e.to_string(),
        })?;

    let raw = parsed
        .format
        .and_then(|f| f.duration)
        .ok_or_else(|| ProbeError::ParseFailure {
            message: "no duration field in format section".to_string(),
        })?;

    raw.parse::<f64>().map_err(|e| ProbeError::ParseFailure {
        message: format!("invalid duration '{}': {}", raw, e),
    })
}

/// Fallback metadata path: read the container duration through the libav
/// bindings. Used when ffprobe is not installed.
pub fn container_duration(path: &Path) -> Result<f64, ProbeError> {
    ffmpeg_next::init().map_err(|e| ProbeError::ToolMissing {
        message: format!("FFmpeg initialization failed: {}", e),
    })?;

    let ictx = ffmpeg_next::format::input(&path).map_err(|e| ProbeError::ParseFailure {
        message: format!("failed to open input: {}", e),
    })?;

    let duration = ictx.duration();
    if duration <= 0 {
        return Err(ProbeError::ParseFailure {
            message: "container reports no duration".to_string(),
        });
    }

    Ok(duration as f64 / ffmpeg_next::ffi::AV_TIME_BASE as f64)
}

/// Check whether the ffmpeg binary is invocable.
///
/// Performed once per job and passed explicitly into strategy selection; tool
/// availability does not change within a run.
pub async fn ffmpeg_available() -> bool {
    let status = Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .status();

    match tokio::time::timeout(CAPABILITY_TIMEOUT, status).await {
        Ok(Ok(status)) => status.success(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_from_ffprobe_json() {
        let json = br#"{
            "streams": [{"codec_type": "video"}],
            "format": {"filename": "in.mp4", "duration": "3000.016000"}
        }"#;
        let duration = parse_duration(json).unwrap();
        assert!((duration - 3000.016).abs() < 1e-6);
    }

    #[test]
    fn test_parse_duration_missing_field() {
        let json = br#"{"format": {"filename": "in.mp4"}}"#;
        assert!(matches!(
            parse_duration(json),
            Err(ProbeError::ParseFailure { .. })
        ));
    }

    #[test]
    fn test_parse_duration_missing_format_section() {
        let json = br#"{"streams": []}"#;
        assert!(matches!(
            parse_duration(json),
            Err(ProbeError::ParseFailure { .. })
        ));
    }

    #[test]
    fn test_parse_duration_not_json() {
        assert!(matches!(
            parse_duration(b"not json at all"),
            Err(ProbeError::ParseFailure { .. })
        ));
    }

    #[test]
    fn test_parse_duration_non_numeric() {
        let json = br#"{"format": {"duration": "N/A"}}"#;
        assert!(matches!(
            parse_duration(json),
            Err(ProbeError::ParseFailure { .. })
        ));
    }
}
