use std::path::Path;
use std::process::Command;

use splitx_cli::engine::{SplitEngine, StreamCopySplitter};
use splitx_cli::planner::ChunkPlan;
use splitx_cli::probe;
use splitx_cli::progress::NoOpReporter;

/// Test utilities for real video processing
mod test_utils {
    use super::*;

    pub fn tool_available(name: &str) -> bool {
        Command::new(name)
            .arg("-version")
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Create a short test video with 1-second GOPs so stream-copy cuts land
    /// close to the requested offsets.
    pub fn create_test_video(output_path: &Path, duration: f64) -> bool {
        let status = Command::new("ffmpeg")
            .args([
                "-f",
                "lavfi",
                "-i",
                &format!("testsrc=duration={}:size=320x240:rate=30", duration),
                "-f",
                "lavfi",
                "-i",
                &format!("sine=frequency=1000:duration={}", duration),
                "-c:v",
                "libx264",
                "-g",
                "30",
                "-c:a",
                "aac",
                "-y",
            ])
            .arg(output_path)
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status();
        status.map(|s| s.success()).unwrap_or(false)
    }

    /// Container start time of a file, via ffprobe
    pub fn probe_start_time(path: &Path) -> Option<f64> {
        let output = Command::new("ffprobe")
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
            ])
            .arg(path)
            .output()
            .ok()?;
        let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).ok()?;
        parsed
            .get("format")?
            .get("start_time")?
            .as_str()?
            .parse()
            .ok()
    }
}

#[tokio::test]
async fn test_end_to_end_stream_copy_split() {
    if !test_utils::tool_available("ffmpeg") || !test_utils::tool_available("ffprobe") {
        eprintln!("skipping: ffmpeg/ffprobe not available");
        return;
    }

    let workspace = tempfile::tempdir().unwrap();
    let source = workspace.path().join("sample.mp4");
    assert!(test_utils::create_test_video(&source, 20.0));

    let duration = probe::probe_duration(&source).await.unwrap();
    assert!((duration - 20.0).abs() < 1.0);

    // Two parts: a full 12s chunk and an 8s tail
    let plan = ChunkPlan::build(duration, 12.0).unwrap();
    assert_eq!(plan.segment_count(), 2);

    let out_dir = workspace.path().join("parts");
    let engine = SplitEngine::new(Box::new(StreamCopySplitter::new()));
    let report = engine
        .execute(&source, &plan, &out_dir, &NoOpReporter)
        .await
        .unwrap();

    assert_eq!(report.succeeded(), 2);
    let files = report.output_files();
    assert!(files[0].ends_with("sample_part_01.mp4"));
    assert!(files[1].ends_with("sample_part_02.mp4"));

    // Each part is independently playable and the durations cover the source
    let mut total = 0.0;
    for file in &files {
        let part_duration = probe::probe_duration(file).await.unwrap();
        assert!(part_duration > 0.0);
        total += part_duration;
    }
    assert!((total - duration).abs() < 3.0);

    // Timestamps are rebased so each part starts at zero
    if let Some(start) = test_utils::probe_start_time(&files[1]) {
        assert!(start.abs() < 1.0);
    }
}
