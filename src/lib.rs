//! SplitX CLI Video Splitter Library
//!
//! A command-line tool for splitting long videos into bounded-duration chunks
//! with lossless stream-copy and fallback re-encoding capabilities.

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod output;
pub mod planner;
pub mod probe;
pub mod progress;
pub mod source;
pub mod utils;

// Re-export commonly used types
pub use engine::{JobReport, SplitEngine, SplitResult, SplitStrategy, StrategyKind, StrategyMode};
pub use error::{AcquireError, PlanError, ProbeError, SegmentError, SplitXError, SplitXResult};
pub use planner::{ChunkPlan, SegmentSpec};
pub use progress::{Phase, ProgressReporter};
pub use source::{MediaSource, SourceKind};

/// Initialize SplitX library
pub fn init() -> SplitXResult<()> {
    // Initialize FFmpeg bindings for the re-encode fallback
    ffmpeg_next::init().map_err(|e| SplitXError::FFmpegInitError {
        message: e.to_string(),
    })?;

    Ok(())
}
