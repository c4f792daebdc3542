//! Error handling module for SplitX

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while probing media metadata
#[derive(Error, Debug)]
pub enum ProbeError {
    /// ffprobe could not be spawned at all
    #[error("ffprobe is not available: {message}")]
    ToolMissing { message: String },

    /// ffprobe ran but its output was not usable
    #[error("failed to parse ffprobe output: {message}")]
    ParseFailure { message: String },

    /// ffprobe exceeded the bounded wait
    #[error("ffprobe did not finish within {seconds}s")]
    Timeout { seconds: u64 },
}

/// Errors raised while computing a chunk plan
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanError {
    /// Total duration must be a positive number of seconds
    #[error("total duration must be positive, got {value}")]
    InvalidDuration { value: f64 },

    /// Chunk length must be a positive number of seconds
    #[error("chunk length must be positive, got {value}")]
    InvalidChunkLength { value: f64 },
}

/// Errors raised while acquiring a media source
#[derive(Error, Debug)]
pub enum AcquireError {
    /// Advertised content length exceeds the configured ceiling
    #[error("remote file too large: {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: u64, limit: u64 },

    /// No file identifier could be extracted from a Drive share link
    #[error("unrecognized share link: {locator}")]
    UnrecognizedShareLink { locator: String },

    /// Connection, redirect, or HTTP status failure
    #[error("network failure: {0}")]
    NetworkFailure(#[from] reqwest::Error),

    /// The running byte counter passed the ceiling mid-transfer
    #[error("download exceeded the {limit} byte limit after {received} bytes")]
    SizeLimitExceeded { received: u64, limit: u64 },

    /// A binary media payload was expected but something else arrived
    #[error("expected a media payload but got content type '{content_type}'")]
    UnexpectedContentType { content_type: String },

    /// No data arrived for the idle-read bound
    #[error("transfer stalled: no data received for {seconds}s")]
    IdleTimeout { seconds: u64 },

    /// Local source path does not exist or is not a file
    #[error("source file not found: {path}")]
    SourceNotFound { path: String },

    /// The job was cancelled while transferring
    #[error("acquisition cancelled")]
    Cancelled,

    /// I/O error while writing the destination file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Per-segment split failure detail; never fatal to the job on its own
#[derive(Error, Debug)]
pub enum SegmentError {
    /// The external tool exited with a non-zero status
    #[error("ffmpeg exited with status {code:?}: {stderr}")]
    ToolFailed { code: Option<i32>, stderr: String },

    /// The segment took longer than the per-segment bound
    #[error("segment processing exceeded {seconds}s")]
    Timeout { seconds: u64 },

    /// The tool reported success but produced no output file
    #[error("output file was not created: {path}")]
    OutputMissing { path: PathBuf },

    /// The re-encode pipeline failed
    #[error("re-encode failed: {message}")]
    Encode { message: String },

    /// I/O error around the segment invocation
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Main error type for SplitX operations
#[derive(Error, Debug)]
pub enum SplitXError {
    /// Media probing failed
    #[error("probe failed: {0}")]
    Probe(#[from] ProbeError),

    /// Chunk planning failed
    #[error("planning failed: {0}")]
    Plan(#[from] PlanError),

    /// Source acquisition failed
    #[error("acquisition failed: {0}")]
    Acquire(#[from] AcquireError),

    /// Neither split strategy is usable
    #[error("no split strategy available: {message}")]
    NoStrategy { message: String },

    /// The whole job was cancelled
    #[error("operation cancelled")]
    Cancelled,

    /// Configuration file error
    #[error("configuration error: {message}")]
    ConfigError { message: String },

    /// Bundling outputs into an archive failed
    #[error("packaging failed: {0}")]
    Packaging(#[from] zip::result::ZipError),

    /// FFmpeg initialization error
    #[error("failed to initialize FFmpeg: {message}")]
    FFmpegInitError { message: String },

    /// FFmpeg error
    #[error("FFmpeg error: {0}")]
    FFmpegError(#[from] ffmpeg_next::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type alias for SplitX operations
pub type SplitXResult<T> = std::result::Result<T, SplitXError>;
