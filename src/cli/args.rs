//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

/// Arguments for the split command
#[derive(Args, Debug)]
pub struct SplitArgs {
    /// Input video: local path, direct URL, or Google Drive share link
    #[arg(short, long)]
    pub input: String,

    /// Chunk length in seconds
    #[arg(short = 'l', long)]
    pub chunk_length: Option<f64>,

    /// Output directory for the parts (default: <stem>_parts in the working directory)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Split strategy
    #[arg(long, default_value = "auto")]
    pub mode: String,

    /// Maximum remote source size in bytes
    #[arg(long)]
    pub size_limit: Option<u64>,

    /// Parallel segment jobs (stream copy only)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Bundle the parts into a zip archive
    #[arg(long)]
    pub zip: bool,

    /// Emit machine-readable JSON progress events instead of a progress line
    #[arg(long)]
    pub json_progress: bool,

    /// Settings file path
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Arguments for the analyze command
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Input video: local path, direct URL, or Google Drive share link
    #[arg(short, long)]
    pub input: String,

    /// Chunk length in seconds
    #[arg(short = 'l', long)]
    pub chunk_length: Option<f64>,

    /// Maximum remote source size in bytes
    #[arg(long)]
    pub size_limit: Option<u64>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    /// Settings file path
    #[arg(long)]
    pub config: Option<PathBuf>,
}
