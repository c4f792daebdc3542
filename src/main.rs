//! SplitX CLI Video Splitter
//!
//! A command-line tool for splitting long videos into bounded-duration chunks.
//! Uses lossless stream copy when ffmpeg is available and falls back to
//! re-encoding through the libav bindings when it is not.
//!
//! # Usage
//!
//! ```bash
//! splitter split --input "lecture.mp4" --chunk-length 1500
//! splitter split --input "https://example.com/video.mp4" --zip
//! splitter split --input "https://drive.google.com/file/d/ID/view" -o parts/
//! splitter analyze --input "lecture.mp4" --json
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::info;

use splitx_cli::cli::{commands, Cli, Commands};

/// Main entry point for the SplitX CLI application
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Parse command line arguments
    let cli = Cli::parse();

    // Execute the requested command
    match cli.command {
        Commands::Split(args) => {
            info!("Executing split command");
            commands::split(args).await?;
        }
        Commands::Analyze(args) => {
            info!("Executing analyze command");
            commands::analyze(args).await?;
        }
    }

    Ok(())
}
