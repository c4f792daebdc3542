//! CLI module for SplitX
//!
//! This module handles command-line argument parsing and command execution.

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

/// SplitX CLI Video Splitter
///
/// A command-line tool for splitting long videos into bounded-duration chunks
/// with lossless stream copy and a re-encoding fallback.
#[derive(Parser)]
#[command(name = "splitter")]
#[command(about = "SplitX CLI Video Splitter - Split long videos into chunks, fast")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Split a video into bounded-duration parts
    Split(args::SplitArgs),
    /// Report the chunk plan without executing it
    Analyze(args::AnalyzeArgs),
}
