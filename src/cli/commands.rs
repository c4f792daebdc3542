//! Command implementations

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cli::args::{AnalyzeArgs, SplitArgs};
use crate::config::Settings;
use crate::engine::{
    JobReport, ReencodeSplitter, SplitEngine, SplitStrategy, StrategyMode, StreamCopySplitter,
};
use crate::error::{ProbeError, SplitXError, SplitXResult};
use crate::output::{self, archive};
use crate::planner::ChunkPlan;
use crate::probe;
use crate::progress::{ConsoleReporter, JsonReporter, Phase, ProgressReporter};
use crate::source::{Acquirer, MediaSource};
use crate::utils::{format_duration, format_size};

/// Execute the split command
pub async fn split(args: SplitArgs) -> Result<()> {
    let settings = Settings::load(args.config.as_deref())?;
    let chunk_length = args.chunk_length.unwrap_or(settings.chunk_length);
    let size_limit = args.size_limit.unwrap_or(settings.size_limit);
    let jobs = args.jobs.unwrap_or(settings.jobs);

    info!("Starting split operation");
    info!("Input: {}", args.input);
    info!("Chunk length: {:.0}s", chunk_length);

    let cancel = watch_for_interrupt();
    let progress: Box<dyn ProgressReporter> = if args.json_progress {
        Box::new(JsonReporter)
    } else {
        Box::new(ConsoleReporter::new())
    };

    // Job-scoped working area; reclaimed on every exit path
    let workspace = tempfile::tempdir().context("failed to create working directory")?;

    let mut source = MediaSource::classify(&args.input);
    let acquirer = Acquirer::new(size_limit, cancel.clone())?;
    let input_path = acquirer
        .acquire(&mut source, workspace.path(), progress.as_ref())
        .await
        .context("failed to acquire source")?;

    progress.report(Phase::Probing, None, "reading media metadata");
    let ffmpeg_ok = probe::ffmpeg_available().await;
    if !ffmpeg_ok {
        warn!("ffmpeg not found on PATH");
    }

    let duration = probe_with_fallback(&input_path).await?;
    info!("Source duration: {}", format_duration(duration));

    let plan = ChunkPlan::build(duration, chunk_length)?;
    info!("Planned {} segments", plan.segment_count());

    let mode = StrategyMode::parse(&args.mode)?;
    let strategy = select_strategy(mode, ffmpeg_ok)?;

    let out_dir = args.output_dir.unwrap_or_else(|| {
        PathBuf::from(format!("{}_parts", output::source_stem(&input_path)))
    });

    let engine = SplitEngine::new(strategy)
        .with_concurrency(jobs)
        .with_segment_timeout(Duration::from_secs(settings.segment_timeout_secs))
        .with_cancellation(cancel.clone());
    let report = engine
        .execute(&input_path, &plan, &out_dir, progress.as_ref())
        .await?;

    display_report(&report);

    if args.zip && report.succeeded() > 0 {
        progress.report(Phase::Packaging, None, "bundling parts");
        let zip_path = out_dir.join(format!("{}_parts.zip", output::source_stem(&input_path)));
        archive::bundle(&report.output_files(), &zip_path)?;
        println!("Archive: {}", zip_path.display());
    }

    if report.succeeded() == 0 {
        anyhow::bail!("all {} segments failed to split", report.results.len());
    }

    info!("Split operation completed");
    Ok(())
}

/// Probed duration, falling back to the libav container API when ffprobe is
/// not installed.
async fn probe_with_fallback(input: &std::path::Path) -> SplitXResult<f64> {
    match probe::probe_duration(input).await {
        Ok(duration) => Ok(duration),
        Err(ProbeError::ToolMissing { message }) => {
            warn!("ffprobe unavailable ({}), using container metadata", message);
            Ok(probe::container_duration(input)?)
        }
        Err(e) => Err(e.into()),
    }
}

/// Pick the strategy from the requested mode and the capability probe.
fn select_strategy(mode: StrategyMode, ffmpeg_ok: bool) -> SplitXResult<Box<dyn SplitStrategy>> {
    match mode {
        StrategyMode::Auto => {
            if ffmpeg_ok {
                info!("Using stream copy (lossless, fast)");
                Ok(Box::new(StreamCopySplitter::new()))
            } else {
                warn!("Falling back to re-encoding; output quality may change");
                Ok(Box::new(ReencodeSplitter::new()?))
            }
        }
        StrategyMode::Copy => {
            if ffmpeg_ok {
                Ok(Box::new(StreamCopySplitter::new()))
            } else {
                Err(SplitXError::NoStrategy {
                    message: "stream copy requested but ffmpeg is not available".to_string(),
                })
            }
        }
        StrategyMode::Reencode => {
            warn!("Re-encoding requested; output quality may change");
            Ok(Box::new(ReencodeSplitter::new()?))
        }
    }
}

/// Execute the analyze command: probe and plan, report, execute nothing.
pub async fn analyze(args: AnalyzeArgs) -> Result<()> {
    let settings = Settings::load(args.config.as_deref())?;
    let chunk_length = args.chunk_length.unwrap_or(settings.chunk_length);
    let size_limit = args.size_limit.unwrap_or(settings.size_limit);

    info!("Starting analysis");
    info!("Input: {}", args.input);

    let cancel = watch_for_interrupt();
    let progress = ConsoleReporter::new();
    let workspace = tempfile::tempdir().context("failed to create working directory")?;

    let mut source = MediaSource::classify(&args.input);
    let acquirer = Acquirer::new(size_limit, cancel)?;
    let input_path = acquirer
        .acquire(&mut source, workspace.path(), &progress)
        .await
        .context("failed to acquire source")?;

    progress.report(Phase::Probing, None, "reading media metadata");
    let duration = probe_with_fallback(&input_path).await?;
    let plan = ChunkPlan::build(duration, chunk_length)?;
    let source_size = std::fs::metadata(&input_path)
        .context("failed to read source size")?
        .len();

    let report = AnalysisReport {
        duration_seconds: duration,
        chunk_length_seconds: chunk_length,
        segment_count: plan.segment_count(),
        source_size_bytes: source_size,
        avg_segment_size_bytes: source_size / plan.segment_count() as u64,
        plan,
    };

    if args.json {
        let json =
            serde_json::to_string_pretty(&report).context("failed to serialize analysis")?;
        println!("{}", json);
    } else {
        display_analysis(&report);
    }

    Ok(())
}

/// Dry-run analysis of a source against a chunk length
#[derive(Debug, Serialize)]
struct AnalysisReport {
    duration_seconds: f64,
    chunk_length_seconds: f64,
    segment_count: usize,
    source_size_bytes: u64,
    avg_segment_size_bytes: u64,
    plan: ChunkPlan,
}

/// Trip a cancellation token on Ctrl-C
fn watch_for_interrupt() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trip = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling job");
            trip.cancel();
        }
    });
    cancel
}

/// Itemized per-segment outcome so the user can retrieve what succeeded
fn display_report(report: &JobReport) {
    println!();
    println!("Split Results ({:?})", report.strategy);
    println!("====================");
    for result in &report.results {
        if result.success {
            let path = result
                .output_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            let size = result
                .output_path
                .as_ref()
                .and_then(|p| std::fs::metadata(p).ok())
                .map(|m| format_size(m.len()))
                .unwrap_or_default();
            println!("  ✓ part {:02}: {} ({})", result.spec.index, path, size);
        } else {
            println!(
                "  ✗ part {:02}: {}",
                result.spec.index,
                result.error_detail.as_deref().unwrap_or("unknown failure")
            );
        }
    }
    println!();
    println!(
        "{} succeeded, {} failed in {:.1}s{}",
        report.succeeded(),
        report.failed(),
        report.elapsed_seconds,
        if report.is_partial() {
            " (partial success)"
        } else {
            ""
        }
    );
}

fn display_analysis(report: &AnalysisReport) {
    println!("Analysis");
    println!("========");
    println!("Duration:        {}", format_duration(report.duration_seconds));
    println!("Chunk length:    {}", format_duration(report.chunk_length_seconds));
    println!("Will create:     {} parts", report.segment_count);
    println!("Source size:     {}", format_size(report.source_size_bytes));
    println!(
        "Avg part size:   {}",
        format_size(report.avg_segment_size_bytes)
    );
}
