//! Split execution engine
//!
//! Executes a [`ChunkPlan`] against one of two interchangeable strategies.
//! Per-segment failures are recorded and skipped rather than aborting the
//! job; partial success is a valid, reportable outcome.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::{SegmentError, SplitXError, SplitXResult};
use crate::output::{segment_file_name, source_extension, source_stem};
use crate::planner::{ChunkPlan, SegmentSpec};
use crate::progress::{Phase, ProgressReporter};

pub mod copy;
pub mod reencode;

pub use copy::StreamCopySplitter;
pub use reencode::ReencodeSplitter;

/// Per-segment processing bound; exceeding it fails that segment only
pub const SEGMENT_TIMEOUT: Duration = Duration::from_secs(300);

/// The closed set of split strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Lossless container-level copy via the ffmpeg CLI
    StreamCopy,
    /// Decode/encode fallback via the libav bindings
    Reencode,
}

/// User-facing strategy selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyMode {
    /// Pick based on the capability probe
    Auto,
    Copy,
    Reencode,
}

impl StrategyMode {
    pub fn parse(s: &str) -> SplitXResult<Self> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(StrategyMode::Auto),
            "copy" => Ok(StrategyMode::Copy),
            "reencode" => Ok(StrategyMode::Reencode),
            _ => Err(SplitXError::ConfigError {
                message: format!("invalid mode '{}', expected auto|copy|reencode", s),
            }),
        }
    }
}

/// One way of turning a segment descriptor into an output file
#[async_trait]
pub trait SplitStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// Produce the output file for one segment. Success means the strategy
    /// believes it wrote `output`; the engine independently verifies the file
    /// exists before recording the segment as done.
    async fn split_segment(
        &self,
        input: &Path,
        spec: &SegmentSpec,
        output: &Path,
    ) -> Result<(), SegmentError>;
}

/// Per-segment outcome
#[derive(Debug, Clone, Serialize)]
pub struct SplitResult {
    pub spec: SegmentSpec,
    pub output_path: Option<PathBuf>,
    pub success: bool,
    pub error_detail: Option<String>,
}

/// Aggregate job outcome: the ordered per-segment results plus overall timing
#[derive(Debug, Serialize)]
pub struct JobReport {
    pub strategy: StrategyKind,
    pub results: Vec<SplitResult>,
    pub elapsed_seconds: f64,
}

impl JobReport {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }

    /// Some segments succeeded and some failed
    pub fn is_partial(&self) -> bool {
        self.succeeded() > 0 && self.failed() > 0
    }

    /// Paths of the parts that were actually produced, in index order
    pub fn output_files(&self) -> Vec<PathBuf> {
        self.results
            .iter()
            .filter_map(|r| r.output_path.clone())
            .collect()
    }
}

/// Drives a plan through a strategy, one output file per segment
pub struct SplitEngine {
    strategy: Box<dyn SplitStrategy>,
    concurrency: usize,
    segment_timeout: Duration,
    cancel: CancellationToken,
}

impl SplitEngine {
    pub fn new(strategy: Box<dyn SplitStrategy>) -> Self {
        Self {
            strategy,
            concurrency: 1,
            segment_timeout: SEGMENT_TIMEOUT,
            cancel: CancellationToken::new(),
        }
    }

    /// Allow up to `jobs` segments in flight. Only the stream-copy strategy
    /// actually fans out; re-encoding stays sequential for predictable
    /// resource usage.
    pub fn with_concurrency(mut self, jobs: usize) -> Self {
        self.concurrency = jobs.clamp(1, num_cpus::get());
        self
    }

    pub fn with_segment_timeout(mut self, timeout: Duration) -> Self {
        self.segment_timeout = timeout;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Execute `plan` against `input`, writing one part per segment into
    /// `out_dir`. Segments are processed in index order (or fanned out and
    /// re-ordered by index); a failing segment is recorded and skipped.
    pub async fn execute(
        &self,
        input: &Path,
        plan: &ChunkPlan,
        out_dir: &Path,
        progress: &dyn ProgressReporter,
    ) -> SplitXResult<JobReport> {
        tokio::fs::create_dir_all(out_dir).await?;

        let stem = source_stem(input);
        let extension = source_extension(input);
        let total = plan.segments.len();
        let started = Instant::now();

        info!(
            "Splitting {} into {} parts using {:?}",
            input.display(),
            total,
            self.strategy.kind()
        );

        let fan_out = self.concurrency > 1 && self.strategy.kind() == StrategyKind::StreamCopy;
        let results = if fan_out {
            self.execute_parallel(input, plan, out_dir, &stem, &extension, progress)
                .await?
        } else {
            self.execute_sequential(input, plan, out_dir, &stem, &extension, progress)
                .await?
        };

        let report = JobReport {
            strategy: self.strategy.kind(),
            results,
            elapsed_seconds: started.elapsed().as_secs_f64(),
        };

        info!(
            "Split finished: {} succeeded, {} failed in {:.1}s",
            report.succeeded(),
            report.failed(),
            report.elapsed_seconds
        );
        Ok(report)
    }

    async fn execute_sequential(
        &self,
        input: &Path,
        plan: &ChunkPlan,
        out_dir: &Path,
        stem: &str,
        extension: &str,
        progress: &dyn ProgressReporter,
    ) -> SplitXResult<Vec<SplitResult>> {
        let total = plan.segments.len();
        let mut results = Vec::with_capacity(total);

        for (done, spec) in plan.segments.iter().enumerate() {
            if self.cancel.is_cancelled() {
                return Err(SplitXError::Cancelled);
            }

            let file_name = segment_file_name(stem, spec.index, extension);
            let output = out_dir.join(&file_name);
            results.push(self.run_segment(input, spec, &output).await);

            progress.report(
                Phase::Splitting,
                Some((done + 1) as f64 / total as f64),
                &format!("part {}/{}: {}", done + 1, total, file_name),
            );
        }

        Ok(results)
    }

    async fn execute_parallel(
        &self,
        input: &Path,
        plan: &ChunkPlan,
        out_dir: &Path,
        stem: &str,
        extension: &str,
        progress: &dyn ProgressReporter,
    ) -> SplitXResult<Vec<SplitResult>> {
        let total = plan.segments.len();
        let completed = AtomicUsize::new(0);

        let mut indexed: Vec<(usize, SplitResult)> =
            stream::iter(plan.segments.iter().map(|spec| {
                let file_name = segment_file_name(stem, spec.index, extension);
                let output = out_dir.join(&file_name);
                let completed = &completed;
                async move {
                    let result = if self.cancel.is_cancelled() {
                        SplitResult {
                            spec: spec.clone(),
                            output_path: None,
                            success: false,
                            error_detail: Some("cancelled".to_string()),
                        }
                    } else {
                        self.run_segment(input, spec, &output).await
                    };

                    let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                    progress.report(
                        Phase::Splitting,
                        Some(done as f64 / total as f64),
                        &format!("part {}/{}: {}", done, total, file_name),
                    );
                    (spec.index, result)
                }
            }))
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        if self.cancel.is_cancelled() {
            return Err(SplitXError::Cancelled);
        }

        indexed.sort_by_key(|(index, _)| *index);
        Ok(indexed.into_iter().map(|(_, result)| result).collect())
    }

    /// Run one segment under the per-segment timeout and verify the output
    /// file was actually created before recording success.
    async fn run_segment(&self, input: &Path, spec: &SegmentSpec, output: &Path) -> SplitResult {
        let outcome = match tokio::time::timeout(
            self.segment_timeout,
            self.strategy.split_segment(input, spec, output),
        )
        .await
        {
            Err(_) => Err(SegmentError::Timeout {
                seconds: self.segment_timeout.as_secs(),
            }),
            Ok(outcome) => outcome,
        };

        let outcome = outcome.and_then(|()| {
            if output.is_file() {
                Ok(())
            } else {
                Err(SegmentError::OutputMissing {
                    path: output.to_path_buf(),
                })
            }
        });

        match outcome {
            Ok(()) => SplitResult {
                spec: spec.clone(),
                output_path: Some(output.to_path_buf()),
                success: true,
                error_detail: None,
            },
            Err(e) => {
                warn!("Segment {} failed: {}", spec.index, e);
                SplitResult {
                    spec: spec.clone(),
                    output_path: None,
                    success: false,
                    error_detail: Some(e.to_string()),
                }
            }
        }
    }
}
