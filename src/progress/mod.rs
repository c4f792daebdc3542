//! Progress reporting sink for UI integration
//!
//! A narrow, one-way interface consumed by the acquirer and the split engine.
//! Callers may report once per network buffer, so implementations coalesce
//! updates instead of assuming the caller throttles.

use std::io::{self, Write};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

/// Coarse-grained job phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Fetching the source onto local disk
    Downloading,
    /// Inspecting media metadata
    Probing,
    /// Cutting segments
    Splitting,
    /// Bundling outputs for retrieval
    Packaging,
}

impl Phase {
    fn label(&self) -> &'static str {
        match self {
            Phase::Downloading => "downloading",
            Phase::Probing => "probing",
            Phase::Splitting => "splitting",
            Phase::Packaging => "packaging",
        }
    }
}

/// Progress sink trait; no return value, no back-pressure.
pub trait ProgressReporter: Send + Sync {
    /// Report progress within a phase. `fraction` is in `[0, 1]`, or `None`
    /// when the total amount of work is unknown.
    fn report(&self, phase: Phase, fraction: Option<f64>, label: &str);
}

/// Terminal line reporter. Re-renders only when the visible whole percentage
/// or the phase changes, so per-buffer calls stay cheap.
pub struct ConsoleReporter {
    last: Mutex<Option<(Phase, i32)>>,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self {
            last: Mutex::new(None),
        }
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for ConsoleReporter {
    fn report(&self, phase: Phase, fraction: Option<f64>, label: &str) {
        // -1 stands in for "unknown" so phase changes still render
        let percent = fraction
            .map(|f| (f.clamp(0.0, 1.0) * 100.0) as i32)
            .unwrap_or(-1);

        {
            let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
            if *last == Some((phase, percent)) {
                return;
            }
            *last = Some((phase, percent));
        }

        let mut stderr = io::stderr();
        let line = match fraction {
            Some(_) => format!("\r[{}] {:>3}% {}", phase.label(), percent, label),
            None => format!("\r[{}] {}", phase.label(), label),
        };
        let _ = write!(stderr, "{:<78}", line);
        let _ = stderr.flush();
        if percent >= 100 {
            let _ = writeln!(stderr);
        }
    }
}

/// Structured reporter emitting one JSON event per update, for machine
/// consumers wrapping the CLI.
pub struct JsonReporter;

impl ProgressReporter for JsonReporter {
    fn report(&self, phase: Phase, fraction: Option<f64>, label: &str) {
        let event = serde_json::json!({
            "event": "progress",
            "phase": phase.label(),
            "fraction": fraction,
            "label": label,
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });
        println!("{}", event);
    }
}

/// No-op reporter for when progress tracking is disabled
pub struct NoOpReporter;

impl ProgressReporter for NoOpReporter {
    fn report(&self, _phase: Phase, _fraction: Option<f64>, _label: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Recording reporter used across the test suite
    pub struct RecordingReporter {
        pub events: Mutex<Vec<(Phase, Option<f64>, String)>>,
    }

    impl RecordingReporter {
        pub fn new() -> Self {
            Self {
                events: Mutex::new(Vec::new()),
            }
        }
    }

    impl ProgressReporter for RecordingReporter {
        fn report(&self, phase: Phase, fraction: Option<f64>, label: &str) {
            self.events
                .lock()
                .unwrap()
                .push((phase, fraction, label.to_string()));
        }
    }

    #[test]
    fn test_recording_reporter_captures_order() {
        let reporter = RecordingReporter::new();
        reporter.report(Phase::Downloading, Some(0.25), "chunk");
        reporter.report(Phase::Splitting, None, "part 01");

        let events = reporter.events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].0, Phase::Downloading);
        assert_eq!(events[0].1, Some(0.25));
        assert_eq!(events[1].0, Phase::Splitting);
        assert_eq!(events[1].1, None);
    }

    #[test]
    fn test_console_reporter_coalesces_same_percent() {
        let reporter = ConsoleReporter::new();
        // Two calls landing on the same whole percentage must only update the
        // stored state once; exercised via the internal dedup key.
        reporter.report(Phase::Downloading, Some(0.501), "a");
        let first = *reporter.last.lock().unwrap();
        reporter.report(Phase::Downloading, Some(0.509), "b");
        let second = *reporter.last.lock().unwrap();
        assert_eq!(first, second);
        assert_eq!(second, Some((Phase::Downloading, 50)));

        reporter.report(Phase::Downloading, Some(0.51), "c");
        assert_eq!(
            *reporter.last.lock().unwrap(),
            Some((Phase::Downloading, 51))
        );
    }

    #[test]
    fn test_console_reporter_renders_on_phase_change() {
        let reporter = ConsoleReporter::new();
        reporter.report(Phase::Downloading, None, "fetch");
        assert_eq!(
            *reporter.last.lock().unwrap(),
            Some((Phase::Downloading, -1))
        );
        reporter.report(Phase::Probing, None, "probe");
        assert_eq!(*reporter.last.lock().unwrap(), Some((Phase::Probing, -1)));
    }
}
