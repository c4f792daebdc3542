//! Chunk planning for timestamp-based splitting
//!
//! Pure computation: given a total duration and a target chunk length, produce
//! the ordered list of segment descriptors the split engine will execute. The
//! planner knows nothing about filenames or output locations.

use serde::{Deserialize, Serialize};

use crate::error::PlanError;

/// One contiguous time-bounded slice of the source video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentSpec {
    /// 1-based ordinal of the segment
    pub index: usize,
    /// Start offset from the beginning of the source, in seconds
    pub start: f64,
    /// Segment duration in seconds; the final segment may be shorter
    pub duration: f64,
}

impl SegmentSpec {
    /// End offset of the segment, in seconds
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// Ordered, gapless, non-overlapping sequence of segment descriptors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkPlan {
    /// Total duration of the source in seconds
    pub total_duration: f64,
    /// Nominal chunk length in seconds
    pub chunk_length: f64,
    /// Segments in index order
    pub segments: Vec<SegmentSpec>,
}

impl ChunkPlan {
    /// Compute the plan for a source of `total_duration` seconds cut into
    /// chunks of at most `chunk_length` seconds.
    ///
    /// The segment count is `ceil(total_duration / chunk_length)`; when the
    /// duration is an exact multiple of the chunk length the division is exact
    /// and no zero-length trailing segment is produced.
    pub fn build(total_duration: f64, chunk_length: f64) -> Result<Self, PlanError> {
        if !total_duration.is_finite() || total_duration <= 0.0 {
            return Err(PlanError::InvalidDuration {
                value: total_duration,
            });
        }
        if !chunk_length.is_finite() || chunk_length <= 0.0 {
            return Err(PlanError::InvalidChunkLength {
                value: chunk_length,
            });
        }

        let count = (total_duration / chunk_length).ceil() as usize;
        let mut segments = Vec::with_capacity(count);
        for i in 0..count {
            let start = i as f64 * chunk_length;
            let duration = chunk_length.min(total_duration - start);
            segments.push(SegmentSpec {
                index: i + 1,
                start,
                duration,
            });
        }

        Ok(Self {
            total_duration,
            chunk_length,
            segments,
        })
    }

    /// Number of segments in the plan
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-6;

    fn assert_plan_invariants(plan: &ChunkPlan) {
        // Contiguous and non-overlapping
        for pair in plan.segments.windows(2) {
            assert!((pair[0].end() - pair[1].start).abs() < TOLERANCE);
        }
        // Durations sum to the total
        let sum: f64 = plan.segments.iter().map(|s| s.duration).sum();
        assert!((sum - plan.total_duration).abs() < TOLERANCE);
        // Indexes are 1-based and sequential
        for (i, segment) in plan.segments.iter().enumerate() {
            assert_eq!(segment.index, i + 1);
            assert!(segment.duration > 0.0);
        }
    }

    #[test]
    fn test_plan_exact_multiple_yields_single_segment() {
        let plan = ChunkPlan::build(1500.0, 1500.0).unwrap();
        assert_eq!(plan.segment_count(), 1);
        assert_eq!(plan.segments[0].start, 0.0);
        assert_eq!(plan.segments[0].duration, 1500.0);
        assert_plan_invariants(&plan);
    }

    #[test]
    fn test_plan_one_second_over_yields_short_tail() {
        let plan = ChunkPlan::build(1501.0, 1500.0).unwrap();
        assert_eq!(plan.segment_count(), 2);
        assert_eq!(plan.segments[1].start, 1500.0);
        assert!((plan.segments[1].duration - 1.0).abs() < TOLERANCE);
        assert_plan_invariants(&plan);
    }

    #[test]
    fn test_plan_exact_multiple_has_no_trailing_segment() {
        let plan = ChunkPlan::build(3000.0, 1500.0).unwrap();
        assert_eq!(plan.segment_count(), 2);
        assert_eq!(plan.segments[1].duration, 1500.0);
        assert_plan_invariants(&plan);
    }

    #[test]
    fn test_plan_count_matches_ceiling() {
        for (total, chunk) in [
            (10.0, 3.0),
            (59.9, 10.0),
            (7200.0, 1500.0),
            (0.5, 1500.0),
            (123.456, 7.89),
        ] {
            let plan = ChunkPlan::build(total, chunk).unwrap();
            assert_eq!(plan.segment_count(), (total / chunk).ceil() as usize);
            assert_plan_invariants(&plan);
        }
    }

    #[test]
    fn test_plan_shorter_than_chunk_yields_single_segment() {
        let plan = ChunkPlan::build(90.0, 1500.0).unwrap();
        assert_eq!(plan.segment_count(), 1);
        assert_eq!(plan.segments[0].duration, 90.0);
    }

    #[test]
    fn test_plan_is_deterministic() {
        let a = ChunkPlan::build(12345.6, 1500.0).unwrap();
        let b = ChunkPlan::build(12345.6, 1500.0).unwrap();
        assert_eq!(a.segments, b.segments);
    }

    #[test]
    fn test_plan_rejects_invalid_inputs() {
        assert_eq!(
            ChunkPlan::build(0.0, 1500.0).unwrap_err(),
            PlanError::InvalidDuration { value: 0.0 }
        );
        assert_eq!(
            ChunkPlan::build(-10.0, 1500.0).unwrap_err(),
            PlanError::InvalidDuration { value: -10.0 }
        );
        assert_eq!(
            ChunkPlan::build(1500.0, 0.0).unwrap_err(),
            PlanError::InvalidChunkLength { value: 0.0 }
        );
        assert_eq!(
            ChunkPlan::build(1500.0, -1.0).unwrap_err(),
            PlanError::InvalidChunkLength { value: -1.0 }
        );
        assert!(ChunkPlan::build(f64::NAN, 1500.0).is_err());
        assert!(ChunkPlan::build(1500.0, f64::INFINITY).is_err());
    }
}
