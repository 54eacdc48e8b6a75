use tracing::debug;

use super::allocator::{allocate_frames, CaptionError};
use super::packer::pack_lines;
use super::timeline::CaptionTimeline;
use crate::metrics::RenderMetrics;
use crate::transcription::TranscriptSegment;

/// Default lead-in, in frames, applied to every segment's first line. Matches
/// the reference overlay timing.
pub const DEFAULT_LEAD_IN_FRAMES: i64 = 15;

/// Pure per-segment driver: packs each transcript segment into lines and
/// allocates its frame span across them, accumulating the full timeline.
///
/// Segments are processed independently in chronological order; the only
/// shared state is the append-only timeline, written here and read-only
/// afterwards.
#[derive(Debug, Clone, Copy)]
pub struct CaptionEngine {
    metrics: RenderMetrics,
    fps: f64,
    lead_in_frames: i64,
}

impl CaptionEngine {
    pub fn new(metrics: RenderMetrics, fps: f64) -> Self {
        Self {
            metrics,
            fps,
            lead_in_frames: DEFAULT_LEAD_IN_FRAMES,
        }
    }

    pub fn with_lead_in(mut self, lead_in_frames: i64) -> Self {
        self.lead_in_frames = lead_in_frames;
        self
    }

    /// Build the complete caption timeline for an ordered run of segments.
    ///
    /// Whitespace-only segments contribute no lines. Malformed segment timing
    /// fails the whole build; see [`CaptionError`].
    pub fn build_timeline(
        &self,
        segments: &[TranscriptSegment],
    ) -> Result<CaptionTimeline, CaptionError> {
        let mut timeline = CaptionTimeline::new();

        for segment in segments {
            let lines = pack_lines(
                &segment.text,
                self.metrics.line_width_budget_px,
                self.metrics.average_char_width_px,
            );
            let allocated = allocate_frames(
                &lines,
                segment.start_seconds,
                segment.end_seconds,
                self.fps,
                self.lead_in_frames,
            )?;

            debug!(
                "segment {:.2}s..{:.2}s packed into {} line(s)",
                segment.start_seconds,
                segment.end_seconds,
                allocated.len()
            );
            timeline.append(allocated);
        }

        Ok(timeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(text: &str, start: f64, end: f64) -> TranscriptSegment {
        TranscriptSegment {
            text: text.to_string(),
            start_seconds: start,
            end_seconds: end,
        }
    }

    fn engine() -> CaptionEngine {
        let metrics = RenderMetrics {
            average_char_width_px: 10.0,
            line_width_budget_px: 200.0,
        };
        CaptionEngine::new(metrics, 30.0)
    }

    #[test]
    fn test_build_timeline_reference_scenario() {
        let timeline = engine()
            .build_timeline(&[segment("the quick brown fox jumps", 0.0, 2.0)])
            .unwrap();

        assert_eq!(timeline.len(), 2);
        assert_eq!(timeline.lines()[0].text, "the quick brown fox");
        assert_eq!(timeline.lines()[0].start_frame, 15);
        assert_eq!(timeline.lines()[1].text, "jumps");

        let total_span: i64 = timeline.lines().iter().map(|l| l.span()).sum();
        assert!((total_span - 60).abs() <= 2);
    }

    #[test]
    fn test_segments_append_in_order() {
        let timeline = engine()
            .build_timeline(&[
                segment("first part", 0.0, 1.0),
                segment("second part", 1.0, 2.0),
            ])
            .unwrap();

        assert_eq!(timeline.len(), 2);
        assert!(timeline.lines()[0].start_frame <= timeline.lines()[1].start_frame);
    }

    #[test]
    fn test_whitespace_segment_contributes_nothing() {
        let timeline = engine()
            .build_timeline(&[segment("   ", 0.0, 1.0), segment("hello", 1.0, 2.0)])
            .unwrap();

        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline.lines()[0].text, "hello");
    }

    #[test]
    fn test_malformed_segment_fails_build() {
        let result = engine().build_timeline(&[segment("oops", 2.0, 1.0)]);
        assert!(matches!(
            result,
            Err(CaptionError::NegativeDuration { .. })
        ));
    }

    #[test]
    fn test_lead_in_override() {
        let timeline = engine()
            .with_lead_in(0)
            .build_timeline(&[segment("hello", 0.0, 1.0)])
            .unwrap();
        assert_eq!(timeline.lines()[0].start_frame, 0);
    }
}
