use thiserror::Error;

use super::timeline::CaptionLine;

/// Engine-level input contract violations.
///
/// The engine itself performs no I/O; these are the only failure modes it
/// owns. Malformed timing inputs fail fast here instead of silently producing
/// negative-length intervals.
#[derive(Debug, Error, PartialEq)]
pub enum CaptionError {
    #[error("fps must be positive and finite, got {0}")]
    InvalidFps(f64),
    #[error("segment ends before it starts ({start}s .. {end}s)")]
    NegativeDuration { start: f64, end: f64 },
    #[error("segment bounds must be finite ({start}s .. {end}s)")]
    NonFiniteBounds { start: f64, end: f64 },
}

/// Distribute a segment's frame span across its packed lines, proportional to
/// each line's character count.
///
/// The cursor starts at `round(start * fps) + lead_in_frames` and each line's
/// end frame is `round(share * total_frames) + cursor`, so spans are
/// contiguous and monotone with no gaps or overlap within the segment. The
/// summed spans reconstruct the segment's frame total up to per-line rounding
/// slack. Lines with zero total characters (no packable text) emit nothing.
pub fn allocate_frames(
    lines: &[String],
    segment_start_s: f64,
    segment_end_s: f64,
    fps: f64,
    lead_in_frames: i64,
) -> Result<Vec<CaptionLine>, CaptionError> {
    if !fps.is_finite() || fps <= 0.0 {
        return Err(CaptionError::InvalidFps(fps));
    }
    if !segment_start_s.is_finite() || !segment_end_s.is_finite() {
        return Err(CaptionError::NonFiniteBounds {
            start: segment_start_s,
            end: segment_end_s,
        });
    }
    if segment_end_s < segment_start_s {
        return Err(CaptionError::NegativeDuration {
            start: segment_start_s,
            end: segment_end_s,
        });
    }

    // Character count of the packed line text, not the raw transcript text.
    let total_chars: usize = lines.iter().map(|line| line.chars().count()).sum();
    if total_chars == 0 {
        return Ok(Vec::new());
    }

    let total_frames = ((segment_end_s - segment_start_s) * fps).round();
    let mut cursor = (segment_start_s * fps).round() as i64 + lead_in_frames;

    let mut allocated = Vec::with_capacity(lines.len());
    for line in lines {
        let share = line.chars().count() as f64 / total_chars as f64;
        let end_frame = (share * total_frames).round() as i64 + cursor;
        allocated.push(CaptionLine {
            text: line.clone(),
            start_frame: cursor,
            end_frame,
        });
        cursor = end_frame;
    }

    Ok(allocated)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_invalid_inputs_fail_fast() {
        let ls = lines(&["hello"]);
        assert_eq!(
            allocate_frames(&ls, 0.0, 1.0, 0.0, 15),
            Err(CaptionError::InvalidFps(0.0))
        );
        assert_eq!(
            allocate_frames(&ls, 0.0, 1.0, -30.0, 15),
            Err(CaptionError::InvalidFps(-30.0))
        );
        assert_eq!(
            allocate_frames(&ls, 2.0, 1.0, 30.0, 15),
            Err(CaptionError::NegativeDuration { start: 2.0, end: 1.0 })
        );
        assert!(matches!(
            allocate_frames(&ls, f64::NAN, 1.0, 30.0, 15),
            Err(CaptionError::NonFiniteBounds { .. })
        ));
    }

    #[test]
    fn test_no_lines_emits_nothing() {
        assert_eq!(allocate_frames(&[], 0.0, 2.0, 30.0, 15), Ok(Vec::new()));
        // Degenerate but defensive: lines that are all empty strings.
        assert_eq!(
            allocate_frames(&lines(&["", ""]), 0.0, 2.0, 30.0, 15),
            Ok(Vec::new())
        );
    }

    #[test]
    fn test_lead_in_and_contiguity() {
        let ls = lines(&["the quick brown fox", "jumps"]);
        let allocated = allocate_frames(&ls, 0.0, 2.0, 30.0, 15).unwrap();

        assert_eq!(allocated.len(), 2);
        assert_eq!(allocated[0].start_frame, 15);
        // Spans chain with no gap or overlap.
        assert_eq!(allocated[1].start_frame, allocated[0].end_frame);
    }

    #[test]
    fn test_reference_scenario_conservation() {
        // 2 seconds at 30fps: 60 frames total, split 19:5 by characters.
        let ls = lines(&["the quick brown fox", "jumps"]);
        let allocated = allocate_frames(&ls, 0.0, 2.0, 30.0, 15).unwrap();

        let span: i64 = allocated
            .iter()
            .map(|l| l.end_frame - l.start_frame)
            .sum();
        assert!((span - 60).abs() <= allocated.len() as i64);
    }

    #[test]
    fn test_proportionality() {
        // 10 chars vs 5 chars over 90 frames: spans should sit within one
        // frame of the 2:1 character ratio.
        let ls = lines(&["aaaaaaaaaa", "bbbbb"]);
        let allocated = allocate_frames(&ls, 0.0, 3.0, 30.0, 15).unwrap();

        let first = allocated[0].end_frame - allocated[0].start_frame;
        let second = allocated[1].end_frame - allocated[1].start_frame;
        assert!((first - 2 * second).abs() <= 2);
    }

    #[test]
    fn test_nonzero_segment_start() {
        let ls = lines(&["hello world"]);
        let allocated = allocate_frames(&ls, 4.5, 6.5, 30.0, 15).unwrap();

        assert_eq!(allocated[0].start_frame, 135 + 15);
        assert_eq!(allocated[0].end_frame, 135 + 15 + 60);
    }

    #[test]
    fn test_zero_duration_segment() {
        // A zero-length segment is valid input and collapses every span.
        let ls = lines(&["blink"]);
        let allocated = allocate_frames(&ls, 1.0, 1.0, 30.0, 15).unwrap();
        assert_eq!(allocated[0].start_frame, allocated[0].end_frame);
    }

    #[test]
    fn test_configurable_lead_in() {
        let ls = lines(&["hello"]);
        let allocated = allocate_frames(&ls, 0.0, 1.0, 30.0, 0).unwrap();
        assert_eq!(allocated[0].start_frame, 0);
    }
}
