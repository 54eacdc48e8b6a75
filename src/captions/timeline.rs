use serde::{Deserialize, Serialize};

/// One screen-ready subtitle line with its active frame interval.
///
/// Both interval endpoints are inclusive. `start_frame <= end_frame` holds for
/// every line the allocator produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptionLine {
    pub text: String,
    pub start_frame: i64,
    pub end_frame: i64,
}

impl CaptionLine {
    /// Whether `frame_index` falls inside this line's display interval.
    pub fn contains(&self, frame_index: i64) -> bool {
        frame_index >= self.start_frame && frame_index <= self.end_frame
    }

    /// Number of frames this line is displayed for.
    pub fn span(&self) -> i64 {
        self.end_frame - self.start_frame
    }
}

/// The complete ordered record of caption lines for a video.
///
/// Built append-only in chronological segment order, then queried read-only
/// by the overlay stage, one lookup per output frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaptionTimeline {
    lines: Vec<CaptionLine>,
}

impl CaptionTimeline {
    pub fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Extend the timeline with one segment's allocated lines.
    pub fn append(&mut self, lines: Vec<CaptionLine>) {
        self.lines.extend(lines);
    }

    /// Text of the first line (in timeline order) whose interval contains
    /// `frame_index`.
    ///
    /// Adjacent segments can produce equal or overlapping boundary frames
    /// through rounding; the first match keeps the earlier line on screen,
    /// which is the intended priority.
    pub fn lookup(&self, frame_index: i64) -> Option<&str> {
        self.lines
            .iter()
            .find(|line| line.contains(frame_index))
            .map(|line| line.text.as_str())
    }

    pub fn lines(&self) -> &[CaptionLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Highest end frame across all lines, the last frame any caption is
    /// visible on.
    pub fn last_frame(&self) -> Option<i64> {
        self.lines.iter().map(|line| line.end_frame).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(text: &str, start: i64, end: i64) -> CaptionLine {
        CaptionLine {
            text: text.to_string(),
            start_frame: start,
            end_frame: end,
        }
    }

    #[test]
    fn test_lookup_inclusive_bounds() {
        let mut timeline = CaptionTimeline::new();
        timeline.append(vec![line("A", 0, 10), line("B", 11, 20)]);

        assert_eq!(timeline.lookup(5), Some("A"));
        assert_eq!(timeline.lookup(15), Some("B"));
        assert_eq!(timeline.lookup(10), Some("A"));
        assert_eq!(timeline.lookup(11), Some("B"));
        assert_eq!(timeline.lookup(25), None);
    }

    #[test]
    fn test_lookup_first_match_wins_on_overlap() {
        let mut timeline = CaptionTimeline::new();
        timeline.append(vec![line("A", 0, 12)]);
        timeline.append(vec![line("B", 10, 20)]);

        // Rounding slack between segments can overlap spans; the earlier
        // line keeps priority.
        assert_eq!(timeline.lookup(11), Some("A"));
        assert_eq!(timeline.lookup(13), Some("B"));
    }

    #[test]
    fn test_empty_timeline() {
        let timeline = CaptionTimeline::new();
        assert!(timeline.is_empty());
        assert_eq!(timeline.lookup(0), None);
        assert_eq!(timeline.last_frame(), None);
    }

    #[test]
    fn test_append_preserves_order() {
        let mut timeline = CaptionTimeline::new();
        timeline.append(vec![line("first", 0, 5)]);
        timeline.append(vec![line("second", 6, 9), line("third", 10, 14)]);

        let texts: Vec<&str> = timeline.lines().iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
        assert_eq!(timeline.len(), 3);
        assert_eq!(timeline.last_frame(), Some(14));
    }
}
