use anyhow::{anyhow, Result};
use std::fmt::Write as _;
use std::path::Path;
use std::time::Duration;

use crate::captions::CaptionTimeline;

/// SRT (SubRip) export of a finished caption timeline.
///
/// A sidecar artifact for players and editors; the burn-in path does not
/// consume it.
#[derive(Debug, Clone)]
pub struct SrtWriter {
    fps: f64,
}

impl SrtWriter {
    pub fn new(fps: f64) -> Self {
        Self { fps }
    }

    /// Render the timeline as SRT content.
    pub fn generate(&self, timeline: &CaptionTimeline) -> Result<String> {
        if self.fps <= 0.0 {
            return Err(anyhow!("fps must be positive, got {}", self.fps));
        }

        let mut content = String::new();
        for (index, line) in timeline.lines().iter().enumerate() {
            let start = self.frame_to_duration(line.start_frame);
            let end = self.frame_to_duration(line.end_frame);
            writeln!(
                content,
                "{}\n{} --> {}\n{}\n",
                index + 1,
                format_timestamp(start),
                format_timestamp(end),
                line.text.trim()
            )?;
        }

        Ok(content)
    }

    /// Save the timeline as an SRT file.
    pub async fn save_to_file<P: AsRef<Path>>(
        &self,
        timeline: &CaptionTimeline,
        path: P,
    ) -> Result<()> {
        let content = self.generate(timeline)?;
        tokio::fs::write(path.as_ref(), content).await?;
        Ok(())
    }

    fn frame_to_duration(&self, frame: i64) -> Duration {
        Duration::from_secs_f64((frame.max(0) as f64) / self.fps)
    }
}

/// Format a duration as an SRT timestamp (HH:MM:SS,mmm).
fn format_timestamp(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    let milliseconds = duration.subsec_millis();

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, milliseconds)
}
