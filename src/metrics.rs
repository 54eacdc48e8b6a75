use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Narrow seam to the external text-measurement capability.
///
/// The production implementation measures with the overlay font
/// ([`crate::overlay::FontRenderer`]); tests use [`FixedAdvanceMeasurer`].
pub trait TextMeasurer {
    /// Rendered pixel width of `text` in the configured font.
    fn measure_width(&self, text: &str) -> f64;
}

/// Fixed-advance measurer: every character is `advance_px` wide.
#[derive(Debug, Clone, Copy)]
pub struct FixedAdvanceMeasurer {
    pub advance_px: f64,
}

impl TextMeasurer for FixedAdvanceMeasurer {
    fn measure_width(&self, text: &str) -> f64 {
        text.chars().count() as f64 * self.advance_px
    }
}

/// Per-video rendering geometry, derived once from a probe measurement and
/// the frame dimensions, then constant for the whole run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RenderMetrics {
    /// Average pixel width of one character in the caption font.
    pub average_char_width_px: f64,
    /// Usable line width after cropping and margin.
    pub line_width_budget_px: f64,
}

impl RenderMetrics {
    /// Derive metrics from a probe string and the frame geometry.
    ///
    /// The width budget is the 16:9-cropped region of the frame (clamped to
    /// the frame width when the frame is already narrower) minus
    /// `margin_ratio` of itself. The average character width is the measured
    /// probe width divided by its character count.
    pub fn from_probe(
        measurer: &dyn TextMeasurer,
        probe_text: &str,
        frame_width: u32,
        frame_height: u32,
        margin_ratio: f64,
    ) -> Result<Self> {
        let probe_chars = probe_text.chars().count();
        if probe_chars == 0 {
            return Err(anyhow!("probe text must not be empty"));
        }
        if frame_width == 0 || frame_height == 0 {
            return Err(anyhow!(
                "invalid frame dimensions {}x{}",
                frame_width,
                frame_height
            ));
        }
        if !(0.0..1.0).contains(&margin_ratio) {
            return Err(anyhow!("margin ratio {} outside [0, 1)", margin_ratio));
        }

        let cropped_width = (frame_height as f64 * 9.0 / 16.0).min(frame_width as f64);
        let line_width_budget_px = cropped_width * (1.0 - margin_ratio);
        let average_char_width_px = measurer.measure_width(probe_text) / probe_chars as f64;

        let metrics = Self {
            average_char_width_px,
            line_width_budget_px,
        };

        info!(
            "📐 Render metrics: {:.1}px budget, {:.2}px avg char width",
            metrics.line_width_budget_px, metrics.average_char_width_px
        );

        Ok(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_advance_measurer() {
        let measurer = FixedAdvanceMeasurer { advance_px: 10.0 };
        assert_eq!(measurer.measure_width("hello"), 50.0);
        assert_eq!(measurer.measure_width(""), 0.0);
    }

    #[test]
    fn test_from_probe_landscape_frame() {
        let measurer = FixedAdvanceMeasurer { advance_px: 12.0 };
        let metrics =
            RenderMetrics::from_probe(&measurer, "sample text", 1920, 1080, 0.1).unwrap();

        // 1080 * 9/16 = 607.5, minus the 10% margin.
        assert!((metrics.line_width_budget_px - 607.5 * 0.9).abs() < 1e-9);
        assert!((metrics.average_char_width_px - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_from_probe_clamps_to_narrow_frame() {
        let measurer = FixedAdvanceMeasurer { advance_px: 10.0 };
        // A 480x1080 portrait frame is narrower than its 16:9 crop region.
        let metrics = RenderMetrics::from_probe(&measurer, "abc", 480, 1080, 0.1).unwrap();
        assert!((metrics.line_width_budget_px - 480.0 * 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_from_probe_rejects_bad_input() {
        let measurer = FixedAdvanceMeasurer { advance_px: 10.0 };
        assert!(RenderMetrics::from_probe(&measurer, "", 1920, 1080, 0.1).is_err());
        assert!(RenderMetrics::from_probe(&measurer, "abc", 0, 1080, 0.1).is_err());
        assert!(RenderMetrics::from_probe(&measurer, "abc", 1920, 1080, 1.0).is_err());
    }
}
