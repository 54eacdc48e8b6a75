use ab_glyph::{FontVec, PxScale};
use anyhow::{anyhow, Context, Result};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::captions::CaptionTimeline;
use crate::config::RenderConfig;
use crate::metrics::TextMeasurer;

/// Caption font loaded for drawing and measuring.
///
/// Doubles as the production [`TextMeasurer`]: the packer's width budget is
/// probed with the same font the overlay draws with.
pub struct FontRenderer {
    font: FontVec,
    scale: PxScale,
    color: Rgb<u8>,
}

impl FontRenderer {
    pub fn load(config: &RenderConfig) -> Result<Self> {
        let font_bytes = std::fs::read(&config.font_path)
            .with_context(|| format!("Failed to read font file {}", config.font_path.display()))?;
        let font = FontVec::try_from_vec(font_bytes)
            .map_err(|_| anyhow!("Invalid font file {}", config.font_path.display()))?;

        Ok(Self {
            font,
            scale: PxScale::from(config.font_scale),
            color: Rgb(config.font_color),
        })
    }

    /// Draw `text` centered horizontally and vertically on the frame.
    pub fn draw_centered(&self, image: &mut RgbImage, text: &str) {
        let (text_w, text_h) = text_size(self.scale, &self.font, text);
        let x = (image.width() as i32 - text_w as i32) / 2;
        let y = (image.height() as i32 - text_h as i32) / 2;
        draw_text_mut(image, self.color, x, y, self.scale, &self.font, text);
    }
}

impl TextMeasurer for FontRenderer {
    fn measure_width(&self, text: &str) -> f64 {
        text_size(self.scale, &self.font, text).0 as f64
    }
}

/// Burns timeline captions into the extracted frame sequence.
///
/// Frames are independent once the timeline is built, so they are processed
/// concurrently under a semaphore; the timeline itself is shared read-only.
pub struct FrameOverlay {
    renderer: Arc<FontRenderer>,
    max_workers: usize,
}

impl FrameOverlay {
    pub fn new(renderer: FontRenderer, max_workers: usize) -> Self {
        Self {
            renderer: Arc::new(renderer),
            max_workers: max_workers.max(1),
        }
    }

    /// Overlay the active caption (if any) onto every numbered frame in
    /// `frames_dir`, rewriting the files in place. Returns the number of
    /// frames that received a caption.
    pub async fn burn_in(&self, timeline: &CaptionTimeline, frames_dir: &Path) -> Result<usize> {
        let frames = numbered_frames(frames_dir).await?;
        info!(
            "🔥 Burning captions into {} frames ({} workers)",
            frames.len(),
            self.max_workers
        );

        let timeline = Arc::new(timeline.clone());
        let semaphore = Arc::new(Semaphore::new(self.max_workers));
        let mut handles = Vec::new();

        for (frame_index, frame_path) in frames {
            // The linear scan stops at the first containing interval, so the
            // earlier of two boundary-overlapping lines wins.
            let Some(text) = timeline.lookup(frame_index).map(str::to_string) else {
                continue;
            };

            let renderer = Arc::clone(&self.renderer);
            let semaphore = Arc::clone(&semaphore);

            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire().await.expect("semaphore closed");
                tokio::task::spawn_blocking(move || burn_one(&renderer, &frame_path, &text))
                    .await
                    .expect("overlay task panicked")
            }));
        }

        let mut burned = 0usize;
        for handle in handles {
            match handle.await.expect("overlay task panicked") {
                Ok(()) => burned += 1,
                Err(e) => warn!("Frame overlay failed: {}", e),
            }
        }

        info!("✅ Captions burned into {} frames", burned);
        Ok(burned)
    }
}

fn burn_one(renderer: &FontRenderer, frame_path: &Path, text: &str) -> Result<()> {
    let mut image = image::open(frame_path)
        .with_context(|| format!("Failed to open frame {}", frame_path.display()))?
        .to_rgb8();
    renderer.draw_centered(&mut image, text);
    image
        .save(frame_path)
        .with_context(|| format!("Failed to save frame {}", frame_path.display()))?;
    Ok(())
}

/// Collect `NNNNN.jpg` frames with their indices, in frame order.
async fn numbered_frames(frames_dir: &Path) -> Result<Vec<(i64, PathBuf)>> {
    let mut frames = Vec::new();
    let mut entries = tokio::fs::read_dir(frames_dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("jpg") {
            continue;
        }
        let Some(index) = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.parse::<i64>().ok())
        else {
            continue;
        };
        frames.push((index, path));
    }

    frames.sort_by_key(|(index, _)| *index);
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_numbered_frames_sorted_and_filtered() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["00002.jpg", "00000.jpg", "00001.jpg", "audio.wav", "x.jpg"] {
            tokio::fs::write(temp_dir.path().join(name), b"stub")
                .await
                .unwrap();
        }

        let frames = numbered_frames(temp_dir.path()).await.unwrap();
        let indices: Vec<i64> = frames.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }
}
