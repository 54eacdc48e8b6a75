use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Extracted audio track metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioInfo {
    pub path: PathBuf,
    pub sample_rate: u32,
    pub channels: u32,
}

/// Audio extraction for transcription.
#[derive(Debug, Clone)]
pub struct AudioExtractor {
    /// Default sample rate for transcription (Whisper optimal)
    pub target_sample_rate: u32,
}

impl AudioExtractor {
    pub fn new() -> Self {
        Self {
            target_sample_rate: 16000,
        }
    }

    /// Extract the audio stream as 16-bit mono PCM WAV, the format the
    /// whisper backends expect.
    pub async fn extract(&self, video_path: &Path, output_dir: &Path) -> Result<AudioInfo> {
        let filename = video_path
            .file_stem()
            .ok_or_else(|| anyhow!("Invalid video filename"))?
            .to_string_lossy();
        let audio_path = output_dir.join(format!("{}.wav", filename));

        info!("🎵 Extracting audio from {}", video_path.display());
        tokio::fs::create_dir_all(output_dir).await?;

        let status = tokio::process::Command::new("ffmpeg")
            .arg("-i")
            .arg(video_path)
            .args([
                "-vn",
                "-acodec",
                "pcm_s16le",
                "-ar",
                &self.target_sample_rate.to_string(),
                "-ac",
                "1",
                "-f",
                "wav",
                "-y",
            ])
            .arg(&audio_path)
            .status()
            .await?;

        if !status.success() {
            return Err(anyhow!("Audio extraction failed for {}", video_path.display()));
        }

        info!("✅ Audio extracted: {}", audio_path.display());
        Ok(AudioInfo {
            path: audio_path,
            sample_rate: self.target_sample_rate,
            channels: 1,
        })
    }
}

impl Default for AudioExtractor {
    fn default() -> Self {
        Self::new()
    }
}
