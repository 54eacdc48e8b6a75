use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Video information extracted from file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoInfo {
    pub path: PathBuf,
    pub filename: String,
    pub duration: Duration,
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub format: String,
    pub has_audio: bool,
}

/// Video probing and frame handling via the FFmpeg command line tools.
#[derive(Debug, Clone, Default)]
pub struct VideoProcessor;

impl VideoProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Extract video information using ffprobe.
    ///
    /// `has_audio` decides which captioning path the pipeline takes
    /// (transcription vs. keyframe description).
    pub async fn probe(&self, video_path: &Path) -> Result<VideoInfo> {
        let output = tokio::process::Command::new("ffprobe")
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(video_path)
            .output()
            .await?;

        if !output.status.success() {
            return Err(anyhow!("ffprobe failed for {}", video_path.display()));
        }

        let json_str = String::from_utf8(output.stdout)?;
        let ffprobe_data: serde_json::Value = serde_json::from_str(&json_str)?;

        let format = &ffprobe_data["format"];
        let streams = ffprobe_data["streams"]
            .as_array()
            .ok_or_else(|| anyhow!("ffprobe output has no streams array"))?;

        let video_stream = streams
            .iter()
            .find(|s| s["codec_type"] == "video")
            .ok_or_else(|| anyhow!("No video stream found"))?;

        let has_audio = streams.iter().any(|s| s["codec_type"] == "audio");

        let duration_seconds: f64 = format["duration"]
            .as_str()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.0);

        let fps = video_stream["r_frame_rate"]
            .as_str()
            .and_then(parse_frame_rate)
            .ok_or_else(|| anyhow!("Could not determine frame rate"))?;

        let video_info = VideoInfo {
            path: video_path.to_path_buf(),
            filename: video_path
                .file_name()
                .ok_or_else(|| anyhow!("Invalid video path"))?
                .to_string_lossy()
                .to_string(),
            duration: Duration::from_secs_f64(duration_seconds),
            width: video_stream["width"].as_u64().unwrap_or(0) as u32,
            height: video_stream["height"].as_u64().unwrap_or(0) as u32,
            fps,
            format: format["format_name"]
                .as_str()
                .unwrap_or("unknown")
                .to_string(),
            has_audio,
        };

        info!(
            "📹 Analyzed video: {} ({}x{}, {:.1}fps, {:.1}s, audio: {})",
            video_info.filename,
            video_info.width,
            video_info.height,
            video_info.fps,
            video_info.duration.as_secs_f64(),
            video_info.has_audio
        );

        Ok(video_info)
    }

    /// Dump every frame of the video as numbered JPEGs (`00000.jpg`, ...).
    pub async fn extract_frames(&self, video_info: &VideoInfo, frames_dir: &Path) -> Result<()> {
        info!("🎞️  Extracting frames from {}", video_info.filename);
        tokio::fs::create_dir_all(frames_dir).await?;

        let status = tokio::process::Command::new("ffmpeg")
            .arg("-i")
            .arg(&video_info.path)
            .args(["-qscale:v", "2", "-start_number", "0", "-y"])
            .arg(frames_dir.join("%05d.jpg"))
            .status()
            .await?;

        if !status.success() {
            return Err(anyhow!("Frame extraction failed for {}", video_info.filename));
        }

        info!("✅ Frames extracted to {}", frames_dir.display());
        Ok(())
    }

    /// Extract one frame every `interval_seconds` for the silent-video path.
    pub async fn extract_keyframes(
        &self,
        video_info: &VideoInfo,
        frames_dir: &Path,
        interval_seconds: u32,
    ) -> Result<Vec<PathBuf>> {
        if interval_seconds == 0 {
            return Err(anyhow!("Keyframe interval must be positive"));
        }

        info!(
            "🎬 Extracting keyframes every {}s from {}",
            interval_seconds, video_info.filename
        );
        tokio::fs::create_dir_all(frames_dir).await?;

        let status = tokio::process::Command::new("ffmpeg")
            .arg("-i")
            .arg(&video_info.path)
            .args([
                "-vf",
                &format!("fps=1/{}", interval_seconds),
                "-qscale:v",
                "2",
                "-start_number",
                "0",
                "-y",
            ])
            .arg(frames_dir.join("frame_%04d.jpg"))
            .status()
            .await?;

        if !status.success() {
            return Err(anyhow!(
                "Keyframe extraction failed for {}",
                video_info.filename
            ));
        }

        let mut keyframes = Vec::new();
        let mut entries = tokio::fs::read_dir(frames_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("jpg") {
                keyframes.push(path);
            }
        }
        keyframes.sort();

        info!("✅ Extracted {} keyframes", keyframes.len());
        Ok(keyframes)
    }

    /// Re-assemble the numbered frame sequence into a video and mux in the
    /// original audio track.
    pub async fn create_video(
        &self,
        frames_dir: &Path,
        audio_path: Option<&Path>,
        fps: f64,
        output_path: &Path,
    ) -> Result<()> {
        info!("🎥 Creating video at {}", output_path.display());

        let mut cmd = tokio::process::Command::new("ffmpeg");
        cmd.args(["-framerate", &format!("{}", fps)])
            .arg("-i")
            .arg(frames_dir.join("%05d.jpg"));

        if let Some(audio) = audio_path {
            cmd.arg("-i").arg(audio).args(["-c:a", "aac", "-shortest"]);
        }

        cmd.args(["-c:v", "libx264", "-pix_fmt", "yuv420p", "-y"])
            .arg(output_path);

        let status = cmd.status().await?;
        if !status.success() {
            return Err(anyhow!("Video creation failed for {}", output_path.display()));
        }

        info!("✅ Video created: {}", output_path.display());
        Ok(())
    }

    /// Validate video file integrity before processing.
    pub async fn validate(&self, video_path: &Path) -> Result<bool> {
        let output = tokio::process::Command::new("ffprobe")
            .args(["-v", "error", "-select_streams", "v:0", "-show_entries", "stream=codec_name", "-of", "csv=p=0"])
            .arg(video_path)
            .output()
            .await?;

        if !output.status.success() {
            warn!("Validation failed for {}", video_path.display());
        }
        Ok(output.status.success())
    }
}

/// Parse an ffprobe `r_frame_rate` value ("30000/1001" or "25").
fn parse_frame_rate(s: &str) -> Option<f64> {
    let parts: Vec<&str> = s.split('/').collect();
    if parts.len() == 2 {
        let num: f64 = parts[0].parse().ok()?;
        let den: f64 = parts[1].parse().ok()?;
        if den == 0.0 {
            return None;
        }
        Some(num / den)
    } else {
        s.parse().ok()
    }
}
