use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::audio::AudioExtractor;
use crate::captions::CaptionEngine;
use crate::config::Config;
use crate::metrics::RenderMetrics;
use crate::overlay::{FontRenderer, FrameOverlay};
use crate::transcription::{SrtWriter, TranscriptSegment, WhisperTranscriber};
use crate::video::{VideoInfo, VideoProcessor};
use crate::vision::{describe_keyframes, GeminiDescriber, SceneDescriber};

/// Where the caption text for a video came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptionSource {
    /// Spoken audio transcribed by whisper
    Transcription,
    /// Keyframes described by the vision collaborator
    Vision,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ProcessingStage {
    Probe,
    AudioExtraction,
    Transcription,
    KeyframeDescription,
    TimelineBuild,
    FrameExtraction,
    Overlay,
    Mux,
    Completed,
}

/// Result of captioning a single video end to end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionJobResult {
    pub video_info: VideoInfo,
    pub caption_source: CaptionSource,
    pub caption_lines: usize,
    pub frames_captioned: usize,
    pub output_video: PathBuf,
    pub srt_path: Option<PathBuf>,
    pub processing_time: Duration,
    pub stages_completed: Vec<ProcessingStage>,
    pub completed_at: DateTime<Utc>,
}

/// End-to-end captioning pipeline for one video.
///
/// Probes the file, picks the transcription or vision path based on audio
/// presence, builds the caption timeline, burns it into the extracted frames
/// and muxes the result back together.
pub struct VideoCaptioner {
    config: Config,
    video_processor: VideoProcessor,
    audio_extractor: AudioExtractor,
    transcriber: WhisperTranscriber,
    describer: Option<Box<dyn SceneDescriber>>,
}

impl VideoCaptioner {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let transcriber = WhisperTranscriber::new(config.transcription.clone());

        Ok(Self {
            config,
            video_processor: VideoProcessor::new(),
            audio_extractor: AudioExtractor::new(),
            transcriber,
            describer: None,
        })
    }

    /// Inject a scene describer instead of the configured Gemini client.
    pub fn with_describer(mut self, describer: Box<dyn SceneDescriber>) -> Self {
        self.describer = Some(describer);
        self
    }

    /// Caption `video_path` and write the result under the configured output
    /// directory.
    pub async fn run(&self, video_path: &Path) -> Result<CaptionJobResult> {
        let start_time = Instant::now();
        let mut stages = Vec::new();

        if !self.video_processor.validate(video_path).await? {
            return Err(anyhow!("Video failed validation: {}", video_path.display()));
        }

        let video_info = self.video_processor.probe(video_path).await?;
        stages.push(ProcessingStage::Probe);

        let stem = video_path
            .file_stem()
            .ok_or_else(|| anyhow!("Invalid video path"))?
            .to_string_lossy()
            .to_string();
        let work_dir = self.config.output.base_dir.join(format!("{}_work", stem));
        let frames_dir = work_dir.join("frames");
        tokio::fs::create_dir_all(&work_dir).await?;

        // Caption text: transcribe spoken audio, or describe keyframes when
        // the video has no audio stream.
        let (segments, caption_source, audio_path) = if video_info.has_audio {
            let audio_info = self
                .audio_extractor
                .extract(video_path, &work_dir.join("audio"))
                .await?;
            stages.push(ProcessingStage::AudioExtraction);

            let transcription = self
                .transcriber
                .transcribe(&audio_info.path, &work_dir.join("whisper"))
                .await?;
            stages.push(ProcessingStage::Transcription);

            (
                transcription.segments,
                CaptionSource::Transcription,
                Some(audio_info.path),
            )
        } else {
            info!("🔇 No audio stream, describing keyframes instead");
            let segments = self.describe_silent_video(&video_info, &work_dir).await?;
            stages.push(ProcessingStage::KeyframeDescription);
            (segments, CaptionSource::Vision, None)
        };

        if segments.is_empty() {
            warn!("No caption material produced for {}", video_info.filename);
        }

        // Probe the caption font once and derive the packing geometry.
        let renderer = FontRenderer::load(&self.config.render)?;
        let metrics = RenderMetrics::from_probe(
            &renderer,
            &self.config.render.probe_text,
            video_info.width,
            video_info.height,
            self.config.render.margin_ratio,
        )?;

        let engine = CaptionEngine::new(metrics, video_info.fps)
            .with_lead_in(self.config.render.lead_in_frames);
        let timeline = engine.build_timeline(&segments)?;
        stages.push(ProcessingStage::TimelineBuild);
        info!("🗒️  Timeline built: {} caption lines", timeline.len());

        self.video_processor
            .extract_frames(&video_info, &frames_dir)
            .await?;
        stages.push(ProcessingStage::FrameExtraction);

        let overlay = FrameOverlay::new(renderer, self.config.performance.max_workers);
        let frames_captioned = overlay.burn_in(&timeline, &frames_dir).await?;
        stages.push(ProcessingStage::Overlay);

        let output_video = self
            .config
            .output
            .base_dir
            .join(format!("{}_captioned.mp4", stem));
        self.video_processor
            .create_video(
                &frames_dir,
                audio_path.as_deref(),
                video_info.fps,
                &output_video,
            )
            .await?;
        stages.push(ProcessingStage::Mux);

        let srt_path = if self.config.output.write_srt {
            let path = self.config.output.base_dir.join(format!("{}.srt", stem));
            SrtWriter::new(video_info.fps)
                .save_to_file(&timeline, &path)
                .await?;
            info!("📝 SRT sidecar written: {}", path.display());
            Some(path)
        } else {
            None
        };

        if self.config.output.cleanup_work_dir {
            debug!("Cleaning up work directory {}", work_dir.display());
            let _ = tokio::fs::remove_dir_all(&work_dir).await;
        }

        stages.push(ProcessingStage::Completed);
        let result = CaptionJobResult {
            video_info,
            caption_source,
            caption_lines: timeline.len(),
            frames_captioned,
            output_video,
            srt_path,
            processing_time: start_time.elapsed(),
            stages_completed: stages,
            completed_at: Utc::now(),
        };

        if self.config.output.save_metadata {
            self.save_summary(&result).await?;
        }

        Ok(result)
    }

    /// Fabricate transcript segments for a silent video by describing
    /// keyframes at the configured interval.
    async fn describe_silent_video(
        &self,
        video_info: &VideoInfo,
        work_dir: &Path,
    ) -> Result<Vec<TranscriptSegment>> {
        let interval = self.config.vision.keyframe_interval_seconds;
        let keyframes = self
            .video_processor
            .extract_keyframes(video_info, &work_dir.join("keyframes"), interval)
            .await?;

        let fallback;
        let describer: &dyn SceneDescriber = match &self.describer {
            Some(d) => d.as_ref(),
            None => {
                fallback = GeminiDescriber::new(self.config.vision.clone())?;
                &fallback
            }
        };

        describe_keyframes(describer, &keyframes, interval).await
    }

    async fn save_summary(&self, result: &CaptionJobResult) -> Result<()> {
        let summary_path = self
            .config
            .output
            .base_dir
            .join(format!("{}.summary.json", result.video_info.filename));
        let json_data = serde_json::to_string_pretty(result)?;
        tokio::fs::write(&summary_path, json_data).await?;
        info!("💾 Summary saved to: {}", summary_path.display());
        Ok(())
    }
}
