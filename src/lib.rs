/// Video Captioner
///
/// Subtitle pipeline for spoken and silent videos: transcribes (or describes)
/// the content, packs the text into width-budgeted caption lines with
/// per-line frame timing, and burns the lines into the video.

pub mod audio;
pub mod captions;
pub mod config;
pub mod metrics;
pub mod overlay;
pub mod pipeline;
pub mod transcription;
pub mod video;
pub mod vision;

// Re-export main types for easy access
pub use crate::captions::{
    allocate_frames, pack_lines, CaptionEngine, CaptionError, CaptionLine, CaptionTimeline,
};
pub use crate::config::{Config, ConfigBuilder};
pub use crate::metrics::{FixedAdvanceMeasurer, RenderMetrics, TextMeasurer};
pub use crate::overlay::{FontRenderer, FrameOverlay};
pub use crate::pipeline::{CaptionJobResult, CaptionSource, VideoCaptioner};
pub use crate::transcription::{TranscriptSegment, TranscriptionResult, WhisperTranscriber};
pub use crate::video::{VideoInfo, VideoProcessor};
pub use crate::vision::{GeminiDescriber, SceneDescriber};
