use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the video captioner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Caption rendering and timing settings
    pub render: RenderConfig,

    /// Transcription backend settings
    pub transcription: TranscriptionConfig,

    /// Generative vision settings (silent-video path)
    pub vision: VisionConfig,

    /// Output and storage settings
    pub output: OutputConfig,

    /// Performance and resource settings
    pub performance: PerformanceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// TrueType font used for measuring and burn-in
    pub font_path: PathBuf,

    /// Pixel scale of the caption font
    pub font_scale: f32,

    /// Caption color (RGB)
    pub font_color: [u8; 3],

    /// Fraction of the cropped width reserved as margin
    pub margin_ratio: f64,

    /// Frames added before each segment's first line
    pub lead_in_frames: i64,

    /// Representative string measured once to derive the average
    /// character width
    pub probe_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionConfig {
    /// Whisper model name
    pub model: String,

    /// Explicit path to a whisper.cpp model file; when unset, standard
    /// install locations are probed
    pub model_path: Option<PathBuf>,

    /// Language hint for transcription
    pub language: Option<String>,

    /// Timeout for the whisper command (seconds)
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionConfig {
    /// Vision model name
    pub model: String,

    /// API key for the vision service
    pub api_key: Option<String>,

    /// Request timeout (seconds)
    pub timeout_seconds: u64,

    /// Seconds between described keyframes
    pub keyframe_interval_seconds: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Base output directory
    pub base_dir: PathBuf,

    /// Also write an SRT sidecar next to the output video
    pub write_srt: bool,

    /// Save a JSON processing summary
    pub save_metadata: bool,

    /// Remove the frames/audio work directory afterwards
    pub cleanup_work_dir: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceConfig {
    /// Maximum number of concurrent overlay workers
    pub max_workers: usize,
}

impl Config {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let config_paths = [
            "video-captioner.toml",
            "config/video-captioner.toml",
            "~/.config/video-captioner/config.toml",
        ];

        for path in &config_paths {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                match toml::from_str(&config_str) {
                    Ok(config) => {
                        tracing::info!("📄 Loaded configuration from: {}", path);
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path, e);
                    }
                }
            }
        }

        Self::from_env()
    }

    /// Load configuration from environment variables on top of defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(api_key) = std::env::var("VIDEO_CAPTIONER_API_KEY") {
            config.vision.api_key = Some(api_key);
        }

        if let Ok(model) = std::env::var("VIDEO_CAPTIONER_WHISPER_MODEL") {
            config.transcription.model = model;
        }

        if let Ok(font) = std::env::var("VIDEO_CAPTIONER_FONT") {
            config.render.font_path = PathBuf::from(font);
        }

        if let Ok(workers) = std::env::var("VIDEO_CAPTIONER_WORKERS") {
            config.performance.max_workers = workers.parse().unwrap_or(4);
        }

        if let Ok(output_dir) = std::env::var("VIDEO_CAPTIONER_OUTPUT_DIR") {
            config.output.base_dir = PathBuf::from(output_dir);
        }

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &str) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path);
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.performance.max_workers == 0 {
            return Err(anyhow!("max_workers must be greater than 0"));
        }

        if !(0.0..1.0).contains(&self.render.margin_ratio) {
            return Err(anyhow!("margin_ratio must be in [0, 1)"));
        }

        if self.render.font_scale <= 0.0 {
            return Err(anyhow!("font_scale must be positive"));
        }

        if self.render.probe_text.trim().is_empty() {
            return Err(anyhow!("probe_text must not be empty"));
        }

        if self.vision.keyframe_interval_seconds == 0 {
            return Err(anyhow!("keyframe_interval_seconds must be greater than 0"));
        }

        tracing::info!("✅ Configuration validation passed");
        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Video Captioner Configuration:\n\
            - Workers: {}\n\
            - Whisper Model: {}\n\
            - Vision Model: {}\n\
            - Font: {} (scale {})\n\
            - Lead-in: {} frames, margin {:.0}%\n\
            - Output Directory: {}",
            self.performance.max_workers,
            self.transcription.model,
            self.vision.model,
            self.render.font_path.display(),
            self.render.font_scale,
            self.render.lead_in_frames,
            self.render.margin_ratio * 100.0,
            self.output.base_dir.display(),
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            render: RenderConfig::default(),
            transcription: TranscriptionConfig::default(),
            vision: VisionConfig::default(),
            output: OutputConfig {
                base_dir: PathBuf::from("./output"),
                write_srt: true,
                save_metadata: true,
                cleanup_work_dir: true,
            },
            performance: PerformanceConfig {
                max_workers: num_cpus::get().min(8),
            },
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            font_path: PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"),
            font_scale: 24.0,
            font_color: [0, 0, 0],
            // Reference values: 10% margin, 15-frame lead-in.
            margin_ratio: 0.1,
            lead_in_frames: 15,
            probe_text: "The quick brown fox jumps over the lazy dog".to_string(),
        }
    }
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            model: "base".to_string(),
            model_path: None,
            language: None,
            timeout_seconds: 3600,
        }
    }
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            model: "gemini-pro-vision".to_string(),
            api_key: None,
            timeout_seconds: 60,
            keyframe_interval_seconds: 3,
        }
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.config.performance.max_workers = workers;
        self
    }

    pub fn with_whisper_model(mut self, model: String) -> Self {
        self.config.transcription.model = model;
        self
    }

    pub fn with_api_key(mut self, api_key: String) -> Self {
        self.config.vision.api_key = Some(api_key);
        self
    }

    pub fn with_output_dir(mut self, dir: PathBuf) -> Self {
        self.config.output.base_dir = dir;
        self
    }

    pub fn with_font(mut self, font_path: PathBuf) -> Self {
        self.config.render.font_path = font_path;
        self
    }

    pub fn with_keyframe_interval(mut self, seconds: u32) -> Self {
        self.config.vision.keyframe_interval_seconds = seconds;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
