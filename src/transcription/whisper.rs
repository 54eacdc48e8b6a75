use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::TranscriptionConfig;

/// One chronological unit of transcribed speech.
///
/// Source of truth from the transcription collaborator: segments arrive in
/// order, non-overlapping, and are consumed exactly once by the caption
/// engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Transcribed text
    pub text: String,
    /// Start time in seconds
    pub start_seconds: f64,
    /// End time in seconds
    pub end_seconds: f64,
}

/// Complete transcription result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionResult {
    /// Full transcription text
    pub text: String,
    /// Detected language, if the backend reports one
    pub language: Option<String>,
    /// Individual segments with timestamps
    pub segments: Vec<TranscriptSegment>,
    /// Processing duration
    pub processing_time: Duration,
    /// Model used for transcription
    pub model_used: String,
}

/// Whisper transcriber shelling out to whatever backend is installed.
#[derive(Debug, Clone)]
pub struct WhisperTranscriber {
    config: TranscriptionConfig,
}

impl WhisperTranscriber {
    pub fn new(config: TranscriptionConfig) -> Self {
        Self { config }
    }

    /// Transcribe a prepared WAV file, returning ordered segments.
    pub async fn transcribe(&self, audio_path: &Path, work_dir: &Path) -> Result<TranscriptionResult> {
        let start_time = std::time::Instant::now();

        info!("🎤 Starting transcription for: {}", audio_path.display());
        info!("⚙️  Model: {}", self.config.model);

        tokio::fs::create_dir_all(work_dir).await?;

        let output = self.run_whisper_command(audio_path, work_dir).await?;
        let result = self.build_result(output, start_time.elapsed())?;

        info!(
            "🎉 Transcription completed in {:.1}s: {} characters, {} segments",
            result.processing_time.as_secs_f64(),
            result.text.len(),
            result.segments.len()
        );

        Ok(result)
    }

    /// Try available whisper backends in order of preference.
    async fn run_whisper_command(&self, audio_path: &Path, work_dir: &Path) -> Result<WhisperOutput> {
        let backends = [
            ("whisper-cli", true), // whisper.cpp via Homebrew (fastest)
            ("whisper-cpp", true), // whisper.cpp
            ("whisper", false),    // Python OpenAI Whisper (fallback)
        ];

        for (cmd_name, is_cpp) in &backends {
            if Self::check_command_available(cmd_name).await {
                info!("✅ Using {} backend for transcription", cmd_name);
                return if *is_cpp {
                    self.run_whisper_cpp(cmd_name, audio_path, work_dir).await
                } else {
                    self.run_python_whisper(audio_path, work_dir).await
                };
            }
            debug!("{} not available", cmd_name);
        }

        Err(anyhow!(
            "No Whisper backend found. Please install whisper.cpp or openai-whisper"
        ))
    }

    async fn run_whisper_cpp(
        &self,
        cmd_name: &str,
        audio_path: &Path,
        work_dir: &Path,
    ) -> Result<WhisperOutput> {
        let base_name = audio_path
            .file_stem()
            .ok_or_else(|| anyhow!("Invalid audio filename"))?
            .to_string_lossy()
            .to_string();
        let output_file = work_dir.join(&base_name);

        let mut cmd = Command::new(cmd_name);
        cmd.arg("-f")
            .arg(audio_path)
            .arg("-oj") // JSON output
            .arg("-of")
            .arg(&output_file)
            .arg("-tp")
            .arg("0.0");

        match self.resolve_model_path() {
            Some(model_path) => {
                cmd.arg("-m").arg(model_path);
            }
            None => warn!("⚠️  No whisper model file found, using backend default"),
        }

        if let Some(language) = &self.config.language {
            cmd.arg("-l").arg(language);
        }

        debug!("Executing command: {:?}", cmd);
        self.execute_and_parse(cmd, work_dir).await
    }

    async fn run_python_whisper(&self, audio_path: &Path, work_dir: &Path) -> Result<WhisperOutput> {
        let mut cmd = Command::new("whisper");
        cmd.arg(audio_path)
            .arg("--model")
            .arg(&self.config.model)
            .arg("--output_dir")
            .arg(work_dir)
            .arg("--output_format")
            .arg("json")
            .arg("--verbose")
            .arg("False")
            .arg("--temperature")
            .arg("0.0");

        if let Some(language) = &self.config.language {
            cmd.arg("--language").arg(language);
        }

        debug!("Executing command: {:?}", cmd);
        self.execute_and_parse(cmd, work_dir).await
    }

    /// Run the command under the configured timeout and parse the JSON file
    /// it leaves in the work directory.
    async fn execute_and_parse(&self, mut cmd: Command, work_dir: &Path) -> Result<WhisperOutput> {
        let timeout = Duration::from_secs(self.config.timeout_seconds);

        let output = match tokio::time::timeout(timeout, cmd.output()).await {
            Ok(output) => output?,
            Err(_) => {
                return Err(anyhow!(
                    "Whisper command timed out after {} seconds",
                    self.config.timeout_seconds
                ));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "Whisper failed with exit code {}: {}",
                output.status,
                stderr.trim()
            ));
        }

        let json_path = self
            .find_json_output(work_dir)
            .await?
            .ok_or_else(|| anyhow!("No Whisper JSON output found in {}", work_dir.display()))?;

        debug!("Parsing whisper output: {}", json_path.display());
        let json_content = tokio::fs::read_to_string(&json_path).await?;
        serde_json::from_str::<WhisperOutput>(&json_content)
            .map_err(|e| anyhow!("Failed to parse Whisper JSON output: {}", e))
    }

    async fn find_json_output(&self, work_dir: &Path) -> Result<Option<std::path::PathBuf>> {
        let mut entries = tokio::fs::read_dir(work_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                return Ok(Some(path));
            }
        }
        Ok(None)
    }

    /// Locate the whisper.cpp model file.
    ///
    /// An explicitly configured path is used as-is; otherwise standard
    /// install locations are probed for `ggml-{model}.bin`.
    fn resolve_model_path(&self) -> Option<std::path::PathBuf> {
        if let Some(path) = &self.config.model_path {
            return Some(path.clone());
        }

        let model_file = format!("ggml-{}.bin", self.config.model);
        let candidates = [
            std::path::PathBuf::from("models").join(&model_file),
            std::path::PathBuf::from("/usr/local/share/whisper-cpp").join(&model_file),
            std::path::PathBuf::from("/opt/homebrew/share/whisper-cpp").join(&model_file),
        ];

        candidates.into_iter().find(|path| path.exists())
    }

    async fn check_command_available(cmd_name: &str) -> bool {
        Command::new(cmd_name)
            .arg("--help")
            .output()
            .await
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    /// Normalize the backend-specific JSON shapes into one result.
    fn build_result(&self, output: WhisperOutput, elapsed: Duration) -> Result<TranscriptionResult> {
        let (segments, language): (Vec<TranscriptSegment>, _) = if !output.transcription.is_empty() {
            // whisper.cpp format: timestamps as "HH:MM:SS,mmm" strings.
            let segments = output
                .transcription
                .into_iter()
                .map(|seg| {
                    let start_seconds = parse_timestamp(&seg.timestamps.from).unwrap_or_else(|e| {
                        warn!("Unparseable segment start timestamp: {}", e);
                        0.0
                    });
                    let end_seconds = parse_timestamp(&seg.timestamps.to).unwrap_or_else(|e| {
                        warn!("Unparseable segment end timestamp: {}", e);
                        start_seconds
                    });
                    TranscriptSegment {
                        text: seg.text,
                        start_seconds,
                        end_seconds,
                    }
                })
                .collect();
            (segments, output.language)
        } else {
            // Python whisper format: float seconds.
            let segments = output
                .segments
                .into_iter()
                .map(|seg| TranscriptSegment {
                    text: seg.text,
                    start_seconds: seg.start,
                    end_seconds: seg.end,
                })
                .collect();
            (segments, output.language)
        };

        let full_text = output.text.unwrap_or_else(|| {
            segments
                .iter()
                .map(|seg| seg.text.trim())
                .collect::<Vec<_>>()
                .join(" ")
        });

        Ok(TranscriptionResult {
            text: full_text,
            language,
            segments,
            processing_time: elapsed,
            model_used: self.config.model.clone(),
        })
    }
}

/// Raw whisper JSON output, covering both whisper.cpp and Python layouts.
#[derive(Debug, Deserialize)]
struct WhisperOutput {
    #[serde(default)]
    transcription: Vec<CppSegment>,
    #[serde(default)]
    segments: Vec<PySegment>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CppSegment {
    timestamps: CppTimestamps,
    text: String,
}

#[derive(Debug, Deserialize)]
struct CppTimestamps {
    from: String,
    to: String,
}

#[derive(Debug, Deserialize)]
struct PySegment {
    start: f64,
    end: f64,
    text: String,
}

/// Parse a "HH:MM:SS,mmm" timestamp to seconds.
fn parse_timestamp(timestamp: &str) -> Result<f64> {
    let parts: Vec<&str> = timestamp.split(',').collect();
    if parts.len() != 2 {
        return Err(anyhow!("Invalid timestamp format: {}", timestamp));
    }

    let milliseconds: f64 = parts[1].parse::<f64>()? / 1000.0;

    let components: Vec<&str> = parts[0].split(':').collect();
    if components.len() != 3 {
        return Err(anyhow!("Invalid time format: {}", parts[0]));
    }

    let hours: f64 = components[0].parse()?;
    let minutes: f64 = components[1].parse()?;
    let seconds: f64 = components[2].parse()?;

    Ok(hours * 3600.0 + minutes * 60.0 + seconds + milliseconds)
}
