use anyhow::{anyhow, Result};
use async_trait::async_trait;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::VisionConfig;
use crate::transcription::TranscriptSegment;

const CAPTION_PROMPT: &str = "describe activity in picture in a line for caption, \
                              if no activity detected return can not detect activity";

/// Narrow seam to the generative vision collaborator.
#[async_trait]
pub trait SceneDescriber: Send + Sync {
    /// One-line description of the activity in the image.
    async fn describe(&self, image_path: &Path) -> Result<String>;

    /// Whether the collaborator is reachable with the current configuration.
    async fn is_available(&self) -> bool;
}

/// Gemini REST implementation of [`SceneDescriber`].
pub struct GeminiDescriber {
    config: VisionConfig,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiInlineData,
    },
}

#[derive(Debug, Serialize)]
struct GeminiInlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiResponseContent,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: String,
}

impl GeminiDescriber {
    pub fn new(config: VisionConfig) -> Result<Self> {
        if config.api_key.is_none() {
            return Err(anyhow!("Gemini API key required"));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl SceneDescriber for GeminiDescriber {
    async fn describe(&self, image_path: &Path) -> Result<String> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| anyhow!("Gemini API key not configured"))?;

        let image_bytes = tokio::fs::read(image_path).await?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(&image_bytes);

        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![
                    GeminiPart::Text {
                        text: CAPTION_PROMPT.to_string(),
                    },
                    GeminiPart::InlineData {
                        inline_data: GeminiInlineData {
                            mime_type: "image/jpeg".to_string(),
                            data: encoded,
                        },
                    },
                ],
            }],
        };

        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.config.model, api_key
        );

        debug!("Sending keyframe {} to Gemini", image_path.display());

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Gemini API error {}: {}", status, text));
        }

        let gemini_response: GeminiResponse = response.json().await?;

        let caption = gemini_response
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.trim().to_lowercase())
            .ok_or_else(|| anyhow!("No caption in Gemini response"))?;

        Ok(caption)
    }

    async fn is_available(&self) -> bool {
        if let Some(api_key) = &self.config.api_key {
            let url = format!(
                "https://generativelanguage.googleapis.com/v1beta/models?key={}",
                api_key
            );
            match self.client.get(&url).send().await {
                Ok(response) => response.status().is_success(),
                Err(_) => false,
            }
        } else {
            false
        }
    }
}

/// Describe keyframes sampled at a fixed interval and synthesize transcript
/// segments from them, the silent-video stand-in for transcription.
///
/// Keyframes the collaborator cannot describe are skipped with a warning
/// rather than failing the run.
pub async fn describe_keyframes(
    describer: &dyn SceneDescriber,
    keyframes: &[std::path::PathBuf],
    interval_seconds: u32,
) -> Result<Vec<TranscriptSegment>> {
    let mut segments = Vec::with_capacity(keyframes.len());
    let interval = interval_seconds as f64;

    for (index, keyframe) in keyframes.iter().enumerate() {
        let start_seconds = index as f64 * interval;
        match describer.describe(keyframe).await {
            Ok(caption) => {
                info!(
                    "🖼️  Keyframe {:.0}s..{:.0}s: {}",
                    start_seconds,
                    start_seconds + interval,
                    caption
                );
                segments.push(TranscriptSegment {
                    text: caption,
                    start_seconds,
                    end_seconds: start_seconds + interval,
                });
            }
            Err(e) => {
                warn!("Skipping keyframe {}: {}", keyframe.display(), e);
            }
        }
    }

    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    struct CannedDescriber {
        captions: Vec<&'static str>,
    }

    #[async_trait]
    impl SceneDescriber for CannedDescriber {
        async fn describe(&self, image_path: &Path) -> Result<String> {
            let index: usize = image_path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse().ok())
                .unwrap_or(0);
            self.captions
                .get(index)
                .map(|c| c.to_string())
                .ok_or_else(|| anyhow!("no caption"))
        }

        async fn is_available(&self) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn test_describe_keyframes_builds_interval_segments() {
        let describer = CannedDescriber {
            captions: vec!["a person walks by", "a dog runs"],
        };
        let keyframes = vec![PathBuf::from("0.jpg"), PathBuf::from("1.jpg")];

        let segments = describe_keyframes(&describer, &keyframes, 3).await.unwrap();

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "a person walks by");
        assert_eq!(segments[0].start_seconds, 0.0);
        assert_eq!(segments[0].end_seconds, 3.0);
        assert_eq!(segments[1].start_seconds, 3.0);
        assert_eq!(segments[1].end_seconds, 6.0);
    }

    #[tokio::test]
    async fn test_describe_keyframes_skips_failures() {
        let describer = CannedDescriber {
            captions: vec!["only one caption"],
        };
        let keyframes = vec![
            PathBuf::from("0.jpg"),
            PathBuf::from("1.jpg"),
            PathBuf::from("2.jpg"),
        ];

        let segments = describe_keyframes(&describer, &keyframes, 3).await.unwrap();
        assert_eq!(segments.len(), 1);
    }

    #[test]
    fn test_describer_requires_api_key() {
        let config = VisionConfig {
            api_key: None,
            ..VisionConfig::default()
        };
        assert!(GeminiDescriber::new(config).is_err());
    }
}
