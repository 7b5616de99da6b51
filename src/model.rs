//! Vision model client: one `generateContent` call per page image.
//!
//! The [`VisionModel`] trait is the seam between the pipeline and the
//! network. Production uses [`GeminiClient`]; tests substitute a scripted
//! implementation so the dispatcher and HTTP handler can be exercised
//! without an API key.
//!
//! There is deliberately no retry here: a failed call is absorbed by the
//! dispatcher into an empty page outcome, and the request carries on.

use crate::config::AppConfig;
use crate::error::{ExtractError, ModelError};
use crate::prompts::EXTRACTION_PROMPT;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// A vision-capable generative model that reads one report page image and
/// returns its raw text reply.
#[async_trait]
pub trait VisionModel: Send + Sync {
    /// Submit `image` (with the stated MIME type) together with the fixed
    /// extraction prompt; return the model's reply text verbatim.
    async fn generate(&self, image: &[u8], mime_type: &str) -> Result<String, ModelError>;
}

/// Gemini REST client.
///
/// Holds a pooled [`reqwest::Client`] with the configured per-call timeout;
/// cheap to clone and share behind an `Arc<dyn VisionModel>`.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    temperature: f32,
    max_output_tokens: usize,
}

impl GeminiClient {
    /// Build a client from an API key and the service config.
    pub fn new(api_key: impl Into<String>, config: &AppConfig) -> Result<Self, ExtractError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api_timeout_secs))
            .build()
            .map_err(|e| ExtractError::InvalidConfig(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        })
    }

    /// Read the API key from the environment.
    ///
    /// `GEMINI_API_KEY` takes precedence; `gemini_api` is accepted as a
    /// legacy fallback. Empty values count as unset.
    pub fn api_key_from_env() -> Option<String> {
        std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var("gemini_api").ok().filter(|k| !k.is_empty()))
    }
}

#[async_trait]
impl VisionModel for GeminiClient {
    async fn generate(&self, image: &[u8], mime_type: &str) -> Result<String, ModelError> {
        let start = Instant::now();
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text {
                        text: EXTRACTION_PROMPT,
                    },
                    Part::Inline {
                        inline_data: InlineData {
                            mime_type,
                            data: STANDARD.encode(image),
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        };

        let url = format!("{API_BASE}/models/{}:generateContent", self.model);
        let response = self
            .http
            .post(&url)
            // Key travels as a query parameter, kept out of the formatted
            // URL so it never appears in logs.
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Api { status, body });
        }

        let reply: GenerateResponse = response.json().await?;
        let text = reply
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .filter(|t| !t.is_empty())
            .ok_or(ModelError::EmptyReply)?;

        debug!(
            model = %self.model,
            elapsed_ms = start.elapsed().as_millis() as u64,
            reply_bytes = text.len(),
            "model reply received"
        );

        Ok(text)
    }
}

// ── Wire types ───────────────────────────────────────────────────────────
//
// The generateContent body mixes snake_case part names with a camelCase
// generation config; typed structs pin that down instead of hand-rolled
// json! blocks.

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    Inline { inline_data: InlineData<'a> },
}

#[derive(Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: usize,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ReplyPart>,
}

#[derive(Deserialize)]
struct ReplyPart {
    #[serde(default)]
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_body_matches_wire_format() {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text { text: "prompt" },
                    Part::Inline {
                        inline_data: InlineData {
                            mime_type: "image/jpeg",
                            data: "QUJD".into(),
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                temperature: 0.3,
                max_output_tokens: 1000,
            },
        };

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["contents"][0]["parts"][0], json!({"text": "prompt"}));
        assert_eq!(
            value["contents"][0]["parts"][1]["inline_data"]["mime_type"],
            json!("image/jpeg")
        );
        assert_eq!(value["generationConfig"]["temperature"], json!(0.3));
        assert_eq!(value["generationConfig"]["maxOutputTokens"], json!(1000));
    }

    #[test]
    fn reply_text_is_joined_across_parts() {
        let raw = json!({
            "candidates": [{
                "content": {
                    "parts": [{"text": "```json\n"}, {"text": "{}\n```"}]
                }
            }]
        });
        let reply: GenerateResponse = serde_json::from_value(raw).unwrap();
        let text: String = reply.candidates[0]
            .content
            .as_ref()
            .unwrap()
            .parts
            .iter()
            .map(|p| p.text.as_str())
            .collect();
        assert_eq!(text, "```json\n{}\n```");
    }

    #[test]
    fn candidate_without_content_deserializes() {
        let reply: GenerateResponse =
            serde_json::from_value(json!({"candidates": [{"finishReason": "SAFETY"}]})).unwrap();
        assert!(reply.candidates[0].content.is_none());
    }
}
