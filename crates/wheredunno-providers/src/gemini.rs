//! Google Gemini API provider.
//!
//! Calls the Gemini `generateContent` endpoint. Auth via URL query param.
//! A structured multi-turn request is tried first; if it fails, the history
//! is flattened into a single prompt and sent once more.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};
use wheredunno_core::{
    config::GeminiConfig,
    context::Context,
    error::WhereError,
    message::{MessageMetadata, OutgoingMessage},
    traits::Provider,
};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Google Gemini API provider.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    generation: GenerationConfig,
}

impl GeminiProvider {
    /// Create from config values.
    pub fn from_config(config: &GeminiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            generation: GenerationConfig {
                temperature: config.temperature,
                top_k: config.top_k,
                top_p: config.top_p,
                max_output_tokens: config.max_output_tokens,
            },
        }
    }

    /// Multi-turn request: system instruction plus role-tagged history.
    fn chat_request(&self, context: &Context) -> GeminiRequest {
        let (system, api_messages) = context.to_api_messages();

        let system_instruction = if system.is_empty() {
            None
        } else {
            Some(GeminiContent {
                role: None,
                parts: vec![GeminiPart { text: system }],
            })
        };

        let contents = api_messages
            .iter()
            .map(|m| GeminiContent {
                role: Some(gemini_role(&m.role).to_string()),
                parts: vec![GeminiPart {
                    text: m.content.clone(),
                }],
            })
            .collect();

        GeminiRequest {
            contents,
            system_instruction,
            generation_config: Some(self.generation.clone()),
        }
    }

    /// Single-turn fallback: system prompt and flattened history in one text part.
    fn direct_request(&self, context: &Context) -> GeminiRequest {
        let flat = context.to_prompt_string();
        let text = if context.system_prompt.is_empty() {
            flat
        } else {
            format!("{}\n\n{flat}", context.system_prompt)
        };
        GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart { text }],
            }],
            system_instruction: None,
            generation_config: Some(self.generation.clone()),
        }
    }

    async fn generate(
        &self,
        model: &str,
        body: &GeminiRequest,
    ) -> Result<(String, Option<u64>), WhereError> {
        let url = format!(
            "{GEMINI_BASE_URL}/models/{model}:generateContent?key={}",
            self.api_key
        );
        debug!("gemini: POST models/{model}:generateContent");

        let resp = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| WhereError::Provider(format!("gemini request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(WhereError::Provider(format!(
                "gemini returned {status}: {text}"
            )));
        }

        let parsed: GeminiResponse = resp
            .json()
            .await
            .map_err(|e| WhereError::Provider(format!("gemini: failed to parse response: {e}")))?;

        let text = response_text(&parsed)
            .ok_or_else(|| WhereError::Provider("gemini: empty response".to_string()))?;
        let tokens = parsed.usage_metadata.as_ref().map(|u| u.total_token_count);
        Ok((text, tokens))
    }
}

fn gemini_role(role: &str) -> &'static str {
    if role == "assistant" {
        "model"
    } else {
        "user"
    }
}

/// Concatenated text of the first candidate, `None` when blank.
fn response_text(parsed: &GeminiResponse) -> Option<String> {
    let text: String = parsed
        .candidates
        .as_ref()
        .and_then(|c| c.first())
        .and_then(|c| c.content.as_ref())
        .map(|c| c.parts.iter().map(|p| p.text.as_str()).collect())?;
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    usage_metadata: Option<GeminiUsage>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    total_token_count: u64,
}

#[async_trait]
impl Provider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn requires_api_key(&self) -> bool {
        true
    }

    async fn complete(&self, context: &Context) -> Result<OutgoingMessage, WhereError> {
        let effective_model = context.model.as_deref().unwrap_or(&self.model);
        let start = Instant::now();

        let (text, tokens) = match self
            .generate(effective_model, &self.chat_request(context))
            .await
        {
            Ok(out) => out,
            Err(e) => {
                warn!("gemini: chat request failed, retrying as a single prompt: {e}");
                self.generate(effective_model, &self.direct_request(context))
                    .await?
            }
        };

        Ok(OutgoingMessage {
            text,
            metadata: MessageMetadata {
                provider_used: "gemini".to_string(),
                tokens_used: tokens,
                processing_time_ms: start.elapsed().as_millis() as u64,
                model: Some(effective_model.to_string()),
            },
        })
    }

    async fn is_available(&self) -> bool {
        if self.api_key.is_empty() {
            warn!("gemini: no API key configured");
            return false;
        }
        let url = format!("{GEMINI_BASE_URL}/models?key={}", self.api_key);
        match self.client.get(&url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                warn!("gemini not available: {e}");
                false
            }
        }
    }
}
