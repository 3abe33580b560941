use crate::traits::{LlmClient, LlmResponse};
use async_trait::async_trait;
use cardsmith_common::{CardsmithError, GenerationError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    total_token_count: Option<u32>,
}

/// Connection settings for [`GeminiClient`].
#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub endpoint: String,
    pub model: String,
    /// Environment variable read on every request for the API key.
    pub api_key_env: String,
    /// `None` leaves the request unbounded.
    pub request_timeout: Option<Duration>,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            endpoint: GEMINI_BASE_URL.to_string(),
            model: crate::DEFAULT_GEMINI_MODEL.to_string(),
            api_key_env: GEMINI_API_KEY_ENV.to_string(),
            request_timeout: Some(Duration::from_secs(180)),
            temperature: None,
            max_output_tokens: None,
        }
    }
}

/// Google Gemini API client.
///
/// The API key is looked up in the environment at request time. A missing
/// key is not checked up front: the request goes out without one and the
/// service's rejection surfaces as [`GenerationError::Unauthorized`].
pub struct GeminiClient {
    client: reqwest::Client,
    settings: GeminiSettings,
}

impl GeminiClient {
    pub fn new(settings: GeminiSettings) -> Result<Self> {
        let mut builder = reqwest::Client::builder().connect_timeout(Duration::from_secs(10));
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| GenerationError::Client(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client, settings })
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.settings.endpoint.trim_end_matches('/'),
            self.settings.model
        )
    }

    fn api_key(&self) -> Option<String> {
        std::env::var(&self.settings.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

/// Map a non-success status to the failure the caller should see.
fn classify_failure(status: u16, body: String) -> GenerationError {
    let names_key = body.contains("API key")
        || body.contains("API_KEY")
        || body.contains("unregistered callers");
    match status {
        401 => GenerationError::Unauthorized,
        400 | 403 if names_key => GenerationError::Unauthorized,
        403 => GenerationError::Forbidden,
        429 => GenerationError::RateLimited,
        _ => GenerationError::Api { status, body },
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn generate(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        max_tokens: Option<u32>,
        temperature: Option<f32>,
    ) -> Result<LlmResponse> {
        let url = self.url();

        let max_output_tokens = max_tokens.or(self.settings.max_output_tokens);
        let temperature = temperature.or(self.settings.temperature);
        let generation_config = if max_output_tokens.is_some() || temperature.is_some() {
            Some(GeminiGenerationConfig {
                temperature,
                max_output_tokens,
            })
        } else {
            None
        };

        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config,
            system_instruction: system_prompt.map(|sys| GeminiContent {
                parts: vec![GeminiPart {
                    text: sys.to_string(),
                }],
            }),
        };

        tracing::debug!(
            target: "llm.gemini",
            %url,
            prompt_chars = prompt.chars().count(),
            "sending Gemini request"
        );

        let mut call = self.client.post(&url).json(&request);
        match self.api_key() {
            Some(key) => call = call.header(API_KEY_HEADER, key),
            None => tracing::debug!(
                target: "llm.gemini",
                env = %self.settings.api_key_env,
                "API key variable unset; sending unauthenticated request"
            ),
        }

        let resp = call
            .send()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(target: "llm.gemini", status, "Gemini rejected request");
            return Err(classify_failure(status, body).into());
        }

        let gemini_response: GeminiResponse = resp
            .json()
            .await
            .map_err(|e| GenerationError::Decode(e.to_string()))?;

        let Some(candidate) = gemini_response.candidates.into_iter().next() else {
            return Err(GenerationError::EmptyResponse.into());
        };

        if candidate.finish_reason.as_deref() == Some("SAFETY") {
            return Err(GenerationError::Blocked.into());
        }

        let text: String = candidate
            .content
            .map(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|p| p.text)
            .collect();
        if text.is_empty() {
            return Err(GenerationError::EmptyResponse.into());
        }

        let tokens_used = gemini_response
            .usage_metadata
            .and_then(|u| u.total_token_count);

        Ok(LlmResponse {
            text,
            model: Some(self.settings.model.clone()),
            tokens_used,
            finish_reason: candidate.finish_reason,
        })
    }

    async fn health_check(&self) -> Result<bool> {
        // no output cap: thinking models spend it before emitting any text
        match self.generate("Respond with just 'OK'", None, None, Some(0.1)).await {
            Ok(_) => Ok(true),
            // an accepted request with an empty or filtered candidate still proves access
            Err(CardsmithError::Generation(
                GenerationError::EmptyResponse | GenerationError::Blocked,
            )) => Ok(true),
            Err(e) => {
                tracing::warn!(target: "llm.gemini", error = %e, "Gemini health check failed");
                Ok(false)
            }
        }
    }

    fn model_name(&self) -> &str {
        &self.settings.model
    }
}
