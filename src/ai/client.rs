use anyhow::{Context, Result};
use base64::Engine;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use super::messages::{GenerateContentRequest, GenerateContentResponse};
use crate::audio::AudioBlob;
use crate::config::AiConfig;

/// Failure of a single remote AI call
#[derive(Debug, Error)]
pub enum AiError {
    #[error("no API key configured (set ai.api_key or GEMINI_API_KEY)")]
    MissingApiKey,

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request blocked: {0}")]
    Blocked(String),

    #[error("service returned no content")]
    EmptyResponse,

    #[error("{0}")]
    Other(String),
}

/// Base64-encoded audio ready for upload
#[derive(Debug, Clone, PartialEq)]
pub struct AudioPayload {
    pub mime_type: String,
    pub data: String,
}

impl AudioPayload {
    pub fn from_blob(blob: &AudioBlob) -> Self {
        Self {
            mime_type: blob.mime_type.clone(),
            data: base64::engine::general_purpose::STANDARD.encode(&blob.bytes),
        }
    }
}

/// Remote speech-to-text / text-generation service
#[async_trait::async_trait]
pub trait NoteAi: Send + Sync {
    /// Transcribe audio following `instruction`
    async fn transcribe(&self, audio: &AudioPayload, instruction: &str) -> Result<String, AiError>;

    /// Generate markdown text for a prompt (polish / elaborate)
    async fn generate(&self, prompt: &str) -> Result<String, AiError>;
}

/// Gemini `generateContent` client
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(config: &AiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty());

        info!(
            "Gemini client: model={} base_url={} api_key={}",
            config.model,
            config.base_url,
            if api_key.is_some() { "set" } else { "missing" }
        );

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    async fn generate_content(&self, request: &GenerateContentRequest) -> Result<String, AiError> {
        let api_key = self.api_key.as_deref().ok_or(AiError::MissingApiKey)?;

        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: GenerateContentResponse = response.json().await?;

        if let Some(reason) = body.block_reason() {
            return Err(AiError::Blocked(reason.to_string()));
        }

        let text = body.text().ok_or(AiError::EmptyResponse)?;
        debug!("Gemini returned {} chars", text.len());

        Ok(text)
    }
}

#[async_trait::async_trait]
impl NoteAi for GeminiClient {
    async fn transcribe(&self, audio: &AudioPayload, instruction: &str) -> Result<String, AiError> {
        info!(
            "Sending {} bytes of {} for transcription",
            audio.data.len(),
            audio.mime_type
        );
        let request = GenerateContentRequest::audio(instruction, &audio.mime_type, &audio.data);
        self.generate_content(&request).await
    }

    async fn generate(&self, prompt: &str) -> Result<String, AiError> {
        let request = GenerateContentRequest::text(prompt);
        self.generate_content(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_key: Option<&str>) -> AiConfig {
        AiConfig {
            base_url: "http://127.0.0.1:9/".to_string(),
            model: "test-model".to_string(),
            api_key: api_key.map(str::to_string),
            timeout_secs: 1,
        }
    }

    #[test]
    fn payload_is_base64_of_blob() {
        let blob = AudioBlob {
            bytes: b"RIFF".to_vec(),
            mime_type: "audio/wav".to_string(),
            sample_rate: 16000,
            channels: 1,
            sample_count: 0,
        };
        let payload = AudioPayload::from_blob(&blob);
        assert_eq!(payload.data, "UklGRg==");
        assert_eq!(payload.mime_type, "audio/wav");
    }

    #[test]
    fn endpoint_includes_model() {
        let client = GeminiClient::new(&config(Some("k"))).unwrap();
        assert_eq!(
            client.endpoint(),
            "http://127.0.0.1:9/v1beta/models/test-model:generateContent"
        );
    }

    #[tokio::test]
    async fn missing_key_fails_without_network() {
        let client = GeminiClient::new(&config(Some("  "))).unwrap();
        let err = client.generate("hi").await.unwrap_err();
        assert!(matches!(err, AiError::MissingApiKey));
    }
}
