//! Whisper transcription via the OpenAI audio API.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::{TranscribeConfig, TranscriptionProvider};
use crate::error::{ConfigError, TranscribeError};

const TRANSCRIPTION_URL: &str = "https://api.openai.com/v1/audio/transcriptions";

/// OpenAI `audio/transcriptions` backend.
#[derive(Debug)]
pub struct WhisperApiProvider {
    client: reqwest::Client,
    api_key: SecretString,
    model: String,
    language: Option<String>,
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

impl WhisperApiProvider {
    pub fn new(config: &TranscribeConfig) -> Result<Self, ConfigError> {
        let api_key = config
            .openai_api_key
            .clone()
            .ok_or_else(|| ConfigError::MissingEnvVar("OPENAI_API_KEY".to_string()))?;

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: config.whisper_model.clone(),
            language: config.language.clone(),
        })
    }
}

#[async_trait]
impl TranscriptionProvider for WhisperApiProvider {
    fn name(&self) -> &str {
        "whisper"
    }

    async fn transcribe(&self, audio: &[u8], format: &str) -> Result<String, TranscribeError> {
        let file_part = reqwest::multipart::Part::bytes(audio.to_vec())
            .file_name(format!("audio.{format}"))
            .mime_str(&format!("audio/{format}"))
            .map_err(|e| TranscribeError::RequestFailed {
                backend: "whisper".to_string(),
                reason: format!("invalid audio format tag '{format}': {e}"),
            })?;

        let mut form = reqwest::multipart::Form::new()
            .text("model", self.model.clone())
            .part("file", file_part);
        if let Some(lang) = &self.language {
            // Whisper takes an ISO-639-1 code; strip any region subtag.
            let code = lang.split('-').next().unwrap_or(lang).to_string();
            form = form.text("language", code);
        }

        let response = self
            .client
            .post(TRANSCRIPTION_URL)
            .bearer_auth(self.api_key.expose_secret())
            .multipart(form)
            .send()
            .await
            .map_err(|e| TranscribeError::RequestFailed {
                backend: "whisper".to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Whisper API error");
            return Err(TranscribeError::RequestFailed {
                backend: "whisper".to_string(),
                reason: format!("HTTP {status}: {body}"),
            });
        }

        let parsed: TranscriptionResponse =
            response
                .json()
                .await
                .map_err(|e| TranscribeError::InvalidResponse {
                    backend: "whisper".to_string(),
                    reason: e.to_string(),
                })?;

        Ok(parsed.text)
    }
}
