//! Google Speech Recognition fallback backend.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::{TranscribeConfig, TranscriptionProvider};
use crate::error::{ConfigError, TranscribeError};

const RECOGNIZE_URL: &str = "https://www.google.com/speech-api/v2/recognize";

/// Google Speech Recognition HTTP API backend.
///
/// The v2 recognize endpoint streams newline-separated JSON objects; the
/// first object with a non-empty `result` array carries the transcript.
#[derive(Debug)]
pub struct GoogleSpeechProvider {
    client: reqwest::Client,
    api_key: SecretString,
    language: String,
}

#[derive(Deserialize)]
struct RecognizeLine {
    #[serde(default)]
    result: Vec<RecognizeResult>,
}

#[derive(Deserialize)]
struct RecognizeResult {
    #[serde(default)]
    alternative: Vec<RecognizeAlternative>,
}

#[derive(Deserialize)]
struct RecognizeAlternative {
    transcript: String,
}

impl GoogleSpeechProvider {
    pub fn new(config: &TranscribeConfig) -> Result<Self, ConfigError> {
        let api_key = config
            .google_api_key
            .clone()
            .ok_or_else(|| ConfigError::MissingEnvVar("GOOGLE_SPEECH_API_KEY".to_string()))?;

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            language: config
                .language
                .clone()
                .unwrap_or_else(|| "en-US".to_string()),
        })
    }

    fn parse_body(body: &str) -> Result<String, TranscribeError> {
        for line in body.lines() {
            let Ok(parsed) = serde_json::from_str::<RecognizeLine>(line) else {
                continue;
            };
            if let Some(alt) = parsed
                .result
                .first()
                .and_then(|r| r.alternative.first())
            {
                return Ok(alt.transcript.clone());
            }
        }
        Err(TranscribeError::InvalidResponse {
            backend: "google".to_string(),
            reason: "speech recognition could not understand the audio".to_string(),
        })
    }
}

#[async_trait]
impl TranscriptionProvider for GoogleSpeechProvider {
    fn name(&self) -> &str {
        "google"
    }

    async fn transcribe(&self, audio: &[u8], format: &str) -> Result<String, TranscribeError> {
        let response = self
            .client
            .post(RECOGNIZE_URL)
            .query(&[
                ("client", "chromium"),
                ("lang", self.language.as_str()),
                ("key", self.api_key.expose_secret()),
            ])
            .header("Content-Type", format!("audio/{format}; rate=16000"))
            .body(audio.to_vec())
            .send()
            .await
            .map_err(|e| TranscribeError::RequestFailed {
                backend: "google".to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranscribeError::RequestFailed {
                backend: "google".to_string(),
                reason: format!("HTTP {status}"),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| TranscribeError::InvalidResponse {
                backend: "google".to_string(),
                reason: e.to_string(),
            })?;

        Self::parse_body(&body)
    }
}
