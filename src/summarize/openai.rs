//! OpenAI chat-completions summarizer.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;

use super::prompt::{SYSTEM_PROMPT, build_user_prompt, parse_key_points};
use super::{MeetingSummary, SummarizeConfig, Summarizer};
use crate::error::SummarizeError;

const COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Summarizer backed by the OpenAI chat completions API.
pub struct OpenAiSummarizer {
    client: reqwest::Client,
    api_key: SecretString,
    model: String,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct CompletionsResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: String,
}

impl OpenAiSummarizer {
    pub fn new(api_key: SecretString, config: &SummarizeConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        }
    }
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    fn name(&self) -> &str {
        &self.model
    }

    async fn summarize(&self, transcript: &str) -> Result<MeetingSummary, SummarizeError> {
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": build_user_prompt(transcript)},
            ],
            "max_tokens": self.max_tokens,
            "temperature": 0.7,
        });

        let response = self
            .client
            .post(COMPLETIONS_URL)
            .bearer_auth(self.api_key.expose_secret())
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|e| SummarizeError::RequestFailed {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "OpenAI API error");
            return Err(SummarizeError::RequestFailed {
                reason: format!("HTTP {status}"),
            });
        }

        let parsed: CompletionsResponse =
            response
                .json()
                .await
                .map_err(|e| SummarizeError::InvalidResponse {
                    reason: e.to_string(),
                })?;

        let summary_text = parsed
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .ok_or_else(|| SummarizeError::InvalidResponse {
                reason: "response contained no choices".to_string(),
            })?;

        let key_points = parse_key_points(&summary_text);

        Ok(MeetingSummary {
            summary: summary_text,
            key_points,
        })
    }
}
