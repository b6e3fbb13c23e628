//! Meeting summarization.
//!
//! Summarization failure is never fatal to a recording: the worker keeps the
//! transcript and degrades the summary. Missing credentials are handled the
//! same way — [`create_summarizer`] hands back an [`UnconfiguredSummarizer`]
//! whose output is a valid, degraded result rather than an error.

pub mod openai;
pub mod prompt;

pub use openai::OpenAiSummarizer;

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::SecretString;

use crate::error::SummarizeError;

/// Structured summary of a meeting transcript.
#[derive(Debug, Clone)]
pub struct MeetingSummary {
    /// Free-text summary (sectioned: overview, key points, action items,
    /// decisions).
    pub summary: String,
    /// Key points extracted from the summary text, in order.
    pub key_points: Vec<String>,
}

/// A summarization backend.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Model or backend name for logging.
    fn name(&self) -> &str;

    async fn summarize(&self, transcript: &str) -> Result<MeetingSummary, SummarizeError>;
}

/// Configuration for creating a summarizer.
#[derive(Debug, Clone)]
pub struct SummarizeConfig {
    pub api_key: Option<SecretString>,
    pub model: String,
    pub max_tokens: u32,
}

impl Default for SummarizeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-3.5-turbo-16k".to_string(),
            max_tokens: 3000,
        }
    }
}

/// Create a summarizer from configuration.
pub fn create_summarizer(config: &SummarizeConfig) -> Arc<dyn Summarizer> {
    match &config.api_key {
        Some(key) => {
            tracing::info!(model = %config.model, "Using OpenAI summarizer");
            Arc::new(OpenAiSummarizer::new(key.clone(), config))
        }
        None => {
            tracing::warn!("No OpenAI API key configured; summaries will be degraded");
            Arc::new(UnconfiguredSummarizer)
        }
    }
}

/// Stand-in summarizer used when no API key is configured. Returns a
/// human-readable failure note so the recording still reaches `Done` with the
/// transcript intact.
pub struct UnconfiguredSummarizer;

#[async_trait]
impl Summarizer for UnconfiguredSummarizer {
    fn name(&self) -> &str {
        "unconfigured"
    }

    async fn summarize(&self, _transcript: &str) -> Result<MeetingSummary, SummarizeError> {
        Ok(MeetingSummary {
            summary: "Summary generation failed: no OpenAI API key configured.".to_string(),
            key_points: Vec::new(),
        })
    }
}
