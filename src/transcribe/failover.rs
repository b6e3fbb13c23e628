//! Failover wrapper: try the primary backend, fall back on failure.

use std::sync::Arc;

use async_trait::async_trait;

use super::TranscriptionProvider;
use crate::error::TranscribeError;

/// Tries the primary provider first; on any error, retries the same payload
/// against the fallback. Only if both fail does the job see an error.
pub struct FailoverProvider {
    primary: Arc<dyn TranscriptionProvider>,
    fallback: Arc<dyn TranscriptionProvider>,
    name: String,
}

impl FailoverProvider {
    pub fn new(
        primary: Arc<dyn TranscriptionProvider>,
        fallback: Arc<dyn TranscriptionProvider>,
    ) -> Self {
        let name = format!("{}+{}", primary.name(), fallback.name());
        Self {
            primary,
            fallback,
            name,
        }
    }
}

#[async_trait]
impl TranscriptionProvider for FailoverProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn transcribe(&self, audio: &[u8], format: &str) -> Result<String, TranscribeError> {
        let primary_err = match self.primary.transcribe(audio, format).await {
            Ok(text) => return Ok(text),
            Err(e) => {
                tracing::warn!(
                    backend = self.primary.name(),
                    error = %e,
                    "Primary transcription backend failed, trying fallback"
                );
                e
            }
        };

        self.fallback.transcribe(audio, format).await.map_err(|fallback_err| {
            TranscribeError::AllBackendsFailed {
                reason: format!(
                    "{}: {primary_err}; {}: {fallback_err}",
                    self.primary.name(),
                    self.fallback.name()
                ),
            }
        })
    }
}
