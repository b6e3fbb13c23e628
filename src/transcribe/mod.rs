//! Transcription backends.
//!
//! The pipeline worker is parameterized by a single [`TranscriptionProvider`];
//! backend selection happens once at startup via [`create_provider`].
//!
//! Supports:
//! - **Whisper**: OpenAI `audio/transcriptions` API
//! - **Google**: Google Speech Recognition HTTP API (fallback backend)
//! - **Failover**: Whisper first, Google on failure

pub mod failover;
pub mod google;
pub mod whisper;

pub use failover::FailoverProvider;
pub use google::GoogleSpeechProvider;
pub use whisper::WhisperApiProvider;

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::SecretString;

use crate::error::{ConfigError, TranscribeError};

/// A speech-to-text backend. Calls are synchronous from the worker's point of
/// view and may be slow; no timeout is enforced at this boundary.
#[async_trait]
pub trait TranscriptionProvider: Send + Sync {
    /// Backend name for logging and the healthcheck endpoint.
    fn name(&self) -> &str;

    /// Transcribe one contiguous audio payload. `format` is the caller's
    /// declared audio format tag, passed through unvalidated.
    async fn transcribe(&self, audio: &[u8], format: &str) -> Result<String, TranscribeError>;
}

/// Supported transcription backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscribeBackend {
    Whisper,
    Google,
    Failover,
}

impl std::str::FromStr for TranscribeBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "whisper" => Ok(Self::Whisper),
            "google" => Ok(Self::Google),
            "failover" => Ok(Self::Failover),
            other => Err(ConfigError::InvalidValue {
                key: "MEETSCRIBE_STT_BACKEND".to_string(),
                message: format!("unknown backend '{other}' (expected whisper, google, failover)"),
            }),
        }
    }
}

/// Configuration for creating a transcription provider.
#[derive(Debug, Clone)]
pub struct TranscribeConfig {
    pub backend: TranscribeBackend,
    /// OpenAI API key for the Whisper backend.
    pub openai_api_key: Option<SecretString>,
    /// Google Speech API key for the fallback backend.
    pub google_api_key: Option<SecretString>,
    /// Whisper model name.
    pub whisper_model: String,
    /// Optional language hint (BCP-47 tag, e.g. "en-US").
    pub language: Option<String>,
}

impl Default for TranscribeConfig {
    fn default() -> Self {
        Self {
            backend: TranscribeBackend::Whisper,
            openai_api_key: None,
            google_api_key: None,
            whisper_model: "whisper-1".to_string(),
            language: None,
        }
    }
}

/// Create a transcription provider from configuration.
pub fn create_provider(
    config: &TranscribeConfig,
) -> Result<Arc<dyn TranscriptionProvider>, ConfigError> {
    match config.backend {
        TranscribeBackend::Whisper => Ok(Arc::new(WhisperApiProvider::new(config)?)),
        TranscribeBackend::Google => Ok(Arc::new(GoogleSpeechProvider::new(config)?)),
        TranscribeBackend::Failover => {
            let primary = Arc::new(WhisperApiProvider::new(config)?);
            let fallback = Arc::new(GoogleSpeechProvider::new(config)?);
            tracing::info!("Using failover transcription (whisper -> google)");
            Ok(Arc::new(FailoverProvider::new(primary, fallback)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_from_str() {
        assert_eq!("whisper".parse::<TranscribeBackend>().unwrap(), TranscribeBackend::Whisper);
        assert_eq!("google".parse::<TranscribeBackend>().unwrap(), TranscribeBackend::Google);
        assert_eq!("failover".parse::<TranscribeBackend>().unwrap(), TranscribeBackend::Failover);
        assert!("azure".parse::<TranscribeBackend>().is_err());
    }

    #[test]
    fn create_provider_requires_keys() {
        // Whisper without a key fails at construction, not at first request.
        let config = TranscribeConfig::default();
        assert!(create_provider(&config).is_err());

        let config = TranscribeConfig {
            openai_api_key: Some(SecretString::from("sk-test")),
            ..TranscribeConfig::default()
        };
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.name(), "whisper");
    }

    #[test]
    fn create_failover_provider() {
        let config = TranscribeConfig {
            backend: TranscribeBackend::Failover,
            openai_api_key: Some(SecretString::from("sk-test")),
            google_api_key: Some(SecretString::from("g-test")),
            ..TranscribeConfig::default()
        };
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.name(), "whisper+google");
    }
}
