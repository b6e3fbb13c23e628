//! Configuration types.

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::summarize::SummarizeConfig;
use crate::transcribe::{TranscribeBackend, TranscribeConfig};

/// Top-level service configuration.
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Port the HTTP server binds to.
    pub port: u16,
    pub transcribe: TranscribeConfig,
    pub summarize: SummarizeConfig,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            port: 9001,
            transcribe: TranscribeConfig::default(),
            summarize: SummarizeConfig::default(),
        }
    }
}

impl RecorderConfig {
    /// Build configuration from the environment.
    ///
    /// `OPENAI_API_KEY` is honored directly; everything else is namespaced
    /// under `MEETSCRIBE_`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = match std::env::var("MEETSCRIBE_PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "MEETSCRIBE_PORT".to_string(),
                message: format!("'{raw}' is not a valid port"),
            })?,
            Err(_) => defaults.port,
        };

        let openai_api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .map(SecretString::from);
        let google_api_key = std::env::var("GOOGLE_SPEECH_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .map(SecretString::from);

        let backend = match std::env::var("MEETSCRIBE_STT_BACKEND") {
            Ok(raw) => raw.parse()?,
            // Prefer failover when both backends have credentials.
            Err(_) if openai_api_key.is_some() && google_api_key.is_some() => {
                TranscribeBackend::Failover
            }
            Err(_) if google_api_key.is_some() && openai_api_key.is_none() => {
                TranscribeBackend::Google
            }
            Err(_) => TranscribeBackend::Whisper,
        };

        let transcribe = TranscribeConfig {
            backend,
            openai_api_key: openai_api_key.clone(),
            google_api_key,
            whisper_model: std::env::var("MEETSCRIBE_WHISPER_MODEL")
                .unwrap_or(defaults.transcribe.whisper_model),
            language: std::env::var("MEETSCRIBE_LANGUAGE").ok().filter(|l| !l.is_empty()),
        };

        let summarize = SummarizeConfig {
            api_key: openai_api_key,
            model: std::env::var("MEETSCRIBE_SUMMARY_MODEL")
                .unwrap_or(defaults.summarize.model),
            max_tokens: defaults.summarize.max_tokens,
        };

        Ok(Self {
            port,
            transcribe,
            summarize,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = RecorderConfig::default();
        assert_eq!(config.port, 9001);
        assert_eq!(config.transcribe.backend, TranscribeBackend::Whisper);
        assert_eq!(config.transcribe.whisper_model, "whisper-1");
        assert_eq!(config.summarize.model, "gpt-3.5-turbo-16k");
        assert_eq!(config.summarize.max_tokens, 3000);
    }
}
