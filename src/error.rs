//! Error types for meetscribe.

use uuid::Uuid;

use crate::session::state::SessionState;

/// Top-level error type for the service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Transcription error: {0}")]
    Transcribe(#[from] TranscribeError),

    #[error("Summarization error: {0}")]
    Summarize(#[from] SummarizeError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Caller-facing session errors. Surfaced synchronously; job state untouched.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Recording {id} not found")]
    NotFound { id: Uuid },

    #[error("Recording {id} is not accepting audio (state: {state})")]
    NotIngesting { id: Uuid, state: SessionState },

    #[error("Recording {id} is in state {actual}, cannot move {expected} -> {target}")]
    InvalidTransition {
        id: Uuid,
        expected: SessionState,
        actual: SessionState,
        target: SessionState,
    },

    #[error("Chunk queue for recording {id} is closed")]
    QueueClosed { id: Uuid },
}

/// Transcription backend errors. Fatal to the job (terminal `Failed`).
#[derive(Debug, thiserror::Error)]
pub enum TranscribeError {
    #[error("Backend {backend} request failed: {reason}")]
    RequestFailed { backend: String, reason: String },

    #[error("Invalid response from {backend}: {reason}")]
    InvalidResponse { backend: String, reason: String },

    #[error("Missing API key for backend {backend}")]
    MissingApiKey { backend: String },

    #[error("All transcription backends failed: {reason}")]
    AllBackendsFailed { reason: String },
}

/// Summarization backend errors. Non-fatal: the worker degrades the summary
/// and the job still reaches `Done` with the transcript preserved.
#[derive(Debug, thiserror::Error)]
pub enum SummarizeError {
    #[error("Request failed: {reason}")]
    RequestFailed { reason: String },

    #[error("Invalid response: {reason}")]
    InvalidResponse { reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for the service.
pub type Result<T> = std::result::Result<T, Error>;
