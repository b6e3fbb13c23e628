//! Pipeline worker — drives one recording from accumulated audio to a
//! terminal state.

use std::sync::Arc;

use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::session::accumulator::accumulate;
use crate::session::queue::ChunkReceiver;
use crate::session::registry::SessionRegistry;
use crate::session::results::{RecordingResult, ResultStore};
use crate::session::state::SessionState;
use crate::summarize::Summarizer;
use crate::transcribe::TranscriptionProvider;

/// Shared dependencies for pipeline execution.
#[derive(Clone)]
pub struct WorkerDeps {
    pub registry: Arc<SessionRegistry>,
    pub results: Arc<ResultStore>,
    pub transcriber: Arc<dyn TranscriptionProvider>,
    pub summarizer: Arc<dyn Summarizer>,
}

/// Worker that executes the pipeline for a single recording.
///
/// Spawned exactly once per recording at start time. It is the only writer
/// for the `Stopping -> ... -> Done/Failed` edges, each guarded by the
/// registry's compare-and-set, and it writes the result exactly once.
/// Collaborator failures are converted into result fields; nothing escapes
/// as a panic that could affect other recordings.
pub struct PipelineWorker {
    recording_id: Uuid,
    deps: WorkerDeps,
}

impl PipelineWorker {
    pub fn new(recording_id: Uuid, deps: WorkerDeps) -> Self {
        Self { recording_id, deps }
    }

    /// Spawn the worker onto the runtime, consuming the queue's receiver half.
    pub fn spawn(self, rx: ChunkReceiver) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(rx).await })
    }

    /// Run the pipeline to completion.
    pub async fn run(self, rx: ChunkReceiver) {
        let id = self.recording_id;
        tracing::info!(recording_id = %id, "Pipeline worker started");

        // Block until the caller's stop signal reaches the queue.
        let audio = accumulate(id, rx).await;

        if let Err(e) = self
            .deps
            .registry
            .transition(id, SessionState::Stopping, SessionState::Transcribing)
            .await
        {
            tracing::error!(recording_id = %id, error = %e, "Worker lost its transition");
            return;
        }

        if audio.is_empty() {
            tracing::warn!(recording_id = %id, "No audio data collected");
            self.finish_failed(String::new(), "No audio data collected".to_string())
                .await;
            return;
        }

        let format = audio.format.as_deref().unwrap_or("wav");
        let transcript = match self
            .deps
            .transcriber
            .transcribe(&audio.payload, format)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(recording_id = %id, error = %e, "Transcription failed");
                self.finish_failed(String::new(), format!("Transcription failed: {e}"))
                    .await;
                return;
            }
        };
        tracing::info!(recording_id = %id, chars = transcript.len(), "Transcription complete");

        if let Err(e) = self
            .deps
            .registry
            .transition(id, SessionState::Transcribing, SessionState::Summarizing)
            .await
        {
            tracing::error!(recording_id = %id, error = %e, "Worker lost its transition");
            return;
        }

        // Summarization failure is not fatal: the transcript is still a valid,
        // retrievable artifact.
        let (summary, key_points) = match self.deps.summarizer.summarize(&transcript).await {
            Ok(s) => (s.summary, s.key_points),
            Err(e) => {
                tracing::warn!(recording_id = %id, error = %e, "Summarization degraded");
                (format!("Summary generation failed: {e}"), Vec::new())
            }
        };

        self.deps
            .results
            .put(
                id,
                RecordingResult {
                    audio_bytes: audio.payload.len(),
                    transcript,
                    summary,
                    key_points,
                    error: None,
                },
            )
            .await;

        if let Err(e) = self
            .deps
            .registry
            .transition(id, SessionState::Summarizing, SessionState::Done)
            .await
        {
            tracing::error!(recording_id = %id, error = %e, "Worker lost its transition");
            return;
        }
        tracing::info!(recording_id = %id, "Pipeline complete");
    }

    async fn finish_failed(&self, transcript: String, error: String) {
        let id = self.recording_id;
        self.deps
            .results
            .put(
                id,
                RecordingResult {
                    audio_bytes: 0,
                    transcript,
                    summary: String::new(),
                    key_points: Vec::new(),
                    error: Some(error),
                },
            )
            .await;
        if let Err(e) = self
            .deps
            .registry
            .transition(id, SessionState::Transcribing, SessionState::Failed)
            .await
        {
            tracing::error!(recording_id = %id, error = %e, "Worker lost its transition");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD as BASE64;

    use crate::error::{SummarizeError, TranscribeError};
    use crate::session::queue::{AudioChunk, chunk_queue};
    use crate::summarize::MeetingSummary;

    struct EchoTranscriber;

    #[async_trait]
    impl TranscriptionProvider for EchoTranscriber {
        fn name(&self) -> &str {
            "echo"
        }
        async fn transcribe(&self, audio: &[u8], _format: &str) -> Result<String, TranscribeError> {
            Ok(String::from_utf8_lossy(audio).into_owned())
        }
    }

    struct FailingTranscriber;

    #[async_trait]
    impl TranscriptionProvider for FailingTranscriber {
        fn name(&self) -> &str {
            "failing"
        }
        async fn transcribe(&self, _audio: &[u8], _format: &str) -> Result<String, TranscribeError> {
            Err(TranscribeError::RequestFailed {
                backend: "failing".to_string(),
                reason: "backend down".to_string(),
            })
        }
    }

    struct FixedSummarizer;

    #[async_trait]
    impl Summarizer for FixedSummarizer {
        fn name(&self) -> &str {
            "fixed"
        }
        async fn summarize(&self, _transcript: &str) -> Result<MeetingSummary, SummarizeError> {
            Ok(MeetingSummary {
                summary: "a summary".to_string(),
                key_points: vec!["point".to_string()],
            })
        }
    }

    struct FailingSummarizer;

    #[async_trait]
    impl Summarizer for FailingSummarizer {
        fn name(&self) -> &str {
            "failing"
        }
        async fn summarize(&self, _transcript: &str) -> Result<MeetingSummary, SummarizeError> {
            Err(SummarizeError::RequestFailed {
                reason: "no credentials".to_string(),
            })
        }
    }

    async fn deps_with(
        transcriber: Arc<dyn TranscriptionProvider>,
        summarizer: Arc<dyn Summarizer>,
    ) -> (WorkerDeps, Uuid) {
        let registry = Arc::new(SessionRegistry::new());
        let id = registry.create("room1", "alice").await.id;
        registry
            .transition(id, SessionState::Created, SessionState::Ingesting)
            .await
            .unwrap();
        registry
            .transition(id, SessionState::Ingesting, SessionState::Stopping)
            .await
            .unwrap();
        (
            WorkerDeps {
                registry,
                results: Arc::new(ResultStore::new()),
                transcriber,
                summarizer,
            },
            id,
        )
    }

    #[tokio::test]
    async fn happy_path_reaches_done() {
        let (deps, id) = deps_with(Arc::new(EchoTranscriber), Arc::new(FixedSummarizer)).await;
        let (queue, rx) = chunk_queue(id);
        queue
            .push(AudioChunk::new(BASE64.encode(b"spoken words"), "wav"))
            .unwrap();
        queue.push_end().unwrap();

        PipelineWorker::new(id, deps.clone()).run(rx).await;

        assert_eq!(deps.registry.get(id).await.unwrap().state, SessionState::Done);
        let result = deps.results.get(id).await.unwrap();
        assert_eq!(result.transcript, "spoken words");
        assert_eq!(result.summary, "a summary");
        assert_eq!(result.key_points, vec!["point"]);
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn empty_payload_fails_with_detail() {
        let (deps, id) = deps_with(Arc::new(EchoTranscriber), Arc::new(FixedSummarizer)).await;
        let (queue, rx) = chunk_queue(id);
        queue.push_end().unwrap();

        PipelineWorker::new(id, deps.clone()).run(rx).await;

        assert_eq!(deps.registry.get(id).await.unwrap().state, SessionState::Failed);
        let result = deps.results.get(id).await.unwrap();
        assert!(result.transcript.is_empty());
        assert_eq!(result.error.as_deref(), Some("No audio data collected"));
    }

    #[tokio::test]
    async fn transcription_failure_is_fatal() {
        let (deps, id) = deps_with(Arc::new(FailingTranscriber), Arc::new(FixedSummarizer)).await;
        let (queue, rx) = chunk_queue(id);
        queue
            .push(AudioChunk::new(BASE64.encode(b"audio"), "wav"))
            .unwrap();
        queue.push_end().unwrap();

        PipelineWorker::new(id, deps.clone()).run(rx).await;

        assert_eq!(deps.registry.get(id).await.unwrap().state, SessionState::Failed);
        let result = deps.results.get(id).await.unwrap();
        assert!(result.error.as_deref().unwrap().contains("backend down"));
    }

    #[tokio::test]
    async fn summarization_failure_degrades_to_done() {
        let (deps, id) = deps_with(Arc::new(EchoTranscriber), Arc::new(FailingSummarizer)).await;
        let (queue, rx) = chunk_queue(id);
        queue
            .push(AudioChunk::new(BASE64.encode(b"spoken words"), "wav"))
            .unwrap();
        queue.push_end().unwrap();

        PipelineWorker::new(id, deps.clone()).run(rx).await;

        assert_eq!(deps.registry.get(id).await.unwrap().state, SessionState::Done);
        let result = deps.results.get(id).await.unwrap();
        assert_eq!(result.transcript, "spoken words");
        assert!(result.summary.contains("Summary generation failed"));
        assert!(result.key_points.is_empty());
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn result_written_exactly_once() {
        let (deps, id) = deps_with(Arc::new(EchoTranscriber), Arc::new(FixedSummarizer)).await;
        let (queue, rx) = chunk_queue(id);
        queue
            .push(AudioChunk::new(BASE64.encode(b"x"), "wav"))
            .unwrap();
        queue.push_end().unwrap();

        PipelineWorker::new(id, deps.clone()).run(rx).await;

        // Terminal state and a result; a second worker run for the same
        // recording is impossible because the Stopping -> Transcribing CAS
        // has already been consumed.
        let (_, rx2) = chunk_queue(id);
        PipelineWorker::new(id, deps.clone()).run(rx2).await;
        assert_eq!(deps.registry.get(id).await.unwrap().state, SessionState::Done);
    }
}
