//! Recorder service — the operations behind the HTTP boundary.
//!
//! Owns the registry, the result store, and the producer halves of every
//! live chunk queue. Handlers stay thin; everything stateful happens here.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::SessionError;
use crate::session::queue::{AudioChunk, ChunkQueue, chunk_queue};
use crate::session::registry::SessionRegistry;
use crate::session::results::ResultStore;
use crate::session::state::{Recording, SessionState};
use crate::session::worker::{PipelineWorker, WorkerDeps};
use crate::summarize::Summarizer;
use crate::transcribe::TranscriptionProvider;

/// Snapshot returned by `poll`.
#[derive(Debug, Clone, Serialize)]
pub struct PollResponse {
    pub recording_id: Uuid,
    pub status: SessionState,
    pub chunks_received: u64,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_points: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Session lifecycle service. One instance per process, shared by all
/// handlers and workers.
pub struct RecorderService {
    registry: Arc<SessionRegistry>,
    results: Arc<ResultStore>,
    queues: RwLock<HashMap<Uuid, ChunkQueue>>,
    transcriber: Arc<dyn TranscriptionProvider>,
    summarizer: Arc<dyn Summarizer>,
}

impl RecorderService {
    pub fn new(
        transcriber: Arc<dyn TranscriptionProvider>,
        summarizer: Arc<dyn Summarizer>,
    ) -> Arc<Self> {
        Arc::new(Self {
            registry: Arc::new(SessionRegistry::new()),
            results: Arc::new(ResultStore::new()),
            queues: RwLock::new(HashMap::new()),
            transcriber,
            summarizer,
        })
    }

    /// Backend name, surfaced by the healthcheck.
    pub fn transcription_backend(&self) -> &str {
        self.transcriber.name()
    }

    /// Create a recording, its chunk queue, and its worker. Returns
    /// immediately; the worker blocks on the queue until stop.
    pub async fn start(
        &self,
        room_id: impl Into<String>,
        started_by: impl Into<String>,
    ) -> Recording {
        let recording = self.registry.create(room_id, started_by).await;
        let id = recording.id;
        let (queue, rx) = chunk_queue(id);
        self.queues.write().await.insert(id, queue);

        let worker = PipelineWorker::new(
            id,
            WorkerDeps {
                registry: Arc::clone(&self.registry),
                results: Arc::clone(&self.results),
                transcriber: Arc::clone(&self.transcriber),
                summarizer: Arc::clone(&self.summarizer),
            },
        );
        worker.spawn(rx);

        tracing::info!(
            recording_id = %id,
            room_id = %recording.room_id,
            started_by = %recording.started_by,
            "Recording started"
        );
        recording
    }

    /// Enqueue one audio chunk. The first chunk flips `Created -> Ingesting`;
    /// losing that CAS to a concurrent feeder is fine. Never blocks on the
    /// worker — the queue is unbounded.
    pub async fn feed(
        &self,
        id: Uuid,
        data: impl Into<String>,
        format: impl Into<String>,
    ) -> Result<u64, SessionError> {
        let recording = self.registry.get(id).await?;

        if recording.state == SessionState::Created {
            match self
                .registry
                .transition(id, SessionState::Created, SessionState::Ingesting)
                .await
            {
                Ok(()) | Err(SessionError::InvalidTransition { .. }) => {}
                Err(e) => return Err(e),
            }
        }

        let state = self.registry.get(id).await?.state;
        if state != SessionState::Ingesting {
            return Err(SessionError::NotIngesting { id, state });
        }

        self.queue(id).await?.push(AudioChunk::new(data, format))?;
        self.registry.increment_chunks(id).await
    }

    /// Request stop: flip to `Stopping` and push the end-of-stream marker
    /// exactly once. Idempotent — a second stop is a no-op. Returns without
    /// waiting for the pipeline.
    pub async fn stop(&self, id: Uuid) -> Result<(), SessionError> {
        loop {
            let state = self.registry.get(id).await?.state;
            if !state.is_ingesting() {
                // Already stopping or terminal; the marker was pushed by the
                // stop that won.
                return Ok(());
            }
            match self
                .registry
                .transition(id, state, SessionState::Stopping)
                .await
            {
                Ok(()) => {
                    self.queue(id).await?.push_end()?;
                    tracing::info!(recording_id = %id, "Recording stopped");
                    return Ok(());
                }
                // Raced a first chunk or another stop; re-read and retry.
                Err(SessionError::InvalidTransition { .. }) => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Pure read of the registry and result store; never blocks on the
    /// pipeline, never mutates.
    pub async fn poll(&self, id: Uuid) -> Result<PollResponse, SessionError> {
        let recording = self.registry.get(id).await?;
        let result = if recording.state.is_terminal() {
            self.results.get(id).await
        } else {
            None
        };

        Ok(PollResponse {
            recording_id: recording.id,
            status: recording.state,
            chunks_received: recording.chunks_received,
            started_at: recording.started_at,
            completed_at: recording.completed_at,
            transcript: result.as_ref().map(|r| r.transcript.clone()),
            summary: result.as_ref().map(|r| r.summary.clone()),
            key_points: result.as_ref().map(|r| r.key_points.clone()),
            error: result.and_then(|r| r.error),
        })
    }

    async fn queue(&self, id: Uuid) -> Result<ChunkQueue, SessionError> {
        self.queues
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(SessionError::NotFound { id })
    }
}
