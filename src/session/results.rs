//! Result store — terminal artifacts, written once by the pipeline worker.

use std::collections::HashMap;

use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Terminal artifact for one recording.
///
/// Exists if and only if the session reached `Done` or `Failed`. Written once
/// by the owning worker, read concurrently by pollers.
#[derive(Debug, Clone, Serialize)]
pub struct RecordingResult {
    /// Total decoded audio bytes that went into the pipeline.
    pub audio_bytes: usize,
    /// Final transcript text (empty on transcription failure).
    pub transcript: String,
    /// Free-text summary; carries a failure note when summarization degraded.
    pub summary: String,
    /// Extracted key points, in the order the summarizer produced them.
    pub key_points: Vec<String>,
    /// Error detail for failed recordings.
    pub error: Option<String>,
}

/// Map from recording ID to its result.
pub struct ResultStore {
    results: RwLock<HashMap<Uuid, RecordingResult>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self {
            results: RwLock::new(HashMap::new()),
        }
    }

    /// Store a result. Write-once per recording: the single-writer invariant
    /// means a second write should never happen; if it does, last-write-wins
    /// and the violation is logged.
    pub async fn put(&self, id: Uuid, result: RecordingResult) {
        let mut results = self.results.write().await;
        if results.insert(id, result).is_some() {
            tracing::warn!(
                recording_id = %id,
                "Result overwritten — single-writer invariant violated"
            );
        }
    }

    /// Get a snapshot of a result.
    pub async fn get(&self, id: Uuid) -> Option<RecordingResult> {
        self.results.read().await.get(&id).cloned()
    }
}

impl Default for ResultStore {
    fn default() -> Self {
        Self::new()
    }
}
