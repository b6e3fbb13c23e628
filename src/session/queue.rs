//! Per-recording chunk queue.
//!
//! One queue per recording, created atomically with the registry entry. The
//! producer half lives with the session service (HTTP handlers push into it,
//! never blocking); the consumer half is handed to that recording's pipeline
//! worker. End-of-stream is an explicit variant, not a sentinel value, so the
//! consumer must handle it exhaustively.

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::error::SessionError;

/// One unit of caller-supplied audio, immutable once enqueued.
#[derive(Debug, Clone)]
pub struct AudioChunk {
    /// Base64-encoded payload as received from the caller.
    pub data: String,
    /// Caller-declared audio format tag (e.g. "wav"). Passed through to the
    /// transcription backend, not validated here.
    pub format: String,
    /// When the chunk arrived.
    pub received_at: DateTime<Utc>,
}

impl AudioChunk {
    pub fn new(data: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            format: format.into(),
            received_at: Utc::now(),
        }
    }
}

/// Item delivered to the queue consumer.
#[derive(Debug, Clone)]
pub enum ChunkMessage {
    Chunk(AudioChunk),
    /// Pushed exactly once per recording; always the last item observed.
    EndOfStream,
}

/// Producer half. Pushes never block the caller; the buffer is unbounded by
/// design — ingest must not stall on a slow worker, at the cost of unbounded
/// memory if the worker wedges.
#[derive(Clone)]
pub struct ChunkQueue {
    id: Uuid,
    tx: mpsc::UnboundedSender<ChunkMessage>,
}

/// Consumer half, owned by the single pipeline worker.
pub struct ChunkReceiver {
    rx: mpsc::UnboundedReceiver<ChunkMessage>,
}

/// Create the queue pair for a recording.
pub fn chunk_queue(id: Uuid) -> (ChunkQueue, ChunkReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChunkQueue { id, tx }, ChunkReceiver { rx })
}

impl ChunkQueue {
    /// Enqueue an audio chunk.
    pub fn push(&self, chunk: AudioChunk) -> Result<(), SessionError> {
        self.tx
            .send(ChunkMessage::Chunk(chunk))
            .map_err(|_| SessionError::QueueClosed { id: self.id })
    }

    /// Enqueue the end-of-stream marker. The caller (session service) is
    /// responsible for pushing it at most once, guarded by the registry CAS.
    pub fn push_end(&self) -> Result<(), SessionError> {
        self.tx
            .send(ChunkMessage::EndOfStream)
            .map_err(|_| SessionError::QueueClosed { id: self.id })
    }
}

impl ChunkReceiver {
    /// Receive the next item, waiting until one is available. Returns
    /// `EndOfStream` if all producer handles were dropped without an explicit
    /// marker, so a drained worker always terminates.
    pub async fn next(&mut self) -> ChunkMessage {
        self.rx.recv().await.unwrap_or(ChunkMessage::EndOfStream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fifo_order() {
        let (queue, mut rx) = chunk_queue(Uuid::new_v4());

        for i in 0..5 {
            queue.push(AudioChunk::new(format!("chunk-{i}"), "wav")).unwrap();
        }
        queue.push_end().unwrap();

        for i in 0..5 {
            match rx.next().await {
                ChunkMessage::Chunk(c) => assert_eq!(c.data, format!("chunk-{i}")),
                ChunkMessage::EndOfStream => panic!("end of stream too early"),
            }
        }
        assert!(matches!(rx.next().await, ChunkMessage::EndOfStream));
    }

    #[tokio::test]
    async fn end_is_last_item_observed() {
        let (queue, mut rx) = chunk_queue(Uuid::new_v4());

        queue.push(AudioChunk::new("a", "wav")).unwrap();
        queue.push_end().unwrap();

        assert!(matches!(rx.next().await, ChunkMessage::Chunk(_)));
        assert!(matches!(rx.next().await, ChunkMessage::EndOfStream));
    }

    #[tokio::test]
    async fn dropped_producer_yields_end_of_stream() {
        let (queue, mut rx) = chunk_queue(Uuid::new_v4());
        queue.push(AudioChunk::new("a", "wav")).unwrap();
        drop(queue);

        assert!(matches!(rx.next().await, ChunkMessage::Chunk(_)));
        assert!(matches!(rx.next().await, ChunkMessage::EndOfStream));
    }

    #[tokio::test]
    async fn push_after_receiver_dropped() {
        let (queue, rx) = chunk_queue(Uuid::new_v4());
        drop(rx);

        let err = queue.push(AudioChunk::new("a", "wav")).unwrap_err();
        assert!(matches!(err, SessionError::QueueClosed { .. }));
    }

    #[tokio::test]
    async fn concurrent_producers_keep_per_producer_order() {
        let (queue, mut rx) = chunk_queue(Uuid::new_v4());

        let mut handles = Vec::new();
        for p in 0..4 {
            let queue = queue.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..50 {
                    queue
                        .push(AudioChunk::new(format!("{p}:{i}"), "wav"))
                        .unwrap();
                }
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        queue.push_end().unwrap();

        let mut last_seen = [-1i64; 4];
        loop {
            match rx.next().await {
                ChunkMessage::Chunk(c) => {
                    let (p, i) = c.data.split_once(':').unwrap();
                    let p: usize = p.parse().unwrap();
                    let i: i64 = i.parse().unwrap();
                    assert!(i > last_seen[p], "producer {p} reordered");
                    last_seen[p] = i;
                }
                ChunkMessage::EndOfStream => break,
            }
        }
        assert!(last_seen.iter().all(|&v| v == 49), "chunks were lost");
    }
}
