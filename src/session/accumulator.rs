//! Ingest accumulator — drains a chunk queue into one contiguous payload.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use uuid::Uuid;

use crate::session::queue::{ChunkMessage, ChunkReceiver};

/// The accumulated audio for one recording.
#[derive(Debug, Default)]
pub struct AccumulatedAudio {
    /// Decoded chunk payloads concatenated in arrival order.
    pub payload: Vec<u8>,
    /// Declared format of the first successfully decoded chunk.
    pub format: Option<String>,
    /// Chunks decoded into the payload.
    pub chunks: usize,
    /// Chunks dropped because their transport encoding did not decode.
    pub skipped: usize,
}

impl AccumulatedAudio {
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

/// Consume the queue until `EndOfStream`, base64-decoding each chunk.
///
/// A chunk that fails to decode is logged and skipped; meeting audio streams
/// are expected to carry the occasional corrupt packet, and one bad chunk
/// must not abort the whole recording.
pub async fn accumulate(recording_id: Uuid, mut rx: ChunkReceiver) -> AccumulatedAudio {
    let mut acc = AccumulatedAudio::default();

    loop {
        match rx.next().await {
            ChunkMessage::Chunk(chunk) => match BASE64.decode(chunk.data.as_bytes()) {
                Ok(bytes) => {
                    acc.payload.extend_from_slice(&bytes);
                    acc.chunks += 1;
                    if acc.format.is_none() {
                        acc.format = Some(chunk.format);
                    }
                }
                Err(e) => {
                    acc.skipped += 1;
                    tracing::warn!(
                        recording_id = %recording_id,
                        error = %e,
                        "Skipping undecodable audio chunk"
                    );
                }
            },
            ChunkMessage::EndOfStream => break,
        }
    }

    tracing::info!(
        recording_id = %recording_id,
        bytes = acc.payload.len(),
        chunks = acc.chunks,
        skipped = acc.skipped,
        "Audio accumulation complete"
    );

    acc
}
