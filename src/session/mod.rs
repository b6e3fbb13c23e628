//! Recording session lifecycle: registry, chunk queues, pipeline workers.

pub mod accumulator;
pub mod queue;
pub mod registry;
pub mod results;
pub mod service;
pub mod state;
pub mod worker;

pub use queue::{AudioChunk, ChunkMessage, ChunkQueue, ChunkReceiver};
pub use registry::SessionRegistry;
pub use results::{RecordingResult, ResultStore};
pub use service::{PollResponse, RecorderService};
pub use state::{Recording, SessionState};
pub use worker::{PipelineWorker, WorkerDeps};
