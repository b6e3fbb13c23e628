//! Recording session state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// State of a recording session.
///
/// The pipeline worker is the only writer for the
/// `Stopping -> Transcribing -> Summarizing -> Done/Failed` edges; the
/// session API only moves `Created -> Ingesting` on first chunk and
/// `-> Stopping` on stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Session created, no audio received yet.
    Created,
    /// Audio chunks are being accepted.
    Ingesting,
    /// Stop requested; worker is draining the chunk queue.
    Stopping,
    /// Accumulated audio is being transcribed.
    Transcribing,
    /// Transcript is being summarized.
    Summarizing,
    /// Pipeline finished; result available.
    Done,
    /// Pipeline failed; result carries the error detail.
    Failed,
}

impl SessionState {
    /// Check if this state allows transitioning to another state.
    pub fn can_transition_to(&self, target: SessionState) -> bool {
        use SessionState::*;

        matches!(
            (self, target),
            // From Created: first chunk, or stop before any audio arrived
            (Created, Ingesting) | (Created, Stopping) |
            // From Ingesting
            (Ingesting, Stopping) |
            // From Stopping: worker observed end-of-stream
            (Stopping, Transcribing) |
            // From Transcribing: empty payload and backend failure both fail here
            (Transcribing, Summarizing) | (Transcribing, Failed) |
            // Summarize failure degrades, never fails the job
            (Summarizing, Done)
        )
    }

    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Check if the session still accepts audio chunks.
    pub fn is_ingesting(&self) -> bool {
        matches!(self, Self::Created | Self::Ingesting)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Created => "created",
            Self::Ingesting => "ingesting",
            Self::Stopping => "stopping",
            Self::Transcribing => "transcribing",
            Self::Summarizing => "summarizing",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// A recording session record.
///
/// Entries persist for the life of the process; there is no eviction of
/// finished sessions.
#[derive(Debug, Clone, Serialize)]
pub struct Recording {
    /// Unique recording ID, never reused.
    pub id: Uuid,
    /// Room the recording belongs to.
    pub room_id: String,
    /// Username of whoever started the recording.
    pub started_by: String,
    /// Current state.
    pub state: SessionState,
    /// When the session was created.
    pub started_at: DateTime<Utc>,
    /// When the pipeline reached a terminal state.
    pub completed_at: Option<DateTime<Utc>>,
    /// Number of chunks accepted so far.
    pub chunks_received: u64,
}

impl Recording {
    /// Create a new session record in `Created`.
    pub fn new(room_id: impl Into<String>, started_by: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            room_id: room_id.into(),
            started_by: started_by.into(),
            state: SessionState::Created,
            started_at: Utc::now(),
            completed_at: None,
            chunks_received: 0,
        }
    }

    /// Apply a state transition. Stamps `completed_at` on terminal states.
    pub fn transition_to(&mut self, target: SessionState) -> bool {
        if !self.state.can_transition_to(target) {
            return false;
        }
        self.state = target;
        if target.is_terminal() {
            self.completed_at = Some(Utc::now());
        }
        true
    }
}
