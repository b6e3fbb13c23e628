//! Session registry — the single source of truth for recording state.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::SessionError;
use crate::session::state::{Recording, SessionState};

/// Process-wide map from recording ID to session record.
///
/// Each entry sits behind its own lock so a status mutation only contends
/// with readers of that one recording, never with the rest of the map. The
/// outer lock is write-held only while inserting a new entry.
pub struct SessionRegistry {
    recordings: RwLock<HashMap<Uuid, Arc<RwLock<Recording>>>>,
}

impl SessionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            recordings: RwLock::new(HashMap::new()),
        }
    }

    /// Allocate a fresh recording in `Created` and return a snapshot of it.
    pub async fn create(
        &self,
        room_id: impl Into<String>,
        started_by: impl Into<String>,
    ) -> Recording {
        let recording = Recording::new(room_id, started_by);
        self.recordings
            .write()
            .await
            .insert(recording.id, Arc::new(RwLock::new(recording.clone())));
        recording
    }

    /// Get a snapshot of a recording.
    pub async fn get(&self, id: Uuid) -> Result<Recording, SessionError> {
        let entry = self.entry(id).await?;
        let rec = entry.read().await;
        Ok(rec.clone())
    }

    /// Compare-and-set state transition.
    ///
    /// Succeeds only if the current state equals `from`; this is the sole
    /// primitive guarding every lifecycle edge, so no two writers can race a
    /// recording through the same transition.
    pub async fn transition(
        &self,
        id: Uuid,
        from: SessionState,
        to: SessionState,
    ) -> Result<(), SessionError> {
        let entry = self.entry(id).await?;
        let mut rec = entry.write().await;
        if rec.state != from {
            return Err(SessionError::InvalidTransition {
                id,
                expected: from,
                actual: rec.state,
                target: to,
            });
        }
        if !rec.transition_to(to) {
            return Err(SessionError::InvalidTransition {
                id,
                expected: from,
                actual: rec.state,
                target: to,
            });
        }
        tracing::debug!(recording_id = %id, from = %from, to = %to, "State transition");
        Ok(())
    }

    /// Increment the accepted-chunk counter. Safe to call concurrently with
    /// reads and other increments; returns the new count.
    pub async fn increment_chunks(&self, id: Uuid) -> Result<u64, SessionError> {
        let entry = self.entry(id).await?;
        let mut rec = entry.write().await;
        rec.chunks_received += 1;
        Ok(rec.chunks_received)
    }

    /// Number of registered recordings (all states).
    pub async fn len(&self) -> usize {
        self.recordings.read().await.len()
    }

    /// Check whether the registry is empty.
    pub async fn is_empty(&self) -> bool {
        self.recordings.read().await.is_empty()
    }

    async fn entry(&self, id: Uuid) -> Result<Arc<RwLock<Recording>>, SessionError> {
        self.recordings
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(SessionError::NotFound { id })
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_and_get() {
        let registry = SessionRegistry::new();
        let id = registry.create("room1", "alice").await.id;

        let rec = registry.get(id).await.unwrap();
        assert_eq!(rec.room_id, "room1");
        assert_eq!(rec.started_by, "alice");
        assert_eq!(rec.state, SessionState::Created);
        assert_eq!(rec.chunks_received, 0);
    }

    #[tokio::test]
    async fn get_unknown() {
        let registry = SessionRegistry::new();
        let err = registry.get(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, SessionError::NotFound { .. }));
    }

    #[tokio::test]
    async fn transition_cas() {
        let registry = SessionRegistry::new();
        let id = registry.create("room1", "alice").await.id;

        registry
            .transition(id, SessionState::Created, SessionState::Ingesting)
            .await
            .unwrap();
        assert_eq!(registry.get(id).await.unwrap().state, SessionState::Ingesting);

        // Second writer attempting the same edge loses the race
        let err = registry
            .transition(id, SessionState::Created, SessionState::Ingesting)
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn transition_rejects_illegal_edge() {
        let registry = SessionRegistry::new();
        let id = registry.create("room1", "alice").await.id;

        let err = registry
            .transition(id, SessionState::Created, SessionState::Done)
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn increment_chunks_concurrent() {
        let registry = Arc::new(SessionRegistry::new());
        let id = registry.create("room1", "alice").await.id;

        let mut handles = Vec::new();
        for _ in 0..8 {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(async move {
                for _ in 0..25 {
                    registry.increment_chunks(id).await.unwrap();
                }
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        assert_eq!(registry.get(id).await.unwrap().chunks_received, 200);
    }

    #[tokio::test]
    async fn only_one_writer_wins_cas_race() {
        let registry = Arc::new(SessionRegistry::new());
        let id = registry.create("room1", "alice").await.id;

        let mut handles = Vec::new();
        for _ in 0..10 {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(async move {
                registry
                    .transition(id, SessionState::Created, SessionState::Ingesting)
                    .await
                    .is_ok()
            }));
        }

        let mut wins = 0;
        for h in handles {
            if h.await.unwrap() {
                wins += 1;
            }
        }
        assert_eq!(wins, 1);
    }
}
