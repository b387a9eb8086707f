use crate::error::{Error, Result};
use crate::models::violation::{ViolationCounts, ViolationKind, ViolationRecord};
use sqlx::PgPool;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub mock_id: String,
    pub owner: String,
}

impl SessionKey {
    pub fn new(mock_id: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            mock_id: mock_id.into(),
            owner: owner.into(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct SessionEntry {
    counts: ViolationCounts,
    ending: bool,
    last_event: Instant,
}

impl SessionEntry {
    fn new() -> Self {
        Self {
            counts: ViolationCounts::default(),
            ending: false,
            last_event: Instant::now(),
        }
    }
}

/// In-memory violation tallies for sessions that have not ended yet.
///
/// A session's counts leave the registry only once its terminal write has
/// succeeded; a failed write leaves them in place for a retry. At most one
/// terminal write per session runs at a time.
#[derive(Clone, Default)]
pub struct ProctoringRegistry {
    sessions: Arc<RwLock<HashMap<SessionKey, SessionEntry>>>,
}

impl ProctoringRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record(&self, key: &SessionKey, kind: ViolationKind) -> ViolationCounts {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.entry(key.clone()).or_insert_with(SessionEntry::new);
        entry.counts.record(kind);
        entry.last_event = Instant::now();
        entry.counts
    }

    pub async fn snapshot(&self, key: &SessionKey) -> ViolationCounts {
        self.sessions
            .read()
            .await
            .get(key)
            .map(|entry| entry.counts)
            .unwrap_or_default()
    }

    /// Runs `write` with the current snapshot and clears the session only if
    /// it succeeds.
    ///
    /// Events recorded while the write is in flight are kept: only the
    /// snapshot that was written is subtracted. A second call for the same
    /// session while one is in flight fails with `Conflict`.
    pub async fn finalize<F, Fut, T>(&self, key: &SessionKey, write: F) -> Result<T>
    where
        F: FnOnce(ViolationCounts) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let written = {
            let mut sessions = self.sessions.write().await;
            let entry = sessions.entry(key.clone()).or_insert_with(SessionEntry::new);
            if entry.ending {
                return Err(Error::Conflict(
                    "Interview end is already in progress".to_string(),
                ));
            }
            entry.ending = true;
            entry.counts
        };

        let outcome = write(written).await;

        let mut sessions = self.sessions.write().await;
        let finished = match sessions.get_mut(key) {
            Some(entry) => {
                entry.ending = false;
                if outcome.is_ok() {
                    entry.counts = entry.counts.without(&written);
                }
                entry.counts.total() == 0
            }
            None => false,
        };
        if finished {
            sessions.remove(key);
        }
        outcome
    }

    /// Drops sessions with no event for `max_idle` that are not ending.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.ending || now.duration_since(entry.last_event) < max_idle);
        before - sessions.len()
    }

    pub async fn active_sessions(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[derive(Clone)]
pub struct ViolationService {
    pool: PgPool,
}

impl ViolationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert_record(
        &self,
        mock_id: &str,
        owner: &str,
        counts: ViolationCounts,
    ) -> Result<ViolationRecord> {
        let record = sqlx::query_as::<_, ViolationRecord>(
            r#"
            INSERT INTO user_violations (mock_id_ref, user_email, face_absent, focus_loss, unauthorized_item)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(mock_id)
        .bind(owner)
        .bind(counts.face_absent)
        .bind(counts.focus_lost)
        .bind(counts.unauthorized_item)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(
            mock_id,
            face_absent = counts.face_absent,
            focus_lost = counts.focus_lost,
            unauthorized_item = counts.unauthorized_item,
            "Violation record saved"
        );
        Ok(record)
    }

    /// Most recent record for the pair, if any.
    pub async fn latest_record(&self, mock_id: &str, owner: &str) -> Result<Option<ViolationRecord>> {
        let record = sqlx::query_as::<_, ViolationRecord>(
            r#"
            SELECT * FROM user_violations
            WHERE mock_id_ref = $1 AND user_email = $2
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .bind(mock_id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;

    fn key() -> SessionKey {
        SessionKey::new("mock-1", "alice@example.com")
    }

    #[tokio::test]
    async fn counts_accumulate_per_session() {
        let registry = ProctoringRegistry::new();
        registry.record(&key(), ViolationKind::FaceAbsent).await;
        registry.record(&key(), ViolationKind::FaceAbsent).await;
        let other = SessionKey::new("mock-1", "bob@example.com");
        registry.record(&other, ViolationKind::FocusLost).await;

        let snap = registry.snapshot(&key()).await;
        assert_eq!(snap.face_absent, 2);
        assert_eq!(snap.focus_lost, 0);
        assert_eq!(registry.snapshot(&other).await.focus_lost, 1);
    }

    #[tokio::test]
    async fn counters_never_decrease_while_recording() {
        let registry = ProctoringRegistry::new();
        let mut previous = ViolationCounts::default();
        let kinds = [
            ViolationKind::FocusLost,
            ViolationKind::UnauthorizedItem,
            ViolationKind::FocusLost,
            ViolationKind::MultipleFaces,
            ViolationKind::FaceAbsent,
        ];
        for kind in kinds {
            let now = registry.record(&key(), kind).await;
            for k in kinds {
                assert!(now.get(k) >= previous.get(k));
            }
            assert_eq!(now.total(), previous.total() + 1);
            previous = now;
        }
    }

    #[tokio::test]
    async fn successful_write_resets_session() {
        let registry = ProctoringRegistry::new();
        registry.record(&key(), ViolationKind::UnauthorizedItem).await;

        let written = registry
            .finalize(&key(), |counts| async move { Ok(counts) })
            .await
            .unwrap();
        assert_eq!(written.unauthorized_item, 1);
        assert_eq!(registry.snapshot(&key()).await, ViolationCounts::default());
        assert_eq!(registry.active_sessions().await, 0);
    }

    #[tokio::test]
    async fn failed_write_keeps_counts() {
        let registry = ProctoringRegistry::new();
        registry.record(&key(), ViolationKind::FocusLost).await;
        registry.record(&key(), ViolationKind::FocusLost).await;

        let result = registry
            .finalize(&key(), |_| async { Err::<(), _>(Error::Internal("db down".into())) })
            .await;
        tokio_test::assert_err!(result);
        assert_eq!(registry.snapshot(&key()).await.focus_lost, 2);

        let retried = registry
            .finalize(&key(), |counts| async move { Ok(counts.focus_lost) })
            .await;
        assert_eq!(tokio_test::assert_ok!(retried), 2);
        assert_eq!(registry.snapshot(&key()).await.total(), 0);
    }

    #[tokio::test]
    async fn events_during_write_survive_finalize() {
        let registry = ProctoringRegistry::new();
        registry.record(&key(), ViolationKind::FaceAbsent).await;

        let inner = registry.clone();
        registry
            .finalize(&key(), |counts| async move {
                inner.record(&key(), ViolationKind::FaceAbsent).await;
                Ok(counts)
            })
            .await
            .unwrap();

        assert_eq!(registry.snapshot(&key()).await.face_absent, 1);
    }

    #[tokio::test]
    async fn finalize_without_events_writes_zeroes() {
        let registry = ProctoringRegistry::new();
        let written = registry
            .finalize(&key(), |counts| async move { Ok(counts) })
            .await
            .unwrap();
        assert_eq!(written, ViolationCounts::default());
    }

    #[tokio::test]
    async fn overlapping_finalize_is_rejected_and_counts_stay_positive() {
        let registry = ProctoringRegistry::new();
        for _ in 0..3 {
            registry.record(&key(), ViolationKind::FaceAbsent).await;
        }

        let (release, hold) = oneshot::channel::<()>();
        let (started_tx, started) = oneshot::channel::<()>();
        let first = {
            let registry = registry.clone();
            tokio::spawn(async move {
                registry
                    .finalize(&key(), |counts| async move {
                        let _ = started_tx.send(());
                        let _ = hold.await;
                        Ok(counts)
                    })
                    .await
            })
        };
        started.await.unwrap();

        let second = registry
            .finalize(&key(), |counts| async move { Ok(counts) })
            .await;
        assert!(matches!(second, Err(Error::Conflict(_))));

        registry.record(&key(), ViolationKind::FaceAbsent).await;
        release.send(()).unwrap();

        let written = tokio_test::assert_ok!(first.await.unwrap());
        assert_eq!(written.face_absent, 3);
        let left = registry.snapshot(&key()).await;
        assert_eq!(left.face_absent, 1);
        assert!(left.focus_lost >= 0 && left.unauthorized_item >= 0);

        let next = registry
            .finalize(&key(), |counts| async move { Ok(counts) })
            .await
            .unwrap();
        assert_eq!(next.face_absent, 1);
        assert_eq!(registry.active_sessions().await, 0);
    }

    #[tokio::test]
    async fn idle_sessions_are_evicted() {
        let registry = ProctoringRegistry::new();
        registry.record(&key(), ViolationKind::FocusLost).await;
        assert_eq!(registry.evict_idle(Duration::from_secs(3600)).await, 0);
        assert_eq!(registry.evict_idle(Duration::ZERO).await, 1);
        assert_eq!(registry.active_sessions().await, 0);
    }
}
