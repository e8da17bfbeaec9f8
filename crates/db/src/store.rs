//! Session store abstraction.
//!
//! The prediction flow needs only three operations on the `predictions`
//! collection: point lookup, whole-document upsert, and an in-place update of
//! the diet result. Each is a single atomic statement; no cross-call locking
//! is performed, so a client racing both phases on one session id sees
//! whichever write lands last.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use vitafit_core::plan::DietOutcome;
use vitafit_core::session::SessionRecord;
use vitafit_core::types::Timestamp;

use crate::models::prediction::PredictionRow;
use crate::repositories::PredictionRepo;
use crate::DbPool;

/// Errors from a session store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("document (de)serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Keyed-by-session document store used by the prediction orchestrator.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fetch the record for `session_id`, if any.
    async fn find(&self, session_id: &str) -> Result<Option<SessionRecord>, StoreError>;

    /// Insert the record, replacing any existing document with the same id.
    async fn upsert(&self, record: &SessionRecord) -> Result<(), StoreError>;

    /// Store a diet result on an existing record.
    ///
    /// Returns `false` when the session does not exist.
    async fn set_diet(
        &self,
        session_id: &str,
        outcome: &DietOutcome,
        at: Timestamp,
    ) -> Result<bool, StoreError>;

    /// Whether the backend is reachable.
    async fn health_check(&self) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// Postgres
// ---------------------------------------------------------------------------

/// [`SessionStore`] backed by the `predictions` table.
#[derive(Clone)]
pub struct PgSessionStore {
    pool: DbPool,
}

impl PgSessionStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn find(&self, session_id: &str) -> Result<Option<SessionRecord>, StoreError> {
        let row = PredictionRepo::find_by_session(&self.pool, session_id).await?;
        Ok(row.map(SessionRecord::try_from).transpose()?)
    }

    async fn upsert(&self, record: &SessionRecord) -> Result<(), StoreError> {
        let row = PredictionRow::try_from(record)?;
        PredictionRepo::upsert(&self.pool, &row).await?;
        tracing::debug!(session_id = %record.session_id, "Prediction document upserted");
        Ok(())
    }

    async fn set_diet(
        &self,
        session_id: &str,
        outcome: &DietOutcome,
        at: Timestamp,
    ) -> Result<bool, StoreError> {
        let value = serde_json::to_value(outcome)?;
        let updated = PredictionRepo::set_diet_predictions(&self.pool, session_id, &value, at).await?;
        Ok(updated)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool).await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Process-local [`SessionStore`], used when no database is configured and
/// in tests. Contents are lost on restart.
#[derive(Default)]
pub struct MemorySessionStore {
    records: RwLock<HashMap<String, SessionRecord>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn find(&self, session_id: &str) -> Result<Option<SessionRecord>, StoreError> {
        Ok(self.records.read().await.get(session_id).cloned())
    }

    async fn upsert(&self, record: &SessionRecord) -> Result<(), StoreError> {
        self.records
            .write()
            .await
            .insert(record.session_id.clone(), record.clone());
        Ok(())
    }

    async fn set_diet(
        &self,
        session_id: &str,
        outcome: &DietOutcome,
        at: Timestamp,
    ) -> Result<bool, StoreError> {
        let mut records = self.records.write().await;
        match records.get_mut(session_id) {
            Some(record) => {
                record.diet_predictions = Some(outcome.clone());
                record.last_updated = Some(at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
