//! Repository for the `predictions` table.

use serde_json::Value;
use sqlx::PgPool;
use vitafit_core::types::Timestamp;

use crate::models::prediction::PredictionRow;

/// Column list for `predictions` queries.
const COLUMNS: &str = "session_id, timestamp, raw_user_input, processed_features, \
                       exercise_predictions, diet_predictions, last_updated";

/// Provides upsert and point lookup for session prediction documents.
pub struct PredictionRepo;

impl PredictionRepo {
    /// Find the document for a session. Returns `None` if none exists.
    pub async fn find_by_session(
        pool: &PgPool,
        session_id: &str,
    ) -> Result<Option<PredictionRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM predictions WHERE session_id = $1");
        sqlx::query_as::<_, PredictionRow>(&query)
            .bind(session_id)
            .fetch_optional(pool)
            .await
    }

    /// Insert or fully replace the document for a session.
    pub async fn upsert(pool: &PgPool, row: &PredictionRow) -> Result<PredictionRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO predictions ({COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             ON CONFLICT (session_id) DO UPDATE \
             SET timestamp = EXCLUDED.timestamp, \
                 raw_user_input = EXCLUDED.raw_user_input, \
                 processed_features = EXCLUDED.processed_features, \
                 exercise_predictions = EXCLUDED.exercise_predictions, \
                 diet_predictions = EXCLUDED.diet_predictions, \
                 last_updated = EXCLUDED.last_updated \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PredictionRow>(&query)
            .bind(&row.session_id)
            .bind(row.timestamp)
            .bind(&row.raw_user_input)
            .bind(&row.processed_features)
            .bind(&row.exercise_predictions)
            .bind(&row.diet_predictions)
            .bind(row.last_updated)
            .fetch_one(pool)
            .await
    }

    /// Set the diet result on an existing document.
    ///
    /// Returns `false` if no document exists for the session.
    pub async fn set_diet_predictions(
        pool: &PgPool,
        session_id: &str,
        diet_predictions: &Value,
        last_updated: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE predictions SET diet_predictions = $2, last_updated = $3 \
             WHERE session_id = $1",
        )
        .bind(session_id)
        .bind(diet_predictions)
        .bind(last_updated)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
