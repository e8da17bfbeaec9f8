//! Row model for the `predictions` table.
//!
//! Document-shaped columns are JSONB and held here as `serde_json::Value`;
//! conversion to the typed [`SessionRecord`] happens in one place so the
//! repository stays a thin SQL layer.

use serde_json::Value;
use sqlx::FromRow;
use vitafit_core::session::SessionRecord;
use vitafit_core::types::Timestamp;

/// A row from the `predictions` table.
#[derive(Debug, Clone, FromRow)]
pub struct PredictionRow {
    pub session_id: String,
    pub timestamp: Timestamp,
    pub raw_user_input: Option<Value>,
    pub processed_features: Option<Value>,
    pub exercise_predictions: Option<Value>,
    pub diet_predictions: Option<Value>,
    pub last_updated: Option<Timestamp>,
}

/// Deserialize an optional JSONB column. JSON `null` and `{}` both read as
/// absent, matching documents written before a phase ran.
fn decode<T: serde::de::DeserializeOwned>(
    value: Option<Value>,
) -> Result<Option<T>, serde_json::Error> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) if map.is_empty() => Ok(None),
        Some(v) => serde_json::from_value(v).map(Some),
    }
}

fn encode<T: serde::Serialize>(value: &Option<T>) -> Result<Option<Value>, serde_json::Error> {
    value.as_ref().map(serde_json::to_value).transpose()
}

impl TryFrom<PredictionRow> for SessionRecord {
    type Error = serde_json::Error;

    fn try_from(row: PredictionRow) -> Result<Self, Self::Error> {
        Ok(SessionRecord {
            session_id: row.session_id,
            timestamp: row.timestamp,
            raw_user_input: decode(row.raw_user_input)?,
            processed_features: decode(row.processed_features)?,
            exercise_predictions: decode(row.exercise_predictions)?,
            diet_predictions: decode(row.diet_predictions)?,
            last_updated: row.last_updated,
        })
    }
}

impl TryFrom<&SessionRecord> for PredictionRow {
    type Error = serde_json::Error;

    fn try_from(record: &SessionRecord) -> Result<Self, Self::Error> {
        Ok(PredictionRow {
            session_id: record.session_id.clone(),
            timestamp: record.timestamp,
            raw_user_input: encode(&record.raw_user_input)?,
            processed_features: encode(&record.processed_features)?,
            exercise_predictions: encode(&record.exercise_predictions)?,
            diet_predictions: encode(&record.diet_predictions)?,
            last_updated: record.last_updated,
        })
    }
}
