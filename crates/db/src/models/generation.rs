//! Models for card generation sessions.

use ankibridge_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `generations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GenerationRow {
    pub id: DbId,
    pub source_type: String,
    pub source_path: Option<String>,
    pub source_metadata: Option<serde_json::Value>,
    pub generated_at: Timestamp,
}

/// A generation joined with the number of cards it produced.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GenerationSummary {
    pub id: DbId,
    pub source_type: String,
    pub source_path: Option<String>,
    pub source_metadata: Option<serde_json::Value>,
    pub generated_at: Timestamp,
    pub card_count: i64,
}

/// DTO for starting a generation session.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateGeneration {
    /// Origin of the cards: `manual`, `pdf`, `epub`, `web`, `text`.
    pub source_type: String,
    pub source_path: Option<String>,
    pub source_metadata: Option<serde_json::Value>,
}
