//! Models for persisted deck analysis runs.

use ankibridge_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `deck_analyses` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DeckAnalysisRow {
    pub id: DbId,
    pub deck_name: String,
    pub analysis_type: String,
    pub overall_score: Option<f64>,
    pub total_cards: i32,
    pub metadata: Option<serde_json::Value>,
    pub analyzed_at: Timestamp,
}

/// DTO for saving an analysis run.
#[derive(Debug, Clone)]
pub struct CreateDeckAnalysis {
    pub deck_name: String,
    /// Analysis flavor, currently always `quality`.
    pub analysis_type: String,
    pub overall_score: Option<f64>,
    pub total_cards: i32,
    pub metadata: Option<serde_json::Value>,
}
