//! Models linking created Anki notes to their generation session.

use ankibridge_core::types::{DbId, NoteId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `generated_cards` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GeneratedCardRow {
    pub id: DbId,
    pub generation_id: Option<DbId>,
    pub anki_note_id: NoteId,
    pub card_type: String,
    pub front_or_text: String,
    pub back: Option<String>,
    pub deck: String,
    pub tags: Option<serde_json::Value>,
    pub validation_warnings: Option<serde_json::Value>,
    pub created_at: Timestamp,
}

/// DTO for recording a created card.
#[derive(Debug, Clone)]
pub struct CreateGeneratedCard {
    pub generation_id: Option<DbId>,
    pub anki_note_id: NoteId,
    pub card_type: String,
    pub front_or_text: String,
    pub back: Option<String>,
    pub deck: String,
    /// JSON array of tag strings, `None` when untagged.
    pub tags: Option<serde_json::Value>,
    /// Serialized non-blocking findings, `None` when the card was clean.
    pub validation_warnings: Option<serde_json::Value>,
}

/// Aggregate warning statistics across all recorded cards.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationStats {
    pub total_cards: i64,
    pub cards_with_warnings: i64,
    /// Percentage of recorded cards that carried warnings (0-100).
    pub warning_rate: f64,
}
