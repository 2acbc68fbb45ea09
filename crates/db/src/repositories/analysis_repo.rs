//! Repository for deck quality analysis snapshots.

use sqlx::PgPool;

use crate::models::analysis::{CreateDeckAnalysis, DeckAnalysisRow};

const ANALYSIS_COLUMNS: &str =
    "id, deck_name, analysis_type, overall_score, total_cards, metadata, analyzed_at";

/// Provides access to the `deck_analyses` table.
pub struct AnalysisRepo;

impl AnalysisRepo {
    /// Persist an analysis snapshot, returning the inserted row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateDeckAnalysis,
    ) -> Result<DeckAnalysisRow, sqlx::Error> {
        let sql = format!(
            "INSERT INTO deck_analyses \
                 (deck_name, analysis_type, overall_score, total_cards, metadata) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {ANALYSIS_COLUMNS}"
        );
        sqlx::query_as::<_, DeckAnalysisRow>(&sql)
            .bind(&input.deck_name)
            .bind(&input.analysis_type)
            .bind(input.overall_score)
            .bind(input.total_cards)
            .bind(&input.metadata)
            .fetch_one(pool)
            .await
    }

    /// Past analyses, newest first, optionally filtered to one deck.
    pub async fn history(
        pool: &PgPool,
        deck_name: Option<&str>,
        limit: i64,
    ) -> Result<Vec<DeckAnalysisRow>, sqlx::Error> {
        let sql = format!(
            "SELECT {ANALYSIS_COLUMNS} FROM deck_analyses \
             WHERE ($1::TEXT IS NULL OR deck_name = $1) \
             ORDER BY analyzed_at DESC LIMIT $2"
        );
        sqlx::query_as::<_, DeckAnalysisRow>(&sql)
            .bind(deck_name)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
