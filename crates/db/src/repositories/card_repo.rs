//! Repository for generated-card records.

use sqlx::PgPool;

use crate::models::card::{CreateGeneratedCard, GeneratedCardRow, ValidationStats};

/// Column list for `generated_cards` queries.
const CARD_COLUMNS: &str = "id, generation_id, anki_note_id, card_type, front_or_text, \
     back, deck, tags, validation_warnings, created_at";

/// Provides access to the `generated_cards` table.
pub struct CardRepo;

impl CardRepo {
    /// Record a card created in Anki, returning the inserted row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateGeneratedCard,
    ) -> Result<GeneratedCardRow, sqlx::Error> {
        let sql = format!(
            "INSERT INTO generated_cards \
                 (generation_id, anki_note_id, card_type, front_or_text, \
                  back, deck, tags, validation_warnings) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {CARD_COLUMNS}"
        );
        sqlx::query_as::<_, GeneratedCardRow>(&sql)
            .bind(input.generation_id)
            .bind(input.anki_note_id)
            .bind(&input.card_type)
            .bind(&input.front_or_text)
            .bind(&input.back)
            .bind(&input.deck)
            .bind(&input.tags)
            .bind(&input.validation_warnings)
            .fetch_one(pool)
            .await
    }

    /// Most recently created cards, newest first.
    pub async fn recent(pool: &PgPool, limit: i64) -> Result<Vec<GeneratedCardRow>, sqlx::Error> {
        let sql = format!(
            "SELECT {CARD_COLUMNS} FROM generated_cards \
             ORDER BY created_at DESC LIMIT $1"
        );
        sqlx::query_as::<_, GeneratedCardRow>(&sql)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Cards generated from a specific source file or URL.
    pub async fn by_source(
        pool: &PgPool,
        source_path: &str,
    ) -> Result<Vec<GeneratedCardRow>, sqlx::Error> {
        let sql = format!(
            "SELECT gc.id, gc.generation_id, gc.anki_note_id, gc.card_type, \
                    gc.front_or_text, gc.back, gc.deck, gc.tags, \
                    gc.validation_warnings, gc.created_at \
             FROM generated_cards gc \
             JOIN generations g ON g.id = gc.generation_id \
             WHERE g.source_path = $1 \
             ORDER BY gc.created_at DESC"
        );
        sqlx::query_as::<_, GeneratedCardRow>(&sql)
            .bind(source_path)
            .fetch_all(pool)
            .await
    }

    /// Aggregate warning statistics across all recorded cards.
    pub async fn validation_stats(pool: &PgPool) -> Result<ValidationStats, sqlx::Error> {
        let (total, with_warnings): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COUNT(validation_warnings) FROM generated_cards",
        )
        .fetch_one(pool)
        .await?;

        let warning_rate = if total > 0 {
            (with_warnings as f64 / total as f64 * 10_000.0).round() / 100.0
        } else {
            0.0
        };

        Ok(ValidationStats {
            total_cards: total,
            cards_with_warnings: with_warnings,
            warning_rate,
        })
    }
}
