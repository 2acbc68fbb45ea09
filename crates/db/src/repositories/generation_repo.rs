//! Repository for generation sessions.

use sqlx::PgPool;

use crate::models::generation::{CreateGeneration, GenerationRow, GenerationSummary};

/// Column list for `generations` queries.
const GENERATION_COLUMNS: &str =
    "g.id, g.source_type, g.source_path, g.source_metadata, g.generated_at";

/// Provides access to the `generations` table.
pub struct GenerationRepo;

impl GenerationRepo {
    /// Start a new generation session, returning the inserted row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateGeneration,
    ) -> Result<GenerationRow, sqlx::Error> {
        sqlx::query_as::<_, GenerationRow>(
            "INSERT INTO generations (source_type, source_path, source_metadata) \
             VALUES ($1, $2, $3) \
             RETURNING id, source_type, source_path, source_metadata, generated_at",
        )
        .bind(&input.source_type)
        .bind(&input.source_path)
        .bind(&input.source_metadata)
        .fetch_one(pool)
        .await
    }

    /// Recent generation sessions with per-session card counts,
    /// newest first, optionally filtered by source type.
    pub async fn history(
        pool: &PgPool,
        source_type: Option<&str>,
        limit: i64,
    ) -> Result<Vec<GenerationSummary>, sqlx::Error> {
        let sql = format!(
            "SELECT {GENERATION_COLUMNS}, COUNT(gc.id) AS card_count \
             FROM generations g \
             LEFT JOIN generated_cards gc ON gc.generation_id = g.id \
             WHERE ($1::TEXT IS NULL OR g.source_type = $1) \
             GROUP BY g.id \
             ORDER BY g.generated_at DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, GenerationSummary>(&sql)
            .bind(source_type)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
