//! Route definitions for the `/history` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::history;
use crate::state::AppState;

/// Routes mounted at `/history`.
///
/// ```text
/// GET  /generations       -> list_generations  (?source_type, ?limit)
/// POST /generations       -> create_generation
/// GET  /cards             -> list_cards        (?limit | ?source_path)
/// GET  /validation-stats  -> validation_stats
/// GET  /analyses          -> list_analyses     (?deck, ?limit)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/generations",
            get(history::list_generations).post(history::create_generation),
        )
        .route("/cards", get(history::list_cards))
        .route("/validation-stats", get(history::validation_stats))
        .route("/analyses", get(history::list_analyses))
}
