//! Route definitions for the `/decks` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::decks;
use crate::state::AppState;

/// Routes mounted at `/decks`.
///
/// ```text
/// GET  /                 -> list_decks
/// POST /                 -> create_deck
/// GET  /{name}/stats     -> deck_stats
/// GET  /{name}/cards     -> deck_cards     (?query&tags&limit)
/// GET  /{name}/patterns  -> deck_patterns  (?sample_size)
/// POST /{name}/analyze   -> analyze_deck   (?strictness)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(decks::list_decks).post(decks::create_deck))
        .route("/{name}/stats", get(decks::deck_stats))
        .route("/{name}/cards", get(decks::deck_cards))
        .route("/{name}/patterns", get(decks::deck_patterns))
        .route("/{name}/analyze", post(decks::analyze_deck))
}
