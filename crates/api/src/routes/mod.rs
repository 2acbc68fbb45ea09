pub mod cards;
pub mod decks;
pub mod health;
pub mod history;
pub mod notes;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /cards/basic                 create Basic card (POST)
/// /cards/cloze                 create Cloze card (POST)
/// /cards/type-in               create type-in card (POST)
/// /cards/validate              dry-run validation (POST)
///
/// /decks                       list (GET), create (POST)
/// /decks/{name}/stats          Anki deck statistics (GET)
/// /decks/{name}/cards          search cards with previews (GET)
/// /decks/{name}/patterns       sample formatting patterns (GET)
/// /decks/{name}/analyze        run quality analysis (POST)
///
/// /notes/{id}                  inspect a note (GET)
/// /notes/{id}/tags             add/remove tags (PUT)
///
/// /history/generations         list (GET), open session (POST)
/// /history/cards               recent or by-source cards (GET)
/// /history/validation-stats    aggregate warning stats (GET)
/// /history/analyses            past analysis runs (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/cards", cards::router())
        .nest("/decks", decks::router())
        .nest("/notes", notes::router())
        .nest("/history", history::router())
}
