//! Route definitions for the `/notes` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::notes;
use crate::state::AppState;

/// Routes mounted at `/notes`.
///
/// ```text
/// GET /{id}       -> get_note
/// PUT /{id}/tags  -> update_tags
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(notes::get_note))
        .route("/{id}/tags", put(notes::update_tags))
}
