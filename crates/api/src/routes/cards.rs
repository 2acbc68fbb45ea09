//! Route definitions for the `/cards` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::cards;
use crate::state::AppState;

/// Routes mounted at `/cards`.
///
/// ```text
/// POST /basic     -> create_basic
/// POST /cloze     -> create_cloze
/// POST /type-in   -> create_type_in
/// POST /validate  -> validate_card  (dry-run)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/basic", post(cards::create_basic))
        .route("/cloze", post(cards::create_cloze))
        .route("/type-in", post(cards::create_type_in))
        .route("/validate", post(cards::validate_card))
}
