use std::sync::Arc;

use ankibridge_anki::AnkiClient;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: ankibridge_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Anki-Connect client (local Anki instance).
    pub anki: Arc<AnkiClient>,
}
