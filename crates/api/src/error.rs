use ankibridge_anki::AnkiError;
use ankibridge_core::error::CoreError;
use ankibridge_core::validation::Verdict;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `ankibridge_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The local Anki-Connect endpoint failed or is unreachable.
    #[error("Anki-Connect error: {0}")]
    Anki(#[from] AnkiError),

    /// A card the client asked to create was blocked by validation.
    #[error("Card blocked by validation")]
    CardBlocked(Verdict),

    /// A named deck does not exist in Anki. Carries a prebuilt message
    /// that may include near-miss suggestions.
    #[error("{0}")]
    DeckNotFound(String),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Blocked cards keep their findings in the body so the client can
        // show the user what to fix.
        if let AppError::CardBlocked(verdict) = &self {
            let body = json!({
                "error": "Card blocked by validation",
                "code": "CARD_BLOCKED",
                "findings": verdict.findings,
            });
            return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(body)).into_response();
        }

        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- Anki-Connect errors ---
            AppError::Anki(err) => classify_anki_error(err),

            // --- HTTP-specific errors ---
            AppError::CardBlocked(_) => unreachable!("handled above"),
            AppError::DeckNotFound(msg) => {
                (StatusCode::NOT_FOUND, "DECK_NOT_FOUND", msg.clone())
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            )
        }
    }
}

/// Classify an Anki-Connect error into an HTTP status, error code, and message.
///
/// Transport failures map to 502: the bridge is fine, the upstream Anki
/// instance is not. Anki-level API errors pass their message through so
/// the caller can see what Anki rejected.
fn classify_anki_error(err: &AnkiError) -> (StatusCode, &'static str, String) {
    match err {
        AnkiError::Request(req_err) => {
            tracing::error!(error = %req_err, "Anki-Connect request failed");
            (
                StatusCode::BAD_GATEWAY,
                "ANKI_UNREACHABLE",
                "Could not reach Anki-Connect. Is Anki running with the Anki-Connect add-on?"
                    .to_string(),
            )
        }
        AnkiError::Http { status, .. } => {
            tracing::error!(status, "Anki-Connect returned an HTTP error");
            (
                StatusCode::BAD_GATEWAY,
                "ANKI_HTTP_ERROR",
                format!("Anki-Connect returned HTTP {status}"),
            )
        }
        AnkiError::Api(msg) => (
            StatusCode::BAD_GATEWAY,
            "ANKI_API_ERROR",
            format!("Anki-Connect reported an error: {msg}"),
        ),
        AnkiError::Decode(decode_err) => {
            tracing::error!(error = %decode_err, "Failed to decode Anki-Connect response");
            (
                StatusCode::BAD_GATEWAY,
                "ANKI_DECODE_ERROR",
                "Anki-Connect returned an unexpected response".to_string(),
            )
        }
    }
}
