//! Handlers for the `/cards` resource.
//!
//! Card creation runs the validation engine before touching Anki: a
//! blocked card never reaches Anki-Connect and returns 422 with the
//! findings. Created cards are recorded in the history store with any
//! non-blocking findings attached.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use ankibridge_anki::Note;
use ankibridge_core::card::{CardDraft, CardKind, FIELD_BACK, FIELD_EXTRA, FIELD_FRONT, FIELD_TEXT};
use ankibridge_core::types::{DbId, NoteId};
use ankibridge_core::validation::{self, Finding, Outcome, Strictness, Verdict};
use ankibridge_db::models::card::CreateGeneratedCard;
use ankibridge_db::repositories::CardRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

fn default_true() -> bool {
    true
}

/// Options shared by every card creation request.
#[derive(Debug, Clone, Deserialize)]
pub struct CardOptions {
    /// Target deck; falls back to the configured default deck.
    pub deck: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Set to `false` to add the card without running the rule engine.
    #[serde(default = "default_true")]
    pub validate: bool,
    /// Per-request strictness override.
    pub strictness: Option<Strictness>,
    /// Generation session to attribute this card to.
    pub generation_id: Option<DbId>,
}

/// Request body for `POST /cards/basic` and `POST /cards/type-in`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateFrontBackCard {
    #[validate(length(min = 1, message = "front must not be empty"))]
    pub front: String,
    #[validate(length(min = 1, message = "back must not be empty"))]
    pub back: String,
    #[serde(flatten)]
    pub options: CardOptions,
}

/// Request body for `POST /cards/cloze`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateClozeCard {
    #[validate(length(min = 1, message = "text must not be empty"))]
    pub text: String,
    /// Optional back-side extra notes.
    pub extra: Option<String>,
    #[serde(flatten)]
    pub options: CardOptions,
}

/// Response payload for a created card.
#[derive(Debug, Serialize)]
pub struct CardCreated {
    pub note_id: NoteId,
    pub deck: String,
    pub verdict: Verdict,
}

/// POST /api/v1/cards/basic
///
/// Validate and create a Basic (front/back) note.
pub async fn create_basic(
    State(state): State<AppState>,
    Json(body): Json<CreateFrontBackCard>,
) -> AppResult<(StatusCode, Json<DataResponse<CardCreated>>)> {
    body.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let draft = CardDraft::basic(&body.front, &body.back);
    create_card(&state, draft, body.options).await
}

/// POST /api/v1/cards/type-in
///
/// Validate and create a type-in-the-answer note.
pub async fn create_type_in(
    State(state): State<AppState>,
    Json(body): Json<CreateFrontBackCard>,
) -> AppResult<(StatusCode, Json<DataResponse<CardCreated>>)> {
    body.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let draft = CardDraft::type_in(&body.front, &body.back);
    create_card(&state, draft, body.options).await
}

/// POST /api/v1/cards/cloze
///
/// Validate and create a Cloze note.
pub async fn create_cloze(
    State(state): State<AppState>,
    Json(body): Json<CreateClozeCard>,
) -> AppResult<(StatusCode, Json<DataResponse<CardCreated>>)> {
    body.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let mut draft = CardDraft::cloze(&body.text);
    if let Some(extra) = &body.extra {
        draft = draft.with_field(FIELD_EXTRA, extra);
    }
    create_card(&state, draft, body.options).await
}

/// Shared creation flow: validate, add via Anki-Connect, record history.
async fn create_card(
    state: &AppState,
    draft: CardDraft,
    options: CardOptions,
) -> AppResult<(StatusCode, Json<DataResponse<CardCreated>>)> {
    let config = state.config.bridge.validation_with(options.strictness);

    // Required-field preconditions surface as 400 even when the caller
    // opted out of quality validation.
    let full_verdict = validation::validate(&draft, &config)?;
    let verdict = if options.validate {
        if full_verdict.is_blocked() {
            tracing::warn!(
                errors = full_verdict.errors().count(),
                warnings = full_verdict.warnings().count(),
                card_type = draft.kind().as_str(),
                "Card blocked by validation"
            );
            return Err(AppError::CardBlocked(full_verdict));
        }
        full_verdict
    } else {
        Verdict {
            outcome: Outcome::Allowed,
            findings: Vec::new(),
        }
    };

    let deck = options
        .deck
        .unwrap_or_else(|| state.config.bridge.default_deck.clone());

    let note = Note::from_draft(&draft, deck.clone(), options.tags.clone());
    let note_id = state.anki.add_note(&note).await?;
    tracing::info!(note_id, deck = %deck, card_type = draft.kind().as_str(), "Created Anki note");

    let record = CreateGeneratedCard {
        generation_id: options.generation_id,
        anki_note_id: note_id,
        card_type: draft.kind().as_str().to_string(),
        front_or_text: front_or_text(&draft).to_string(),
        back: draft.field(FIELD_BACK).map(str::to_string),
        deck: deck.clone(),
        tags: if options.tags.is_empty() {
            None
        } else {
            Some(serde_json::json!(options.tags))
        },
        validation_warnings: {
            let advisory = advisory_findings(&verdict);
            if advisory.is_empty() {
                None
            } else {
                Some(
                    serde_json::to_value(&advisory)
                        .map_err(|e| AppError::InternalError(e.to_string()))?,
                )
            }
        },
    };
    CardRepo::create(&state.pool, &record).await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: CardCreated {
                note_id,
                deck,
                verdict,
            },
        }),
    ))
}

fn front_or_text(draft: &CardDraft) -> &str {
    let field = match draft.kind() {
        CardKind::Cloze => FIELD_TEXT,
        CardKind::Basic | CardKind::TypeIn => FIELD_FRONT,
    };
    draft.field(field).unwrap_or_default()
}

/// Findings worth recording with a card that was actually created.
///
/// An allowed verdict carries no errors, so what remains is advisory:
/// warnings first, then suggestions.
fn advisory_findings(verdict: &Verdict) -> Vec<&Finding> {
    verdict.warnings().chain(verdict.suggestions()).collect()
}

// ── Dry-run validation ───────────────────────────────────────────────

/// Request body for the dry-run validation endpoint.
#[derive(Debug, Deserialize)]
pub struct ValidateCardRequest {
    pub card_type: CardKind,
    pub front: Option<String>,
    pub back: Option<String>,
    pub text: Option<String>,
    pub extra: Option<String>,
    pub strictness: Option<Strictness>,
}

/// POST /api/v1/cards/validate
///
/// Run the rule engine against a draft without creating anything.
/// Touches neither Anki nor the database.
pub async fn validate_card(
    State(state): State<AppState>,
    Json(body): Json<ValidateCardRequest>,
) -> AppResult<Json<DataResponse<Verdict>>> {
    let mut draft = match body.card_type {
        CardKind::Basic => CardDraft::basic(
            body.front.unwrap_or_default(),
            body.back.unwrap_or_default(),
        ),
        CardKind::TypeIn => CardDraft::type_in(
            body.front.unwrap_or_default(),
            body.back.unwrap_or_default(),
        ),
        CardKind::Cloze => CardDraft::cloze(body.text.unwrap_or_default()),
    };
    if let Some(extra) = &body.extra {
        draft = draft.with_field(FIELD_EXTRA, extra);
    }

    let config = state.config.bridge.validation_with(body.strictness);
    let verdict = validation::validate(&draft, &config)?;
    Ok(Json(DataResponse { data: verdict }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ankibridge_core::validation::{RuleId, Severity};

    fn finding(rule_id: RuleId, severity: Severity) -> Finding {
        Finding {
            rule_id,
            severity,
            message: "x".to_string(),
            field: FIELD_FRONT,
        }
    }

    #[test]
    fn advisory_findings_keep_warnings_before_suggestions() {
        let verdict = Verdict {
            outcome: Outcome::AllowedWithWarnings,
            findings: vec![
                finding(RuleId::ContextFree, Severity::Suggestion),
                finding(RuleId::AnswerLength, Severity::Warning),
            ],
        };

        let advisory = advisory_findings(&verdict);
        assert_eq!(advisory.len(), 2);
        assert_eq!(advisory[0].severity, Severity::Warning);
        assert_eq!(advisory[1].severity, Severity::Suggestion);
    }

    #[test]
    fn advisory_findings_drop_errors() {
        let verdict = Verdict {
            outcome: Outcome::Blocked,
            findings: vec![
                finding(RuleId::ClozeFormat, Severity::Error),
                finding(RuleId::AnswerLength, Severity::Warning),
            ],
        };

        let advisory = advisory_findings(&verdict);
        assert_eq!(advisory.len(), 1);
        assert_eq!(advisory[0].rule_id, RuleId::AnswerLength);
    }

    #[test]
    fn clean_verdict_has_no_advisory_findings() {
        let verdict = Verdict {
            outcome: Outcome::Allowed,
            findings: Vec::new(),
        };
        assert!(advisory_findings(&verdict).is_empty());
    }
}
