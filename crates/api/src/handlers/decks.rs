//! Handlers for the `/decks` resource.
//!
//! Deck listing, creation, and statistics are thin proxies over
//! Anki-Connect. Deck analysis pulls every note in a deck, converts it
//! to a draft, and runs the validation engine over the lot. Card search
//! and pattern previews fetch notes the same way but render them for
//! inspection instead of validating them.

use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use ankibridge_anki::{NoteInfo, NoteInfoField};
use ankibridge_core::analyzer::{self, QualityReport};
use ankibridge_core::types::{DbId, NoteId};
use ankibridge_core::validation::Strictness;
use ankibridge_db::models::analysis::CreateDeckAnalysis;
use ankibridge_db::repositories::AnalysisRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/decks
///
/// List all deck names with their Anki ids.
pub async fn list_decks(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<BTreeMap<String, i64>>>> {
    let decks = state.anki.deck_names_and_ids().await?;
    Ok(Json(DataResponse { data: decks }))
}

/// Request body for deck creation.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateDeckRequest {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
}

/// Response payload for a created deck.
#[derive(Debug, Serialize)]
pub struct DeckCreated {
    pub name: String,
    pub deck_id: i64,
}

/// POST /api/v1/decks
///
/// Create a deck (no-op in Anki if it already exists).
pub async fn create_deck(
    State(state): State<AppState>,
    Json(body): Json<CreateDeckRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<DeckCreated>>)> {
    body.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let deck_id = state.anki.create_deck(&body.name).await?;
    tracing::info!(deck = %body.name, deck_id, "Created deck");
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: DeckCreated {
                name: body.name,
                deck_id,
            },
        }),
    ))
}

/// GET /api/v1/decks/{name}/stats
///
/// Raw Anki deck statistics, passed through unmodified.
pub async fn deck_stats(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<Json<DataResponse<serde_json::Value>>> {
    let stats = state.anki.get_deck_stats(&name).await?;
    Ok(Json(DataResponse { data: stats }))
}

/// Query parameters for deck analysis.
#[derive(Debug, Deserialize)]
pub struct AnalyzeParams {
    /// Strictness override for this analysis run.
    pub strictness: Option<Strictness>,
}

/// Response payload for a completed analysis run.
#[derive(Debug, Serialize)]
pub struct AnalysisResult {
    pub analysis_id: DbId,
    pub deck: String,
    pub report: QualityReport,
}

/// POST /api/v1/decks/{name}/analyze
///
/// Fetch every note in the deck via Anki-Connect, run the validation
/// engine over each, and persist the aggregated quality report.
pub async fn analyze_deck(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<AnalyzeParams>,
) -> AppResult<Json<DataResponse<AnalysisResult>>> {
    let note_ids = state
        .anki
        .find_notes(&format!("deck:\"{name}\""))
        .await?;
    let notes = state.anki.notes_info(&note_ids).await?;

    // Notes with unrecognized field layouts are skipped, not fatal.
    let cards: Vec<_> = notes
        .iter()
        .filter_map(|note| note.to_draft().map(|draft| (note.note_id, draft)))
        .collect();
    tracing::info!(
        deck = %name,
        notes = notes.len(),
        convertible = cards.len(),
        "Analyzing deck"
    );

    let config = state.config.bridge.validation_with(params.strictness);
    let report = analyzer::analyze_cards(&cards, &config);

    let metadata = serde_json::to_value(&report)
        .map_err(|e| AppError::InternalError(e.to_string()))?;
    let row = AnalysisRepo::create(
        &state.pool,
        &CreateDeckAnalysis {
            deck_name: name.clone(),
            analysis_type: "quality".to_string(),
            overall_score: Some(report.score),
            total_cards: report.total_cards as i32,
            metadata: Some(metadata),
        },
    )
    .await?;

    Ok(Json(DataResponse {
        data: AnalysisResult {
            analysis_id: row.id,
            deck: name,
            report,
        },
    }))
}

/// Largest number of cards a single search may return.
const MAX_CARD_LIMIT: usize = 100;
const DEFAULT_CARD_LIMIT: usize = 20;

/// Largest sample a pattern analysis may request.
const MAX_SAMPLE_SIZE: usize = 25;
const DEFAULT_SAMPLE_SIZE: usize = 10;

/// Markers that count a note as HTML-formatted for pattern analysis.
const HTML_MARKERS: &[&str] = &["<b>", "<i>", "<br>", "<sub>", "<sup>", "<ul>", "<ol>"];

/// Query parameters for a deck card search.
#[derive(Debug, Deserialize)]
pub struct DeckCardsParams {
    /// Raw Anki search syntax appended to the deck filter (e.g. `is:new`).
    pub query: Option<String>,
    /// Comma-separated tag filters.
    pub tags: Option<String>,
    pub limit: Option<usize>,
}

/// One note rendered for listing, with truncated field previews.
#[derive(Debug, Serialize)]
pub struct CardSummary {
    pub note_id: NoteId,
    pub model_name: String,
    pub tags: Vec<String>,
    pub preview: Vec<FieldPreview>,
}

#[derive(Debug, Serialize)]
pub struct FieldPreview {
    pub field: String,
    pub value: String,
}

/// Response payload for a deck card search.
#[derive(Debug, Serialize)]
pub struct DeckCards {
    pub deck: String,
    /// Matches before the limit was applied.
    pub total_found: usize,
    pub cards: Vec<CardSummary>,
}

/// GET /api/v1/decks/{name}/cards
///
/// Search the notes of a deck, optionally narrowed by tags or raw Anki
/// search syntax, and return truncated previews.
pub async fn deck_cards(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<DeckCardsParams>,
) -> AppResult<Json<DataResponse<DeckCards>>> {
    let limit = params.limit.unwrap_or(DEFAULT_CARD_LIMIT);
    if limit == 0 || limit > MAX_CARD_LIMIT {
        return Err(AppError::BadRequest(format!(
            "limit must be between 1 and {MAX_CARD_LIMIT}"
        )));
    }

    let decks = state.anki.deck_names_and_ids().await?;
    if !decks.contains_key(&name) {
        return Err(deck_not_found(&name, &decks));
    }

    let tags = parse_tag_filter(params.tags.as_deref());
    let query = compose_search_query(&name, &tags, params.query.as_deref());
    let mut note_ids = state.anki.find_notes(&query).await?;
    let total_found = note_ids.len();
    note_ids.truncate(limit);

    let notes = state.anki.notes_info(&note_ids).await?;
    let cards: Vec<CardSummary> = notes.iter().map(summarize_note).collect();
    tracing::debug!(deck = %name, total_found, returned = cards.len(), "Searched deck cards");

    Ok(Json(DataResponse {
        data: DeckCards {
            deck: name,
            total_found,
            cards,
        },
    }))
}

/// Query parameters for deck pattern analysis.
#[derive(Debug, Deserialize)]
pub struct DeckPatternsParams {
    pub sample_size: Option<usize>,
}

/// Aggregated formatting and tagging patterns over a note sample.
#[derive(Debug, Serialize)]
pub struct PatternSummary {
    /// Note model name to number of sampled notes using it.
    pub model_distribution: BTreeMap<String, usize>,
    /// Most frequent tags in the sample, descending.
    pub top_tags: Vec<TagCount>,
    /// Sampled notes using any HTML formatting marker.
    pub html_notes: usize,
    /// Mean visible field length in characters, over plain-text notes.
    pub avg_field_chars: usize,
}

#[derive(Debug, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

/// Response payload for deck pattern analysis.
#[derive(Debug, Serialize)]
pub struct DeckPatterns {
    pub deck: String,
    pub total_notes: usize,
    pub sampled: usize,
    pub patterns: PatternSummary,
    pub samples: Vec<CardSummary>,
}

/// GET /api/v1/decks/{name}/patterns
///
/// Sample a deck and summarize how its existing cards are built, so new
/// cards can match the deck's style.
pub async fn deck_patterns(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<DeckPatternsParams>,
) -> AppResult<Json<DataResponse<DeckPatterns>>> {
    let sample_size = params.sample_size.unwrap_or(DEFAULT_SAMPLE_SIZE);
    if sample_size == 0 || sample_size > MAX_SAMPLE_SIZE {
        return Err(AppError::BadRequest(format!(
            "sample_size must be between 1 and {MAX_SAMPLE_SIZE}"
        )));
    }

    let decks = state.anki.deck_names_and_ids().await?;
    if !decks.contains_key(&name) {
        return Err(deck_not_found(&name, &decks));
    }

    let mut note_ids = state
        .anki
        .find_notes(&format!("deck:\"{name}\""))
        .await?;
    let total_notes = note_ids.len();
    note_ids.truncate(sample_size);

    let notes = state.anki.notes_info(&note_ids).await?;
    let patterns = pattern_summary(&notes);
    let samples: Vec<CardSummary> = notes.iter().map(summarize_note).collect();
    tracing::debug!(deck = %name, total_notes, sampled = samples.len(), "Analyzed deck patterns");

    Ok(Json(DataResponse {
        data: DeckPatterns {
            deck: name,
            total_notes,
            sampled: samples.len(),
            patterns,
            samples,
        },
    }))
}

/// Build the 404 for a deck Anki does not know, suggesting up to five
/// decks whose names contain the requested one (case-insensitive).
fn deck_not_found(name: &str, decks: &BTreeMap<String, i64>) -> AppError {
    let needle = name.to_lowercase();
    let suggestions: Vec<&str> = decks
        .keys()
        .filter(|d| d.to_lowercase().contains(&needle))
        .map(String::as_str)
        .take(5)
        .collect();

    let mut msg = format!("Deck '{name}' not found.");
    if !suggestions.is_empty() {
        msg.push_str(" Did you mean: ");
        msg.push_str(&suggestions.join(", "));
        msg.push('?');
    }
    AppError::DeckNotFound(msg)
}

fn parse_tag_filter(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Compose an Anki search string from a deck filter, tag filters, and an
/// optional raw query.
fn compose_search_query(deck: &str, tags: &[String], raw: Option<&str>) -> String {
    let mut parts = vec![format!("deck:\"{deck}\"")];
    for tag in tags {
        parts.push(format!("tag:\"{tag}\""));
    }
    if let Some(raw) = raw.map(str::trim).filter(|q| !q.is_empty()) {
        parts.push(raw.to_string());
    }
    parts.join(" ")
}

/// Truncate a field value to `max` characters, appending an ellipsis.
///
/// Counts characters rather than bytes so multibyte values never split
/// mid-codepoint.
fn truncate_preview(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    let mut out: String = value.chars().take(max).collect();
    out.push_str("...");
    out
}

/// Render a note as a listing entry.
///
/// Stock models preview their canonical fields (question and answer at
/// 80 characters, cloze text at 100); other models preview their first
/// field by order.
fn summarize_note(note: &NoteInfo) -> CardSummary {
    let field = |name: &str| note.fields.get(name).map(|f| f.value.as_str()).unwrap_or_default();
    let preview = match note.model_name.as_str() {
        "Basic" | "Basic (type in the answer)" => vec![
            FieldPreview {
                field: "Front".to_string(),
                value: truncate_preview(field("Front"), 80),
            },
            FieldPreview {
                field: "Back".to_string(),
                value: truncate_preview(field("Back"), 80),
            },
        ],
        "Cloze" => vec![FieldPreview {
            field: "Text".to_string(),
            value: truncate_preview(field("Text"), 100),
        }],
        _ => {
            let mut ordered: Vec<(&String, &NoteInfoField)> = note.fields.iter().collect();
            ordered.sort_by_key(|(_, f)| f.order);
            ordered
                .first()
                .map(|(name, f)| FieldPreview {
                    field: name.to_string(),
                    value: truncate_preview(&f.value, 100),
                })
                .into_iter()
                .collect()
        }
    };

    CardSummary {
        note_id: note.note_id,
        model_name: note.model_name.clone(),
        tags: note.tags.clone(),
        preview,
    }
}

/// Aggregate model, tag, and formatting patterns over a note sample.
fn pattern_summary(notes: &[NoteInfo]) -> PatternSummary {
    let mut model_distribution: BTreeMap<String, usize> = BTreeMap::new();
    let mut tag_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut html_notes = 0;
    let mut field_chars = 0usize;
    let mut field_count = 0usize;

    for note in notes {
        *model_distribution.entry(note.model_name.clone()).or_default() += 1;
        for tag in &note.tags {
            *tag_counts.entry(tag.clone()).or_default() += 1;
        }

        let uses_html = note.fields.values().any(|f| {
            HTML_MARKERS.iter().any(|marker| f.value.contains(marker))
        });
        if uses_html {
            html_notes += 1;
        } else {
            for f in note.fields.values() {
                field_chars += f.value.chars().count();
                field_count += 1;
            }
        }
    }

    let mut top_tags: Vec<TagCount> = tag_counts
        .into_iter()
        .map(|(tag, count)| TagCount { tag, count })
        .collect();
    top_tags.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
    top_tags.truncate(5);

    let avg_field_chars = if field_count == 0 {
        0
    } else {
        field_chars / field_count
    };

    PatternSummary {
        model_distribution,
        top_tags,
        html_notes,
        avg_field_chars,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(id: NoteId, model: &str, tags: &[&str], fields: &[(&str, &str, i32)]) -> NoteInfo {
        NoteInfo {
            note_id: id,
            model_name: model.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            fields: fields
                .iter()
                .map(|(name, value, order)| {
                    (
                        name.to_string(),
                        NoteInfoField {
                            value: value.to_string(),
                            order: *order,
                        },
                    )
                })
                .collect(),
        }
    }

    #[test]
    fn truncate_preview_keeps_short_values_intact() {
        assert_eq!(truncate_preview("short", 80), "short");
    }

    #[test]
    fn truncate_preview_counts_characters_not_bytes() {
        let long: String = "é".repeat(90);
        let cut = truncate_preview(&long, 80);
        assert_eq!(cut.chars().count(), 83);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn search_query_combines_deck_tags_and_raw_query() {
        let tags = vec!["organic".to_string(), "reactions".to_string()];
        assert_eq!(
            compose_search_query("Chemistry", &tags, Some("is:new")),
            "deck:\"Chemistry\" tag:\"organic\" tag:\"reactions\" is:new"
        );
        assert_eq!(
            compose_search_query("Chemistry", &[], None),
            "deck:\"Chemistry\""
        );
    }

    #[test]
    fn tag_filter_splits_on_commas_and_drops_blanks() {
        assert_eq!(
            parse_tag_filter(Some("organic, reactions, ,")),
            vec!["organic".to_string(), "reactions".to_string()]
        );
        assert!(parse_tag_filter(None).is_empty());
    }

    #[test]
    fn basic_note_previews_front_and_back() {
        let summary = summarize_note(&note(
            1,
            "Basic",
            &["bio"],
            &[("Front", "Q?", 0), ("Back", "A", 1)],
        ));
        assert_eq!(summary.preview.len(), 2);
        assert_eq!(summary.preview[0].field, "Front");
        assert_eq!(summary.preview[0].value, "Q?");
        assert_eq!(summary.preview[1].value, "A");
    }

    #[test]
    fn unknown_model_previews_first_field_by_order() {
        let summary = summarize_note(&note(
            1,
            "Custom Vocab",
            &[],
            &[("Meaning", "cat", 1), ("Word", "chat", 0)],
        ));
        assert_eq!(summary.preview.len(), 1);
        assert_eq!(summary.preview[0].field, "Word");
        assert_eq!(summary.preview[0].value, "chat");
    }

    #[test]
    fn pattern_summary_counts_models_tags_and_html() {
        let notes = vec![
            note(1, "Basic", &["bio", "cells"], &[("Front", "Q?", 0), ("Back", "A", 1)]),
            note(2, "Basic", &["bio"], &[("Front", "<b>Bold</b>", 0), ("Back", "A", 1)]),
            note(3, "Cloze", &["bio"], &[("Text", "{{c1::x}} is y", 0)]),
        ];
        let summary = pattern_summary(&notes);

        assert_eq!(summary.model_distribution.get("Basic"), Some(&2));
        assert_eq!(summary.model_distribution.get("Cloze"), Some(&1));
        assert_eq!(summary.html_notes, 1);
        assert_eq!(summary.top_tags[0].tag, "bio");
        assert_eq!(summary.top_tags[0].count, 3);
        // note 2 uses HTML, so only notes 1 and 3 feed the average:
        // "Q?" + "A" + "{{c1::x}} is y" over three fields.
        assert_eq!(summary.avg_field_chars, (2 + 1 + 14) / 3);
    }

    #[test]
    fn missing_deck_error_suggests_similar_names() {
        let decks: BTreeMap<String, i64> = [
            ("Biology::Cells".to_string(), 1),
            ("Biology::Genetics".to_string(), 2),
            ("Chemistry".to_string(), 3),
        ]
        .into_iter()
        .collect();

        let err = deck_not_found("biology", &decks);
        match err {
            AppError::DeckNotFound(msg) => {
                assert!(msg.contains("Biology::Cells"));
                assert!(msg.contains("Biology::Genetics"));
                assert!(!msg.contains("Chemistry"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_deck_error_without_matches_has_no_suggestions() {
        let decks: BTreeMap<String, i64> = [("Chemistry".to_string(), 1)].into_iter().collect();
        match deck_not_found("History", &decks) {
            AppError::DeckNotFound(msg) => assert!(!msg.contains("Did you mean")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
