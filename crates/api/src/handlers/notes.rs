//! Handlers for the `/notes` resource.

use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use ankibridge_core::error::CoreError;
use ankibridge_core::types::NoteId;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Full detail of one note, with raw field values.
///
/// Field values keep their HTML so the caller can see how the card is
/// actually formatted.
#[derive(Debug, Serialize)]
pub struct NoteDetail {
    pub note_id: NoteId,
    pub model_name: String,
    pub tags: Vec<String>,
    pub fields: BTreeMap<String, String>,
}

/// GET /api/v1/notes/{id}
///
/// Inspect one note by its Anki id.
pub async fn get_note(
    State(state): State<AppState>,
    Path(note_id): Path<NoteId>,
) -> AppResult<Json<DataResponse<NoteDetail>>> {
    let notes = state.anki.notes_info(&[note_id]).await?;
    let note = notes.into_iter().next().ok_or(CoreError::NotFound {
        entity: "Note",
        id: note_id,
    })?;

    Ok(Json(DataResponse {
        data: NoteDetail {
            note_id: note.note_id,
            model_name: note.model_name,
            tags: note.tags,
            fields: note
                .fields
                .into_iter()
                .map(|(name, field)| (name, field.value))
                .collect(),
        },
    }))
}

/// Request body for a tag update.
#[derive(Debug, Deserialize)]
pub struct UpdateTagsRequest {
    #[serde(default)]
    pub add: Vec<String>,
    #[serde(default)]
    pub remove: Vec<String>,
}

/// Response payload after a tag update.
#[derive(Debug, Serialize)]
pub struct TagsUpdated {
    pub note_id: NoteId,
    /// The note's tags after the update, as reported by Anki.
    pub tags: Vec<String>,
}

/// PUT /api/v1/notes/{id}/tags
///
/// Add and/or remove tags on an existing note, then report the note's
/// current tag set.
pub async fn update_tags(
    State(state): State<AppState>,
    Path(note_id): Path<NoteId>,
    Json(body): Json<UpdateTagsRequest>,
) -> AppResult<Json<DataResponse<TagsUpdated>>> {
    if body.add.is_empty() && body.remove.is_empty() {
        return Err(AppError::BadRequest(
            "at least one of 'add' or 'remove' must be non-empty".to_string(),
        ));
    }

    // Anki-Connect takes tags as one space-separated string.
    if !body.add.is_empty() {
        state.anki.add_tags(&[note_id], &body.add.join(" ")).await?;
    }
    if !body.remove.is_empty() {
        state
            .anki
            .remove_tags(&[note_id], &body.remove.join(" "))
            .await?;
    }

    let notes = state.anki.notes_info(&[note_id]).await?;
    let tags = notes.into_iter().next().map(|n| n.tags).unwrap_or_default();
    tracing::info!(note_id, added = body.add.len(), removed = body.remove.len(), "Updated note tags");

    Ok(Json(DataResponse {
        data: TagsUpdated { note_id, tags },
    }))
}
