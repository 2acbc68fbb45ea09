//! Payload types for Anki-Connect note actions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use ankibridge_core::card::{CardDraft, CardKind, FIELD_BACK, FIELD_EXTRA, FIELD_FRONT, FIELD_TEXT};
use ankibridge_core::types::NoteId;

/// A note as submitted to the `addNote` / `addNotes` actions.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub deck_name: String,
    pub model_name: String,
    /// Anki field names (`Front`, `Back`, `Text`, `Extra`) to values.
    pub fields: BTreeMap<String, String>,
    pub tags: Vec<String>,
}

impl Note {
    /// Build the Anki note payload for a validated draft.
    ///
    /// Maps the draft's lowercase field names onto the capitalized
    /// field names of the stock Anki note types.
    pub fn from_draft(draft: &CardDraft, deck: String, tags: Vec<String>) -> Self {
        let mut fields = BTreeMap::new();
        match draft.kind() {
            CardKind::Basic | CardKind::TypeIn => {
                fields.insert(
                    "Front".to_string(),
                    draft.field(FIELD_FRONT).unwrap_or_default().to_string(),
                );
                fields.insert(
                    "Back".to_string(),
                    draft.field(FIELD_BACK).unwrap_or_default().to_string(),
                );
            }
            CardKind::Cloze => {
                fields.insert(
                    "Text".to_string(),
                    draft.field(FIELD_TEXT).unwrap_or_default().to_string(),
                );
                if let Some(extra) = draft.field(FIELD_EXTRA) {
                    fields.insert("Extra".to_string(), extra.to_string());
                }
            }
        }
        Self {
            deck_name: deck,
            model_name: draft.kind().model_name().to_string(),
            fields,
            tags,
        }
    }
}

/// One note as returned by the `notesInfo` action.
///
/// Anki-Connect answers unknown ids with an empty object instead of
/// omitting them, so every field defaults; the client filters out the
/// placeholders (a real note id is never 0).
#[derive(Debug, Clone, Deserialize)]
pub struct NoteInfo {
    #[serde(rename = "noteId", default)]
    pub note_id: NoteId,
    #[serde(rename = "modelName", default)]
    pub model_name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, NoteInfoField>,
}

/// Field value wrapper used by `notesInfo` (`{"value": ..., "order": ...}`).
#[derive(Debug, Clone, Deserialize)]
pub struct NoteInfoField {
    pub value: String,
    #[serde(default)]
    pub order: i32,
}

impl NoteInfo {
    /// Convert an existing Anki note back into a draft for validation.
    ///
    /// Stock note types map directly; for unknown types the first two
    /// fields (by order) are treated as front/back. Returns `None`
    /// when no usable mapping exists.
    pub fn to_draft(&self) -> Option<CardDraft> {
        let value = |name: &str| self.fields.get(name).map(|f| f.value.clone());
        match self.model_name.as_str() {
            "Cloze" => {
                let mut draft = CardDraft::cloze(value("Text")?);
                if let Some(extra) = value("Extra").filter(|v| !v.trim().is_empty()) {
                    draft = draft.with_field(FIELD_EXTRA, extra);
                }
                Some(draft)
            }
            "Basic (type in the answer)" => Some(CardDraft::type_in(value("Front")?, value("Back")?)),
            "Basic" => Some(CardDraft::basic(value("Front")?, value("Back")?)),
            _ => {
                let mut ordered: Vec<&NoteInfoField> = self.fields.values().collect();
                ordered.sort_by_key(|f| f.order);
                match ordered.as_slice() {
                    [front, back, ..] => {
                        Some(CardDraft::basic(front.value.clone(), back.value.clone()))
                    }
                    _ => None,
                }
            }
        }
    }
}
