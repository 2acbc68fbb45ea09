//! Card drafts submitted for validation and creation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Field name for the question side of basic and type-in cards.
pub const FIELD_FRONT: &str = "front";
/// Field name for the answer side of basic and type-in cards.
pub const FIELD_BACK: &str = "back";
/// Field name for the deletion-bearing text of cloze cards.
pub const FIELD_TEXT: &str = "text";
/// Field name for optional extra context on cloze cards.
pub const FIELD_EXTRA: &str = "extra";

/// Supported Anki card types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    Basic,
    Cloze,
    TypeIn,
}

impl CardKind {
    /// Stable string form used in history rows and API payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            CardKind::Basic => "basic",
            CardKind::Cloze => "cloze",
            CardKind::TypeIn => "type_in",
        }
    }

    /// Fields that must be present and non-empty before any rule runs.
    ///
    /// A missing field is caller misuse, not a quality finding.
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            CardKind::Basic | CardKind::TypeIn => &[FIELD_FRONT, FIELD_BACK],
            CardKind::Cloze => &[FIELD_TEXT],
        }
    }

    /// Anki note type name for this kind.
    pub fn model_name(&self) -> &'static str {
        match self {
            CardKind::Basic => "Basic",
            CardKind::Cloze => "Cloze",
            CardKind::TypeIn => "Basic (type in the answer)",
        }
    }
}

/// A card proposal as submitted for validation.
///
/// Constructed fresh per validation call from caller-supplied strings
/// and immutable for the duration of the call. Field values may carry
/// HTML; rules that need human-readable text go through
/// [`crate::validation::normalize::visible_text`].
#[derive(Debug, Clone, PartialEq)]
pub struct CardDraft {
    kind: CardKind,
    fields: BTreeMap<String, String>,
}

impl CardDraft {
    /// Basic front/back card. Leading and trailing whitespace is
    /// stripped from both sides.
    pub fn basic(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self::two_sided(CardKind::Basic, front.into(), back.into())
    }

    /// Type-in card (the answer must be typed exactly during review).
    pub fn type_in(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self::two_sided(CardKind::TypeIn, front.into(), back.into())
    }

    /// Cloze deletion card built from deletion-bearing text.
    pub fn cloze(text: impl Into<String>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(FIELD_TEXT.to_string(), text.into().trim().to_string());
        Self {
            kind: CardKind::Cloze,
            fields,
        }
    }

    fn two_sided(kind: CardKind, front: String, back: String) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(FIELD_FRONT.to_string(), front.trim().to_string());
        fields.insert(FIELD_BACK.to_string(), back.trim().to_string());
        Self { kind, fields }
    }

    /// Attach an additional named field (e.g. `extra` on cloze cards).
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields
            .insert(name.into(), value.into().trim().to_string());
        self
    }

    pub fn kind(&self) -> CardKind {
        self.kind
    }

    /// Raw (possibly HTML-bearing) value of a named field.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// All fields in deterministic (name-sorted) order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
