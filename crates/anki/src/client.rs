//! Request plumbing for the Anki-Connect endpoint.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use ankibridge_core::types::NoteId;

use crate::note::{Note, NoteInfo};

/// HTTP client for a single Anki-Connect endpoint.
pub struct AnkiClient {
    client: reqwest::Client,
    url: String,
    version: u32,
}

/// Errors from the Anki-Connect client layer.
#[derive(Debug, thiserror::Error)]
pub enum AnkiError {
    /// The HTTP request itself failed (connection refused, DNS, ...).
    /// Usually means Anki is not running or the add-on is missing.
    #[error("Failed to reach Anki-Connect: {0}")]
    Request(#[from] reqwest::Error),

    /// Anki-Connect returned a non-2xx status code.
    #[error("Anki-Connect HTTP error ({status}): {body}")]
    Http { status: u16, body: String },

    /// The action executed but Anki reported an error in the envelope.
    #[error("Anki-Connect action failed: {0}")]
    Api(String),

    /// The result payload did not have the expected shape.
    #[error("Unexpected Anki-Connect response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Response envelope common to every Anki-Connect action.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<String>,
}

impl AnkiClient {
    /// Create a client for an Anki-Connect endpoint.
    ///
    /// * `url`     - base URL, e.g. `http://localhost:8765`.
    /// * `version` - Anki-Connect API version (currently `6`).
    pub fn new(url: String, version: u32) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
            version,
        }
    }

    /// Create a client reusing an existing [`reqwest::Client`]
    /// (connection pooling across callers).
    pub fn with_client(client: reqwest::Client, url: String, version: u32) -> Self {
        Self {
            client,
            url,
            version,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Invoke a raw Anki-Connect action.
    ///
    /// Posts `{action, version, params}` and unwraps the
    /// `{result, error}` envelope, surfacing the `error` string as
    /// [`AnkiError::Api`].
    pub async fn invoke(&self, action: &str, params: Value) -> Result<Value, AnkiError> {
        tracing::debug!(action, "Invoking Anki-Connect action");

        let body = json!({
            "action": action,
            "version": self.version,
            "params": params,
        });

        let response = self.client.post(&self.url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(AnkiError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: Envelope = response.json().await?;
        if let Some(error) = envelope.error {
            return Err(AnkiError::Api(error));
        }
        Ok(envelope.result)
    }

    /// Invoke an action and decode the result into a typed value.
    async fn invoke_as<T: DeserializeOwned>(
        &self,
        action: &str,
        params: Value,
    ) -> Result<T, AnkiError> {
        let result = self.invoke(action, params).await?;
        Ok(serde_json::from_value(result)?)
    }

    // ---- note actions ----

    /// Add a single note, returning the assigned note ID.
    pub async fn add_note(&self, note: &Note) -> Result<NoteId, AnkiError> {
        self.invoke_as("addNote", json!({ "note": note })).await
    }

    /// Find note IDs matching an Anki search query.
    pub async fn find_notes(&self, query: &str) -> Result<Vec<NoteId>, AnkiError> {
        self.invoke_as("findNotes", json!({ "query": query })).await
    }

    /// Fetch full field/tag information for the given notes.
    ///
    /// Ids Anki does not know come back as empty objects; those are
    /// dropped, so the result may be shorter than the input.
    pub async fn notes_info(&self, note_ids: &[NoteId]) -> Result<Vec<NoteInfo>, AnkiError> {
        let notes: Vec<NoteInfo> = self
            .invoke_as("notesInfo", json!({ "notes": note_ids }))
            .await?;
        Ok(notes.into_iter().filter(|n| n.note_id != 0).collect())
    }

    // ---- tag actions ----

    /// Add space-separated tags to the given notes.
    pub async fn add_tags(&self, note_ids: &[NoteId], tags: &str) -> Result<(), AnkiError> {
        self.invoke("addTags", json!({ "notes": note_ids, "tags": tags }))
            .await?;
        Ok(())
    }

    /// Remove space-separated tags from the given notes.
    pub async fn remove_tags(&self, note_ids: &[NoteId], tags: &str) -> Result<(), AnkiError> {
        self.invoke("removeTags", json!({ "notes": note_ids, "tags": tags }))
            .await?;
        Ok(())
    }

    // ---- deck actions ----

    /// All deck names mapped to their IDs.
    pub async fn deck_names_and_ids(&self) -> Result<BTreeMap<String, i64>, AnkiError> {
        self.invoke_as("deckNamesAndIds", json!({})).await
    }

    /// Create a deck (hierarchy supported via `::`), returning its ID.
    pub async fn create_deck(&self, name: &str) -> Result<i64, AnkiError> {
        self.invoke_as("createDeck", json!({ "deck": name })).await
    }

    /// Raw statistics blob for one deck (new/learning/review counts).
    pub async fn get_deck_stats(&self, deck_name: &str) -> Result<Value, AnkiError> {
        self.invoke("getDeckStats", json!({ "decks": [deck_name] }))
            .await
    }
}
