//! HTTP client for the Anki-Connect local API.
//!
//! Anki-Connect exposes a single POST endpoint taking
//! `{action, version, params}` and answering `{result, error}`.
//! [`AnkiClient`] wraps that envelope with [`reqwest`] and provides
//! typed helpers for the actions the bridge uses.

mod client;
mod note;

pub use client::{AnkiClient, AnkiError};
pub use note::{Note, NoteInfo, NoteInfoField};
