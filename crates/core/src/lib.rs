//! Domain logic for the ankibridge server.
//!
//! Everything in this crate is pure computation: the card model, the
//! quality validation engine, and the deck quality analyzer. Network
//! and persistence concerns live in the `ankibridge-anki` and
//! `ankibridge-db` crates.

pub mod analyzer;
pub mod card;
pub mod error;
pub mod types;
pub mod validation;
