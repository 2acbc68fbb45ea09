pub mod cards;
pub mod decks;
pub mod history;
pub mod notes;
