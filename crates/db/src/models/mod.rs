pub mod analysis;
pub mod card;
pub mod generation;
