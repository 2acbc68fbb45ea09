//! Card quality validation engine.
//!
//! A deterministic three-stage pipeline: [`normalize`] produces the
//! visible-text view of HTML-bearing fields, [`rules`] holds an ordered
//! set of independent pure checks, and [`evaluator`] runs the rules and
//! folds their findings into a single [`evaluator::Verdict`].
//!
//! Quality problems are always data (findings), never control-flow
//! failures; only structural misuse of the API (a missing required
//! field) is a hard error.

pub mod evaluator;
pub mod normalize;
pub mod rules;

pub use evaluator::{aggregate, validate, Outcome, Verdict};
pub use rules::{Finding, RuleId, Severity, Strictness, ValidationConfig};
