//! The canonical rule set and its wire types.
//!
//! Each rule is a pure function of `(CardDraft, ValidationConfig)`
//! returning zero or more findings. Rules share no state and may run
//! in any order; the fixed evaluation order lives in
//! [`super::evaluator::RULES`]. A rule that does not apply to the
//! card's kind returns an empty vec.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::card::{CardDraft, CardKind, FIELD_BACK, FIELD_FRONT, FIELD_TEXT};
use crate::validation::normalize::{char_count, visible_text, word_count};

/// A well-formed cloze deletion span: `{{cN::body}}` with a positive
/// integer index and non-empty body (hints ride inside the body as
/// `{{c1::answer::hint}}`).
static CLOZE_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{c([1-9][0-9]*)::([^}]+)\}\}").expect("cloze span pattern is valid")
});

/// Identifies which check produced a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    ClozeFormat,
    AnswerLength,
    MinimumInformation,
    Ambiguity,
    ClozeCount,
    ContextFree,
}

impl RuleId {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleId::ClozeFormat => "cloze_format",
            RuleId::AnswerLength => "answer_length",
            RuleId::MinimumInformation => "minimum_information",
            RuleId::Ambiguity => "ambiguity",
            RuleId::ClozeCount => "cloze_count",
            RuleId::ContextFree => "context_free",
        }
    }
}

/// Severity is intrinsic to the rule that fires; only the strictness
/// policy decides how severities map to the final outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Suggestion,
}

/// One rule's structured report of a detected quality issue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub rule_id: RuleId,
    pub severity: Severity,
    /// Self-contained human-readable explanation.
    pub message: String,
    /// The card field the finding is about.
    pub field: &'static str,
}

/// How aggressively warnings escalate to a blocking outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    Strict,
    Moderate,
    Lenient,
}

impl Strictness {
    /// Parse the lowercase env-var form.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "strict" => Some(Strictness::Strict),
            "moderate" => Some(Strictness::Moderate),
            "lenient" => Some(Strictness::Lenient),
            _ => None,
        }
    }
}

/// Explicit per-call validation policy.
///
/// Resolved once at the call boundary; the engine never reads ambient
/// state mid-validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationConfig {
    pub strictness: Strictness,
    pub max_answer_words: u32,
    pub max_cloze_deletions: u32,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            strictness: Strictness::Moderate,
            max_answer_words: 50,
            max_cloze_deletions: 3,
        }
    }
}

/// Combined visible length below which a card is considered to lack
/// standalone context.
const CONTEXT_MIN_CHARS: usize = 25;

/// Visible front text shorter than this is flagged as likely incomplete.
const SHORT_QUESTION_CHARS: usize = 10;

/// Leading markers that explicitly supply topic context.
const TOPIC_MARKERS: &[&str] = &["category:", "topic:", "context:"];

/// Phrases that admit many valid answers wherever they appear.
const VAGUE_PHRASES: &[&str] = &[
    "what about",
    "tell me about",
    "explain everything",
    "what do you know",
];

/// Question openers that are vague unless followed by a qualifying
/// object of more than [`VAGUE_OPENER_MAX_OBJECT_WORDS`] words.
const VAGUE_OPENERS: &[&str] = &["what is", "describe"];
const VAGUE_OPENER_MAX_OBJECT_WORDS: usize = 2;

/// Distinct indices of all well-formed cloze spans in `text`.
pub fn cloze_indices(text: &str) -> BTreeSet<u32> {
    CLOZE_SPAN
        .captures_iter(text)
        .filter_map(|caps| caps[1].parse().ok())
        .collect()
}

fn finding(rule_id: RuleId, severity: Severity, field: &'static str, message: String) -> Finding {
    Finding {
        rule_id,
        severity,
        message,
        field,
    }
}

/// `cloze_format`: a cloze card without a single well-formed deletion
/// span is unusable in Anki.
pub fn cloze_format(draft: &CardDraft, _config: &ValidationConfig) -> Vec<Finding> {
    if draft.kind() != CardKind::Cloze {
        return Vec::new();
    }
    let text = draft.field(FIELD_TEXT).unwrap_or_default();
    if cloze_indices(text).is_empty() {
        vec![finding(
            RuleId::ClozeFormat,
            Severity::Error,
            FIELD_TEXT,
            "Cloze card must contain at least one well-formed deletion in {{c1::text}} format."
                .to_string(),
        )]
    } else {
        Vec::new()
    }
}

/// `answer_length`: long answers violate the minimum information
/// principle and are harder to recall atomically.
pub fn answer_length(draft: &CardDraft, config: &ValidationConfig) -> Vec<Finding> {
    if !matches!(draft.kind(), CardKind::Basic | CardKind::TypeIn) {
        return Vec::new();
    }
    let back = draft.field(FIELD_BACK).unwrap_or_default();
    let words = word_count(back);
    if words > config.max_answer_words as usize {
        vec![finding(
            RuleId::AnswerLength,
            Severity::Warning,
            FIELD_BACK,
            format!(
                "Answer has {words} words (max recommended: {}). Consider splitting into \
                 multiple cards following the minimum information principle.",
                config.max_answer_words
            ),
        )]
    } else {
        Vec::new()
    }
}

/// `minimum_information`: an answer joining independent clauses or
/// enumerating several items is testing more than one fact.
pub fn minimum_information(draft: &CardDraft, _config: &ValidationConfig) -> Vec<Finding> {
    if !matches!(draft.kind(), CardKind::Basic | CardKind::TypeIn) {
        return Vec::new();
    }
    let back = draft.field(FIELD_BACK).unwrap_or_default();
    let visible = visible_text(back).to_lowercase();

    let clause_conjunction = visible.contains(", and ") || visible.contains("; and ");
    let semicolons = visible.matches(';').count();
    let commas = visible.matches(',').count();

    if clause_conjunction || semicolons >= 2 || commas >= 3 {
        vec![finding(
            RuleId::MinimumInformation,
            Severity::Warning,
            FIELD_BACK,
            "Answer appears to combine multiple facts or list items. One concept per card \
             improves retention; consider splitting it."
                .to_string(),
        )]
    } else {
        Vec::new()
    }
}

/// `ambiguity`: vague prompts admit many valid answers, defeating
/// exact recall scoring. At most one finding is produced.
pub fn ambiguity(draft: &CardDraft, _config: &ValidationConfig) -> Vec<Finding> {
    if !matches!(draft.kind(), CardKind::Basic | CardKind::TypeIn) {
        return Vec::new();
    }
    let front = draft.field(FIELD_FRONT).unwrap_or_default();
    let visible = visible_text(front);
    let lower = visible.to_lowercase();

    if let Some(phrase) = VAGUE_PHRASES.iter().find(|p| lower.contains(*p)) {
        return vec![finding(
            RuleId::Ambiguity,
            Severity::Suggestion,
            FIELD_FRONT,
            format!(
                "Question contains '{phrase}', which may be too vague. Be more specific \
                 (e.g. 'What is the function of...' instead of 'What about...')."
            ),
        )];
    }

    for opener in VAGUE_OPENERS {
        if let Some(rest) = lower.strip_prefix(opener) {
            let object_words = rest
                .split_whitespace()
                .filter(|w| w.chars().any(char::is_alphanumeric))
                .count();
            if object_words <= VAGUE_OPENER_MAX_OBJECT_WORDS {
                return vec![finding(
                    RuleId::Ambiguity,
                    Severity::Suggestion,
                    FIELD_FRONT,
                    format!(
                        "Question opens with '{opener}' but names almost nothing to qualify \
                         it. Name the specific object or property being asked about."
                    ),
                )];
            }
        }
    }

    if visible.chars().count() < SHORT_QUESTION_CHARS {
        return vec![finding(
            RuleId::Ambiguity,
            Severity::Suggestion,
            FIELD_FRONT,
            "Question is very short. Ensure it provides enough context for standalone \
             understanding."
                .to_string(),
        )];
    }

    Vec::new()
}

/// `cloze_count`: too many deletions per card reduce focus and recall
/// specificity. Counts distinct `cN` indices, not occurrences.
pub fn cloze_count(draft: &CardDraft, config: &ValidationConfig) -> Vec<Finding> {
    if draft.kind() != CardKind::Cloze {
        return Vec::new();
    }
    let text = draft.field(FIELD_TEXT).unwrap_or_default();
    let distinct = cloze_indices(text).len();
    if distinct > config.max_cloze_deletions as usize {
        vec![finding(
            RuleId::ClozeCount,
            Severity::Warning,
            FIELD_TEXT,
            format!(
                "Card has {distinct} distinct cloze deletions (max recommended: {}). Too many \
                 deletions make cards difficult and violate the minimum information principle.",
                config.max_cloze_deletions
            ),
        )]
    } else {
        Vec::new()
    }
}

/// `context_free`: a card must be understandable without external
/// material -- either a topic marker or enough visible text.
pub fn context_free(draft: &CardDraft, _config: &ValidationConfig) -> Vec<Finding> {
    let mut total_chars = 0;
    for (_, value) in draft.fields() {
        let visible = visible_text(value);
        let lower = visible.to_lowercase();
        if TOPIC_MARKERS.iter().any(|m| lower.starts_with(m)) {
            return Vec::new();
        }
        total_chars += char_count(value);
    }

    if total_chars < CONTEXT_MIN_CHARS {
        let field = match draft.kind() {
            CardKind::Cloze => FIELD_TEXT,
            CardKind::Basic | CardKind::TypeIn => FIELD_FRONT,
        };
        vec![finding(
            RuleId::ContextFree,
            Severity::Suggestion,
            field,
            "Card carries very little context. Add details (or a leading 'Category:' marker) \
             so it can be understood without external material."
                .to_string(),
        )]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ValidationConfig {
        ValidationConfig::default()
    }

    // -- cloze_format --

    #[test]
    fn cloze_format_passes_well_formed_span() {
        let draft = CardDraft::cloze("The {{c1::mitochondria}} is the powerhouse");
        assert!(cloze_format(&draft, &config()).is_empty());
    }

    #[test]
    fn cloze_format_fires_on_malformed_braces() {
        let draft = CardDraft::cloze("The cell has {c1:mitochondria}");
        let findings = cloze_format(&draft, &config());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule_id, RuleId::ClozeFormat);
        assert_eq!(findings[0].severity, Severity::Error);
    }

    #[test]
    fn cloze_format_rejects_zero_index_and_empty_body() {
        assert!(cloze_indices("{{c0::body}}").is_empty());
        assert!(cloze_indices("{{c1::}}").is_empty());
    }

    #[test]
    fn cloze_format_accepts_hint_syntax() {
        assert_eq!(cloze_indices("{{c1::answer::hint}}").len(), 1);
    }

    #[test]
    fn cloze_format_not_applicable_to_basic() {
        let draft = CardDraft::basic("front", "back");
        assert!(cloze_format(&draft, &config()).is_empty());
    }

    #[test]
    fn two_spans_yield_no_format_finding_and_two_indices() {
        let text = "{{c1::x}}{{c2::y}}";
        let draft = CardDraft::cloze(text);
        assert!(cloze_format(&draft, &config()).is_empty());
        assert_eq!(cloze_indices(text).len(), 2);
    }

    // -- answer_length --

    #[test]
    fn answer_length_fires_over_threshold() {
        let long_back = "word ".repeat(60);
        let draft = CardDraft::basic("What is the capital of France?", &long_back);
        let findings = answer_length(&draft, &config());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Warning);
        assert_eq!(findings[0].field, FIELD_BACK);
    }

    #[test]
    fn answer_length_counts_visible_words_only() {
        // 3 visible words wrapped in heavy markup.
        let draft = CardDraft::basic("q?", "<b>one</b> <i>two</i> <u>three</u>");
        let cfg = ValidationConfig {
            max_answer_words: 2,
            ..config()
        };
        assert_eq!(answer_length(&draft, &cfg).len(), 1);
        let cfg = ValidationConfig {
            max_answer_words: 3,
            ..config()
        };
        assert!(answer_length(&draft, &cfg).is_empty());
    }

    #[test]
    fn answer_length_not_applicable_to_cloze() {
        let draft = CardDraft::cloze("{{c1::x}}".repeat(99));
        assert!(answer_length(&draft, &config()).is_empty());
    }

    // -- minimum_information --

    #[test]
    fn minimum_information_fires_on_clause_conjunction() {
        let draft = CardDraft::basic(
            "What does the liver do?",
            "It filters blood, and it produces bile",
        );
        let findings = minimum_information(&draft, &config());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule_id, RuleId::MinimumInformation);
    }

    #[test]
    fn minimum_information_fires_on_multiple_separators() {
        let draft = CardDraft::basic("q?", "alpha; beta; gamma");
        assert_eq!(minimum_information(&draft, &config()).len(), 1);

        let draft = CardDraft::basic("q?", "one, two, three, four");
        assert_eq!(minimum_information(&draft, &config()).len(), 1);
    }

    #[test]
    fn minimum_information_allows_plain_answer() {
        let draft = CardDraft::basic("What is the capital of France?", "Paris");
        assert!(minimum_information(&draft, &config()).is_empty());
    }

    #[test]
    fn minimum_information_allows_single_comma() {
        let draft = CardDraft::basic("q?", "A city in France, founded by the Parisii");
        assert!(minimum_information(&draft, &config()).is_empty());
    }

    // -- ambiguity --

    #[test]
    fn ambiguity_fires_on_vague_phrase() {
        let draft = CardDraft::basic("Tell me about the French Revolution", "Much");
        let findings = ambiguity(&draft, &config());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Suggestion);
    }

    #[test]
    fn ambiguity_fires_on_unqualified_opener() {
        let draft = CardDraft::basic("<b>What</b> is X?", "X is defined as Y");
        assert_eq!(ambiguity(&draft, &config()).len(), 1);
    }

    #[test]
    fn ambiguity_allows_qualified_opener() {
        let draft = CardDraft::basic("What is the capital of France?", "Paris");
        assert!(ambiguity(&draft, &config()).is_empty());
    }

    #[test]
    fn ambiguity_fires_on_very_short_front() {
        let draft = CardDraft::basic("France?", "Paris");
        assert_eq!(ambiguity(&draft, &config()).len(), 1);
    }

    #[test]
    fn ambiguity_produces_at_most_one_finding() {
        // Contains a vague phrase AND is short.
        let draft = CardDraft::basic("What about", "x");
        assert_eq!(ambiguity(&draft, &config()).len(), 1);
    }

    // -- cloze_count --

    #[test]
    fn cloze_count_fires_above_threshold() {
        let draft = CardDraft::cloze("{{c1::A}} {{c2::B}} {{c3::C}} {{c4::D}}");
        let findings = cloze_count(&draft, &config());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule_id, RuleId::ClozeCount);
        assert_eq!(findings[0].severity, Severity::Warning);
    }

    #[test]
    fn cloze_count_counts_distinct_indices() {
        // Four spans but only two distinct indices.
        let draft = CardDraft::cloze("{{c1::A}} {{c1::B}} {{c2::C}} {{c2::D}}");
        assert!(cloze_count(&draft, &config()).is_empty());
    }

    #[test]
    fn cloze_count_respects_configured_maximum() {
        let draft = CardDraft::cloze("{{c1::A}} {{c2::B}}");
        let cfg = ValidationConfig {
            max_cloze_deletions: 1,
            ..config()
        };
        assert_eq!(cloze_count(&draft, &cfg).len(), 1);
    }

    // -- context_free --

    #[test]
    fn context_free_fires_on_short_unmarked_card() {
        let draft = CardDraft::basic("France", "Paris");
        let findings = context_free(&draft, &config());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule_id, RuleId::ContextFree);
    }

    #[test]
    fn context_free_suppressed_by_topic_marker() {
        let draft = CardDraft::basic("Category: Geography", "Paris");
        assert!(context_free(&draft, &config()).is_empty());
    }

    #[test]
    fn context_free_suppressed_by_enough_text() {
        let draft = CardDraft::basic("What is the capital of France?", "Paris");
        assert!(context_free(&draft, &config()).is_empty());
    }

    #[test]
    fn context_free_applies_to_cloze() {
        let draft = CardDraft::cloze("{{c1::Paris}}");
        assert_eq!(context_free(&draft, &config()).len(), 1);
    }
}
