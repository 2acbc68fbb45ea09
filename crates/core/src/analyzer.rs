//! Deck-level quality analysis.
//!
//! Runs the validation engine over existing cards and folds the
//! findings into a single scored report. Pure computation -- fetching
//! the cards from Anki is the caller's job.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::card::CardDraft;
use crate::types::NoteId;
use crate::validation::{validate, Severity, ValidationConfig};

/// Scored quality report for one deck.
#[derive(Debug, Clone, Serialize)]
pub struct QualityReport {
    /// 0-100, higher is better. An empty deck scores 100.
    pub score: f64,
    /// Cards actually analyzed (unconvertible notes are skipped).
    pub total_cards: usize,
    pub errors: usize,
    pub warnings: usize,
    pub suggestions: usize,
    /// Most frequent rules, up to five, most common first.
    pub top_issues: Vec<IssueCount>,
    /// Notes with at least one error or warning finding.
    pub problematic_note_ids: Vec<NoteId>,
}

/// Frequency of a single rule across the analyzed deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueCount {
    pub rule: &'static str,
    pub count: usize,
}

/// Validate every card and aggregate a deck report.
///
/// Cards whose required fields are missing (notes with unexpected
/// field layouts) are skipped rather than failing the whole analysis.
pub fn analyze_cards(cards: &[(NoteId, CardDraft)], config: &ValidationConfig) -> QualityReport {
    let mut errors = 0;
    let mut warnings = 0;
    let mut suggestions = 0;
    let mut by_rule: BTreeMap<&'static str, usize> = BTreeMap::new();
    let mut problematic_note_ids = Vec::new();
    let mut total_cards = 0;

    for (note_id, draft) in cards {
        let Ok(verdict) = validate(draft, config) else {
            continue;
        };
        total_cards += 1;

        let mut is_problematic = false;
        for finding in &verdict.findings {
            match finding.severity {
                Severity::Error => {
                    errors += 1;
                    is_problematic = true;
                }
                Severity::Warning => {
                    warnings += 1;
                    is_problematic = true;
                }
                Severity::Suggestion => suggestions += 1,
            }
            *by_rule.entry(finding.rule_id.as_str()).or_insert(0) += 1;
        }
        if is_problematic {
            problematic_note_ids.push(*note_id);
        }
    }

    let mut top_issues: Vec<IssueCount> = by_rule
        .into_iter()
        .map(|(rule, count)| IssueCount { rule, count })
        .collect();
    // Descending by count; BTreeMap iteration keeps ties in rule-name
    // order so the report is deterministic.
    top_issues.sort_by(|a, b| b.count.cmp(&a.count));
    top_issues.truncate(5);

    QualityReport {
        score: quality_score(errors, warnings, suggestions),
        total_cards,
        errors,
        warnings,
        suggestions,
        top_issues,
        problematic_note_ids,
    }
}

/// Base score 100 minus capped per-severity penalties.
fn quality_score(errors: usize, warnings: usize, suggestions: usize) -> f64 {
    let mut score = 100.0;
    score -= (errors as f64 * 10.0).min(50.0);
    score -= (warnings as f64 * 3.0).min(30.0);
    score -= (suggestions as f64).min(15.0);
    (score.clamp(0.0, 100.0) * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Strictness;

    fn config() -> ValidationConfig {
        ValidationConfig {
            strictness: Strictness::Moderate,
            ..ValidationConfig::default()
        }
    }

    #[test]
    fn empty_deck_scores_full_marks() {
        let report = analyze_cards(&[], &config());
        assert_eq!(report.score, 100.0);
        assert_eq!(report.total_cards, 0);
        assert!(report.top_issues.is_empty());
    }

    #[test]
    fn clean_cards_score_full_marks() {
        let cards = vec![
            (1, CardDraft::basic("What is the capital of France?", "Paris")),
            (2, CardDraft::basic("What is the capital of Spain?", "Madrid")),
        ];
        let report = analyze_cards(&cards, &config());
        assert_eq!(report.score, 100.0);
        assert_eq!(report.total_cards, 2);
        assert!(report.problematic_note_ids.is_empty());
    }

    #[test]
    fn errors_and_warnings_mark_cards_problematic() {
        let cards = vec![
            (10, CardDraft::cloze("this cloze deletion span is {c1:broken} badly")),
            (11, CardDraft::basic("What is the capital of France?", "Paris")),
        ];
        let report = analyze_cards(&cards, &config());
        assert_eq!(report.errors, 1);
        assert_eq!(report.problematic_note_ids, vec![10]);
        assert_eq!(report.score, 90.0);
    }

    #[test]
    fn suggestions_do_not_mark_cards_problematic() {
        let cards = vec![(7, CardDraft::basic("France", "Paris"))];
        let report = analyze_cards(&cards, &config());
        assert!(report.suggestions > 0);
        assert!(report.problematic_note_ids.is_empty());
    }

    #[test]
    fn unconvertible_cards_are_skipped() {
        let cards = vec![
            (1, CardDraft::basic("", "")),
            (2, CardDraft::basic("What is the capital of France?", "Paris")),
        ];
        let report = analyze_cards(&cards, &config());
        assert_eq!(report.total_cards, 1);
    }

    #[test]
    fn top_issues_are_sorted_by_frequency() {
        let cards = vec![
            (1, CardDraft::cloze("a sentence long enough for context but no span")),
            (2, CardDraft::cloze("another sentence without any deletion span at all")),
            (3, CardDraft::basic("France", "Paris")),
        ];
        let report = analyze_cards(&cards, &config());
        assert_eq!(report.top_issues[0].rule, "cloze_format");
        assert_eq!(report.top_issues[0].count, 2);
    }

    #[test]
    fn score_penalties_are_capped() {
        // Ten malformed cloze cards: raw penalty would be 100.
        let cards: Vec<_> = (0..10).map(|i| (i, CardDraft::cloze("bad"))).collect();
        let report = analyze_cards(&cards, &config());
        assert_eq!(report.errors, 10);
        // Error penalty caps at 50.
        assert!(report.score >= 30.0);
    }
}
