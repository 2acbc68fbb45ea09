//! Rule evaluation and verdict aggregation -- pure logic, no I/O.

use serde::Serialize;

use crate::card::CardDraft;
use crate::error::CoreError;
use crate::validation::rules::{self, Finding, Severity, Strictness, ValidationConfig};

/// A single validation rule: pure function of draft and config.
pub type Rule = fn(&CardDraft, &ValidationConfig) -> Vec<Finding>;

/// Canonical rule evaluation order. Finding order in a [`Verdict`]
/// follows this slice, so verdicts are reproducible across runs.
pub const RULES: &[Rule] = &[
    rules::cloze_format,
    rules::answer_length,
    rules::minimum_information,
    rules::ambiguity,
    rules::cloze_count,
    rules::context_free,
];

/// Final aggregate outcome for one card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Allowed,
    AllowedWithWarnings,
    Blocked,
}

/// The pass/warn/block decision plus every finding, in rule order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub outcome: Outcome,
    pub findings: Vec<Finding>,
}

impl Verdict {
    pub fn is_blocked(&self) -> bool {
        self.outcome == Outcome::Blocked
    }

    pub fn errors(&self) -> impl Iterator<Item = &Finding> {
        self.by_severity(Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.by_severity(Severity::Warning)
    }

    pub fn suggestions(&self) -> impl Iterator<Item = &Finding> {
        self.by_severity(Severity::Suggestion)
    }

    fn by_severity(&self, severity: Severity) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.severity == severity)
    }
}

/// Run all rules against a draft and aggregate the findings.
///
/// Fails fast with [`CoreError::Validation`] when a field required by
/// the card's kind is missing or blank -- that is caller misuse, not a
/// quality finding, and produces no verdict.
pub fn validate(draft: &CardDraft, config: &ValidationConfig) -> Result<Verdict, CoreError> {
    for name in draft.kind().required_fields() {
        match draft.field(name) {
            Some(value) if !value.trim().is_empty() => {}
            _ => {
                return Err(CoreError::Validation(format!(
                    "{} card requires a non-empty '{name}' field",
                    draft.kind().as_str()
                )))
            }
        }
    }

    let mut findings = Vec::new();
    for rule in RULES {
        findings.extend(rule(draft, config));
    }
    Ok(aggregate(findings, config.strictness))
}

/// Fold findings into a verdict under the given strictness policy.
///
/// Total and deterministic: blocked iff any error finding exists, or
/// (under strict) any warning finding exists. Suggestions never block.
/// Finding order is preserved unchanged; nothing is dropped or merged.
pub fn aggregate(findings: Vec<Finding>, strictness: Strictness) -> Verdict {
    let has_error = findings.iter().any(|f| f.severity == Severity::Error);
    let has_warning = findings.iter().any(|f| f.severity == Severity::Warning);

    let outcome = if has_error || (strictness == Strictness::Strict && has_warning) {
        Outcome::Blocked
    } else if findings.is_empty() {
        Outcome::Allowed
    } else {
        Outcome::AllowedWithWarnings
    };

    Verdict { outcome, findings }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::rules::RuleId;
    use assert_matches::assert_matches;

    fn config(strictness: Strictness) -> ValidationConfig {
        ValidationConfig {
            strictness,
            ..ValidationConfig::default()
        }
    }

    fn finding(severity: Severity) -> Finding {
        Finding {
            rule_id: RuleId::AnswerLength,
            severity,
            message: "test".to_string(),
            field: "back",
        }
    }

    // -- aggregation policy --

    #[test]
    fn error_always_blocks() {
        for strictness in [Strictness::Strict, Strictness::Moderate, Strictness::Lenient] {
            let verdict = aggregate(vec![finding(Severity::Error)], strictness);
            assert_eq!(verdict.outcome, Outcome::Blocked);
        }
    }

    #[test]
    fn warning_blocks_only_under_strict() {
        let verdict = aggregate(vec![finding(Severity::Warning)], Strictness::Strict);
        assert_eq!(verdict.outcome, Outcome::Blocked);

        let verdict = aggregate(vec![finding(Severity::Warning)], Strictness::Moderate);
        assert_eq!(verdict.outcome, Outcome::AllowedWithWarnings);

        let verdict = aggregate(vec![finding(Severity::Warning)], Strictness::Lenient);
        assert_eq!(verdict.outcome, Outcome::AllowedWithWarnings);
    }

    #[test]
    fn suggestion_never_blocks_even_under_strict() {
        let verdict = aggregate(vec![finding(Severity::Suggestion)], Strictness::Strict);
        assert_eq!(verdict.outcome, Outcome::AllowedWithWarnings);
    }

    #[test]
    fn empty_findings_are_allowed() {
        let verdict = aggregate(Vec::new(), Strictness::Strict);
        assert_eq!(verdict.outcome, Outcome::Allowed);
        assert!(verdict.findings.is_empty());
    }

    #[test]
    fn finding_order_is_preserved() {
        let input = vec![
            finding(Severity::Suggestion),
            finding(Severity::Error),
            finding(Severity::Warning),
        ];
        let verdict = aggregate(input.clone(), Strictness::Moderate);
        assert_eq!(verdict.findings, input);
    }

    // -- preconditions --

    #[test]
    fn blank_required_field_is_a_hard_error() {
        let draft = CardDraft::basic("front", "   ");
        let result = validate(&draft, &config(Strictness::Moderate));
        assert_matches!(result, Err(CoreError::Validation(_)));
    }

    // -- end-to-end scenarios --

    #[test]
    fn clean_basic_card_is_allowed() {
        let draft = CardDraft::basic("What is the capital of France?", "Paris");
        let verdict = validate(&draft, &config(Strictness::Moderate)).unwrap();
        assert_eq!(verdict.outcome, Outcome::Allowed);
        assert!(verdict.findings.is_empty());
    }

    #[test]
    fn malformed_cloze_is_blocked() {
        let draft = CardDraft::cloze("The cell has {c1:mitochondria}");
        let verdict = validate(&draft, &config(Strictness::Moderate)).unwrap();
        assert_eq!(verdict.outcome, Outcome::Blocked);
        assert_eq!(verdict.findings.len(), 1);
        assert_eq!(verdict.findings[0].rule_id, RuleId::ClozeFormat);
        assert_eq!(verdict.findings[0].severity, Severity::Error);
    }

    #[test]
    fn long_answer_warns_under_moderate() {
        let back = "word ".repeat(60);
        let draft = CardDraft::basic("What is the capital of France?", back);
        let verdict = validate(&draft, &config(Strictness::Moderate)).unwrap();
        assert_eq!(verdict.outcome, Outcome::AllowedWithWarnings);
        assert_eq!(verdict.findings.len(), 1);
        assert_eq!(verdict.findings[0].rule_id, RuleId::AnswerLength);
    }

    #[test]
    fn too_many_deletions_warn_under_moderate() {
        let draft = CardDraft::cloze("{{c1::A}} {{c2::B}} {{c3::C}} {{c4::D}}");
        let verdict = validate(&draft, &config(Strictness::Moderate)).unwrap();
        assert_eq!(verdict.outcome, Outcome::AllowedWithWarnings);
        assert!(verdict
            .findings
            .iter()
            .any(|f| f.rule_id == RuleId::ClozeCount && f.severity == Severity::Warning));
    }

    #[test]
    fn suggestion_only_card_passes_under_strict() {
        let draft = CardDraft::basic("<b>What</b> is X?", "X is defined as Y");
        let verdict = validate(&draft, &config(Strictness::Strict)).unwrap();
        assert_eq!(verdict.outcome, Outcome::AllowedWithWarnings);
        assert!(verdict
            .findings
            .iter()
            .all(|f| f.severity == Severity::Suggestion));
        assert!(verdict.findings.iter().any(|f| f.rule_id == RuleId::Ambiguity));
    }

    // -- determinism --

    #[test]
    fn identical_input_yields_identical_verdicts() {
        let draft = CardDraft::cloze("{{c1::A}} {{c2::B}} {{c3::C}} {{c4::D}}");
        let cfg = config(Strictness::Moderate);
        let first = validate(&draft, &cfg).unwrap();
        let second = validate(&draft, &cfg).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn severity_accessors_partition_findings() {
        let verdict = aggregate(
            vec![
                finding(Severity::Error),
                finding(Severity::Warning),
                finding(Severity::Suggestion),
                finding(Severity::Warning),
            ],
            Strictness::Lenient,
        );
        assert_eq!(verdict.errors().count(), 1);
        assert_eq!(verdict.warnings().count(), 2);
        assert_eq!(verdict.suggestions().count(), 1);
    }
}
