use crate::classifier::rule_set::{RuleSet, RuleSpec};
use crate::config::RulesConfig;
use crate::error::Result;
use crate::extractor::ExtractedFields;

/// Outcome of evaluating both rule sets against one document.
///
/// Both flags are always computed; a primary miss never suppresses the
/// secondary evaluation, because the diagnostics file reports each flag
/// independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationVerdict {
    pub primary_match: bool,
    pub secondary_match: bool,
    /// Labels of every rule that hit, primary set first, set order within.
    pub matched_labels: Vec<String>,
}

impl ClassificationVerdict {
    pub fn is_matched(&self) -> bool {
        self.primary_match && self.secondary_match
    }
}

/// Evaluates the primary and secondary keyword rule sets over the combined
/// text of a document. Pure: no I/O, no state beyond the compiled rules.
#[derive(Debug)]
pub struct KeywordClassifier {
    primary: RuleSet,
    secondary: RuleSet,
}

impl KeywordClassifier {
    pub fn new(primary: &[RuleSpec], secondary: &[RuleSpec]) -> Result<Self> {
        Ok(Self {
            primary: RuleSet::compile(primary)?,
            secondary: RuleSet::compile(secondary)?,
        })
    }

    pub fn from_config(rules: &RulesConfig) -> Result<Self> {
        Self::new(&rules.primary, &rules.secondary)
    }

    pub fn classify(&self, text: &str) -> ClassificationVerdict {
        let primary_hits = self.primary.matching_labels(text);
        let secondary_hits = self.secondary.matching_labels(text);
        let primary_match = !primary_hits.is_empty();
        let secondary_match = !secondary_hits.is_empty();

        let mut matched_labels = Vec::with_capacity(primary_hits.len() + secondary_hits.len());
        matched_labels.extend(primary_hits.into_iter().map(String::from));
        matched_labels.extend(secondary_hits.into_iter().map(String::from));

        ClassificationVerdict {
            primary_match,
            secondary_match,
            matched_labels,
        }
    }

    pub fn classify_fields(&self, fields: &ExtractedFields) -> ClassificationVerdict {
        self.classify(&fields.combined_text())
    }

    pub fn rule_counts(&self) -> (usize, usize) {
        (self.primary.len(), self.secondary.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::rule_set::{default_primary_rules, default_secondary_rules};

    fn default_classifier() -> KeywordClassifier {
        KeywordClassifier::new(&default_primary_rules(), &default_secondary_rules()).unwrap()
    }

    #[test]
    fn test_both_rule_sets_evaluated_independently() {
        let classifier = default_classifier();

        let verdict = classifier.classify("a plain transistor paper");
        assert!(!verdict.primary_match);
        assert!(!verdict.secondary_match);

        // Secondary is still reported even when primary fails.
        let verdict = classifier.classify("a memristor paper about perovskites");
        assert!(!verdict.primary_match);
        assert!(verdict.secondary_match);

        let verdict = classifier.classify("2D materials growth methods");
        assert!(verdict.primary_match);
        assert!(!verdict.secondary_match);
    }

    #[test]
    fn test_matched_requires_both() {
        let classifier = default_classifier();

        let verdict = classifier.classify("memristor DEVICE built from 2d materials");
        assert!(verdict.primary_match);
        assert!(verdict.secondary_match);
        assert!(verdict.is_matched());

        assert!(!classifier.classify("2D materials only").is_matched());
        assert!(!classifier.classify("memristor only").is_matched());
    }

    #[test]
    fn test_matched_labels_listed_in_rule_order() {
        let classifier = default_classifier();

        let verdict = classifier.classify("2d materials memristor device array");
        assert!(verdict.is_matched());
        assert_eq!(
            verdict.matched_labels,
            vec!["2d-materials", "memristor", "memristor-device"]
        );

        let verdict = classifier.classify("a memristor paper");
        assert!(!verdict.primary_match);
        assert_eq!(verdict.matched_labels, vec!["memristor"]);

        assert!(classifier.classify("plain transistor").matched_labels.is_empty());
    }

    #[test]
    fn test_classify_fields_uses_all_three_fields() {
        let classifier = default_classifier();

        let fields = ExtractedFields {
            title: "Synthesis routes".to_string(),
            abstract_text: "We review 2-D Materials growth.".to_string(),
            body: "The memristor device application is discussed.".to_string(),
        };

        assert!(classifier.classify_fields(&fields).is_matched());
    }

    #[test]
    fn test_rule_counts() {
        let classifier = default_classifier();
        assert_eq!(classifier.rule_counts(), (1, 3));
    }
}
