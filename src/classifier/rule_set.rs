use crate::error::{Result, SiftError};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// A single keyword rule: a labelled regular expression plus its case mode.
///
/// Rules live in the configuration file, so corpora with different target
/// topics only need a different `[rules]` section, not a code change.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RuleSpec {
    pub label: String,
    pub pattern: String,
    #[serde(default)]
    pub case_sensitive: bool,
}

impl RuleSpec {
    pub fn new<L: Into<String>, P: Into<String>>(label: L, pattern: P) -> Self {
        Self {
            label: label.into(),
            pattern: pattern.into(),
            case_sensitive: false,
        }
    }
}

/// The built-in primary rule set: the topic phrase "2D Materials" with
/// optional hyphens/spaces between its parts.
pub fn default_primary_rules() -> Vec<RuleSpec> {
    vec![RuleSpec::new(
        "2d-materials",
        r"\b2\s*[-]?\s*D\s*[-]?\s*Materials\b",
    )]
}

/// The built-in secondary rule set: device keywords, any of which qualifies.
pub fn default_secondary_rules() -> Vec<RuleSpec> {
    vec![
        RuleSpec::new("memristor", r"\bMemristor\b"),
        RuleSpec::new(
            "resistive-switching-device",
            r"\bResistive\s+switching\s+device\b",
        ),
        RuleSpec::new("memristor-device", r"\bMemristor\s+device\b"),
    ]
}

/// An ordered set of compiled rules. The set matches when any member matches.
#[derive(Debug)]
pub struct RuleSet {
    rules: Vec<CompiledRule>,
}

#[derive(Debug)]
struct CompiledRule {
    label: String,
    regex: Regex,
}

impl RuleSet {
    /// Compile every spec up front so a bad pattern fails at startup, not
    /// halfway through a batch.
    pub fn compile(specs: &[RuleSpec]) -> Result<Self> {
        let mut rules = Vec::with_capacity(specs.len());

        for spec in specs {
            let regex = RegexBuilder::new(&spec.pattern)
                .case_insensitive(!spec.case_sensitive)
                .build()
                .map_err(|e| SiftError::RulePattern {
                    label: spec.label.clone(),
                    source: e,
                })?;

            rules.push(CompiledRule {
                label: spec.label.clone(),
                regex,
            });
        }

        Ok(Self { rules })
    }

    pub fn matches(&self, text: &str) -> bool {
        self.rules.iter().any(|rule| rule.regex.is_match(text))
    }

    /// Labels of the rules that match, in set order. Used for debug output.
    pub fn matching_labels(&self, text: &str) -> Vec<&str> {
        self.rules
            .iter()
            .filter(|rule| rule.regex.is_match(text))
            .map(|rule| rule.label.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_primary_tolerates_hyphens_and_spaces() {
        let rules = RuleSet::compile(&default_primary_rules()).unwrap();

        assert!(rules.matches("advances in 2D Materials research"));
        assert!(rules.matches("advances in 2-D Materials research"));
        assert!(rules.matches("advances in 2 D Materials research"));
        assert!(rules.matches("advances in 2D-Materials research"));
        assert!(!rules.matches("advances in 2E Materials research"));
    }

    #[test]
    fn test_default_primary_is_case_insensitive() {
        let rules = RuleSet::compile(&default_primary_rules()).unwrap();
        assert!(rules.matches("2d materials"));
        assert!(rules.matches("2D MATERIALS"));
    }

    #[test]
    fn test_default_secondary_matches_any_member() {
        let rules = RuleSet::compile(&default_secondary_rules()).unwrap();

        assert!(rules.matches("a memristor crossbar"));
        assert!(rules.matches("a resistive switching device array"));
        assert!(rules.matches("the memristor device showed hysteresis"));
        assert!(!rules.matches("a transistor array"));
    }

    #[test]
    fn test_word_boundaries_are_respected() {
        let rules = RuleSet::compile(&default_secondary_rules()).unwrap();
        assert!(!rules.matches("memristors"));
        assert!(!rules.matches("memristors2"));
        assert!(rules.matches("(memristor)"));
    }

    #[test]
    fn test_case_sensitive_rule() {
        let specs = vec![RuleSpec {
            label: "exact".to_string(),
            pattern: r"\bMoS2\b".to_string(),
            case_sensitive: true,
        }];
        let rules = RuleSet::compile(&specs).unwrap();

        assert!(rules.matches("monolayer MoS2 films"));
        assert!(!rules.matches("monolayer mos2 films"));
    }

    #[test]
    fn test_invalid_pattern_reports_label() {
        let specs = vec![RuleSpec::new("broken", "(unclosed")];
        let err = RuleSet::compile(&specs).unwrap_err();
        match err {
            SiftError::RulePattern { label, .. } => assert_eq!(label, "broken"),
            other => panic!("expected RulePattern, got {:?}", other),
        }
    }

    #[test]
    fn test_matching_labels() {
        let rules = RuleSet::compile(&default_secondary_rules()).unwrap();
        let labels = rules.matching_labels("the memristor device");
        assert_eq!(labels, vec!["memristor", "memristor-device"]);
    }

    #[test]
    fn test_rule_spec_serde_defaults() {
        let spec: RuleSpec =
            toml::from_str("label = \"x\"\npattern = \"y\"").unwrap();
        assert!(!spec.case_sensitive);
    }
}
