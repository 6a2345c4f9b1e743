pub mod keyword_classifier;
pub mod rule_set;

pub use keyword_classifier::{ClassificationVerdict, KeywordClassifier};
pub use rule_set::{default_primary_rules, default_secondary_rules, RuleSet, RuleSpec};
