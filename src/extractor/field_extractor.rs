use crate::config::ExtractionConfig;
use crate::error::Result;

#[cfg(feature = "citation")]
use crate::extractor::citation_extractor::CitationExtractor;
#[cfg(not(feature = "citation"))]
use crate::error::SiftError;
use crate::extractor::generic_extractor::GenericExtractor;

/// The three bibliographic fields pulled out of one page, each already
/// whitespace-normalized. A field is empty when no strategy produced a value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedFields {
    pub title: String,
    pub abstract_text: String,
    pub body: String,
}

impl ExtractedFields {
    /// Build fields from raw strings, normalizing each one.
    pub fn normalized(title: &str, abstract_text: &str, body: &str) -> Self {
        Self {
            title: normalize_whitespace(title),
            abstract_text: normalize_whitespace(abstract_text),
            body: normalize_whitespace(body),
        }
    }

    /// The text the classifier sees: all three fields, blank-line separated.
    pub fn combined_text(&self) -> String {
        format!("{}\n\n{}\n\n{}", self.title, self.abstract_text, self.body)
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.abstract_text.is_empty() && self.body.is_empty()
    }
}

/// Collapse every whitespace run to a single space and trim the ends.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// One field-extraction strategy. The implementation is picked once at
/// startup and shared read-only across the worker pool.
pub trait FieldExtractor: Send + Sync {
    fn name(&self) -> &'static str;

    /// Pull (title, abstract, body) out of one page. Markup that is merely
    /// messy must not error; an error means this strategy cannot process the
    /// document at all, and the caller skips the file with a warning.
    fn extract(&self, file_name: &str, raw_html: &str) -> Result<ExtractedFields>;
}

/// Resolve the configured parser choice to a concrete strategy.
///
/// `auto` prefers the citation parser when this build carries it and falls
/// back to the generic chain otherwise. Asking for `citation` outright in a
/// build without the feature is an error rather than a silent downgrade.
pub fn select_field_extractor(config: &ExtractionConfig) -> Result<Box<dyn FieldExtractor>> {
    match config.parser.as_str() {
        "generic" => Ok(Box::new(GenericExtractor::new())),

        #[cfg(feature = "citation")]
        "citation" => Ok(Box::new(CitationExtractor::new())),
        #[cfg(not(feature = "citation"))]
        "citation" => Err(SiftError::Config {
            message: "this build does not include the citation parser \
                      (rebuild with --features citation)"
                .to_string(),
        }),

        #[cfg(feature = "citation")]
        _ => Ok(Box::new(CitationExtractor::new())),
        #[cfg(not(feature = "citation"))]
        _ => Ok(Box::new(GenericExtractor::new())),
    }
}
