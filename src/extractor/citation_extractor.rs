use std::collections::HashMap;

use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use crate::error::{Result, SiftError};
use crate::extractor::field_extractor::{ExtractedFields, FieldExtractor};

static META: Lazy<Selector> = Lazy::new(|| Selector::parse("meta").unwrap());

/// Extraction strategy for publisher pages carrying Highwire citation
/// metadata (`citation_title`, `citation_abstract`).
///
/// The body field stays empty on purpose: classification driven by this
/// strategy relies on the curated title and abstract alone. Pages without
/// any citation metadata are outside this strategy's reach and error out,
/// which the pipeline reports as a skipped document.
pub struct CitationExtractor;

impl CitationExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CitationExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for CitationExtractor {
    fn name(&self) -> &'static str {
        "citation"
    }

    fn extract(&self, file_name: &str, raw_html: &str) -> Result<ExtractedFields> {
        let document = Html::parse_document(raw_html);
        let names = collect_named_meta(&document);

        let title = names
            .get("citation_title")
            .or_else(|| names.get("dc.title"))
            .cloned()
            .unwrap_or_default();
        let abstract_text = names.get("citation_abstract").cloned().unwrap_or_default();

        if !names.contains_key("citation_title") && !names.contains_key("citation_abstract") {
            return Err(SiftError::DocumentParse {
                file: file_name.to_string(),
                message: "page carries no citation metadata".to_string(),
            });
        }

        Ok(ExtractedFields::normalized(&title, &abstract_text, ""))
    }
}

fn collect_named_meta(document: &Html) -> HashMap<String, String> {
    let mut names = HashMap::new();
    for meta in document.select(&META) {
        let content = match meta.value().attr("content") {
            Some(content) if !content.trim().is_empty() => content,
            _ => continue,
        };
        if let Some(name) = meta.value().attr("name") {
            names
                .entry(name.to_string())
                .or_insert_with(|| content.to_string());
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_citation_fields() {
        let fields = CitationExtractor::new()
            .extract(
                "paper.html",
                r#"<html><head>
                    <meta name="citation_title" content="Oxide Memristor Arrays">
                    <meta name="citation_abstract" content="We report  2D materials.">
                </head><body><p>Full text ignored.</p></body></html>"#,
            )
            .unwrap();
        assert_eq!(fields.title, "Oxide Memristor Arrays");
        assert_eq!(fields.abstract_text, "We report 2D materials.");
        assert_eq!(fields.body, "");
    }

    #[test]
    fn test_dc_title_fallback() {
        let fields = CitationExtractor::new()
            .extract(
                "paper.html",
                r#"<html><head>
                    <meta name="dc.title" content="Fallback Title">
                    <meta name="citation_abstract" content="Some abstract.">
                </head></html>"#,
            )
            .unwrap();
        assert_eq!(fields.title, "Fallback Title");
    }

    #[test]
    fn test_page_without_citation_metadata_errors() {
        let result = CitationExtractor::new().extract(
            "saved.html",
            r#"<html><head><title>Plain Page</title></head>
               <body><p>No citation tags here.</p></body></html>"#,
        );
        assert!(result.is_err());
        let message = result.unwrap_err().to_string();
        assert!(message.contains("saved.html"));
    }

    #[test]
    fn test_strategy_name() {
        assert_eq!(CitationExtractor::new().name(), "citation");
    }
}
