use std::collections::HashMap;

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::extractor::field_extractor::{ExtractedFields, FieldExtractor};

static META: Lazy<Selector> = Lazy::new(|| Selector::parse("meta").unwrap());
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());
static LD_JSON: Lazy<Selector> =
    Lazy::new(|| Selector::parse("script[type='application/ld+json']").unwrap());
static CONTENT_REGIONS: Lazy<Selector> = Lazy::new(|| Selector::parse("article, main").unwrap());
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());

/// Abstract containers publishers commonly use, tried in this order.
static ABSTRACT_CONTAINERS: Lazy<Vec<Selector>> = Lazy::new(|| {
    [
        "section.abstract",
        "div.abstract",
        "div[class*='Abstract']",
        "section[id*='bstract']",
        "section[role='doc-abstract']",
    ]
    .iter()
    .map(|css| Selector::parse(css).unwrap())
    .collect()
});

/// Extraction strategy that works on arbitrary article pages.
///
/// Each field walks its own fallback chain: title from `og:title` then
/// `<title>`, abstract from meta tags then JSON-LD then known abstract
/// containers, body from `<article>`/`<main>` then all paragraphs. Markup
/// parsing is error-recovering, so this strategy never fails a document.
pub struct GenericExtractor;

impl GenericExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GenericExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for GenericExtractor {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn extract(&self, _file_name: &str, raw_html: &str) -> Result<ExtractedFields> {
        let document = Html::parse_document(raw_html);
        let (names, properties) = collect_meta(&document);

        let mut title = properties.get("og:title").cloned().unwrap_or_default();
        if title.trim().is_empty() {
            if let Some(element) = document.select(&TITLE).next() {
                title = element.text().collect::<String>();
            }
        }

        let mut abstract_text = names
            .get("dc.Description")
            .or_else(|| names.get("dc.description"))
            .or_else(|| names.get("description"))
            .or_else(|| properties.get("og:description"))
            .or_else(|| names.get("citation_abstract"))
            .cloned()
            .unwrap_or_default();

        if abstract_text.trim().is_empty() {
            abstract_text = structured_data_abstract(&document, &mut title);
        }

        if abstract_text.trim().is_empty() {
            for selector in ABSTRACT_CONTAINERS.iter() {
                if let Some(container) = document.select(selector).next() {
                    abstract_text = element_text(&container);
                    break;
                }
            }
        }

        let mut chunks: Vec<String> = document
            .select(&CONTENT_REGIONS)
            .map(|region| element_text(&region))
            .collect();
        if chunks.is_empty() {
            chunks = document
                .select(&PARAGRAPH)
                .map(|paragraph| element_text(&paragraph))
                .collect();
        }
        let body = chunks.join(" ");

        Ok(ExtractedFields::normalized(&title, &abstract_text, &body))
    }
}

/// First non-empty `content` per meta key, split by `name` vs `property`
/// attribute so the two namespaces never shadow each other.
fn collect_meta(document: &Html) -> (HashMap<String, String>, HashMap<String, String>) {
    let mut names = HashMap::new();
    let mut properties = HashMap::new();

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
        if let Some(property) = meta.value().attr("property") {
            properties
                .entry(property.to_string())
                .or_insert_with(|| content.to_string());
        }
    }

    (names, properties)
}

/// Scan `application/ld+json` blocks for a scholarly-article record.
///
/// A block that fails to parse is skipped, never fatal. Within a block the
/// first article object settles it; scanning stops at the first block that
/// yields a description. The article headline backfills the title only when
/// the meta-tag chain left it empty.
fn structured_data_abstract(document: &Html, title: &mut String) -> String {
    let mut abstract_text = String::new();

    for script in document.select(&LD_JSON) {
        let raw = script.text().collect::<String>();
        let raw = raw
            .trim()
            .trim_start_matches("<![CDATA[")
            .trim_end_matches("]]>")
            .trim();

        let parsed: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(_) => continue,
        };
        let candidates = match parsed {
            Value::Array(entries) => entries,
            single => vec![single],
        };

        for candidate in &candidates {
            let object = match candidate.as_object() {
                Some(object) => object,
                None => continue,
            };
            if !is_scholarly_article(object) {
                continue;
            }

            if let Some(description) = non_empty_str(object.get("description")) {
                abstract_text = description.to_string();
            }
            if title.trim().is_empty() {
                if let Some(headline) = non_empty_str(object.get("headline"))
                    .or_else(|| non_empty_str(object.get("name")))
                {
                    *title = headline.to_string();
                }
            }
            break;
        }

        if !abstract_text.is_empty() {
            break;
        }
    }

    abstract_text
}

/// `@type` may be a single string or a list; the first string entry decides.
fn is_scholarly_article(object: &Map<String, Value>) -> bool {
    let type_name = match object.get("@type") {
        Some(Value::String(single)) => single.as_str(),
        Some(Value::Array(entries)) => entries.iter().find_map(|entry| entry.as_str()).unwrap_or(""),
        _ => "",
    };
    type_name.contains("ScholarlyArticle")
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(|value| value.as_str())
        .filter(|text| !text.trim().is_empty())
}

fn element_text(element: &ElementRef) -> String {
    element.text().collect::<Vec<_>>().join(" ")
}
