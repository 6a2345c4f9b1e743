#[cfg(feature = "citation")]
pub mod citation_extractor;
pub mod field_extractor;
pub mod generic_extractor;

#[cfg(feature = "citation")]
pub use citation_extractor::CitationExtractor;
pub use field_extractor::{
    normalize_whitespace, select_field_extractor, ExtractedFields, FieldExtractor,
};
pub use generic_extractor::GenericExtractor;
