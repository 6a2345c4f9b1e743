pub mod batch_processor;

pub use batch_processor::{
    resolve_thread_count, BatchOutcome, BatchProcessor, DocumentOutcome, MatchedRecord,
    SkippedDocument, UnmatchedRecord,
};
