pub mod report_writer;

pub use report_writer::{ReportWriter, WrittenReports, MATCHED_CSV, MATCHED_JSONL, UNMATCHED_CSV};
