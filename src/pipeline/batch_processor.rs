use std::fs;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::Serialize;

use crate::classifier::KeywordClassifier;
use crate::error::{Result, SiftError};
use crate::extractor::FieldExtractor;
use crate::scanner::DocumentFile;
use crate::ui::GracefulShutdown;

/// One accepted article, ready for the report files.
#[derive(Debug, Clone, Serialize)]
pub struct MatchedRecord {
    pub file: String,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
}

/// Diagnostics row for a document that failed classification: which rule
/// set missed, plus short field samples for eyeballing extraction quality.
#[derive(Debug, Clone, Serialize)]
pub struct UnmatchedRecord {
    pub file: String,
    pub primary_found: bool,
    pub secondary_found: bool,
    pub title_sample: String,
    pub abstract_sample: String,
}

#[derive(Debug, Clone)]
pub struct SkippedDocument {
    pub file: String,
    pub reason: String,
}

/// Terminal state of one document. Every discovered file produces exactly
/// one of these, so the accumulated counts always add up to the discovery
/// total. The classified variants also carry the labels of the rules that
/// hit, for the per-file debug line; labels never reach the report files.
#[derive(Debug)]
pub enum DocumentOutcome {
    Matched {
        record: MatchedRecord,
        matched_labels: Vec<String>,
    },
    Unmatched {
        record: UnmatchedRecord,
        matched_labels: Vec<String>,
    },
    Skipped(SkippedDocument),
    /// The run was interrupted before a worker reached this document.
    NotProcessed,
}

#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub matched: Vec<MatchedRecord>,
    pub unmatched: Vec<UnmatchedRecord>,
    pub skipped: Vec<SkippedDocument>,
    pub not_processed: usize,
    pub interrupted: bool,
    pub elapsed: Duration,
}

impl BatchOutcome {
    fn record(&mut self, outcome: DocumentOutcome) {
        match outcome {
            DocumentOutcome::Matched { record, .. } => self.matched.push(record),
            DocumentOutcome::Unmatched { record, .. } => self.unmatched.push(record),
            DocumentOutcome::Skipped(skip) => self.skipped.push(skip),
            DocumentOutcome::NotProcessed => self.not_processed += 1,
        }
    }

    /// Documents that ran to a terminal state this run.
    pub fn processed(&self) -> usize {
        self.matched.len() + self.unmatched.len() + self.skipped.len()
    }

    /// Processed plus interrupted-away documents; equals the discovery count.
    pub fn accounted(&self) -> usize {
        self.processed() + self.not_processed
    }

    /// Workers finish in arrival order, so sort for stable report files.
    fn sort_by_file(&mut self) {
        self.matched.sort_by(|a, b| a.file.cmp(&b.file));
        self.unmatched.sort_by(|a, b| a.file.cmp(&b.file));
        self.skipped.sort_by(|a, b| a.file.cmp(&b.file));
    }
}

/// Fans documents out to a worker pool and folds the outcomes back into a
/// single [`BatchOutcome`] on the calling thread.
///
/// Workers send outcomes over a channel; the caller drains it, which keeps
/// accumulation single-threaded and lets a progress callback observe every
/// outcome as it lands. On shutdown, in-flight documents still finish while
/// unstarted ones come back as `NotProcessed`.
pub struct BatchProcessor<'a> {
    extractor: &'a dyn FieldExtractor,
    classifier: &'a KeywordClassifier,
    threads: usize,
}

impl<'a> BatchProcessor<'a> {
    pub fn new(
        extractor: &'a dyn FieldExtractor,
        classifier: &'a KeywordClassifier,
        threads: usize,
    ) -> Self {
        Self {
            extractor,
            classifier,
            threads,
        }
    }

    pub fn process(
        &self,
        documents: &[DocumentFile],
        shutdown: &GracefulShutdown,
        progress: Option<&dyn Fn(&DocumentOutcome)>,
    ) -> Result<BatchOutcome> {
        let started = Instant::now();
        let worker_count = resolve_thread_count(self.threads, documents.len());

        let mut batch = if worker_count <= 1 {
            self.process_sequential(documents, shutdown, progress)
        } else {
            self.process_parallel(documents, shutdown, progress, worker_count)?
        };

        batch.interrupted = !shutdown.is_running();
        batch.elapsed = started.elapsed();
        batch.sort_by_file();
        Ok(batch)
    }

    fn process_sequential(
        &self,
        documents: &[DocumentFile],
        shutdown: &GracefulShutdown,
        progress: Option<&dyn Fn(&DocumentOutcome)>,
    ) -> BatchOutcome {
        let mut batch = BatchOutcome::default();

        for (index, document) in documents.iter().enumerate() {
            if !shutdown.is_running() {
                batch.not_processed += documents.len() - index;
                break;
            }

            let outcome = self.process_one(document);
            if let Some(callback) = progress {
                callback(&outcome);
            }
            batch.record(outcome);
        }

        batch
    }

    fn process_parallel(
        &self,
        documents: &[DocumentFile],
        shutdown: &GracefulShutdown,
        progress: Option<&dyn Fn(&DocumentOutcome)>,
        worker_count: usize,
    ) -> Result<BatchOutcome> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(worker_count)
            .build()
            .map_err(|e| SiftError::ThreadPool {
                message: e.to_string(),
            })?;

        let mut batch = BatchOutcome::default();
        let (tx, rx) = mpsc::channel();

        thread::scope(|scope| {
            scope.spawn(move || {
                pool.install(|| {
                    documents.par_iter().for_each_with(tx, |tx, document| {
                        let outcome = if shutdown.is_running() {
                            self.process_one(document)
                        } else {
                            DocumentOutcome::NotProcessed
                        };
                        // The receiver outlives the pool, send cannot fail.
                        let _ = tx.send(outcome);
                    });
                });
            });

            for outcome in rx {
                if let Some(callback) = progress {
                    callback(&outcome);
                }
                batch.record(outcome);
            }
        });

        Ok(batch)
    }

    /// Read, extract and classify a single document. Read and extraction
    /// failures become skips; they never abort the batch.
    fn process_one(&self, document: &DocumentFile) -> DocumentOutcome {
        let raw = match fs::read(&document.path) {
            Ok(bytes) => bytes,
            Err(e) => {
                return DocumentOutcome::Skipped(SkippedDocument {
                    file: document.file_name.clone(),
                    reason: format!("read failed: {}", e),
                });
            }
        };
        let html = String::from_utf8_lossy(&raw);

        let fields = match self.extractor.extract(&document.file_name, &html) {
            Ok(fields) => fields,
            Err(e) => {
                return DocumentOutcome::Skipped(SkippedDocument {
                    file: document.file_name.clone(),
                    reason: e.to_string(),
                });
            }
        };

        let verdict = self.classifier.classify_fields(&fields);
        if verdict.is_matched() {
            DocumentOutcome::Matched {
                record: MatchedRecord {
                    file: document.file_name.clone(),
                    title: fields.title,
                    abstract_text: fields.abstract_text,
                },
                matched_labels: verdict.matched_labels,
            }
        } else {
            DocumentOutcome::Unmatched {
                record: UnmatchedRecord {
                    file: document.file_name.clone(),
                    primary_found: verdict.primary_match,
                    secondary_found: verdict.secondary_match,
                    title_sample: truncate_chars(&fields.title, 120),
                    abstract_sample: truncate_chars(&fields.abstract_text, 160),
                },
                matched_labels: verdict.matched_labels,
            }
        }
    }
}

/// Worker count for a batch: 0 means one per CPU, and there is never a
/// point in more workers than documents.
pub fn resolve_thread_count(requested: usize, file_count: usize) -> usize {
    let requested = if requested == 0 {
        num_cpus::get()
    } else {
        requested
    };
    requested.min(file_count).max(1)
}

/// Character-based truncation for the diagnostics samples, safe on
/// multi-byte text.
fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{default_primary_rules, default_secondary_rules};
    use crate::extractor::GenericExtractor;
    use std::cell::{Cell, RefCell};
    use std::path::Path;
    use tempfile::TempDir;

    fn write_doc(dir: &Path, name: &str, html: &str) -> DocumentFile {
        let path = dir.join(name);
        fs::write(&path, html).unwrap();
        let size = fs::metadata(&path).unwrap().len();
        DocumentFile::new(path, size)
    }

    fn test_classifier() -> KeywordClassifier {
        KeywordClassifier::new(&default_primary_rules(), &default_secondary_rules()).unwrap()
    }

    const MATCHING_PAGE: &str = r#"<html><head>
        <meta property="og:title" content="Memristor Study">
        <meta name="description" content="2D materials for memristor devices.">
    </head><body></body></html>"#;

    const OFF_TOPIC_PAGE: &str = r#"<html><head>
        <title>Graphene transport</title>
        <meta name="description" content="Carrier mobility in graphene sheets.">
    </head><body></body></html>"#;

    #[test]
    fn test_sequential_partition() {
        let dir = TempDir::new().unwrap();
        let matched = write_doc(dir.path(), "a.html", MATCHING_PAGE);
        let unmatched = write_doc(dir.path(), "b.html", OFF_TOPIC_PAGE);
        let missing = write_doc(dir.path(), "c.html", OFF_TOPIC_PAGE);
        fs::remove_file(&missing.path).unwrap();

        let extractor = GenericExtractor::new();
        let classifier = test_classifier();
        let processor = BatchProcessor::new(&extractor, &classifier, 1);
        let shutdown = GracefulShutdown::new_for_test();

        let batch = processor
            .process(&[matched, unmatched, missing], &shutdown, None)
            .unwrap();

        assert_eq!(batch.matched.len(), 1);
        assert_eq!(batch.unmatched.len(), 1);
        assert_eq!(batch.skipped.len(), 1);
        assert_eq!(batch.not_processed, 0);
        assert_eq!(batch.processed(), 3);
        assert_eq!(batch.accounted(), 3);
        assert!(!batch.interrupted);

        assert_eq!(batch.matched[0].file, "a.html");
        assert_eq!(batch.matched[0].title, "Memristor Study");
        assert_eq!(batch.skipped[0].file, "c.html");
        assert!(batch.skipped[0].reason.contains("read failed"));
    }

    #[test]
    fn test_unmatched_diagnostics() {
        let dir = TempDir::new().unwrap();
        let document = write_doc(dir.path(), "b.html", OFF_TOPIC_PAGE);

        let extractor = GenericExtractor::new();
        let classifier = test_classifier();
        let processor = BatchProcessor::new(&extractor, &classifier, 1);
        let shutdown = GracefulShutdown::new_for_test();

        let batch = processor.process(&[document], &shutdown, None).unwrap();

        let row = &batch.unmatched[0];
        assert!(!row.primary_found);
        assert!(!row.secondary_found);
        assert_eq!(row.title_sample, "Graphene transport");
        assert_eq!(row.abstract_sample, "Carrier mobility in graphene sheets.");
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let dir = TempDir::new().unwrap();
        let mut documents = Vec::new();
        for i in 0..8 {
            let page = if i % 2 == 0 {
                MATCHING_PAGE
            } else {
                OFF_TOPIC_PAGE
            };
            documents.push(write_doc(dir.path(), &format!("doc{}.html", i), page));
        }

        let extractor = GenericExtractor::new();
        let classifier = test_classifier();
        let shutdown = GracefulShutdown::new_for_test();

        let sequential = BatchProcessor::new(&extractor, &classifier, 1)
            .process(&documents, &shutdown, None)
            .unwrap();
        let parallel = BatchProcessor::new(&extractor, &classifier, 4)
            .process(&documents, &shutdown, None)
            .unwrap();

        let files = |records: &[MatchedRecord]| -> Vec<String> {
            records.iter().map(|r| r.file.clone()).collect()
        };
        assert_eq!(files(&sequential.matched), files(&parallel.matched));
        assert_eq!(sequential.unmatched.len(), parallel.unmatched.len());
        assert_eq!(parallel.processed(), 8);
    }

    #[test]
    fn test_shutdown_leaves_documents_unprocessed() {
        let dir = TempDir::new().unwrap();
        let documents = vec![
            write_doc(dir.path(), "a.html", MATCHING_PAGE),
            write_doc(dir.path(), "b.html", OFF_TOPIC_PAGE),
        ];

        let extractor = GenericExtractor::new();
        let classifier = test_classifier();
        let processor = BatchProcessor::new(&extractor, &classifier, 1);
        let shutdown = GracefulShutdown::new_for_test();
        shutdown.request_shutdown();

        let batch = processor.process(&documents, &shutdown, None).unwrap();

        assert_eq!(batch.processed(), 0);
        assert_eq!(batch.not_processed, 2);
        assert_eq!(batch.accounted(), 2);
        assert!(batch.interrupted);
    }

    #[test]
    fn test_progress_callback_sees_every_outcome() {
        let dir = TempDir::new().unwrap();
        let documents = vec![
            write_doc(dir.path(), "a.html", MATCHING_PAGE),
            write_doc(dir.path(), "b.html", OFF_TOPIC_PAGE),
            write_doc(dir.path(), "c.html", OFF_TOPIC_PAGE),
        ];

        let extractor = GenericExtractor::new();
        let classifier = test_classifier();
        let processor = BatchProcessor::new(&extractor, &classifier, 2);
        let shutdown = GracefulShutdown::new_for_test();

        let seen = Cell::new(0usize);
        let callback = |_outcome: &DocumentOutcome| {
            seen.set(seen.get() + 1);
        };
        processor
            .process(&documents, &shutdown, Some(&callback))
            .unwrap();

        assert_eq!(seen.get(), 3);
    }

    #[test]
    fn test_outcomes_carry_matched_rule_labels() {
        let dir = TempDir::new().unwrap();
        let documents = vec![
            write_doc(dir.path(), "a.html", MATCHING_PAGE),
            write_doc(dir.path(), "b.html", OFF_TOPIC_PAGE),
        ];

        let extractor = GenericExtractor::new();
        let classifier = test_classifier();
        let processor = BatchProcessor::new(&extractor, &classifier, 1);
        let shutdown = GracefulShutdown::new_for_test();

        let seen = RefCell::new(Vec::new());
        let callback = |outcome: &DocumentOutcome| match outcome {
            DocumentOutcome::Matched { matched_labels, .. }
            | DocumentOutcome::Unmatched { matched_labels, .. } => {
                seen.borrow_mut().push(matched_labels.clone());
            }
            _ => {}
        };
        processor
            .process(&documents, &shutdown, Some(&callback))
            .unwrap();

        let seen = seen.into_inner();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], vec!["2d-materials", "memristor"]);
        assert!(seen[1].is_empty());
    }

    #[test]
    fn test_resolve_thread_count() {
        assert!(resolve_thread_count(0, 100) >= 1);
        assert!(resolve_thread_count(0, 2) <= 2);
        assert_eq!(resolve_thread_count(4, 100), 4);
        assert_eq!(resolve_thread_count(4, 2), 2);
        assert_eq!(resolve_thread_count(4, 0), 1);
        assert_eq!(resolve_thread_count(1, 10), 1);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("short", 120), "short");
        let long = "x".repeat(200);
        assert_eq!(truncate_chars(&long, 120).len(), 120);
        assert_eq!(truncate_chars("áéíóú", 3), "áéí");
    }
}
