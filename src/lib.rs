pub mod classifier;
pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod pipeline;
pub mod report;
pub mod scanner;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{
    CliOverrides, Config, DiscoveryConfig, ExtractionConfig, OutputConfig, PipelineConfig,
    RulesConfig,
};
pub use error::{Result, SiftError, UserFriendlyError};

// Core functionality re-exports
pub use classifier::{ClassificationVerdict, KeywordClassifier, RuleSet, RuleSpec};
pub use extractor::{select_field_extractor, ExtractedFields, FieldExtractor, GenericExtractor};
pub use pipeline::{
    resolve_thread_count, BatchOutcome, BatchProcessor, DocumentOutcome, MatchedRecord,
    UnmatchedRecord,
};
pub use report::{ReportWriter, WrittenReports};
pub use scanner::{DocumentFile, DocumentScanner, FileFilter, ScanStatistics};
pub use ui::{GracefulShutdown, OutputFormatter, OutputMode, ProgressManager};

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use ui::{OperationProgress, ProgressAwareOutput};

/// Summary of one corpus-building run, printable as JSON for scripting.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub input_dir: String,
    pub output_dir: String,
    pub parser: String,
    pub threads: usize,
    pub documents_found: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub skipped: usize,
    pub not_processed: usize,
    pub interrupted: bool,
    pub duration_ms: u128,
    pub completed_at: DateTime<Utc>,
}

/// Main library interface for PaperSift functionality
pub struct PaperSift {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
    shutdown: GracefulShutdown,
}

impl PaperSift {
    /// Create a new PaperSift instance with the provided configuration
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Result<Self> {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet);
        let shutdown = GracefulShutdown::new()?;

        Ok(Self {
            config,
            output_formatter,
            progress_manager,
            shutdown,
        })
    }

    /// Create a new PaperSift instance for testing (no signal handler conflicts)
    #[cfg(test)]
    pub fn new_for_test(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet);
        let shutdown = GracefulShutdown::new_for_test();

        Self {
            config,
            output_formatter,
            progress_manager,
            shutdown,
        }
    }

    /// Create PaperSift instance from CLI arguments
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            crate::cli::OutputFormat::Human => OutputMode::Human,
            crate::cli::OutputFormat::Json => OutputMode::Json,
            crate::cli::OutputFormat::Plain => OutputMode::Plain,
        };

        Self::new(
            config,
            output_mode,
            cli_args.verbosity_level(),
            cli_args.quiet,
        )
    }

    /// Run the whole pipeline: discover documents, extract fields, classify
    /// and write the report files.
    ///
    /// On Ctrl+C the accumulated results are still written before this
    /// returns `Cancelled`, so a long run never loses finished work.
    pub async fn build_corpus(&self) -> Result<RunReport> {
        let start_time = Instant::now();

        self.shutdown.check_shutdown()?;
        self.output_formatter.start_operation("Starting corpus build");

        // Step 1: Discover candidate documents
        let documents = self.scan_documents()?;
        self.shutdown.check_shutdown()?;

        self.output_formatter
            .info(&format!("Found {} candidate documents", documents.len()));

        // Step 2: Pick the extraction strategy and compile the rule sets
        let extractor = select_field_extractor(&self.config.extraction)?;
        self.log_parser_choice(extractor.name());

        let classifier = KeywordClassifier::from_config(&self.config.rules)?;
        let (primary_rules, secondary_rules) = classifier.rule_counts();
        self.output_formatter.debug(&format!(
            "Compiled {} primary and {} secondary rules",
            primary_rules, secondary_rules
        ));

        // Step 3: Prepare the output directory before doing any real work
        let writer = ReportWriter::new(&self.config.output.directory);
        writer.initialize()?;
        self.output_formatter.success(&format!(
            "Initialized output directory: {}",
            writer.output_directory().display()
        ));
        self.shutdown.check_shutdown()?;

        // Step 4: Process every document through the worker pool
        let batch = self.classify_documents(&documents, extractor.as_ref(), &classifier)?;

        // Step 5: Write reports, also for a partial batch after Ctrl+C
        let written = writer.write(&batch, &self.config.output.format)?;
        if batch.matched.is_empty() {
            self.output_formatter.warning(
                "No documents matched the configured rules; only diagnostics were written.",
            );
        }

        self.output_formatter.print_run_summary(&batch, &written);

        let report = self.create_run_report(&documents, &batch, start_time);
        self.output_formatter.print_run_report(&report);

        if batch.interrupted {
            return Err(SiftError::Cancelled);
        }
        Ok(report)
    }

    /// Validate the configuration against the filesystem without touching
    /// the output directory.
    pub async fn dry_run(&self) -> Result<()> {
        self.output_formatter.start_operation("Dry run");

        let documents = self.scan_documents()?;
        let extractor = select_field_extractor(&self.config.extraction)?;
        let classifier = KeywordClassifier::from_config(&self.config.rules)?;
        let (primary_rules, secondary_rules) = classifier.rule_counts();

        self.output_formatter.info(&format!(
            "Would process {} documents from {}",
            documents.len(),
            self.config.discovery.input_dir.display()
        ));
        self.output_formatter.info(&format!(
            "Field extraction strategy: {}",
            extractor.name()
        ));
        self.output_formatter.info(&format!(
            "Rules: {} primary, {} secondary",
            primary_rules, secondary_rules
        ));
        self.output_formatter.info(&format!(
            "Worker threads: {}",
            resolve_thread_count(self.config.pipeline.threads, documents.len())
        ));
        self.output_formatter.info(&format!(
            "Reports would be written to {} (format: {})",
            self.config.output.directory.display(),
            self.config.output.format
        ));
        self.output_formatter.success("Dry run completed, nothing was written");

        Ok(())
    }

    /// Scan the input directory for candidate documents
    fn scan_documents(&self) -> Result<Vec<DocumentFile>> {
        self.output_formatter.start_operation("Scanning input directory");

        let scanner = DocumentScanner::new(&self.config.discovery);
        let documents = scanner.discover(&self.config.discovery.input_dir)?;

        let stats = scanner.get_statistics(&documents);
        self.output_formatter.debug(&stats.display_summary());

        Ok(documents)
    }

    /// Run extraction and classification with progress tracking
    fn classify_documents(
        &self,
        documents: &[DocumentFile],
        extractor: &dyn FieldExtractor,
        classifier: &KeywordClassifier,
    ) -> Result<BatchOutcome> {
        self.output_formatter.start_operation("Classifying documents");

        let processor = BatchProcessor::new(extractor, classifier, self.config.pipeline.threads);
        self.output_formatter.debug(&format!(
            "Using {} worker threads",
            resolve_thread_count(self.config.pipeline.threads, documents.len())
        ));

        let progress = OperationProgress::new(
            &self.progress_manager,
            "Parsing documents",
            documents.len() as u64,
        );
        let live_output = ProgressAwareOutput::new(&self.output_formatter, Some(&self.progress_manager));

        let callback = |outcome: &DocumentOutcome| {
            progress.increment(1);
            match outcome {
                DocumentOutcome::Matched {
                    record,
                    matched_labels,
                } => {
                    live_output.debug(&verdict_line(&record.file, true, true, matched_labels));
                }
                DocumentOutcome::Unmatched {
                    record,
                    matched_labels,
                } => {
                    live_output.debug(&verdict_line(
                        &record.file,
                        record.primary_found,
                        record.secondary_found,
                        matched_labels,
                    ));
                }
                DocumentOutcome::Skipped(skip) => {
                    live_output.warning(&format!("Skipping {}: {}", skip.file, skip.reason));
                }
                DocumentOutcome::NotProcessed => {}
            }
        };

        let batch = processor.process(documents, &self.shutdown, Some(&callback))?;

        if batch.interrupted {
            progress.abandon_with_message("Interrupted, saving partial results");
        } else {
            progress.finish_with_message(&format!("{} documents processed", batch.processed()));
        }

        Ok(batch)
    }

    fn log_parser_choice(&self, selected: &str) {
        match (self.config.extraction.parser.as_str(), selected) {
            ("auto", "citation") => {
                self.output_formatter
                    .info("Using citation metadata parser for field extraction.");
            }
            ("auto", _) => {
                self.output_formatter
                    .info("Citation parser not available in this build, using generic extraction.");
            }
            _ => {
                self.output_formatter
                    .debug(&format!("Field extraction strategy: {}", selected));
            }
        }
    }

    fn create_run_report(
        &self,
        documents: &[DocumentFile],
        batch: &BatchOutcome,
        start_time: Instant,
    ) -> RunReport {
        RunReport {
            input_dir: self.config.discovery.input_dir.display().to_string(),
            output_dir: self.config.output.directory.display().to_string(),
            parser: self.config.extraction.parser.clone(),
            threads: resolve_thread_count(self.config.pipeline.threads, documents.len()),
            documents_found: documents.len(),
            matched: batch.matched.len(),
            unmatched: batch.unmatched.len(),
            skipped: batch.skipped.len(),
            not_processed: batch.not_processed,
            interrupted: batch.interrupted,
            duration_ms: start_time.elapsed().as_millis(),
            completed_at: Utc::now(),
        }
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path.as_ref(), sample_config).map_err(SiftError::Io)?;
        Ok(())
    }

    /// Get configuration reference
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get output formatter reference
    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    /// Get progress manager reference
    pub fn progress_manager(&self) -> &ProgressManager {
        &self.progress_manager
    }

    /// Check if shutdown has been requested
    pub fn is_running(&self) -> bool {
        self.shutdown.is_running()
    }

    /// Request graceful shutdown
    pub fn request_shutdown(&self) {
        self.shutdown.request_shutdown();
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &SiftError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

/// One debug line per document. Names the rules that hit so a surprising
/// verdict can be traced back to its pattern.
fn verdict_line(file: &str, primary: bool, secondary: bool, labels: &[String]) -> String {
    let mut line = format!("{} -> primary={} secondary={}", file, primary, secondary);
    if !labels.is_empty() {
        line.push_str(&format!(" (rules: {})", labels.join(", ")));
    }
    line
}

/// Get version information
pub fn version_info() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Get build information
pub fn build_info() -> BuildInfo {
    BuildInfo {
        version: env!("CARGO_PKG_VERSION"),
        build_date: option_env!("BUILD_DATE").unwrap_or("unknown"),
        target: std::env::consts::ARCH.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct BuildInfo {
    pub version: &'static str,
    pub build_date: &'static str,
    pub target: String,
}

impl std::fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "PaperSift {} built on {} for {}",
            self.version, self.build_date, self.target
        )
    }
}
