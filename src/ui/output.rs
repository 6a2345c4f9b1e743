use crate::error::{SiftError, UserFriendlyError};
use crate::pipeline::BatchOutcome;
use crate::report::WrittenReports;
use crate::RunReport;
use console::{style, Emoji, Term};
use serde_json;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

impl OutputMode {
    pub fn from_string(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputMode::Json,
            "plain" => OutputMode::Plain,
            _ => OutputMode::Human,
        }
    }
}

// Emojis with text fallbacks
static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static ROCKET: Emoji = Emoji("🚀 ", "> ");
static SPARKLES: Emoji = Emoji("✨ ", "* ");

pub struct OutputFormatter {
    #[allow(dead_code)]
    term: Term,
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let term = Term::stdout();
        let use_colors = match mode {
            OutputMode::Human => term.features().colors_supported() && !quiet,
            _ => false,
        };

        Self {
            term,
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    // Core messaging methods
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Success, message),
            OutputMode::Json => self.print_json_message("success", message),
            OutputMode::Plain => println!("SUCCESS: {}", message),
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Error, message),
            OutputMode::Json => self.print_json_message("error", message),
            OutputMode::Plain => eprintln!("ERROR: {}", message),
        }
    }

    // Warnings and info belong to the default run output; only --quiet
    // hides them. Per-document skip warnings and the no-match notice must
    // reach a plain invocation.
    pub fn warning(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Warning, message),
                OutputMode::Json => self.print_json_message("warning", message),
                OutputMode::Plain => println!("WARNING: {}", message),
            }
        }
    }

    pub fn info(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Info, message),
                OutputMode::Json => self.print_json_message("info", message),
                OutputMode::Plain => println!("INFO: {}", message),
            }
        }
    }

    pub fn debug(&self, message: &str) {
        if self.should_show_message(2) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("  {}", style(message).dim());
                    } else {
                        println!("  DEBUG: {}", message);
                    }
                }
                OutputMode::Json => self.print_json_message("debug", message),
                OutputMode::Plain => println!("DEBUG: {}", message),
            }
        }
    }

    pub fn start_operation(&self, operation: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("{}{}", ROCKET, style(operation).bold());
                    } else {
                        println!("> {}", operation);
                    }
                }
                OutputMode::Json => self.print_json_message("operation_start", operation),
                OutputMode::Plain => println!("STARTING: {}", operation),
            }
        }
    }

    // User-friendly error handling
    pub fn print_user_friendly_error(&self, error: &SiftError) {
        let user_message = error.user_message();
        self.error(&user_message);

        if let Some(suggestion) = error.suggestion() {
            match self.mode {
                OutputMode::Human => {
                    println!();
                    if self.use_colors {
                        println!(
                            "{}{}",
                            INFO,
                            style(&format!("Suggestion: {}", suggestion)).cyan()
                        );
                    } else {
                        println!("Suggestion: {}", suggestion);
                    }
                }
                OutputMode::Json => {
                    self.print_json_object(&serde_json::json!({
                        "type": "suggestion",
                        "message": suggestion
                    }));
                }
                OutputMode::Plain => {
                    println!("SUGGESTION: {}", suggestion);
                }
            }
        }
    }

    // Summary and reporting
    pub fn print_run_summary(&self, batch: &BatchOutcome, written: &WrittenReports) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => self.print_human_summary(batch, written),
            OutputMode::Json => self.print_json_summary(batch, written),
            OutputMode::Plain => self.print_plain_summary(batch, written),
        }
    }

    /// The run report duplicates the summary for humans, so the readable
    /// modes only show it when verbose; JSON mode always emits it as the
    /// machine-readable result.
    pub fn print_run_report(&self, report: &RunReport) {
        match self.mode {
            OutputMode::Human => {
                if self.should_show_message(1) {
                    self.print_human_report(report);
                }
            }
            OutputMode::Json => {
                let json_output =
                    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string());
                println!("{}", json_output);
            }
            OutputMode::Plain => {
                if self.should_show_message(1) {
                    self.print_plain_report(report);
                }
            }
        }
    }

    // Specialized output methods
    pub fn print_header(&self, title: &str) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                println!();
                if self.use_colors {
                    println!("{} {}", SPARKLES, style(title).bold().cyan());
                } else {
                    println!("=== {} ===", title);
                }
                println!();
            }
            OutputMode::Json => {
                self.print_json_object(&serde_json::json!({
                    "type": "header",
                    "title": title
                }));
            }
            OutputMode::Plain => {
                println!("=== {} ===", title);
            }
        }
    }

    pub fn print_separator(&self) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("{}", style("─".repeat(60)).dim());
                } else {
                    println!("{}", "-".repeat(60));
                }
            }
            OutputMode::Plain => {
                println!("{}", "-".repeat(60));
            }
            OutputMode::Json => {} // No separator in JSON mode
        }
    }

    // Private helper methods
    fn should_show_message(&self, min_verbose_level: u8) -> bool {
        !self.quiet && self.verbose_level >= min_verbose_level
    }

    fn print_human_message(&self, msg_type: MessageType, message: &str) {
        #[allow(clippy::type_complexity)]
        let (emoji, color_fn): (Emoji, Box<dyn Fn(&str) -> console::StyledObject<&str>>) =
            match msg_type {
                MessageType::Success => (CHECKMARK, Box::new(|msg| style(msg).green().bold())),
                MessageType::Error => (CROSS, Box::new(|msg| style(msg).red().bold())),
                MessageType::Warning => (WARNING, Box::new(|msg| style(msg).yellow().bold())),
                MessageType::Info => (INFO, Box::new(|msg| style(msg).cyan())),
            };

        if self.use_colors {
            match msg_type {
                MessageType::Error => eprintln!("{}{}", emoji, color_fn(message)),
                _ => println!("{}{}", emoji, color_fn(message)),
            }
        } else {
            let prefix = match msg_type {
                MessageType::Success => "✓",
                MessageType::Error => "✗",
                MessageType::Warning => "!",
                MessageType::Info => "i",
            };

            match msg_type {
                MessageType::Error => eprintln!("{} {}", prefix, message),
                _ => println!("{} {}", prefix, message),
            }
        }
    }

    fn print_json_message(&self, level: &str, message: &str) {
        self.print_json_object(&serde_json::json!({
            "type": "message",
            "level": level,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn print_human_summary(&self, batch: &BatchOutcome, written: &WrittenReports) {
        println!();
        self.print_separator();

        if batch.interrupted {
            if self.use_colors {
                println!(
                    "{} {}",
                    style("Corpus build interrupted, partial results saved.")
                        .yellow()
                        .bold(),
                    WARNING
                );
            } else {
                println!("! Corpus build interrupted, partial results saved.");
            }
        } else if self.use_colors {
            println!(
                "{} {}",
                style("Corpus build completed!").green().bold(),
                CHECKMARK
            );
        } else {
            println!("✓ Corpus build completed!");
        }

        println!();
        let count = |n: usize| {
            if self.use_colors {
                style(n).cyan().bold().to_string()
            } else {
                n.to_string()
            }
        };
        println!("  Documents found: {}", count(batch.accounted()));
        println!("  Matched:         {}", count(batch.matched.len()));
        println!("  Unmatched:       {}", count(batch.unmatched.len()));
        if !batch.skipped.is_empty() {
            println!("  Skipped:         {}", count(batch.skipped.len()));
        }
        if batch.not_processed > 0 {
            println!("  Not processed:   {}", count(batch.not_processed));
        }
        println!(
            "  Time taken:      {}",
            if self.use_colors {
                style(format_duration(batch.elapsed)).cyan().bold().to_string()
            } else {
                format_duration(batch.elapsed)
            }
        );

        let mut report_paths = Vec::new();
        if let Some(path) = &written.jsonl_path {
            report_paths.push(path.display().to_string());
        }
        if let Some(path) = &written.csv_path {
            report_paths.push(path.display().to_string());
        }
        if let Some(path) = &written.unmatched_path {
            report_paths.push(path.display().to_string());
        }
        if !report_paths.is_empty() {
            println!();
            println!("  Reports written:");
            for path in report_paths {
                println!("    {}", path);
            }
        }

        self.print_separator();
    }

    fn print_json_summary(&self, batch: &BatchOutcome, written: &WrittenReports) {
        let summary = serde_json::json!({
            "type": "summary",
            "documents_found": batch.accounted(),
            "matched": batch.matched.len(),
            "unmatched": batch.unmatched.len(),
            "skipped": batch.skipped.len(),
            "not_processed": batch.not_processed,
            "interrupted": batch.interrupted,
            "duration_ms": batch.elapsed.as_millis(),
            "jsonl": written.jsonl_path.as_ref().map(|p| p.display().to_string()),
            "csv": written.csv_path.as_ref().map(|p| p.display().to_string()),
            "unmatched_csv": written.unmatched_path.as_ref().map(|p| p.display().to_string()),
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        println!(
            "{}",
            serde_json::to_string_pretty(&summary).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn print_human_report(&self, report: &RunReport) {
        self.print_header("Run Report");

        println!("Input directory:  {}", report.input_dir);
        println!("Output directory: {}", report.output_dir);
        println!("Parser:           {}", report.parser);
        println!("Worker threads:   {}", report.threads);
        println!(
            "Finished at:      {}",
            report.completed_at.format("%Y-%m-%d %H:%M UTC")
        );
        println!();
        println!("Documents found:  {}", report.documents_found);
        println!("Matched:          {}", report.matched);
        println!("Unmatched:        {}", report.unmatched);
        println!("Skipped:          {}", report.skipped);
        if report.not_processed > 0 {
            println!("Not processed:    {}", report.not_processed);
        }
    }

    fn print_plain_report(&self, report: &RunReport) {
        println!("REPORT: Corpus build");
        println!("Input: {}", report.input_dir);
        println!("Output: {}", report.output_dir);
        println!("Parser: {}", report.parser);
        println!("Threads: {}", report.threads);
        println!("Documents: {}", report.documents_found);
        println!("Matched: {}", report.matched);
        println!("Unmatched: {}", report.unmatched);
        println!("Skipped: {}", report.skipped);
        if report.interrupted {
            println!("Interrupted: true");
        }
    }

    fn print_plain_summary(&self, batch: &BatchOutcome, written: &WrittenReports) {
        if batch.interrupted {
            println!("INTERRUPTED: Corpus build stopped early, partial results saved");
        } else {
            println!("COMPLETED: Corpus build");
        }
        println!("Documents found: {}", batch.accounted());
        println!("Matched: {}", batch.matched.len());
        println!("Unmatched: {}", batch.unmatched.len());
        println!("Skipped: {}", batch.skipped.len());
        if batch.not_processed > 0 {
            println!("Not processed: {}", batch.not_processed);
        }
        println!("Duration: {:?}", batch.elapsed);
        if let Some(path) = &written.jsonl_path {
            println!("JSONL: {}", path.display());
        }
        if let Some(path) = &written.csv_path {
            println!("CSV: {}", path.display());
        }
        if let Some(path) = &written.unmatched_path {
            println!("Unmatched CSV: {}", path.display());
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum MessageType {
    Success,
    Error,
    Warning,
    Info,
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}s", secs)
    } else {
        format!("{}ms", duration.as_millis())
    }
}

// Progress-aware output wrapper
pub struct ProgressAwareOutput<'a> {
    formatter: &'a OutputFormatter,
    progress_manager: Option<&'a crate::ui::ProgressManager>,
}

impl<'a> ProgressAwareOutput<'a> {
    pub fn new(
        formatter: &'a OutputFormatter,
        progress_manager: Option<&'a crate::ui::ProgressManager>,
    ) -> Self {
        Self {
            formatter,
            progress_manager,
        }
    }

    pub fn suspend_and_print<F>(&self, f: F)
    where
        F: FnOnce(&OutputFormatter),
    {
        if let Some(pm) = self.progress_manager {
            pm.suspend(|| f(self.formatter));
        } else {
            f(self.formatter);
        }
    }

    pub fn warning(&self, message: &str) {
        self.suspend_and_print(|f| f.warning(message));
    }

    pub fn info(&self, message: &str) {
        self.suspend_and_print(|f| f.info(message));
    }

    pub fn debug(&self, message: &str) {
        self.suspend_and_print(|f| f.debug(message));
    }
}
