use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;

pub struct ProgressManager {
    multi_progress: MultiProgress,
    enabled: bool,
}

impl ProgressManager {
    pub fn new(enabled: bool) -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            enabled,
        }
    }

    pub fn create_document_progress(&self, total_documents: u64) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let pb = self.multi_progress.add(ProgressBar::new(total_documents));
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>7}/{len:7} documents {msg}"
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-")
        );
        pb.set_message("Parsing documents...");
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    pub fn create_spinner(&self, message: &str) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let pb = self.multi_progress.add(ProgressBar::new_spinner());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg} ({elapsed})")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        pb.set_message(message.to_string());
        pb
    }

    pub fn suspend<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if self.enabled {
            self.multi_progress.suspend(f)
        } else {
            f()
        }
    }

    pub fn clear(&self) {
        if self.enabled {
            self.multi_progress.clear().ok();
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new(true)
    }
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

// Progress tracking wrapper for operations
pub struct OperationProgress {
    progress_bar: ProgressBar,
    operation_name: String,
    start_time: std::time::Instant,
}

impl OperationProgress {
    pub fn new(progress_manager: &ProgressManager, operation_name: &str, total_units: u64) -> Self {
        let progress_bar = if total_units == 0 {
            progress_manager.create_spinner(operation_name)
        } else {
            progress_manager.create_document_progress(total_units)
        };

        Self {
            progress_bar,
            operation_name: operation_name.to_string(),
            start_time: std::time::Instant::now(),
        }
    }

    pub fn update(&self, current: u64, message: Option<&str>) {
        self.progress_bar.set_position(current);
        if let Some(msg) = message {
            self.progress_bar.set_message(msg.to_string());
        }
    }

    pub fn set_message(&self, message: &str) {
        self.progress_bar.set_message(message.to_string());
    }

    pub fn increment(&self, delta: u64) {
        self.progress_bar.inc(delta);
    }

    pub fn finish_with_message(&self, message: &str) {
        let duration = self.start_time.elapsed();
        let final_message = format!(
            "{}: {} ({})",
            self.operation_name,
            message,
            format_duration(duration)
        );
        self.progress_bar.finish_with_message(final_message);
    }

    pub fn abandon_with_message(&self, message: &str) {
        self.progress_bar.abandon_with_message(message.to_string());
    }
}
