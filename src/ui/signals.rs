use crate::error::{Result, SiftError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub struct GracefulShutdown {
    running: Arc<AtomicBool>,
    shutdown_message_shown: Arc<AtomicBool>,
}

impl GracefulShutdown {
    pub fn new() -> Result<Self> {
        let running = Arc::new(AtomicBool::new(true));
        let shutdown_message_shown = Arc::new(AtomicBool::new(false));

        let running_clone = running.clone();
        let message_shown_clone = shutdown_message_shown.clone();

        // Handle Ctrl+C gracefully
        ctrlc::set_handler(move || {
            running_clone.store(false, Ordering::SeqCst);

            if !message_shown_clone.swap(true, Ordering::SeqCst) {
                eprintln!(
                    "\n🛑 Gracefully stopping... saving partial results \
                     (press Ctrl+C again to force exit)"
                );
            } else {
                eprintln!("\n💀 Force stopping...");
                std::process::exit(1);
            }
        })
        .map_err(|e| SiftError::Config {
            message: format!("Failed to set signal handler: {}", e),
        })?;

        Ok(Self {
            running,
            shutdown_message_shown,
        })
    }

    /// Create a GracefulShutdown instance for testing (no signal handler registration)
    pub fn new_for_test() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
            shutdown_message_shown: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn check_shutdown(&self) -> Result<()> {
        if !self.is_running() {
            return Err(SiftError::Cancelled);
        }
        Ok(())
    }

    pub fn request_shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.running.store(true, Ordering::SeqCst);
        self.shutdown_message_shown.store(false, Ordering::SeqCst);
    }

    pub fn with_shutdown_check<F, R>(&self, operation: F) -> Result<R>
    where
        F: FnOnce() -> Result<R>,
    {
        self.check_shutdown()?;
        let result = operation()?;
        self.check_shutdown()?;
        Ok(result)
    }
}

impl Default for GracefulShutdown {
    fn default() -> Self {
        Self::new().unwrap_or_else(|_| {
            // Fallback if signal handler setup fails
            Self {
                running: Arc::new(AtomicBool::new(true)),
                shutdown_message_shown: Arc::new(AtomicBool::new(false)),
            }
        })
    }
}
