//! User-facing notifications
//!
//! The check-in flow emits toast-style messages (success, warning, error).
//! The trait keeps the orchestrator independent of the delivery surface so
//! tests can record instead of print.

use tracing::{error, info, warn};

/// Sink for user-facing notifications.
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}

/// Notifier backed by the tracing subscriber (the CLI surface).
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn success(&self, message: &str) {
        info!(kind = "success", "{}", message);
    }

    fn info(&self, message: &str) {
        info!("{}", message);
    }

    fn warn(&self, message: &str) {
        warn!("{}", message);
    }

    fn error(&self, message: &str) {
        error!("{}", message);
    }
}
