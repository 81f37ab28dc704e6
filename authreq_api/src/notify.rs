//! User-facing side effects: error notifications and navigation.

/// Displays a transient, user-facing error message. Fire-and-forget.
pub trait Notifier: Send + Sync {
    fn error(&self, text: &str);
}

/// Changes the current view without adding a history entry.
pub trait Navigator: Send + Sync {
    fn replace(&self, path: &str);
}

/// Notifier that emits messages as `tracing` error events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn error(&self, text: &str) {
        tracing::error!("{}", text);
    }
}

/// Navigator that only logs the redirect target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNavigator;

impl Navigator for TracingNavigator {
    fn replace(&self, path: &str) {
        tracing::info!("Redirecting to {}", path);
    }
}
