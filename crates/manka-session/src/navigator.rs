//! Navigation primitives used when a session expires.

use std::sync::Mutex;

use manka_core::Navigator;

/// Navigator that only records the redirect in the log.
///
/// Suitable for headless hosts with no view to replace.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn redirect(&self, path: &str) {
        tracing::info!(path, "redirect requested");
    }
}

/// Navigator backed by a closure supplied by the host.
pub struct FnNavigator<F> {
    redirect: F,
}

impl<F> FnNavigator<F>
where
    F: Fn(&str) + Send + Sync,
{
    /// Wrap a redirect callback.
    #[must_use]
    pub const fn new(redirect: F) -> Self {
        Self { redirect }
    }
}

impl<F> Navigator for FnNavigator<F>
where
    F: Fn(&str) + Send + Sync,
{
    fn redirect(&self, path: &str) {
        (self.redirect)(path);
    }
}

/// Navigator that keeps every requested path.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    redirects: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Paths requested so far, oldest first.
    #[must_use]
    pub fn redirects(&self) -> Vec<String> {
        self.redirects
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Number of redirects requested so far.
    #[must_use]
    pub fn count(&self) -> usize {
        self.redirects.lock().map(|r| r.len()).unwrap_or_default()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, path: &str) {
        if let Ok(mut redirects) = self.redirects.lock() {
            redirects.push(path.to_string());
        }
    }
}
