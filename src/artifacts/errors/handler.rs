use derive_new::new;
use tracing::warn;

/// Decides what happens when a source cannot be read.
///
/// `handle_error` returns `true` to keep going (the affected node or pair is then
/// treated as different) and `false` to abort. The sticky `has_errors` flag is
/// never cleared by the engine.
pub trait ErrorHandler {
    fn handle_error(&mut self, error: &anyhow::Error) -> bool;

    fn log_error(&mut self, error: &anyhow::Error);

    fn has_errors(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    #[default]
    Abort,
    Ignore,
}

/// Error handler recording every failure and answering with a fixed policy
#[derive(Debug, Default, new)]
pub struct ReportingErrorHandler {
    policy: ErrorPolicy,
    #[new(default)]
    messages: Vec<String>,
    #[new(default)]
    failed: bool,
}

impl ReportingErrorHandler {
    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    fn record(&mut self, error: &anyhow::Error) {
        self.failed = true;
        self.messages.push(format!("{error:#}"));
    }
}

impl ErrorHandler for ReportingErrorHandler {
    fn handle_error(&mut self, error: &anyhow::Error) -> bool {
        self.record(error);

        match self.policy {
            ErrorPolicy::Ignore => {
                warn!(error = %format!("{error:#}"), "ignoring error");
                true
            }
            ErrorPolicy::Abort => false,
        }
    }

    fn log_error(&mut self, error: &anyhow::Error) {
        warn!(error = %format!("{error:#}"), "error reported");
        self.record(error);
    }

    fn has_errors(&self) -> bool {
        self.failed
    }
}
