//! Event Recorder: ordered capture of console output and page errors.
//!
//! The recorder is registered on the page's CDP event streams before
//! navigation begins and stays active for the whole session, so events
//! emitted during load are not lost. Handlers are side-effect-only: they
//! append to their log and return. They never block the session's event
//! loop and never panic; a failure to record is swallowed rather than
//! allowed to abort the scenario.
//!
//! The two logs (console, page errors) are independent orderings. Within
//! each log the sequence position is strictly increasing insertion order,
//! even though events arrive asynchronously relative to the driver's
//! phases.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex};

/// Console message severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConsoleSeverity {
    /// console.log
    Log,
    /// console.info
    Info,
    /// console.warn
    Warning,
    /// console.error
    Error,
    /// console.debug
    Debug,
}

impl fmt::Display for ConsoleSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Log => write!(f, "log"),
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
            Self::Debug => write!(f, "debug"),
        }
    }
}

impl ConsoleSeverity {
    /// Parse a severity tag leniently; unknown tags fold to `Log`.
    #[must_use]
    pub fn parse(tag: &str) -> Self {
        match tag.to_lowercase().as_str() {
            "error" | "assert" => Self::Error,
            "warn" | "warning" => Self::Warning,
            "info" => Self::Info,
            "debug" | "trace" => Self::Debug,
            _ => Self::Log,
        }
    }
}

/// A recorded console message. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleEvent {
    /// Severity tag reported by the page
    pub severity: ConsoleSeverity,
    /// Message text
    pub text: String,
    /// Insertion order within the console log, strictly increasing
    pub seq: u64,
}

/// A recorded uncaught page error. Immutable once recorded.
///
/// Kept in a separate log from [`ConsoleEvent`]: an uncaught runtime
/// fault is a distinct failure class from intentional logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageErrorEvent {
    /// Error text
    pub text: String,
    /// Insertion order within the error log, strictly increasing
    pub seq: u64,
}

/// Accumulates console and page-error events in emission order.
///
/// Cloning is cheap; all clones share the same logs, so the handle can be
/// moved into the event-drain tasks while the driver keeps its own copy
/// for the report. Writers append, the synthesizer reads after teardown;
/// the two never overlap.
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    console: Arc<Mutex<Vec<ConsoleEvent>>>,
    errors: Arc<Mutex<Vec<PageErrorEvent>>>,
}

impl EventRecorder {
    /// Create a new recorder with empty logs
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a console message.
    ///
    /// Never panics: if the log is unavailable the event is dropped.
    pub fn on_console(&self, severity: ConsoleSeverity, text: impl Into<String>) {
        if let Ok(mut log) = self.console.lock() {
            let seq = log.len() as u64;
            log.push(ConsoleEvent {
                severity,
                text: text.into(),
                seq,
            });
        }
    }

    /// Record an uncaught page error.
    ///
    /// Never panics: if the log is unavailable the event is dropped.
    pub fn on_page_error(&self, text: impl Into<String>) {
        if let Ok(mut log) = self.errors.lock() {
            let seq = log.len() as u64;
            log.push(PageErrorEvent {
                text: text.into(),
                seq,
            });
        }
    }

    /// Snapshot of all console events in emission order
    #[must_use]
    pub fn console_events(&self) -> Vec<ConsoleEvent> {
        self.console.lock().map(|log| log.clone()).unwrap_or_default()
    }

    /// Snapshot of all page errors in emission order
    #[must_use]
    pub fn page_errors(&self) -> Vec<PageErrorEvent> {
        self.errors.lock().map(|log| log.clone()).unwrap_or_default()
    }

    /// Number of console events recorded so far
    #[must_use]
    pub fn console_count(&self) -> usize {
        self.console.lock().map(|log| log.len()).unwrap_or(0)
    }

    /// Number of page errors recorded so far
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors.lock().map(|log| log.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_severity_parse_lenient() {
        assert_eq!(ConsoleSeverity::parse("error"), ConsoleSeverity::Error);
        assert_eq!(ConsoleSeverity::parse("WARN"), ConsoleSeverity::Warning);
        assert_eq!(ConsoleSeverity::parse("warning"), ConsoleSeverity::Warning);
        assert_eq!(ConsoleSeverity::parse("info"), ConsoleSeverity::Info);
        assert_eq!(ConsoleSeverity::parse("debug"), ConsoleSeverity::Debug);
        assert_eq!(ConsoleSeverity::parse("table"), ConsoleSeverity::Log);
    }

    #[test]
    fn test_console_order_preserved() {
        let recorder = EventRecorder::new();
        recorder.on_console(ConsoleSeverity::Log, "first");
        recorder.on_console(ConsoleSeverity::Error, "second");
        recorder.on_console(ConsoleSeverity::Info, "third");

        let events = recorder.console_events();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].text, "first");
        assert_eq!(events[1].text, "second");
        assert_eq!(events[2].text, "third");
        assert_eq!(events[0].seq, 0);
        assert_eq!(events[2].seq, 2);
    }

    #[test]
    fn test_logs_are_independent() {
        let recorder = EventRecorder::new();
        recorder.on_console(ConsoleSeverity::Log, "message");
        recorder.on_page_error("boom");
        recorder.on_page_error("boom again");

        assert_eq!(recorder.console_count(), 1);
        assert_eq!(recorder.error_count(), 2);
        // Each log numbers from zero independently.
        assert_eq!(recorder.console_events()[0].seq, 0);
        assert_eq!(recorder.page_errors()[0].seq, 0);
        assert_eq!(recorder.page_errors()[1].seq, 1);
    }

    #[test]
    fn test_clones_share_logs() {
        let recorder = EventRecorder::new();
        let writer = recorder.clone();
        writer.on_page_error("seen by both");
        assert_eq!(recorder.error_count(), 1);
    }

    #[test]
    fn test_concurrent_appends_keep_per_log_order() {
        let recorder = EventRecorder::new();
        let mut handles = Vec::new();
        for t in 0..4 {
            let writer = recorder.clone();
            handles.push(std::thread::spawn(move || {
                for i in 0..50 {
                    writer.on_console(ConsoleSeverity::Log, format!("t{t}-{i}"));
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let events = recorder.console_events();
        assert_eq!(events.len(), 200);
        // Sequence positions are strictly increasing regardless of which
        // thread won each append.
        for (i, event) in events.iter().enumerate() {
            assert_eq!(event.seq, i as u64);
        }
        // Per-writer emission order is preserved within the shared log.
        for t in 0..4 {
            let prefix = format!("t{t}-");
            let own: Vec<&ConsoleEvent> = events
                .iter()
                .filter(|e| e.text.starts_with(&prefix))
                .collect();
            for (i, event) in own.iter().enumerate() {
                assert_eq!(event.text, format!("t{t}-{i}"));
            }
        }
    }

    proptest! {
        /// For any interleaving of console and error emissions, each log
        /// preserves its own emission order with no drops.
        #[test]
        fn prop_interleaved_emissions_preserve_order(script in proptest::collection::vec(any::<bool>(), 0..64)) {
            let recorder = EventRecorder::new();
            let mut expected_console = Vec::new();
            let mut expected_errors = Vec::new();

            for (i, is_console) in script.iter().enumerate() {
                if *is_console {
                    recorder.on_console(ConsoleSeverity::Log, format!("c{i}"));
                    expected_console.push(format!("c{i}"));
                } else {
                    recorder.on_page_error(format!("e{i}"));
                    expected_errors.push(format!("e{i}"));
                }
            }

            let console: Vec<String> =
                recorder.console_events().into_iter().map(|e| e.text).collect();
            let errors: Vec<String> =
                recorder.page_errors().into_iter().map(|e| e.text).collect();
            prop_assert_eq!(console, expected_console);
            prop_assert_eq!(errors, expected_errors);
        }
    }
}
