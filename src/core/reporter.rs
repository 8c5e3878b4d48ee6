//! Diagnostic sink passed through the engine and analyzers.
//!
//! Nothing in the core writes to stdout or stderr. Non-blocking problems (a
//! template that misbehaved, an artifact that could not be read) are handed to a
//! `Reporter` and the caller decides what to do with them.

use serde::Serialize;
use std::cell::RefCell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    Trace,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    /// Component or template id that produced the diagnostic.
    pub source: String,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(source: &str, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Warning,
            source: source.to_string(),
            message: message.into(),
        }
    }

    pub fn trace(source: &str, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Trace,
            source: source.to_string(),
            message: message.into(),
        }
    }
}

pub trait Reporter {
    fn report(&self, diagnostic: Diagnostic);
}

/// Drops everything.
pub struct NullReporter;

impl Reporter for NullReporter {
    fn report(&self, _diagnostic: Diagnostic) {}
}

/// Keeps diagnostics in memory for later inspection.
#[derive(Default)]
pub struct CollectingReporter {
    items: RefCell<Vec<Diagnostic>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<Diagnostic> {
        self.items.take()
    }

    pub fn warnings(&self) -> Vec<Diagnostic> {
        self.items
            .borrow()
            .iter()
            .filter(|d| d.level == DiagnosticLevel::Warning)
            .cloned()
            .collect()
    }
}

impl Reporter for CollectingReporter {
    fn report(&self, diagnostic: Diagnostic) {
        self.items.borrow_mut().push(diagnostic);
    }
}
