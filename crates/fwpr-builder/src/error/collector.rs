//! Collector for accumulating diagnostics during a build phase.
//!
//! The [`DiagnosticCollector`] lets a phase report every problem of a model
//! instead of stopping at the first one.

use log::warn;

use crate::error::{BuildError, Diagnostic};

/// A collector for accumulating diagnostics during a build phase.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
    has_errors: bool,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a diagnostic to this collector.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity().is_error() {
            self.has_errors = true;
        }
        self.diagnostics.push(diagnostic);
    }

    /// Returns `true` if an error has been emitted.
    pub fn has_errors(&self) -> bool {
        self.has_errors
    }

    /// Finish collection and return a result.
    ///
    /// - If there are errors, returns `Err(BuildError)` with all diagnostics.
    /// - If there are only warnings, logs them and returns `Ok(())`.
    pub fn finish(self) -> Result<(), BuildError> {
        if self.has_errors {
            return Err(BuildError::new(self.diagnostics));
        }
        for diagnostic in &self.diagnostics {
            let elements: Vec<&str> = diagnostic.elements().collect();
            warn!(elements:?; "{diagnostic}");
        }
        Ok(())
    }
}
