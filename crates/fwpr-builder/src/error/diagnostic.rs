//! The core diagnostic type for the fwpr error system.
//!
//! A [`Diagnostic`] represents a single error or warning with optional
//! error code, labeled model elements, and help text.

use std::fmt;

use crate::error::{ErrorCode, Label, Severity};

/// A diagnostic message about the input model.
///
/// # Example
///
/// ```text
/// error[E101]: connection `c12` refers to unknown element `state_99`
///   element c12: dangling endpoint
///   help: reconnect the connection in the editor
/// ```
#[derive(Debug, Clone)]
pub struct Diagnostic {
    severity: Severity,
    code: Option<ErrorCode>,
    message: String,
    labels: Vec<Label>,
    help: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    ///
    /// # Example
    ///
    /// ```
    /// # use fwpr_builder::error::{Diagnostic, ErrorCode};
    /// let diag = Diagnostic::error("element `state_4` has no kind")
    ///     .with_code(ErrorCode::E001)
    ///     .with_label("state_4", "missing kind");
    /// assert!(diag.severity().is_error());
    /// ```
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Get the severity of this diagnostic.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Get the error code, if any.
    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    /// Get the primary message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get all labels attached to this diagnostic.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Get the help text, if any.
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Returns the ids of all labeled elements, primary labels first.
    pub fn elements(&self) -> impl Iterator<Item = &str> {
        let primary = self.labels.iter().filter(|l| l.is_primary());
        let secondary = self.labels.iter().filter(|l| l.is_secondary());
        primary.chain(secondary).map(Label::element)
    }

    /// Set the error code.
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Add a primary label to this diagnostic.
    pub fn with_label(mut self, element: impl Into<String>, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(element, message));
        self
    }

    /// Add a secondary label to this diagnostic.
    pub fn with_secondary_label(
        mut self,
        element: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        self.labels.push(Label::secondary(element, message));
        self
    }

    /// Set the help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            labels: Vec::new(),
            help: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Format: "error[E001]: message" or "error: message"
        write!(f, "{}", self.severity)?;
        if let Some(code) = self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for Diagnostic {}
