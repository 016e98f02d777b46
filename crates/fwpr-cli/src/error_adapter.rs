//! Error adapter for converting FwprError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI.
//!
//! # Element labels
//!
//! Model diagnostics point at element ids rather than at source text. The
//! adapter lists the labelled ids, one per line, and hands that listing to
//! miette as the snippet to annotate.
//!
//! # Multi-Error Support
//!
//! When a [`fwpr_builder::BuildError`] contains multiple diagnostics, each
//! diagnostic is rendered independently.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, SourceSpan};

use fwpr::FwprError;
use fwpr_builder::error::{Diagnostic, Severity};

/// Adapter for a single model diagnostic.
pub struct DiagnosticAdapter<'a> {
    /// The wrapped diagnostic
    diag: &'a Diagnostic,
    /// Labelled element ids, one per line
    elements: String,
}

impl<'a> DiagnosticAdapter<'a> {
    /// Create a new diagnostic adapter.
    pub fn new(diag: &'a Diagnostic) -> Self {
        let elements = diag
            .labels()
            .iter()
            .map(|label| label.element())
            .collect::<Vec<_>>()
            .join("\n");
        Self { diag, elements }
    }
}

impl fmt::Debug for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticAdapter")
            .field("diag", &self.diag)
            .finish()
    }
}

impl fmt::Display for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.diag.message())
    }
}

impl std::error::Error for DiagnosticAdapter<'_> {}

impl MietteDiagnostic for DiagnosticAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .code()
            .map(|c| Box::new(c) as Box<dyn fmt::Display>)
    }

    fn severity(&self) -> Option<miette::Severity> {
        match self.diag.severity() {
            Severity::Error => Some(miette::Severity::Error),
            Severity::Warning => Some(miette::Severity::Warning),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .help()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        if self.elements.is_empty() {
            return None;
        }
        Some(&self.elements as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let labels = self.diag.labels();
        if labels.is_empty() {
            return None;
        }

        let mut offset = 0;
        Some(Box::new(labels.iter().map(move |label| {
            let len = label.element().len();
            let span = SourceSpan::new(offset.into(), len);
            offset += len + 1;
            let message = Some(label.message().to_string());
            if label.is_primary() {
                LabeledSpan::new_primary_with_span(message, span)
            } else {
                LabeledSpan::new_with_span(message, span)
            }
        })))
    }
}

/// Adapter for non-diagnostic [`FwprError`] variants.
///
/// This adapter handles errors that don't carry model diagnostics, such as
/// I/O errors, malformed documents, internal defects and export errors.
pub struct ErrorAdapter<'a>(pub &'a FwprError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            FwprError::Io(_) => "fwpr::io",
            FwprError::Ingest(_) => "fwpr::ingest",
            FwprError::Build { .. } => return None,
            FwprError::Invariant(_) => "fwpr::invariant",
            FwprError::Export(_) => "fwpr::export",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match &self.0 {
            FwprError::Ingest(_) => "the input must be a document saved by the procedure editor",
            FwprError::Invariant(_) => {
                "the model passed validation, so this is a bug in fwpr; please report it"
            }
            _ => return None,
        };
        Some(Box::new(help))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        None
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}

/// A reportable error that can be rendered by miette.
///
/// This enum wraps either a single diagnostic or a non-diagnostic error,
/// providing a uniform interface for error rendering.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A model diagnostic labelling element ids.
    Diagnostic(DiagnosticAdapter<'a>),
    /// A simple error without element labels.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Diagnostic(d) => fmt::Display::fmt(d, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Diagnostic(_) => None,
            Reportable::Error(e) => e.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn severity(&self) -> Option<miette::Severity> {
        match self {
            Reportable::Diagnostic(d) => d.severity(),
            Reportable::Error(e) => e.severity(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.help(),
            Reportable::Error(e) => e.help(),
        }
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        match self {
            Reportable::Diagnostic(d) => d.source_code(),
            Reportable::Error(e) => e.source_code(),
        }
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        match self {
            Reportable::Diagnostic(d) => d.labels(),
            Reportable::Error(e) => e.labels(),
        }
    }
}

/// Convert a [`FwprError`] into a list of reportable errors.
///
/// For [`FwprError::Build`], this returns one [`Reportable`] for each
/// diagnostic in the error. For other error variants, this returns a single
/// [`Reportable`].
pub fn to_reportables(err: &FwprError) -> Vec<Reportable<'_>> {
    match err {
        FwprError::Build { err: build_err, .. } => build_err
            .diagnostics()
            .iter()
            .map(|d| Reportable::Diagnostic(DiagnosticAdapter::new(d)))
            .collect(),
        _ => vec![Reportable::Error(ErrorAdapter(err))],
    }
}

#[cfg(test)]
mod tests {
    use fwpr_builder::{BuildError, ErrorCode};

    use super::*;

    fn build_error(diagnostics: Vec<Diagnostic>) -> FwprError {
        FwprError::new_build_error(BuildError::from(diagnostics), "Test")
    }

    #[test]
    fn test_single_diagnostic() {
        let diag = Diagnostic::error("duplicate name")
            .with_code(ErrorCode::E100)
            .with_label("s3", "here")
            .with_help("rename it");
        let err = build_error(vec![diag]);

        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 1);

        match &reportables[0] {
            Reportable::Diagnostic(d) => {
                assert_eq!(d.to_string(), "duplicate name");
                assert_eq!(d.code().unwrap().to_string(), "E100");
                assert_eq!(d.help().unwrap().to_string(), "rename it");
            }
            Reportable::Error(_) => panic!("Expected Diagnostic"),
        }
    }

    #[test]
    fn test_multiple_diagnostics() {
        let err = build_error(vec![
            Diagnostic::error("first error").with_label("a", "first"),
            Diagnostic::error("second error").with_label("b", "second"),
            Diagnostic::warning("a warning"),
        ]);

        let reportables = to_reportables(&err);
        assert_eq!(reportables.len(), 3);
        assert_eq!(reportables[0].to_string(), "first error");
        assert_eq!(reportables[1].to_string(), "second error");
        assert_eq!(reportables[2].severity(), Some(miette::Severity::Warning));
        assert!(reportables[2].source_code().is_none());
    }

    #[test]
    fn test_invariant_error() {
        let err = FwprError::Invariant("flattening did not terminate".to_string());

        let reportables = to_reportables(&err);

        assert_eq!(reportables.len(), 1);
        match &reportables[0] {
            Reportable::Error(e) => {
                assert_eq!(
                    e.to_string(),
                    "Internal invariant violated: flattening did not terminate"
                );
                assert_eq!(e.code().unwrap().to_string(), "fwpr::invariant");
                assert!(e.help().is_some());
            }
            Reportable::Diagnostic(_) => panic!("Expected Error"),
        }
    }

    #[test]
    fn test_labels_point_at_element_lines() {
        let diag = Diagnostic::error("duplicate name")
            .with_label("state_7", "duplicate")
            .with_secondary_label("s2", "first used here");

        let adapter = DiagnosticAdapter::new(&diag);
        let labels: Vec<_> = adapter.labels().unwrap().collect();

        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0].label(), Some("duplicate"));
        assert_eq!(labels[0].offset(), 0);
        assert_eq!(labels[0].len(), 7);
        assert!(labels[0].primary());
        assert_eq!(labels[1].offset(), 8);
        assert_eq!(labels[1].len(), 2);
        assert!(!labels[1].primary());
    }
}
