//! Error and diagnostic system for the descriptor builder.
//!
//! This module provides an error handling system with:
//! - Error codes for documentation and searchability
//! - Multiple labeled model elements for rich error context
//! - Severity levels
//! - Diagnostic collector for accumulating multiple errors
//!
//! # Overview
//!
//! The error system is built around the [`Diagnostic`] type, which represents
//! a single error or warning message with optional error code, the model
//! elements it concerns, and help text. Multiple diagnostics are wrapped in
//! [`BuildError`] for returning from the build.
//!
//! Model elements have no source text positions; labels name the element or
//! connection id as the editor shows it, so the modeller can find it.
//!
//! # Example
//!
//! ```
//! # use fwpr_builder::error::{Diagnostic, ErrorCode};
//! let diag = Diagnostic::error("node name `Check` is used more than once")
//!     .with_code(ErrorCode::E100)
//!     .with_label("state_7", "duplicate name")
//!     .with_secondary_label("state_2", "first used here")
//!     .with_help("rename one of the nodes");
//! ```

mod build_error;
mod collector;
mod diagnostic;
mod error_code;
mod label;
mod severity;

pub(crate) use build_error::Result;
pub(crate) use collector::DiagnosticCollector;

pub use build_error::BuildError;
pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use severity::Severity;
