//! Descriptor builder for graphical procedure models.
//!
//! This crate turns the element and connection lists exported by a
//! procedure editor into a validated [`ProcedureDescriptor`]:
//!
//! 1. **Ingestion** - [`editor::from_json`] reads the editor's JSON document
//!    into a raw [`model::Model`]. Models may also be assembled in code.
//! 2. **Resolution** - elements become nodes, notes and anchors; connections
//!    become edges or note links; notes are attached to the nodes their
//!    anchors sit in.
//! 3. **Validation** - the structural rules of a procedure are checked.
//!
//! Every problem is reported as a [`Diagnostic`]; a failed build returns all
//! of them at once in a [`BuildError`].
//!
//! [`ProcedureDescriptor`]: fwpr_core::descriptor::ProcedureDescriptor

pub mod attach;
pub mod editor;
pub mod error;
pub mod model;

mod builder;
mod validate;

pub use builder::{BuildOutcome, DEFAULT_PROCEDURE_NAME, RESERVED_NAMES, build};
pub use error::{BuildError, Diagnostic, ErrorCode};
