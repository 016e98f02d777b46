//! Error types for fwpr operations.
//!
//! This module provides the main error type [`FwprError`] which wraps the
//! error conditions that can occur while turning a procedure model into
//! generated code.

use std::io;

use thiserror::Error;

use fwpr_builder::BuildError;

/// The main error type for fwpr operations.
///
/// # Model errors versus defects
///
/// The `Build` variant carries every diagnostic found in the input model;
/// the modeller fixes those. The `Invariant` variant reports an internal
/// defect that a valid model must never trigger.
#[derive(Debug, Error)]
pub enum FwprError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed editor document: {0}")]
    Ingest(#[from] serde_json::Error),

    #[error("{err}")]
    Build { err: BuildError, model: String },

    #[error("Internal invariant violated: {0}")]
    Invariant(String),

    #[error("Export error: {0}")]
    Export(String),
}

impl From<crate::export::Error> for FwprError {
    fn from(error: crate::export::Error) -> Self {
        Self::Export(error.to_string())
    }
}

impl FwprError {
    /// Create a new `Build` error for the named procedure model.
    pub fn new_build_error(err: BuildError, model: impl Into<String>) -> Self {
        Self::Build {
            err,
            model: model.into(),
        }
    }

    /// Returns `true` if the error is an internal defect rather than a
    /// problem of the input.
    pub fn is_invariant(&self) -> bool {
        matches!(self, Self::Invariant(_))
    }
}
