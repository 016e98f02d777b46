//! Export of a synthesized procedure into source artifacts.
//!
//! This module provides the [`Exporter`] trait that turns a built
//! [`Procedure`] into named text [`Artifact`]s. It is the final stage of the
//! fwpr pipeline; writing artifacts to disk is left to the caller.
//!
//! # Pipeline Position
//!
//! ```text
//! Editor Document
//!     ↓ ingest
//! Model
//!     ↓ build
//! Procedure Descriptor
//!     ↓ classify + synthesize
//! Execution Plan
//!     ↓ export (this module)
//! Artifacts
//! ```
//!
//! # Available Backends
//!
//! - [`c`] - C99 header and body files via [`c::CExporter`]

/// C export backend.
pub mod c;

mod doxygen;

use std::fmt;

use crate::Procedure;

/// A generated text file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    file_name: String,
    description: String,
    content: String,
}

impl Artifact {
    pub fn new(
        file_name: impl Into<String>,
        description: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            description: description.into(),
            content: content.into(),
        }
    }

    /// File name, without directory.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// One-line summary of what the file holds.
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Abstraction for export backends.
pub trait Exporter {
    /// Exports a procedure into the backend's artifacts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the backend cannot honour its
    /// configuration.
    fn export(&self, procedure: &Procedure) -> Result<Vec<Artifact>, Error>;
}

/// Errors that can occur during export.
///
/// This type is converted into [`FwprError::Export`] at the crate boundary.
///
/// [`FwprError::Export`]: crate::FwprError::Export
#[derive(Debug)]
pub enum Error {
    /// A configuration value the backend cannot work with.
    InvalidConfig(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig(msg) => write!(f, "Invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for Error {}
