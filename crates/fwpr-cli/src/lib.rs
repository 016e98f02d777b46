//! CLI logic for the fwpr procedure code generator.
//!
//! This module wires the command-line arguments to the
//! [`ProcedureGenerator`] pipeline and writes the generated files.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{info, warn};

use fwpr::{FwprError, ProcedureGenerator, export::Artifact};

/// Run the fwpr CLI application
///
/// This function reads the editor document, builds the procedure and writes
/// every generated artifact into the output directory. Nothing is written
/// unless generation succeeds for the whole procedure, and a failed write
/// removes the files staged so far.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Returns
///
/// The paths of the written files. The list is empty when the document is
/// not a procedure.
///
/// # Errors
///
/// Returns `FwprError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Malformed editor documents
/// - Model defects
/// - Export errors
pub fn run(args: &Args) -> Result<Vec<PathBuf>, FwprError> {
    info!(
        input_path = args.input,
        output_dir = args.output;
        "Processing procedure"
    );

    // Load configuration
    let app_config = config::load_config(args.config.as_ref())?;

    // Read input file
    let source = fs::read_to_string(&args.input)?;

    let generator = ProcedureGenerator::new(app_config);
    let model = generator.ingest(&source)?;
    let Some(procedure) = generator.build(&model)? else {
        info!(input_path = args.input; "Nothing to generate");
        return Ok(Vec::new());
    };
    let artifacts = generator.generate(&procedure)?;

    let output_dir = Path::new(&args.output);
    fs::create_dir_all(output_dir)?;

    let written = write_artifacts(output_dir, &artifacts)?;
    for path in &written {
        info!(file = path.display().to_string(); "Artifact written");
    }

    Ok(written)
}

/// Writes every artifact into `output_dir`, or none of them.
///
/// The contents go to temporary files first; only when all of them are on
/// disk are they renamed to their final names.
fn write_artifacts(output_dir: &Path, artifacts: &[Artifact]) -> Result<Vec<PathBuf>, FwprError> {
    let mut staged = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        let staging = output_dir.join(format!(".{}.tmp", artifact.file_name()));
        if let Err(err) = fs::write(&staging, artifact.content()) {
            discard(&staged, Some(staging.as_path()));
            return Err(err.into());
        }
        staged.push((staging, output_dir.join(artifact.file_name())));
    }

    let mut written = Vec::with_capacity(staged.len());
    for (pos, (staging, path)) in staged.iter().enumerate() {
        if let Err(err) = fs::rename(staging, path) {
            discard(&staged[pos..], None);
            return Err(err.into());
        }
        written.push(path.clone());
    }
    Ok(written)
}

/// Removes staged files left behind by a failed write.
fn discard(staged: &[(PathBuf, PathBuf)], partial: Option<&Path>) {
    let leftovers = staged.iter().map(|(staging, _)| staging.as_path()).chain(partial);
    for staging in leftovers {
        if let Err(err) = fs::remove_file(staging) {
            warn!(file = staging.display().to_string(), err:% = err; "Failed to remove staged file");
        }
    }
}
