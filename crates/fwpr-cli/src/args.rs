//! Command-line argument definitions for the fwpr CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control the input document, the output
//! directory, configuration file selection, and logging verbosity.

use clap::Parser;

/// Command-line arguments for the fwpr procedure code generator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the editor document (JSON)
    #[arg(help = "Path to the input procedure document")]
    pub input: String,

    /// Directory receiving the generated files
    #[arg(short, long, default_value = ".")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
