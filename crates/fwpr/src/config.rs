//! Configuration types for fwpr code generation.
//!
//! This module provides configuration structures that control how generated
//! code is named and laid out. All types implement [`serde::Deserialize`] for
//! loading from external sources.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level application configuration combining naming and codegen settings.
//! - [`NamingConfig`] - Prefixes and suffixes of generated files and identifiers.
//! - [`CodegenConfig`] - Layout and optional features of the generated code.
//!
//! # Example
//!
//! ```
//! # use fwpr::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.naming().function_prefix(), "FwPr");
//! assert_eq!(config.codegen().indent_width(), 4);
//! ```

use serde::Deserialize;

/// Top-level application configuration combining naming and codegen settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Naming configuration section.
    #[serde(default)]
    naming: NamingConfig,

    /// Codegen configuration section.
    #[serde(default)]
    codegen: CodegenConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the specified sections.
    pub fn new(naming: NamingConfig, codegen: CodegenConfig) -> Self {
        Self { naming, codegen }
    }

    /// Returns the naming configuration.
    pub fn naming(&self) -> &NamingConfig {
        &self.naming
    }

    /// Returns the codegen configuration.
    pub fn codegen(&self) -> &CodegenConfig {
        &self.codegen
    }
}

/// Prefixes and suffixes applied to generated names.
///
/// With the defaults, procedure `Blink` with action node `Led` yields the
/// files `FwPrBlink.h`, `FwPrBlinkUser.h` and `FwPrBlink.c`, the function
/// `FwPrBlinkLed` and the enumerator `eBlinkLed`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    file_prefix: String,
    function_prefix: String,
    enum_prefix: String,
    user_suffix: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            file_prefix: "FwPr".to_string(),
            function_prefix: "FwPr".to_string(),
            enum_prefix: "e".to_string(),
            user_suffix: "User".to_string(),
        }
    }
}

impl NamingConfig {
    pub fn new(
        file_prefix: impl Into<String>,
        function_prefix: impl Into<String>,
        enum_prefix: impl Into<String>,
        user_suffix: impl Into<String>,
    ) -> Self {
        Self {
            file_prefix: file_prefix.into(),
            function_prefix: function_prefix.into(),
            enum_prefix: enum_prefix.into(),
            user_suffix: user_suffix.into(),
        }
    }

    /// Prefix of every generated file name.
    pub fn file_prefix(&self) -> &str {
        &self.file_prefix
    }

    /// Prefix of every generated function and type name.
    pub fn function_prefix(&self) -> &str {
        &self.function_prefix
    }

    /// Prefix of the node enumerators.
    pub fn enum_prefix(&self) -> &str {
        &self.enum_prefix
    }

    /// Suffix distinguishing the files the user implements.
    pub fn user_suffix(&self) -> &str {
        &self.user_suffix
    }
}

/// Layout and optional features of the generated code.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CodegenConfig {
    indent_width: usize,
    exec_counters: bool,
    max_comment_width: usize,
    user_stub: bool,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            indent_width: 4,
            exec_counters: false,
            max_comment_width: 80,
            user_stub: true,
        }
    }
}

impl CodegenConfig {
    pub fn new(
        indent_width: usize,
        exec_counters: bool,
        max_comment_width: usize,
        user_stub: bool,
    ) -> Self {
        Self {
            indent_width,
            exec_counters,
            max_comment_width,
            user_stub,
        }
    }

    /// Number of spaces per indentation level.
    pub fn indent_width(&self) -> usize {
        self.indent_width
    }

    /// Whether execution counters and their accessors are generated.
    pub fn exec_counters(&self) -> bool {
        self.exec_counters
    }

    /// Column at which documentation comments are wrapped.
    pub fn max_comment_width(&self) -> usize {
        self.max_comment_width
    }

    /// Whether a template implementation of the user callbacks is generated.
    pub fn user_stub(&self) -> bool {
        self.user_stub
    }
}
