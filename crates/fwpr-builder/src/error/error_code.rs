//! Error codes for the fwpr diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Malformed elements
//! - `E1xx` - Graph resolution errors
//! - `E2xx` - Structural validation errors

use std::fmt;

/// Error codes for categorizing diagnostic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Element Errors (E0xx)
    // =========================================================================
    /// Missing required field.
    ///
    /// An element or connection lacks a field the builder needs, such as an
    /// id, a kind, a rectangle coordinate or a connection order.
    E001,

    /// Unknown element kind.
    ///
    /// The declared kind is none of initial, final, action, decision, note
    /// or anchor.
    E002,

    /// Non-numeric order.
    ///
    /// A connection's order is not a non-negative integer.
    E003,

    /// Invalid identifier.
    ///
    /// A node or procedure name cannot be used inside a generated C
    /// identifier.
    E004,

    /// Reserved name.
    ///
    /// A node name collides with a name of the generated control surface.
    E005,

    // =========================================================================
    // Resolution Errors (E1xx)
    // =========================================================================
    /// Duplicate node name.
    ///
    /// Two nodes resolve to the same name.
    E100,

    /// Dangling connection endpoint.
    ///
    /// A connection refers to an element id that does not exist.
    E101,

    /// Connection into the initial node.
    E102,

    /// Connection out of a final node.
    E103,

    /// Duplicate element id.
    E104,

    /// Generated name clash.
    ///
    /// Two elements produce the same identifier in the generated code, for
    /// example a node `AToB` and the guard of a transition from `A` to `B`.
    E105,

    // =========================================================================
    // Structure Errors (E2xx)
    // =========================================================================
    /// Missing initial node.
    E200,

    /// Invalid initial transition.
    ///
    /// The initial node needs exactly one unguarded outgoing connection.
    E201,

    /// Invalid action out-degree.
    ///
    /// Action nodes need exactly one outgoing connection.
    E202,

    /// Decision without branches.
    E203,

    /// Invalid decision order.
    ///
    /// The orders of a decision's branches must be exactly `1..=k`.
    E204,

    /// Invalid default branch.
    ///
    /// A decision needs exactly one `else` branch.
    E205,

    /// Unguarded decision branch.
    ///
    /// A decision branch other than the default carries no guard.
    E206,

    /// Transient cycle.
    ///
    /// Nodes form a cycle that can be traversed without ever evaluating a
    /// guard that may park the procedure.
    E207,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            // Element errors
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::E004 => "E004",
            ErrorCode::E005 => "E005",
            // Resolution errors
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",
            ErrorCode::E104 => "E104",
            ErrorCode::E105 => "E105",
            // Structure errors
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E203 => "E203",
            ErrorCode::E204 => "E204",
            ErrorCode::E205 => "E205",
            ErrorCode::E206 => "E206",
            ErrorCode::E207 => "E207",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            // Element errors
            ErrorCode::E001 => "missing required field",
            ErrorCode::E002 => "unknown element kind",
            ErrorCode::E003 => "non-numeric order",
            ErrorCode::E004 => "invalid identifier",
            ErrorCode::E005 => "reserved name",
            // Resolution errors
            ErrorCode::E100 => "duplicate node name",
            ErrorCode::E101 => "dangling connection endpoint",
            ErrorCode::E102 => "connection into initial node",
            ErrorCode::E103 => "connection out of final node",
            ErrorCode::E104 => "duplicate element id",
            ErrorCode::E105 => "generated name clash",
            // Structure errors
            ErrorCode::E200 => "missing initial node",
            ErrorCode::E201 => "invalid initial transition",
            ErrorCode::E202 => "invalid action out-degree",
            ErrorCode::E203 => "decision without branches",
            ErrorCode::E204 => "invalid decision order",
            ErrorCode::E205 => "invalid default branch",
            ErrorCode::E206 => "unguarded decision branch",
            ErrorCode::E207 => "transient cycle",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
