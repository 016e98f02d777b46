//! Free-text conventions of the procedure notation.
//!
//! The editor stores descriptions, guards and notes as free text. Two
//! textual conventions carry meaning: an action described as "do nothing"
//! has no callback, and a guard reading "else" is a decision's default
//! branch. Both are matched case-insensitively after trimming, and both are
//! evaluated once when the descriptor is built.

const NO_OP_DESCRIPTION: &str = "do nothing";
const DEFAULT_GUARD: &str = "else";

/// Replaces every line break in `text` with a single space.
///
/// `\r\n` counts as one line break.
///
/// # Examples
///
/// ```
/// # use fwpr_core::text::normalize_text;
/// assert_eq!(normalize_text("first\nsecond\r\nthird"), "first second third");
/// ```
pub fn normalize_text(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

/// Returns `true` if an action description marks the action as a no-op.
pub fn is_no_op_text(description: &str) -> bool {
    matches_convention(description, NO_OP_DESCRIPTION)
}

/// Returns `true` if a guard description marks the default branch.
pub fn is_default_guard_text(guard: &str) -> bool {
    matches_convention(guard, DEFAULT_GUARD)
}

/// Returns `true` if `name` can be spliced into a generated C identifier.
///
/// # Examples
///
/// ```
/// # use fwpr_core::text::is_c_identifier;
/// assert!(is_c_identifier("Check_1"));
/// assert!(!is_c_identifier("1Check"));
/// assert!(!is_c_identifier("Check Value"));
/// ```
pub fn is_c_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

fn matches_convention(text: &str, keyword: &str) -> bool {
    normalize_text(text).trim().eq_ignore_ascii_case(keyword)
}
