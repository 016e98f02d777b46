//! Labeled model elements for diagnostic messages.
//!
//! A label associates a message with an element of the input model,
//! identified by the id the editor assigned to it.

/// A labeled model element.
///
/// # Primary vs Secondary Labels
///
/// - **Primary labels** mark the element that has to change.
/// - **Secondary labels** point at related elements, such as the other
///   node of a name collision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    element: String,
    message: String,
    is_primary: bool,
}

impl Label {
    /// Create a new primary label.
    pub fn primary(element: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            element: element.into(),
            message: message.into(),
            is_primary: true,
        }
    }

    /// Create a new secondary label.
    pub fn secondary(element: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            element: element.into(),
            message: message.into(),
            is_primary: false,
        }
    }

    /// Get the id of the labeled element or connection.
    pub fn element(&self) -> &str {
        &self.element
    }

    /// Get the label message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Check if this is a primary label.
    pub fn is_primary(&self) -> bool {
        self.is_primary
    }

    /// Check if this is a secondary label.
    pub fn is_secondary(&self) -> bool {
        !self.is_primary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_label() {
        let label = Label::primary("state_3", "missing width");
        assert_eq!(label.element(), "state_3");
        assert_eq!(label.message(), "missing width");
        assert!(label.is_primary());
        assert!(!label.is_secondary());
    }

    #[test]
    fn test_secondary_label() {
        let label = Label::secondary("state_1", "first used here");
        assert!(label.is_secondary());
    }
}
