//! Doxygen comment blocks wrapped at a fixed width.

/// Builds a `/** ... */` block, one entry of `paragraphs` per paragraph.
///
/// Words are wrapped so that no line, `indent` included, is wider than
/// `width`, except for single words that do not fit on any line. Empty
/// paragraphs are skipped; a bare ` *` line separates the others.
pub fn comment_block(paragraphs: &[&str], indent: &str, width: usize) -> Vec<String> {
    let prefix = format!("{indent} * ");
    let text_width = width.saturating_sub(prefix.len()).max(1);

    let mut lines = vec![format!("{indent}/**")];
    let mut first = true;
    for paragraph in paragraphs.iter().map(|p| sanitize(p)) {
        if paragraph.trim().is_empty() {
            continue;
        }
        if !first {
            lines.push(format!("{indent} *"));
        }
        first = false;
        for line in wrap(&paragraph, text_width) {
            lines.push(format!("{prefix}{line}"));
        }
    }
    lines.push(format!("{indent} */"));
    lines
}

/// Makes free text safe inside a C comment.
pub fn sanitize(text: &str) -> String {
    text.replace("*/", "* /").replace("/*", "/ *")
}

fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}


#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    // ===================
    // Strategies
    // ===================

    fn text_strategy() -> impl Strategy<Value = String> {
        prop::collection::vec("[a-z]{1,12}", 0..30).prop_map(|words| words.join(" "))
    }

    // ===================
    // Property Test Functions
    // ===================

    /// Wrapping keeps every word, in order, and respects the width.
    fn check_wrap_preserves_words(text: String, width: usize) -> Result<(), TestCaseError> {
        let lines = wrap(&text, width);
        let rejoined: Vec<&str> = lines.iter().flat_map(|l| l.split(' ')).collect();
        let original: Vec<&str> = text.split_whitespace().collect();
        prop_assert_eq!(rejoined, original);

        for line in &lines {
            prop_assert!(
                line.len() <= width || !line.contains(' '),
                "line {line:?} exceeds width {width}"
            );
        }
        Ok(())
    }

    // ===================
    // Proptest Wrappers
    // ===================

    proptest! {
        #[test]
        fn wrap_preserves_words(text in text_strategy(), width in 1usize..60) {
            check_wrap_preserves_words(text, width)?;
        }
    }
}
