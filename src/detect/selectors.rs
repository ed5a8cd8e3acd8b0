//! Fixed structural selector groups for candidate enumeration.

use scraper::Selector;
use tracing::warn;

/// Selector groups that enumerate candidate question containers.
///
/// Not every entry is valid CSS — the `:contains` group is host-dependent
/// syntax. Groups that fail to parse are logged and skipped; scanning
/// continues with the rest.
pub const QUESTION_SELECTORS: &[&str] = &[
    // Multiple choice question containers
    ".question, .quiz-question, .mcq, .multiple-choice",
    // Elements whose text contains a question mark
    r#"*:contains("?")"#,
    // Common quiz platform markup
    r#"[data-type="question"], [class*="question"]"#,
    // Lists that might be answer choices
    "ol, ul",
];

/// Selector groups that enumerate answer choices within a container.
pub const CHOICE_SELECTORS: &[&str] = &[
    // List items
    "li",
    // Radio buttons and labels
    r#"input[type="radio"] + label"#,
    "label",
    // Options in select elements
    "option",
    // Common class patterns
    r#"[class*="choice"], [class*="option"], [class*="answer"]"#,
    // Siblings following a question
    ".question ~ div, .question ~ p",
];

/// Compiled selector groups, in source order.
pub struct SelectorSet {
    pub question: Vec<Selector>,
    pub choice: Vec<Selector>,
}

impl SelectorSet {
    /// Compile both group lists, dropping (and logging) any group whose
    /// syntax the selector engine rejects.
    pub fn compile() -> Self {
        Self {
            question: compile_groups(QUESTION_SELECTORS),
            choice: compile_groups(CHOICE_SELECTORS),
        }
    }
}

fn compile_groups(sources: &[&str]) -> Vec<Selector> {
    let mut compiled = Vec::with_capacity(sources.len());
    for source in sources {
        match Selector::parse(source) {
            Ok(sel) => compiled.push(sel),
            Err(e) => warn!("skipping unsupported selector {source:?}: {e}"),
        }
    }
    compiled
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_group_is_skipped() {
        let set = SelectorSet::compile();
        // The `:contains` group is not CSS and drops out at compile time.
        assert_eq!(set.question.len(), QUESTION_SELECTORS.len() - 1);
        assert_eq!(set.choice.len(), CHOICE_SELECTORS.len());
    }
}
