//! Highlight bookkeeping.
//!
//! The detector decides *which* elements to mark; how the mark lands
//! depends on where the page lives. Live pages get the class and style
//! block applied by script (see [`crate::live::scripts`]); static scans
//! and tests record the same operations here. Both are idempotent:
//! marking an element twice changes nothing.

use crate::detect::ElementId;
use std::collections::HashMap;

/// CSS class added to a guessed-correct choice element.
pub const HIGHLIGHT_CLASS: &str = "correct-answer-highlight";

/// Id of the one-time `<style>` block injected into the page.
pub const STYLE_BLOCK_ID: &str = "answer-highlighter-dynamic-styles";

/// Styles backing the highlight class: a `::after` badge reading
/// "✓ Correct" in green bold text next to the marked element.
pub const HIGHLIGHT_CSS: &str = "\
.correct-answer-highlight { position: relative; } \
.correct-answer-highlight::after { content: \" \u{2713} Correct\"; \
color: #28a745; font-weight: bold; margin-left: 5px; }";

/// Records highlight operations without a page: static scans and tests.
#[derive(Debug, Default)]
pub struct MemoryHighlighter {
    classes: HashMap<ElementId, Vec<String>>,
    style_blocks: Vec<String>,
}

impl MemoryHighlighter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inject the style block if it is not present yet.
    pub fn ensure_styles(&mut self) {
        if !self.style_blocks.iter().any(|id| id == STYLE_BLOCK_ID) {
            self.style_blocks.push(STYLE_BLOCK_ID.to_string());
        }
    }

    /// Add the highlight class to each element. Already-marked elements
    /// are left untouched.
    pub fn mark(&mut self, elements: &[ElementId]) {
        for &element in elements {
            let classes = self.classes.entry(element).or_default();
            if !classes.iter().any(|c| c == HIGHLIGHT_CLASS) {
                classes.push(HIGHLIGHT_CLASS.to_string());
            }
        }
    }

    /// Classes recorded for an element.
    pub fn classes_of(&self, element: ElementId) -> &[String] {
        self.classes
            .get(&element)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of elements carrying the highlight class.
    pub fn marked_count(&self) -> usize {
        self.classes.len()
    }

    /// Ids of injected style blocks.
    pub fn style_blocks(&self) -> &[String] {
        &self.style_blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_twice_adds_one_class() {
        let mut sink = MemoryHighlighter::new();
        let el = ElementId(7);
        sink.mark(&[el]);
        sink.mark(&[el]);
        assert_eq!(sink.classes_of(el), [HIGHLIGHT_CLASS.to_string()]);
        assert_eq!(sink.marked_count(), 1);
    }

    #[test]
    fn test_style_block_injected_once() {
        let mut sink = MemoryHighlighter::new();
        sink.ensure_styles();
        sink.ensure_styles();
        assert_eq!(sink.style_blocks(), [STYLE_BLOCK_ID.to_string()]);
    }

    #[test]
    fn test_unmarked_element_has_no_classes() {
        let sink = MemoryHighlighter::new();
        assert!(sink.classes_of(ElementId(1)).is_empty());
    }
}
