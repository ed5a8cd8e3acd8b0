//! Question/answer detection over parsed HTML.
//!
//! The detector owns the growing list of detected questions for the life of
//! a run. It is host-independent: static scans hand it a full document,
//! live watching hands it one inserted element at a time, and both paths
//! run the same per-element analysis.

use crate::detect::heuristics::Heuristics;
use crate::detect::selectors::SelectorSet;
use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Attribute used to address elements in a live page. Elements stamped by
/// the injected page helper carry their id here; elements without it get a
/// synthetic id assigned in document order.
pub const ID_ATTR: &str = "data-quizmark-id";

/// Stable handle for an element within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(pub u64);

/// A selectable answer option extracted from a question container.
#[derive(Debug, Clone)]
pub struct AnswerChoice {
    /// Element the choice text came from.
    pub element: ElementId,
    /// Trimmed display text.
    pub text: String,
    /// Whether the text carries an explicit correctness marker.
    pub looks_correct: bool,
}

/// An element classified as a question, with its extracted choices.
///
/// Never mutated after creation. `correct`, when present, indexes into
/// `choices` — the selection is always one of the question's own options.
#[derive(Debug, Clone)]
pub struct DetectedQuestion {
    /// The question container element.
    pub element: ElementId,
    /// Trimmed display text of the container.
    pub text: String,
    /// Choices in extraction order. Never empty for a retained question.
    pub choices: Vec<AnswerChoice>,
    /// Index of the guessed correct choice.
    pub correct: Option<usize>,
}

/// A newly decided highlight: mark `choice` as the guessed answer for
/// `question`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Highlight {
    pub question: ElementId,
    pub choice: ElementId,
}

/// Pick the guessed-correct choice for a question.
///
/// The first explicitly marked choice wins, in extraction order. With no
/// marked choice, the longest text wins, and on equal length the earlier
/// choice is kept — first occurrence winning ties is the contract here,
/// not an accident of iteration.
pub fn identify_correct_answer(choices: &[AnswerChoice]) -> Option<usize> {
    if choices.is_empty() {
        return None;
    }
    if let Some(marked) = choices.iter().position(|c| c.looks_correct) {
        return Some(marked);
    }
    let mut best = 0;
    for (idx, choice) in choices.iter().enumerate().skip(1) {
        if choice.text.chars().count() > choices[best].text.chars().count() {
            best = idx;
        }
    }
    Some(best)
}

#[derive(Default)]
struct DetectorState {
    questions: Vec<DetectedQuestion>,
    /// Question container → chosen choice, for every highlight applied.
    marked: HashMap<ElementId, ElementId>,
    /// Choice elements already highlighted; repeat decisions are dropped.
    highlighted: HashSet<ElementId>,
    next_synthetic_id: u64,
}

/// Scans documents and inserted elements for question/answer structures.
pub struct Detector {
    selectors: SelectorSet,
    heuristics: Heuristics,
    state: DetectorState,
}

impl Detector {
    pub fn new() -> Self {
        Self {
            selectors: SelectorSet::compile(),
            heuristics: Heuristics::new(),
            state: DetectorState::default(),
        }
    }

    /// Every question retained so far, in detection order.
    pub fn questions(&self) -> &[DetectedQuestion] {
        &self.state.questions
    }

    /// Question container → chosen choice for all applied highlights.
    pub fn marked(&self) -> &HashMap<ElementId, ElementId> {
        &self.state.marked
    }

    /// Run one full detection pass over a document.
    ///
    /// Enumerates candidate containers from the structural selector groups
    /// (deduplicated by element within the pass), classifies each, and
    /// returns the highlights that are new in this pass.
    pub fn scan_document(&mut self, doc: &Html) -> Vec<Highlight> {
        let mut ids = IdAssigner::default();
        let mut analyzed: HashSet<ElementId> = HashSet::new();
        let mut new = Vec::new();

        for selector in &self.selectors.question {
            for candidate in doc.select(selector) {
                let id = ids.id_of(&candidate, &mut self.state.next_synthetic_id);
                if !analyzed.insert(id) {
                    continue;
                }
                if let Some(highlight) = Self::analyze_element(
                    &self.selectors,
                    &self.heuristics,
                    &mut self.state,
                    &mut ids,
                    candidate,
                ) {
                    new.push(highlight);
                }
            }
        }

        debug!(
            "scan pass: {} question(s) retained, {} new highlight(s)",
            self.state.questions.len(),
            new.len()
        );
        new
    }

    /// Analyze a newly inserted element and each of its descendants.
    ///
    /// Called once per insertion, in insertion order. Unlike the initial
    /// scan there is no selector gating — every element of the inserted
    /// subtree goes through the same per-element analysis.
    pub fn on_element_inserted(&mut self, element: ElementRef<'_>) -> Vec<Highlight> {
        let mut ids = IdAssigner::default();
        let mut new = Vec::new();

        if let Some(highlight) = Self::analyze_element(
            &self.selectors,
            &self.heuristics,
            &mut self.state,
            &mut ids,
            element,
        ) {
            new.push(highlight);
        }
        for node in element.descendants() {
            let Some(child) = ElementRef::wrap(node) else {
                continue;
            };
            if child.id() == element.id() {
                continue;
            }
            if let Some(highlight) = Self::analyze_element(
                &self.selectors,
                &self.heuristics,
                &mut self.state,
                &mut ids,
                child,
            ) {
                new.push(highlight);
            }
        }

        new
    }

    /// Classify one element; retain it as a question if its text matches
    /// and at least one choice can be extracted.
    fn analyze_element(
        selectors: &SelectorSet,
        heuristics: &Heuristics,
        state: &mut DetectorState,
        ids: &mut IdAssigner,
        element: ElementRef<'_>,
    ) -> Option<Highlight> {
        let text = element_text(element);
        if text.is_empty() || !heuristics.is_question(&text) {
            return None;
        }

        let choices = find_answer_choices(
            selectors,
            heuristics,
            ids,
            &mut state.next_synthetic_id,
            element,
        );
        if choices.is_empty() {
            return None;
        }

        let correct = identify_correct_answer(&choices);
        let question_id = ids.id_of(&element, &mut state.next_synthetic_id);
        let question = DetectedQuestion {
            element: question_id,
            text,
            choices,
            correct,
        };

        let mut highlight = None;
        if let Some(idx) = question.correct {
            let choice_id = question.choices[idx].element;
            debug!(
                "question {:?}: guessed {:?} ({})",
                question_id, choice_id, question.choices[idx].text
            );
            state.marked.insert(question_id, choice_id);
            if state.highlighted.insert(choice_id) {
                highlight = Some(Highlight {
                    question: question_id,
                    choice: choice_id,
                });
            }
        }

        state.questions.push(question);
        highlight
    }
}

/// Extract choices from a container's descendants using the fixed choice
/// selector groups, in group order.
fn find_answer_choices(
    selectors: &SelectorSet,
    heuristics: &Heuristics,
    ids: &mut IdAssigner,
    next_synthetic_id: &mut u64,
    container: ElementRef<'_>,
) -> Vec<AnswerChoice> {
    let mut choices = Vec::new();
    for selector in &selectors.choice {
        for element in container.select(selector) {
            let text = element_text(element);
            if text.is_empty() || !heuristics.is_likely_answer_choice(&text) {
                continue;
            }
            let looks_correct = heuristics.looks_marked_correct(&text);
            choices.push(AnswerChoice {
                element: ids.id_of(&element, next_synthetic_id),
                text,
                looks_correct,
            });
        }
    }
    choices
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Assigns element ids within one analysis pass: stamped `data-quizmark-id`
/// attributes win, anything else gets a synthetic id memoized per node.
#[derive(Default)]
struct IdAssigner {
    memo: HashMap<ego_tree::NodeId, ElementId>,
}

impl IdAssigner {
    fn id_of(&mut self, element: &ElementRef<'_>, next_synthetic_id: &mut u64) -> ElementId {
        if let Some(tagged) = element
            .value()
            .attr(ID_ATTR)
            .and_then(|raw| raw.parse::<u64>().ok())
        {
            return ElementId(tagged);
        }
        if let Some(&known) = self.memo.get(&element.id()) {
            return known;
        }
        *next_synthetic_id += 1;
        let id = ElementId(*next_synthetic_id);
        self.memo.insert(element.id(), id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choice(text: &str, looks_correct: bool) -> AnswerChoice {
        AnswerChoice {
            element: ElementId(0),
            text: text.to_string(),
            looks_correct,
        }
    }

    #[test]
    fn test_marked_choice_wins() {
        let choices = vec![
            choice("A. Berlin", false),
            choice("B. Paris (correct)", true),
            choice("C. Madrid", false),
        ];
        assert_eq!(identify_correct_answer(&choices), Some(1));
    }

    #[test]
    fn test_first_marked_choice_wins_over_later_marks() {
        let choices = vec![
            choice("A. yes", true),
            choice("B. also correct", true),
        ];
        assert_eq!(identify_correct_answer(&choices), Some(0));
    }

    #[test]
    fn test_longest_choice_fallback() {
        let choices = vec![
            choice("A. No", false),
            choice("B. The considerably longer option", false),
            choice("C. Meh", false),
        ];
        assert_eq!(identify_correct_answer(&choices), Some(1));
    }

    #[test]
    fn test_equal_length_tie_keeps_first() {
        let choices = vec![
            choice("A. 3", false),
            choice("B. 4", false),
            choice("C. 5", false),
        ];
        assert_eq!(identify_correct_answer(&choices), Some(0));
    }

    #[test]
    fn test_no_choices_no_answer() {
        assert_eq!(identify_correct_answer(&[]), None);
    }

    #[test]
    fn test_scan_retains_question_with_choices() {
        let doc = Html::parse_document(
            r#"<div class="question">What is the capital of France?
                 <ul>
                   <li>A. Berlin</li>
                   <li>B. Paris is the capital</li>
                   <li>C. Rome</li>
                 </ul>
               </div>"#,
        );
        let mut detector = Detector::new();
        let highlights = detector.scan_document(&doc);

        assert_eq!(detector.questions().len(), 1);
        let q = &detector.questions()[0];
        assert!(q.text.starts_with("What is the capital of France?"));
        assert_eq!(q.choices.len(), 3);
        // Longest text, no markers present.
        assert_eq!(q.correct, Some(1));
        assert_eq!(highlights.len(), 1);
        assert_eq!(highlights[0].choice, q.choices[1].element);
        assert_eq!(
            detector.marked().get(&q.element),
            Some(&q.choices[1].element)
        );
    }

    #[test]
    fn test_equal_length_choices_pick_first_end_to_end() {
        let doc = Html::parse_document(
            r#"<div class="quiz-question">What is 2+2?
                 <ol>
                   <li>A. 3</li>
                   <li>B. 4</li>
                   <li>C. 5</li>
                 </ol>
               </div>"#,
        );
        let mut detector = Detector::new();
        detector.scan_document(&doc);

        assert_eq!(detector.questions().len(), 1);
        let q = &detector.questions()[0];
        let idx = q.correct.unwrap();
        assert_eq!(q.choices[idx].text, "A. 3");
    }

    #[test]
    fn test_marked_correct_end_to_end() {
        let doc = Html::parse_document(
            r#"<div class="question">Question 1: select the correct option
                 <ul>
                   <li>[x] Paris</li>
                   <li>London</li>
                 </ul>
               </div>"#,
        );
        let mut detector = Detector::new();
        detector.scan_document(&doc);

        assert_eq!(detector.questions().len(), 1);
        let q = &detector.questions()[0];
        // "London" has no choice prefix and drops out.
        assert_eq!(q.choices.len(), 1);
        let idx = q.correct.unwrap();
        assert_eq!(q.choices[idx].text, "[x] Paris");
        assert!(q.choices[idx].looks_correct);
    }

    #[test]
    fn test_question_without_choices_is_dropped() {
        let doc = Html::parse_document(
            r#"<p class="question">Why is the sky blue?</p>"#,
        );
        let mut detector = Detector::new();
        let highlights = detector.scan_document(&doc);

        assert!(detector.questions().is_empty());
        assert!(highlights.is_empty());
    }

    #[test]
    fn test_non_question_text_is_ignored() {
        let doc = Html::parse_document(
            r#"<div class="question">Just a statement.
                 <ul><li>A. Something</li></ul>
               </div>"#,
        );
        let mut detector = Detector::new();
        detector.scan_document(&doc);
        assert!(detector.questions().is_empty());
    }

    #[test]
    fn test_container_matching_several_groups_analyzed_once() {
        // Matches both the class-name group and the [class*="question"] group.
        let doc = Html::parse_document(
            r#"<div class="question">What is 1+1?
                 <ul><li>A. 2</li><li>B. 3</li></ul>
               </div>"#,
        );
        let mut detector = Detector::new();
        detector.scan_document(&doc);
        assert_eq!(detector.questions().len(), 1);
    }

    #[test]
    fn test_overlong_choice_text_is_excluded() {
        let long = "x".repeat(300);
        let doc = Html::parse_document(&format!(
            r#"<div class="question">Which one?
                 <ul>
                   <li>A. short</li>
                   <li>B. {long}</li>
                 </ul>
               </div>"#
        ));
        let mut detector = Detector::new();
        detector.scan_document(&doc);

        assert_eq!(detector.questions().len(), 1);
        let q = &detector.questions()[0];
        assert_eq!(q.choices.len(), 1);
        assert_eq!(q.choices[0].text, "A. short");
    }

    #[test]
    fn test_inserted_subtree_is_analyzed() {
        let fragment = Html::parse_fragment(
            r#"<div class="question">Question 7: choose the right city
                 <ul>
                   <li>A. Oslo</li>
                   <li>B. Lisbon ✓</li>
                 </ul>
               </div>"#,
        );
        let root = fragment
            .root_element()
            .children()
            .find_map(ElementRef::wrap)
            .expect("fragment has an element");

        let mut detector = Detector::new();
        let highlights = detector.on_element_inserted(root);

        assert_eq!(detector.questions().len(), 1);
        let q = &detector.questions()[0];
        let idx = q.correct.unwrap();
        assert_eq!(q.choices[idx].text, "B. Lisbon ✓");
        assert_eq!(highlights.len(), 1);
    }

    #[test]
    fn test_repeat_highlight_decision_is_dropped() {
        let html = r#"<div class="question" data-quizmark-id="10">What is 2+2?
                 <ul>
                   <li data-quizmark-id="11">A. 3</li>
                   <li data-quizmark-id="12">B. 4</li>
                 </ul>
               </div>"#;
        let mut detector = Detector::new();

        let first = detector.scan_document(&Html::parse_document(html));
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].choice, ElementId(11));

        // The same subtree re-inserted later: analyzed again, recorded
        // again, but no second highlight for the same element.
        let fragment = Html::parse_fragment(html);
        let root = fragment
            .root_element()
            .children()
            .find_map(ElementRef::wrap)
            .unwrap();
        let second = detector.on_element_inserted(root);
        assert!(second.is_empty());
        assert_eq!(detector.questions().len(), 2);
    }

    #[test]
    fn test_stamped_ids_are_used_verbatim() {
        let doc = Html::parse_document(
            r#"<div class="question" data-quizmark-id="42">Question 2: choose the right one
                 <ul><li data-quizmark-id="43">A. Only option</li></ul>
               </div>"#,
        );
        let mut detector = Detector::new();
        let highlights = detector.scan_document(&doc);

        assert_eq!(detector.questions()[0].element, ElementId(42));
        assert_eq!(highlights[0].choice, ElementId(43));
    }
}
