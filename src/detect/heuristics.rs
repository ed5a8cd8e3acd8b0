//! Regex heuristics for classifying page text.
//!
//! Three classifiers, all best-effort pattern matching: does a block of
//! text read like a question, does it read like an answer choice, and does
//! it carry an explicit correctness marker. No formal grammar — a text
//! either matches one of the fixed patterns or it is silently ignored.

use regex::Regex;

/// Maximum length (in characters) for a text to qualify as an answer choice.
pub const MAX_CHOICE_LEN: usize = 200;

/// Compiled pattern sets, built once per [`crate::detect::Detector`].
pub struct Heuristics {
    question: Vec<Regex>,
    choice: Vec<Regex>,
    correct: Vec<Regex>,
}

impl Heuristics {
    pub fn new() -> Self {
        let question = vec![
            pattern(r"\?$"),
            pattern(r"(?i)^(what|who|when|where|why|how|which).*\?"),
            pattern(r"(?i)question\s*\d+"),
            pattern(r"(?i)select.*correct|choose.*right"),
        ];

        let choice = vec![
            pattern(r"(?i)^[A-D][.)]\s+.+"),
            pattern(r"^\d+\.\s+.+"),
            pattern(r"^[•\-]\s+.+"),
            pattern(r"(?i)^answer\s*[A-D]"),
            pattern(r"(?i)^\[x\]\s+.+"),
        ];

        let correct = vec![
            pattern(r"(?i)\b(correct|right|true|yes)\b"),
            pattern(r"✓"),
            pattern(r"(?i)\[x\]"),
            pattern(r"(?i)checked|selected"),
            pattern(r"(?i)answer\s*key"),
        ];

        Self {
            question,
            choice,
            correct,
        }
    }

    /// Does this text read like a quiz question?
    ///
    /// Matches: trailing `?`, an interrogative opener with a later `?`,
    /// "question N" numbering, or "select the correct" / "choose the right"
    /// phrasing.
    pub fn is_question(&self, text: &str) -> bool {
        self.question.iter().any(|p| p.is_match(text))
    }

    /// Does this text read like an answer choice?
    ///
    /// Requires both a recognized prefix (letter/number/bullet/"answer X"/
    /// checked-box marker) and a length under [`MAX_CHOICE_LEN`] characters.
    pub fn is_likely_answer_choice(&self, text: &str) -> bool {
        self.choice.iter().any(|p| p.is_match(text)) && text.chars().count() < MAX_CHOICE_LEN
    }

    /// Does this choice text carry an explicit correctness marker?
    pub fn looks_marked_correct(&self, text: &str) -> bool {
        self.correct.iter().any(|p| p.is_match(text))
    }
}

fn pattern(source: &str) -> Regex {
    // All sources are fixed literals above.
    Regex::new(source).expect("hardcoded pattern")
}
