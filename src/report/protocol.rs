//! Wire protocol between a running watch and the report surface.
//!
//! Newline-delimited JSON over a Unix socket. One request kind exists:
//! `{"action": "getResults"}`, answered with the current findings.

use crate::detect::DetectedQuestion;
use serde::{Deserialize, Serialize};

/// Sentinel answer text for a question with no selected choice.
pub const UNKNOWN_ANSWER: &str = "Unknown";

/// Request sent by the report surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum Request {
    #[serde(rename = "getResults")]
    GetResults,
}

/// One question/answer pair in a results response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSummary {
    pub question: String,
    pub correct_answer: String,
}

/// Response to [`Request::GetResults`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsReport {
    pub total_questions: usize,
    pub questions: Vec<QuestionSummary>,
}

impl ResultsReport {
    /// Transient copy of the detector's current findings.
    pub fn from_questions(questions: &[DetectedQuestion]) -> Self {
        let questions: Vec<QuestionSummary> = questions
            .iter()
            .map(|q| QuestionSummary {
                question: q.text.clone(),
                correct_answer: q
                    .correct
                    .and_then(|idx| q.choices.get(idx))
                    .map(|c| c.text.clone())
                    .unwrap_or_else(|| UNKNOWN_ANSWER.to_string()),
            })
            .collect();
        Self {
            total_questions: questions.len(),
            questions,
        }
    }

    /// Questions whose answer is not the [`UNKNOWN_ANSWER`] sentinel.
    pub fn known_answer_count(&self) -> usize {
        self.questions
            .iter()
            .filter(|q| q.correct_answer != UNKNOWN_ANSWER)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{AnswerChoice, ElementId};
    use assert_json_diff::assert_json_eq;

    #[test]
    fn test_request_wire_shape() {
        let json = serde_json::to_value(Request::GetResults).unwrap();
        assert_json_eq!(json, serde_json::json!({"action": "getResults"}));

        let parsed: Request = serde_json::from_str(r#"{"action":"getResults"}"#).unwrap();
        assert_eq!(parsed, Request::GetResults);
    }

    #[test]
    fn test_response_wire_shape() {
        let report = ResultsReport {
            total_questions: 1,
            questions: vec![QuestionSummary {
                question: "What is 2+2?".to_string(),
                correct_answer: "B. 4".to_string(),
            }],
        };
        assert_json_eq!(
            serde_json::to_value(&report).unwrap(),
            serde_json::json!({
                "totalQuestions": 1,
                "questions": [
                    {"question": "What is 2+2?", "correctAnswer": "B. 4"}
                ]
            })
        );
    }

    #[test]
    fn test_from_questions_resolves_choice_text() {
        let questions = vec![DetectedQuestion {
            element: ElementId(1),
            text: "Which city?".to_string(),
            choices: vec![
                AnswerChoice {
                    element: ElementId(2),
                    text: "A. Oslo".to_string(),
                    looks_correct: false,
                },
                AnswerChoice {
                    element: ElementId(3),
                    text: "B. Lisbon".to_string(),
                    looks_correct: true,
                },
            ],
            correct: Some(1),
        }];
        let report = ResultsReport::from_questions(&questions);
        assert_eq!(report.total_questions, 1);
        assert_eq!(report.questions[0].correct_answer, "B. Lisbon");
        assert_eq!(report.known_answer_count(), 1);
    }

    #[test]
    fn test_missing_selection_becomes_unknown() {
        let questions = vec![DetectedQuestion {
            element: ElementId(1),
            text: "Which city?".to_string(),
            choices: vec![AnswerChoice {
                element: ElementId(2),
                text: "A. Oslo".to_string(),
                looks_correct: false,
            }],
            correct: None,
        }];
        let report = ResultsReport::from_questions(&questions);
        assert_eq!(report.questions[0].correct_answer, UNKNOWN_ANSWER);
        assert_eq!(report.known_answer_count(), 0);
    }
}
