//! Human-readable rendering of a results report.

use crate::cli::output::Styled;
use crate::report::protocol::{ResultsReport, UNKNOWN_ANSWER};

/// Question labels are cut to this many characters.
pub const LABEL_LIMIT: usize = 100;

/// Truncate a label to `limit` characters, appending an ellipsis when the
/// text was longer.
pub fn truncate_label(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let cut: String = text.chars().take(limit).collect();
    format!("{cut}...")
}

/// Build the report lines: counts, then one truncated question per line
/// with its guessed answer. An empty report yields the placeholder state
/// instead of a list.
pub fn report_lines(s: &Styled, report: &ResultsReport) -> Vec<String> {
    if report.questions.is_empty() {
        return vec![empty_line(s)];
    }

    let mut lines = vec![
        format!(
            "  {} {} question(s), {} with a guessed answer",
            s.ok_sym(),
            s.bold(&report.total_questions.to_string()),
            report.known_answer_count()
        ),
        String::new(),
    ];
    for (idx, q) in report.questions.iter().enumerate() {
        lines.push(format!(
            "  {}. {}",
            idx + 1,
            truncate_label(&q.question, LABEL_LIMIT)
        ));
        if q.correct_answer == UNKNOWN_ANSWER {
            lines.push(format!("     {}", s.yellow(UNKNOWN_ANSWER)));
        } else {
            lines.push(format!("     {} {}", s.green("\u{2713}"), q.correct_answer));
        }
    }
    lines
}

fn empty_line(s: &Styled) -> String {
    format!("  {} {}", s.warn_sym(), s.dim("no questions found"))
}

/// Print a report to stderr.
pub fn render_report(s: &Styled, report: &ResultsReport) {
    for line in report_lines(s, report) {
        eprintln!("{line}");
    }
}

/// Print the placeholder shown when there is nothing to report.
pub fn render_empty(s: &Styled) {
    eprintln!("{}", empty_line(s));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::protocol::QuestionSummary;

    fn plain() -> Styled {
        std::env::set_var("NO_COLOR", "1");
        Styled::new()
    }

    #[test]
    fn test_short_label_untouched() {
        assert_eq!(truncate_label("What is 2+2?", LABEL_LIMIT), "What is 2+2?");
    }

    #[test]
    fn test_label_at_limit_untouched() {
        let text = "q".repeat(LABEL_LIMIT);
        assert_eq!(truncate_label(&text, LABEL_LIMIT), text);
    }

    #[test]
    fn test_long_label_truncated_with_ellipsis() {
        let text = "q".repeat(LABEL_LIMIT + 1);
        let label = truncate_label(&text, LABEL_LIMIT);
        assert_eq!(label.chars().count(), LABEL_LIMIT + 3);
        assert!(label.ends_with("..."));
        assert!(label.starts_with(&"q".repeat(LABEL_LIMIT)));
    }

    #[test]
    fn test_truncation_counts_characters_not_bytes() {
        let text = "✓".repeat(LABEL_LIMIT + 5);
        let label = truncate_label(&text, LABEL_LIMIT);
        assert_eq!(label.chars().count(), LABEL_LIMIT + 3);
    }

    #[test]
    fn test_empty_report_renders_placeholder_not_a_list() {
        let lines = report_lines(&plain(), &ResultsReport::default());
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("no questions found"));
    }

    #[test]
    fn test_report_lists_questions_with_answers() {
        let report = ResultsReport {
            total_questions: 2,
            questions: vec![
                QuestionSummary {
                    question: "What is 2+2?".to_string(),
                    correct_answer: "B. 4".to_string(),
                },
                QuestionSummary {
                    question: "q".repeat(LABEL_LIMIT + 10),
                    correct_answer: UNKNOWN_ANSWER.to_string(),
                },
            ],
        };
        let lines = report_lines(&plain(), &report);
        assert!(lines[0].contains("2 question(s), 1 with a guessed answer"));
        assert!(lines[2].contains("1. What is 2+2?"));
        assert!(lines[3].contains("B. 4"));
        assert!(lines[4].ends_with("..."));
        assert!(lines[5].contains(UNKNOWN_ANSWER));
    }
}
