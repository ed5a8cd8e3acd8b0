//! `quizmark scan <input>` — one detection pass over a static document.

use crate::cli::output::{self, Styled};
use crate::detect::{Detector, ElementId};
use crate::highlight::MemoryHighlighter;
use crate::report::render;
use crate::report::protocol::ResultsReport;
use anyhow::{Context, Result};
use chrono::Utc;
use scraper::Html;
use serde::Serialize;
use tracing::info;
use url::Url;

/// Machine-readable scan output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScanSummary<'a> {
    generated_at: String,
    highlighted: usize,
    #[serde(flatten)]
    report: &'a ResultsReport,
}

/// Run the scan command against a file path, `-` for stdin, or an
/// http(s) URL.
pub async fn run(input: &str) -> Result<()> {
    let s = Styled::new();
    let html_text = load_input(input).await?;

    let mut detector = Detector::new();
    let mut sink = MemoryHighlighter::new();

    let highlights = {
        let doc = Html::parse_document(&html_text);
        detector.scan_document(&doc)
    };
    if !highlights.is_empty() {
        sink.ensure_styles();
        let choices: Vec<ElementId> = highlights.iter().map(|h| h.choice).collect();
        sink.mark(&choices);
    }
    info!(
        "scanned {input}: {} question(s), {} highlight(s)",
        detector.questions().len(),
        sink.marked_count()
    );

    let report = ResultsReport::from_questions(detector.questions());
    if output::is_json() {
        let summary = ScanSummary {
            generated_at: Utc::now().to_rfc3339(),
            highlighted: sink.marked_count(),
            report: &report,
        };
        output::print_json(&serde_json::to_value(summary)?);
        return Ok(());
    }

    render::render_report(&s, &report);
    if output::is_verbose() {
        eprintln!();
        eprintln!("  {} highlight(s) recorded", sink.marked_count());
    }
    Ok(())
}

async fn load_input(input: &str) -> Result<String> {
    if input == "-" {
        use std::io::Read;
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading stdin")?;
        return Ok(buf);
    }

    if input.starts_with("http://") || input.starts_with("https://") {
        let target = Url::parse(input).with_context(|| format!("invalid url: {input}"))?;
        let response = reqwest::get(target)
            .await
            .with_context(|| format!("fetching {input}"))?;
        return response.text().await.context("reading response body");
    }

    std::fs::read_to_string(input).with_context(|| format!("reading {input}"))
}
