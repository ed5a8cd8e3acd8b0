//! Live page watching: initial scan, insertion polling, highlight apply.

use crate::detect::{Detector, ElementId, Highlight};
use crate::live::page::PageContext;
use crate::live::scripts::{self, InsertedRecord};
use anyhow::{Context, Result};
use scraper::{ElementRef, Html};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Navigation timeout for the target page.
const NAV_TIMEOUT_MS: u64 = 30_000;

/// Drives one page: navigates, installs the page helper, runs the initial
/// scan, then processes queued insertions tick by tick. Each tick drains
/// the page-side queue and feeds every record to the detector in insertion
/// order, one at a time.
pub struct LiveWatcher {
    page: Box<dyn PageContext>,
    detector: Arc<Mutex<Detector>>,
}

impl LiveWatcher {
    pub fn new(page: Box<dyn PageContext>, detector: Arc<Mutex<Detector>>) -> Self {
        Self { page, detector }
    }

    /// Navigate, install the helper, and run the initial scan.
    /// Returns the number of questions found by the first pass.
    pub async fn prepare(&mut self, url: &str) -> Result<usize> {
        self.page
            .navigate(url, NAV_TIMEOUT_MS)
            .await
            .with_context(|| format!("navigating to {url}"))?;
        self.page
            .execute_js(scripts::HELPER_JS)
            .await
            .context("injecting page helper")?;
        self.page
            .execute_js(&scripts::install_call())
            .await
            .context("installing page helper")?;

        let snapshot = self
            .page
            .execute_js(scripts::SNAPSHOT_CALL)
            .await
            .context("taking document snapshot")?;
        let html_text = snapshot.as_str().unwrap_or("").to_string();

        let (found, highlights) = {
            let mut detector = self.detector.lock().await;
            let doc = Html::parse_document(&html_text);
            let highlights = detector.scan_document(&doc);
            (detector.questions().len(), highlights)
        };

        self.apply(&highlights).await;
        Ok(found)
    }

    /// One poll tick: drain queued insertions, analyze each, apply any new
    /// highlights. Returns the number of highlights applied this tick.
    pub async fn tick(&mut self) -> Result<usize> {
        let drained = self
            .page
            .execute_js(scripts::DRAIN_CALL)
            .await
            .context("draining insertion queue")?;
        let records: Vec<InsertedRecord> = match serde_json::from_value(drained) {
            Ok(records) => records,
            Err(e) => {
                warn!("discarding malformed insertion queue: {e}");
                return Ok(0);
            }
        };
        if records.is_empty() {
            return Ok(0);
        }
        debug!("processing {} inserted element(s)", records.len());

        let highlights = {
            let mut detector = self.detector.lock().await;
            let mut highlights: Vec<Highlight> = Vec::new();
            for record in &records {
                let fragment = Html::parse_fragment(&record.html);
                let Some(root) = fragment
                    .root_element()
                    .children()
                    .find_map(ElementRef::wrap)
                else {
                    continue;
                };
                highlights.extend(detector.on_element_inserted(root));
            }
            highlights
        };

        let applied = highlights.len();
        self.apply(&highlights).await;
        Ok(applied)
    }

    /// Release the page session.
    pub async fn close(&mut self) -> Result<()> {
        self.page.close().await.context("closing page session")
    }

    /// Apply highlights in the live DOM. Failures are logged and skipped.
    async fn apply(&mut self, highlights: &[Highlight]) {
        if highlights.is_empty() {
            return;
        }
        let choices: Vec<ElementId> = highlights.iter().map(|h| h.choice).collect();
        if let Err(e) = self.page.execute_js(&scripts::apply_call(&choices)).await {
            warn!("failed to apply {} highlight(s): {e}", choices.len());
        }
    }
}
