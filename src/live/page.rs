//! Browser page sessions over the Chrome DevTools Protocol.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Failures at the page-session seam.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("browser launch failed: {0}")]
    Launch(String),
    #[error("browser connect failed: {0}")]
    Connect(String),
    #[error("navigation failed: {0}")]
    Navigate(String),
    #[error("navigation timed out after {0}ms")]
    NavigateTimeout(u64),
    #[error("script evaluation failed: {0}")]
    Eval(String),
    #[error("browser close failed: {0}")]
    Close(String),
}

/// A live page the watcher can drive: navigate once, then evaluate
/// scripts against it for the life of the run.
#[async_trait]
pub trait PageContext: Send {
    /// Navigate to a URL and wait for the load to settle.
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<(), PageError>;

    /// Evaluate a script expression and return its JSON value.
    async fn execute_js(&self, script: &str) -> Result<serde_json::Value, PageError>;

    /// Release the session. Only managed (launched) browsers are closed;
    /// a connected browser belongs to whoever started it.
    async fn close(&mut self) -> Result<(), PageError>;
}

/// Chromium-backed page session.
pub struct CdpPage {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    managed: bool,
}

impl CdpPage {
    /// Launch a managed headless Chromium and open a blank page.
    pub async fn launch() -> Result<Self, PageError> {
        let config = BrowserConfig::builder()
            .build()
            .map_err(PageError::Launch)?;
        let (browser, handler) = Browser::launch(config)
            .await
            .map_err(|e| PageError::Launch(e.to_string()))?;
        info!("launched managed browser");
        Self::with_browser(browser, handler, true).await
    }

    /// Connect to an already-running browser over its DevTools websocket.
    pub async fn connect(ws_url: &str) -> Result<Self, PageError> {
        let (browser, handler) = Browser::connect(ws_url)
            .await
            .map_err(|e| PageError::Connect(e.to_string()))?;
        info!("connected to browser at {ws_url}");
        Self::with_browser(browser, handler, false).await
    }

    async fn with_browser(
        browser: Browser,
        mut handler: chromiumoxide::Handler,
        managed: bool,
    ) -> Result<Self, PageError> {
        // Drive CDP message dispatch until the connection drops.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| PageError::Launch(e.to_string()))?;

        Ok(Self {
            browser,
            page,
            handler_task,
            managed,
        })
    }
}

#[async_trait]
impl PageContext for CdpPage {
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<(), PageError> {
        let load = async {
            self.page
                .goto(url)
                .await
                .map_err(|e| PageError::Navigate(e.to_string()))?;
            self.page
                .wait_for_navigation()
                .await
                .map_err(|e| PageError::Navigate(e.to_string()))?;
            Ok(())
        };
        match tokio::time::timeout(Duration::from_millis(timeout_ms), load).await {
            Ok(result) => result,
            Err(_) => Err(PageError::NavigateTimeout(timeout_ms)),
        }
    }

    async fn execute_js(&self, script: &str) -> Result<serde_json::Value, PageError> {
        let evaluated = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| PageError::Eval(e.to_string()))?;
        Ok(evaluated.value().cloned().unwrap_or(serde_json::Value::Null))
    }

    async fn close(&mut self) -> Result<(), PageError> {
        if self.managed {
            debug!("closing managed browser");
            self.browser
                .close()
                .await
                .map_err(|e| PageError::Close(e.to_string()))?;
        }
        self.handler_task.abort();
        Ok(())
    }
}
