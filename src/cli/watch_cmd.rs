//! `quizmark watch <url>` — watch a live page and serve results.

use crate::cli::output::{self, Styled};
use crate::detect::Detector;
use crate::live::{CdpPage, LiveWatcher, PageContext};
use crate::report::server;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn};
use url::Url;

/// Run the watch command until interrupted.
pub async fn run(
    url: &str,
    connect: Option<String>,
    interval_ms: u64,
    socket: Option<PathBuf>,
) -> Result<()> {
    let s = Styled::new();
    let target = Url::parse(url).with_context(|| format!("invalid target url: {url}"))?;

    let page: Box<dyn PageContext> = match connect {
        Some(ws_url) => Box::new(CdpPage::connect(&ws_url).await?),
        None => Box::new(CdpPage::launch().await?),
    };

    let detector = Arc::new(Mutex::new(Detector::new()));
    let mut watcher = LiveWatcher::new(page, detector.clone());
    let found = watcher.prepare(target.as_str()).await?;
    info!("initial scan found {found} question(s)");

    let socket_path = socket.unwrap_or_else(server::default_socket_path);
    let listener = server::bind(&socket_path)?;
    let server_task = tokio::spawn(server::serve(listener, detector));

    if !output::is_quiet() {
        eprintln!(
            "  {} watching {} ({found} question(s) so far)",
            s.ok_sym(),
            s.bold(target.as_str())
        );
        eprintln!("  Results socket: {}", socket_path.display());
        eprintln!("  Press Ctrl-C to stop.");
    }

    let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms.max(50)));
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("received shutdown signal");
                break;
            }
            _ = ticker.tick() => {
                match watcher.tick().await {
                    Ok(applied) if applied > 0 => {
                        info!("highlighted {applied} new choice(s)");
                    }
                    Ok(_) => {}
                    Err(e) => warn!("observer poll failed: {e}"),
                }
            }
        }
    }

    server_task.abort();
    let _ = std::fs::remove_file(&socket_path);
    watcher.close().await.ok();

    if !output::is_quiet() {
        eprintln!("  {} quizmark stopped.", s.ok_sym());
    }
    Ok(())
}
