//! Results server — answers report queries for a running watch.

use crate::detect::Detector;
use crate::report::protocol::ResultsReport;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Default socket path: `~/.quizmark/quizmark.sock`.
pub fn default_socket_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join(".quizmark")
        .join("quizmark.sock")
}

/// Bind the results socket, clearing any stale file first.
pub fn bind(path: &Path) -> Result<UnixListener> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    if path.exists() {
        std::fs::remove_file(path).ok();
    }
    UnixListener::bind(path).with_context(|| format!("binding {}", path.display()))
}

/// Accept report clients until the task is dropped. Each client gets one
/// request/response exchange over newline-delimited JSON.
pub async fn serve(listener: UnixListener, detector: Arc<Mutex<Detector>>) -> Result<()> {
    loop {
        let (stream, _) = listener.accept().await.context("accepting report client")?;
        let detector = detector.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_client(stream, detector).await {
                warn!("report client failed: {e}");
            }
        });
    }
}

async fn handle_client(stream: UnixStream, detector: Arc<Mutex<Detector>>) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    let Some(line) = lines.next_line().await? else {
        return Ok(());
    };

    let reply = match serde_json::from_str::<serde_json::Value>(&line) {
        Ok(message) => match message.get("action").and_then(|a| a.as_str()) {
            Some("getResults") => {
                let detector = detector.lock().await;
                let report = ResultsReport::from_questions(detector.questions());
                debug!("reporting {} question(s)", report.total_questions);
                serde_json::to_value(report)?
            }
            Some(other) => {
                warn!("unknown action: {other}");
                serde_json::json!({"error": "unknown_action"})
            }
            None => serde_json::json!({"error": "bad_request"}),
        },
        Err(e) => {
            warn!("malformed request: {e}");
            serde_json::json!({"error": "bad_request"})
        }
    };

    writer.write_all(format!("{reply}\n").as_bytes()).await?;
    Ok(())
}
