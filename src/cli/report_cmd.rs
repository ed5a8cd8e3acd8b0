//! `quizmark report` — query a running watch and render its findings.

use crate::cli::output::{self, Styled};
use crate::report::protocol::{Request, ResultsReport};
use crate::report::render;
use crate::report::server;
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;
use tracing::debug;

/// Run the report command once. No retry: an unreachable or silent watch
/// renders the empty state.
pub async fn run(socket: Option<PathBuf>, timeout_ms: u64) -> Result<()> {
    let s = Styled::new();
    let socket_path = socket.unwrap_or_else(server::default_socket_path);

    let report = fetch_results(&socket_path, timeout_ms).await;

    if output::is_json() {
        output::print_json(&serde_json::to_value(report.unwrap_or_default())?);
        return Ok(());
    }

    match report {
        Some(report) => render::render_report(&s, &report),
        None => {
            debug!("no response from {}", socket_path.display());
            render::render_empty(&s);
        }
    }
    Ok(())
}

/// One request/response exchange. Any failure — missing socket, write
/// error, timeout, malformed reply — collapses to `None`.
async fn fetch_results(path: &Path, timeout_ms: u64) -> Option<ResultsReport> {
    let exchange = async {
        let stream = UnixStream::connect(path).await.ok()?;
        let (reader, mut writer) = stream.into_split();

        let request = serde_json::to_string(&Request::GetResults).ok()?;
        writer
            .write_all(format!("{request}\n").as_bytes())
            .await
            .ok()?;

        let mut lines = BufReader::new(reader).lines();
        let reply = lines.next_line().await.ok()??;
        serde_json::from_str(&reply).ok()
    };

    tokio::time::timeout(Duration::from_millis(timeout_ms), exchange)
        .await
        .ok()
        .flatten()
}
