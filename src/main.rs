use anyhow::Result;
use clap::{Parser, Subcommand};
use quizmark::cli::{report_cmd, scan_cmd, watch_cmd};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "quizmark",
    version,
    about = "Find quiz questions in web pages and flag the likely correct answers"
)]
struct Cli {
    /// Emit machine-readable JSON output
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Verbose diagnostics
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one detection pass over a document (file, `-` for stdin, or URL)
    Scan {
        /// HTML source to scan
        input: String,
    },
    /// Watch a live page, highlight answers, and serve results
    Watch {
        /// Page URL to watch
        url: String,
        /// Attach to a running browser via its DevTools websocket URL
        #[arg(long)]
        connect: Option<String>,
        /// Insertion-queue polling interval in milliseconds
        #[arg(long, default_value_t = 500)]
        interval_ms: u64,
        /// Results socket path (default: ~/.quizmark/quizmark.sock)
        #[arg(long)]
        socket: Option<PathBuf>,
    },
    /// Query a running watch and render its findings
    Report {
        /// Results socket path (default: ~/.quizmark/quizmark.sock)
        #[arg(long)]
        socket: Option<PathBuf>,
        /// How long to wait for a response, in milliseconds
        #[arg(long, default_value_t = 3000)]
        timeout_ms: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.json {
        std::env::set_var("QUIZMARK_JSON", "1");
    }
    if cli.quiet {
        std::env::set_var("QUIZMARK_QUIET", "1");
    }
    if cli.verbose {
        std::env::set_var("QUIZMARK_VERBOSE", "1");
    }
    if cli.no_color {
        std::env::set_var("QUIZMARK_NO_COLOR", "1");
    }

    init_tracing(cli.verbose);

    match cli.command {
        Commands::Scan { input } => scan_cmd::run(&input).await,
        Commands::Watch {
            url,
            connect,
            interval_ms,
            socket,
        } => watch_cmd::run(&url, connect, interval_ms, socket).await,
        Commands::Report { socket, timeout_ms } => report_cmd::run(socket, timeout_ms).await,
    }
}

fn init_tracing(verbose: bool) {
    let directive = if verbose {
        "quizmark=debug"
    } else {
        "quizmark=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(directive.parse().unwrap()),
        )
        .init();
}
