//! CLI subcommand implementations for the quizmark binary.

pub mod output;
pub mod report_cmd;
pub mod scan_cmd;
pub mod watch_cmd;
