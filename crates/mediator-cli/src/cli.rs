//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "mediator", about = "Route commands and queries through an in-process mediator")]
pub struct Cli {
    /// JSON file with mediator settings (e.g. `{ "validate_commands": true }`)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// tracing filter expression; falls back to RUST_LOG, then `info`
    #[arg(long, global = true)]
    pub log_filter: Option<String>,

    /// cancel in-flight requests after this many milliseconds
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Action,
}

#[derive(Debug, Subcommand)]
pub enum Action {
    /// create, read, cancel and list an order
    Demo,
    /// print every request name accepted by `send`
    Routes,
    /// send one request by name, e.g. `send CREATE_ORDER '{"sku":"A-1","quantity":2}'`
    Send {
        name: String,
        #[arg(default_value = "{}")]
        payload: String,
    },
    /// send a JSON array of `{"request": NAME, "payload": {...}}` in order
    Batch { file: PathBuf },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_defaults_to_empty_payload() {
        let cli = Cli::parse_from(["mediator", "send", "LIST_ORDERS"]);
        assert!(matches!(
            cli.command,
            Action::Send { ref name, ref payload } if name == "LIST_ORDERS" && payload == "{}"
        ));
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::parse_from(["mediator", "demo", "--timeout-ms", "250", "--log-filter", "debug"]);
        assert_eq!(cli.timeout_ms, Some(250));
        assert_eq!(cli.log_filter.as_deref(), Some("debug"));
    }
}
