mod cli;
mod orders;
mod telemetry;

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use mediator_core::{
    BuildError, CancellationSignal, CancellationSource, MediatorConfig, MediatorError,
    RegistryError, Sender,
};

use crate::cli::{Action, Cli};
use crate::orders::{CancelOrder, CreateOrder, GetOrder, ListOrders, OrderStore};
use crate::telemetry::TelemetryError;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),

    #[error("read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("parse {what}: {source}")]
    Json {
        what: String,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Mediator(#[from] MediatorError),
}

/// One step of a batch file.
#[derive(Debug, Deserialize)]
struct BatchEntry {
    request: String,
    #[serde(default = "empty_object")]
    payload: Value,
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    telemetry::initialise(cli.log_filter.as_deref())?;

    let config = match cli.config.as_deref() {
        Some(path) => load_config(path)?,
        None => MediatorConfig::default(),
    };
    info!(validate_commands = config.validate_commands, "mediator configured");

    let builder = orders::builder(Arc::new(OrderStore::default()))?.config(config);
    let routes = builder.registry().route_names();
    let mediator = builder.build()?;
    let cancel = cancellation(cli.timeout_ms);

    match cli.command {
        Action::Demo => demo(&mediator, cancel).await,
        Action::Routes => {
            for name in routes {
                println!("{name}");
            }
            Ok(())
        }
        Action::Send { name, payload } => {
            let payload = parse_json(&payload, "payload")?;
            let output = mediator.send_json(&name, payload, cancel).await?;
            print_json(&output)
        }
        Action::Batch { file } => {
            let raw = read_file(&file)?;
            let entries: Vec<BatchEntry> = serde_json::from_str(&raw).map_err(|source| CliError::Json {
                what: file.display().to_string(),
                source,
            })?;
            for entry in entries {
                let output = mediator
                    .send_json(&entry.request, entry.payload, cancel.clone())
                    .await?;
                print_json(&output)?;
            }
            Ok(())
        }
    }
}

/// Walks one order through its life using only the `Sender` surface.
async fn demo<S: Sender>(sender: &S, cancel: CancellationSignal) -> Result<(), CliError> {
    let id = sender
        .send_command(
            CreateOrder {
                sku: "SKU-1".to_string(),
                quantity: 2,
            },
            cancel.clone(),
        )
        .await?;
    print_json(&id)?;

    let order = sender.send_query(GetOrder { id }, cancel.clone()).await?;
    print_json(&order)?;

    let cancelled = sender.send_command(CancelOrder { id }, cancel.clone()).await?;
    print_json(&cancelled)?;

    // a second cancel is rejected by the handler itself
    if let Err(err) = sender.send_command(CancelOrder { id }, cancel.clone()).await {
        warn!(dispatch_failure = err.is_dispatch_failure(), error = %err, "second cancel rejected");
    }

    let all = sender.send_query(ListOrders {}, cancel).await?;
    print_json(&all)
}

fn cancellation(timeout_ms: Option<u64>) -> CancellationSignal {
    let Some(timeout_ms) = timeout_ms else {
        return CancellationSignal::none();
    };
    let source = CancellationSource::new();
    let signal = source.signal();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(timeout_ms)).await;
        warn!(timeout_ms, "timeout reached, cancelling in-flight requests");
        source.cancel();
    });
    signal
}

fn load_config(path: &Path) -> Result<MediatorConfig, CliError> {
    let raw = read_file(path)?;
    MediatorConfig::from_json_str(&raw).map_err(|source| CliError::Json {
        what: path.display().to_string(),
        source,
    })
}

fn read_file(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.display().to_string(),
        source,
    })
}

fn parse_json(raw: &str, what: &str) -> Result<Value, CliError> {
    serde_json::from_str(raw).map_err(|source| CliError::Json {
        what: what.to_string(),
        source,
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value).map_err(|source| CliError::Json {
        what: "output".to_string(),
        source,
    })?;
    println!("{rendered}");
    Ok(())
}
