//! command-bus demo: wires a small bus, dispatches a few commands, and prints
//! the resulting metrics.

use command_bus::config::{Config, validate};
use command_bus::{CancellationToken, CommandBus, DispatchError, Registry, metrics, telemetry};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

#[derive(Debug, Clone)]
struct DoStuff {
    id: String,
    message: String,
}

#[derive(Debug, PartialEq)]
struct Outcome(String);

#[derive(Debug)]
struct Forgotten;

/// Bus that records `DoStuff` messages and echoes them back on request.
struct StuffBus {
    registry: Registry,
    recorded: Arc<Mutex<HashMap<String, String>>>,
}

impl StuffBus {
    fn new(config: &Config) -> Result<Self, DispatchError> {
        let recorded = Arc::new(Mutex::new(HashMap::new()));
        let mut registry = Registry::from_config(&config.registry);

        let sink = Arc::clone(&recorded);
        registry.register_void(move |cmd: DoStuff, _cancel| {
            let sink = Arc::clone(&sink);
            async move {
                sink.lock().await.insert(cmd.id, cmd.message);
                Ok(())
            }
        })?;

        registry.register_with_result(|cmd: DoStuff, _cancel| async move {
            Ok(Outcome(format!("{} - {}", cmd.id, cmd.message)))
        })?;

        Ok(Self { registry, recorded })
    }
}

impl CommandBus for StuffBus {
    fn registry(&self) -> &Registry {
        &self.registry
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(&path).map_err(|e| {
            eprintln!("failed to load config {path}: {e}");
            e
        })?,
        None => Config::default(),
    };

    if let Err(errors) = validate(&config) {
        for e in &errors {
            eprintln!("config error: {e}");
        }
        anyhow::bail!("invalid configuration ({} errors)", errors.len());
    }

    if !telemetry::init(&config.telemetry)? {
        warn!("Tracing subscriber already installed");
    }
    if config.telemetry.metrics {
        metrics::init();
    }

    let bus = StuffBus::new(&config)?;
    info!(
        handlers = bus.registry().len(),
        policy = ?bus.registry().policy(),
        "Command bus ready"
    );

    let cancel = CancellationToken::new();
    let command = DoStuff {
        id: "42".into(),
        message: "hello".into(),
    };

    bus.send(command.clone(), cancel.clone()).await?;
    info!(recorded = ?bus.recorded.lock().await.get("42"), "Void dispatch complete");

    let outcome: Outcome = bus.request(command, cancel.clone()).await?;
    info!(outcome = %outcome.0, "Request dispatch complete");

    match bus.send(Forgotten, cancel).await {
        Err(e) if e.is_no_handler() => info!(error = %e, "Unregistered command rejected"),
        Err(e) => error!(error = %e, "Unexpected dispatch failure"),
        Ok(()) => error!("Unregistered command was dispatched"),
    }

    for (shape, count) in bus.registry().stats() {
        info!(shape = %shape, count, "Dispatch stats");
    }

    if config.telemetry.metrics {
        print!("{}", metrics::gather_metrics());
    }
    Ok(())
}
