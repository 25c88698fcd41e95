//! Shared fixtures for integration tests.

#![allow(dead_code)]

use command_bus::{CancellationToken, DispatchResult, Registry};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
pub struct DoStuff {
    pub id: String,
    pub message: String,
}

impl DoStuff {
    pub fn new(id: &str, message: &str) -> Self {
        Self {
            id: id.to_string(),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Outcome(pub String);

/// A command type no fixture ever registers.
#[derive(Debug)]
pub struct NeverRegistered;

/// Messages recorded by the void `DoStuff` handler, keyed by id.
pub type Recorded = Arc<Mutex<HashMap<String, String>>>;

/// Register the recording void handler; returns its sink and call counter.
pub fn register_recorder(registry: &mut Registry) -> DispatchResult<(Recorded, Arc<AtomicUsize>)> {
    let recorded: Recorded = Arc::new(Mutex::new(HashMap::new()));
    let calls = Arc::new(AtomicUsize::new(0));

    let sink = Arc::clone(&recorded);
    let counter = Arc::clone(&calls);
    registry.register_void(move |cmd: DoStuff, _cancel: CancellationToken| {
        let sink = Arc::clone(&sink);
        let counter = Arc::clone(&counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            sink.lock().await.insert(cmd.id, cmd.message);
            Ok(())
        }
    })?;
    Ok((recorded, calls))
}

/// Register the `(DoStuff, Outcome)` handler that joins id and message;
/// returns its call counter.
pub fn register_joiner(registry: &mut Registry) -> DispatchResult<Arc<AtomicUsize>> {
    let calls = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&calls);
    registry.register_with_result(move |cmd: DoStuff, _cancel: CancellationToken| {
        let counter = Arc::clone(&counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Outcome(format!("{} - {}", cmd.id, cmd.message)))
        }
    })?;
    Ok(calls)
}
