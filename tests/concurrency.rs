//! Concurrent dispatch over a shared registry.

mod common;

use command_bus::{CancellationToken, CommandBus, Registry, SharedRegistry};
use common::{DoStuff, Outcome, register_joiner, register_recorder};
use std::sync::Arc;
use std::sync::atomic::Ordering;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_dispatch_over_arc_registry() {
    let mut registry = Registry::new();
    let (recorded, calls) = register_recorder(&mut registry).expect("register recorder");
    register_joiner(&mut registry).expect("register joiner");
    let registry = Arc::new(registry);

    let mut tasks = Vec::new();
    for i in 0..64 {
        let registry = Arc::clone(&registry);
        tasks.push(tokio::spawn(async move {
            let id = i.to_string();
            registry
                .send(DoStuff::new(&id, "payload"), CancellationToken::new())
                .await?;
            registry
                .request::<_, Outcome>(DoStuff::new(&id, "payload"), CancellationToken::new())
                .await
        }));
    }

    for (i, task) in tasks.into_iter().enumerate() {
        let outcome = task.await.expect("task panicked").expect("dispatch failed");
        assert_eq!(outcome.0, format!("{i} - payload"));
    }

    assert_eq!(calls.load(Ordering::SeqCst), 64);
    assert_eq!(recorded.lock().await.len(), 64);

    let stats = registry.stats();
    assert_eq!(stats.len(), 2);
    assert!(stats.iter().all(|(_, count)| *count == 64));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_shared_registry_registers_while_dispatching() {
    let shared = Arc::new(SharedRegistry::default());
    shared
        .register_with_result(|cmd: DoStuff, _| async move {
            tokio::task::yield_now().await;
            Ok(Outcome(cmd.id))
        })
        .expect("register");

    let dispatcher = {
        let shared = Arc::clone(&shared);
        tokio::spawn(async move {
            for i in 0..200 {
                let outcome: Outcome = shared
                    .request(DoStuff::new(&i.to_string(), ""), CancellationToken::new())
                    .await?;
                assert_eq!(outcome.0, i.to_string());
            }
            Ok::<_, command_bus::DispatchError>(())
        })
    };

    for n in 0..50u32 {
        shared
            .register_with_result(move |_: u32, _| async move { Ok(n) })
            .expect("late registration");
    }

    dispatcher.await.expect("dispatcher panicked").expect("dispatch failed");
    let last: u32 = shared
        .request(0u32, CancellationToken::new())
        .await
        .expect("request");
    assert_eq!(last, 49);
}

struct Counter {
    registry: Registry,
}

impl CommandBus for Counter {
    fn registry(&self) -> &Registry {
        &self.registry
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_bus_futures_are_spawnable() {
    let mut registry = Registry::new();
    register_joiner(&mut registry).expect("register joiner");
    let bus = Arc::new(Counter { registry });

    let handle = {
        let bus = Arc::clone(&bus);
        tokio::spawn(async move {
            bus.request::<_, Outcome>(DoStuff::new("1", "spawned"), CancellationToken::new())
                .await
        })
    };

    let outcome = handle.await.expect("join").expect("dispatch");
    assert_eq!(outcome.0, "1 - spawned");
}
