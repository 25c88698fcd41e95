use command_bus::{AnyCommand, CancellationToken, Registry};
use criterion::{Criterion, Throughput, criterion_group, criterion_main};

// Measures router overhead: lookup, type erasure, boxing and the downcast of
// the result. Handlers do no work of their own.

struct Ping(u64);
struct Pong(u64);

fn registry() -> Registry {
    let mut registry = Registry::new();
    registry
        .register_void(|_: Ping, _| async { Ok(()) })
        .unwrap();
    registry
        .register_with_result(|cmd: Ping, _| async move { Ok(Pong(cmd.0 + 1)) })
        .unwrap();
    registry
}

fn dispatch_benchmark(c: &mut Criterion) {
    let rt = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();
    let registry = registry();
    let mut group = c.benchmark_group("dispatch");
    group.throughput(Throughput::Elements(1));

    group.bench_function("send", |b| {
        b.to_async(&rt).iter(|| async {
            registry
                .send(Ping(1), CancellationToken::new())
                .await
                .unwrap()
        })
    });

    group.bench_function("request", |b| {
        b.to_async(&rt).iter(|| async {
            let pong: Pong = registry
                .request(Ping(1), CancellationToken::new())
                .await
                .unwrap();
            pong.0
        })
    });

    group.bench_function("request_any", |b| {
        b.to_async(&rt).iter(|| async {
            let pong: Pong = registry
                .request_any(AnyCommand::new(Ping(1)), CancellationToken::new())
                .await
                .unwrap();
            pong.0
        })
    });

    group.bench_function("miss", |b| {
        b.to_async(&rt).iter(|| async {
            registry
                .send(Pong(1), CancellationToken::new())
                .await
                .unwrap_err()
        })
    });

    group.finish();
}

criterion_group!(benches, dispatch_benchmark);
criterion_main!(benches);
