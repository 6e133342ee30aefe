use criterion::{criterion_group, criterion_main, Criterion};
use serde_json::json;
use spyglass::{component, watch, Component, Config, Thrown, Value};
use std::hint::black_box;

fn ledger() -> Component {
    component! {
        state: { "total": 0 },
        record(this, args) => {
            let amount = args.first().and_then(Value::as_i64).unwrap_or(0);
            let total = this.field("total").and_then(|v| v.as_i64()).unwrap_or(0);
            this.set_field("total", total + amount);
            Ok(json!(total + amount))
        },
        audit(this, args) => {
            let _ = args;
            Err(Thrown::text("ledger out of balance"))
        },
    }
}

fn bench_happy_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("happy_path");

    let raw = ledger();
    group.bench_function("unwatched_call", |b| {
        b.iter(|| black_box(raw.call("record", &[json!(1)])))
    });

    let watched = watch(ledger(), "Ledger").expect("object target is watchable");
    group.bench_function("watched_call", |b| {
        b.iter(|| black_box(watched.call("record", &[json!(1)])))
    });

    group.finish();
}

fn bench_interception(c: &mut Criterion) {
    let mut group = c.benchmark_group("interception");

    let swallowing = watch(
        ledger(),
        ("Ledger", Config::new().set_rethrow(false).set_on_error(|_, _| {})),
    )
    .expect("object target is watchable");
    group.bench_function("observed_and_swallowed", |b| {
        b.iter(|| black_box(swallowing.call("audit", &[])))
    });

    let silent = watch(ledger(), ("Ledger", Config::new().set_rethrow(false)))
        .expect("object target is watchable");
    group.bench_function("short_circuit_swallow", |b| {
        b.iter(|| black_box(silent.call("audit", &[])))
    });

    let rethrowing = watch(ledger(), "Ledger").expect("object target is watchable");
    group.bench_function("normalize_and_rethrow", |b| {
        b.iter(|| black_box(rethrowing.call("audit", &[])))
    });

    group.finish();
}

fn bench_wrapping(c: &mut Criterion) {
    c.bench_function("watch_object", |b| {
        b.iter(|| black_box(watch(ledger(), "Ledger")))
    });
}

criterion_group!(benches, bench_happy_path, bench_interception, bench_wrapping);
criterion_main!(benches);
