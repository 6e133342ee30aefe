//! Layering instrumentation underneath the interception pipeline.
//!
//! Run with: cargo run --example addons

use serde_json::json;
use spyglass::{component, raise, AddOn, Component, Config, Method, Value, Watcher};
use std::cell::Cell;
use std::rc::Rc;

fn main() {
    let watcher = Watcher::new();

    // Count every call through every watched member, success or failure.
    let calls = Rc::new(Cell::new(0u64));
    let counter = calls.clone();
    watcher.register(AddOn::new("call-counter").on_error_closure(
        move |method, _member, _config, _watcher| {
            let count = counter.clone();
            let wrapped: Method = Rc::new(move |receiver: &Component, args: &[Value]| {
                count.set(count.get() + 1);
                method(receiver, args)
            });
            wrapped
        },
    ));

    let pony = watcher
        .watch(
            component! {
                trick(this, args) => { Ok(json!("ta-da")) },
                stumble(this, args) => { raise!("stumbled") },
            },
            ("Pony", Config::new().set_rethrow(false)),
        )
        .expect("object target is watchable");

    pony.call("trick", &[]).unwrap();
    pony.call("trick", &[]).unwrap();
    pony.call("stumble", &[]).unwrap();

    println!("calls through watched members: {}", calls.get());
}
