//! The prebuilt tracing add-on narrating the interception lifecycle.
//!
//! Run with: cargo run --example verbose_addon --features tracing

use spyglass::{component, raise, Watcher};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .init();

    let watcher = Watcher::new();
    watcher.register(spyglass::trace::verbose());

    let pony = watcher
        .watch(
            component! { trick(this, args) => { raise!("stumbled") } },
            "Pony",
        )
        .expect("object target is watchable");

    let _ = pony.call("trick", &[]);
}
