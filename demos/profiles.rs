//! Pre-configured wrapping profiles and curried narrowing.
//!
//! Run with: cargo run --example profiles

use spyglass::{component, configure, raise, Config};

fn main() {
    // One profile for the whole subsystem: everything watched through it is
    // named, observed, and silenced the same way.
    let subsystem = configure((
        "Payments",
        Config::new().set_on_error(|_receiver, notice| {
            eprintln!("[payments] {}", notice.error.message().unwrap_or_default());
        }),
    ));

    let gateway = subsystem
        .watch(
            component! { charge(this, args) => { raise!("card declined") } },
            (),
        )
        .expect("object target is watchable");

    if let Err(raised) = gateway.call("charge", &[]) {
        println!("propagated: {}", raised.message().unwrap_or_default());
    }

    // Narrow the profile for a noisy corner that should never propagate.
    let quiet = subsystem.reconfigure(Config::new().set_rethrow(false));
    let retries = quiet
        .watch(
            component! { poll(this, args) => { raise!("still pending") } },
            (),
        )
        .expect("object target is watchable");

    println!("suppressed: {}", retries.call("poll", &[]).unwrap());
}
