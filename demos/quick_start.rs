//! Watching a component and observing its failures.
//!
//! Run with: cargo run --example quick_start

use serde_json::json;
use spyglass::{component, raise, watch, Config, Value};

fn main() {
    let teller = component! {
        state: { "till": 100 },
        withdraw(this, args) => {
            let amount = args.first().and_then(Value::as_i64).unwrap_or(0);
            let till = this.field("till").and_then(|v| v.as_i64()).unwrap_or(0);
            if amount > till {
                raise!("insufficient funds: {amount} > {till}");
            }
            this.set_field("till", till - amount);
            Ok(json!(till - amount))
        },
    };

    let config = Config::new()
        .set_rethrow(false)
        .set_on_error(|_receiver, notice| {
            println!(
                "observed a failure in {}: {}",
                notice.member,
                notice.error.message().unwrap_or_default()
            );
        });

    let teller = watch(teller, ("Teller", config)).expect("object target is watchable");

    // The happy path is untouched.
    println!("balance: {}", teller.call("withdraw", &[json!(30)]).unwrap());

    // The failure is observed and swallowed.
    let outcome = teller.call("withdraw", &[json!(1_000)]).unwrap();
    println!("suppressed failure yielded: {outcome}");
    println!("till is still: {}", teller.field("till").unwrap());
}
