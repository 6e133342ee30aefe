//! Covert method interception and error observation for dynamic components.
//!
//! Spyglass replaces each callable member of a watched component with a
//! functionally-transparent wrapper: the original logic runs as-is, but any
//! failure it raises is intercepted, optionally normalized into a structured
//! [`SpyglassError`], reported to observer hooks, and then re-raised or
//! swallowed per configuration. Application code stays free of repetitive
//! failure plumbing; error policy lives in one declarative place.
//!
//! # Examples
//!
//! ## Watching a component
//!
//! ```
//! use spyglass::{component, raise, watch, Config};
//! use serde_json::json;
//!
//! let teller = component! {
//!     state: { "till": 100 },
//!     withdraw(this, args) => {
//!         let amount = args.first().and_then(|v| v.as_i64()).unwrap_or(0);
//!         let till = this.field("till").and_then(|v| v.as_i64()).unwrap_or(0);
//!         if amount > till {
//!             raise!("insufficient funds: {amount} > {till}");
//!         }
//!         this.set_field("till", till - amount);
//!         Ok(json!(till - amount))
//!     },
//! };
//!
//! let seen = std::rc::Rc::new(std::cell::Cell::new(0));
//! let observed = seen.clone();
//! let config = Config::new()
//!     .set_rethrow(false)
//!     .set_on_error(move |_receiver, _notice| observed.set(observed.get() + 1));
//!
//! let teller = watch(teller, ("Teller", config)).unwrap();
//!
//! // The happy path is untouched.
//! assert_eq!(teller.call("withdraw", &[json!(30)]).unwrap(), json!(70));
//!
//! // The failure is observed and, with rethrow off, swallowed.
//! assert!(teller.call("withdraw", &[json!(1_000)]).unwrap().is_null());
//! assert_eq!(seen.get(), 1);
//! ```
//!
//! ## Transparent pass-through with notification
//!
//! Under the default configuration a watched call behaves exactly like the
//! unwatched one — same result, same eventual failure — except that hooks
//! get a side-channel look at every raise before it propagates:
//!
//! ```
//! use spyglass::{component, raise, watch};
//!
//! let pony = component! {
//!     trick(this, args) => { raise!("stumbled") },
//! };
//! let pony = watch(&pony, ()).unwrap();
//!
//! let raised = pony.call("trick", &[]).unwrap_err();
//! assert_eq!(raised.message().as_deref(), Some("Error [:trick] stumbled"));
//! ```
//!
//! ## Profiles
//!
//! ```
//! use spyglass::{component, configure, raise, Config};
//!
//! let quiet = configure(("Stunts", Config::new().set_rethrow(false)));
//! let pony = component! { trick(this, args) => { raise!("stumbled") } };
//!
//! let pony = quiet.watch(&pony, ()).unwrap();
//! assert!(pony.call("trick", &[]).unwrap().is_null());
//! ```
//!
//! # Threading
//!
//! The crate is synchronous and single-threaded by construction: watchers,
//! components, and hooks are `Rc`-based and `!Send`. The process-wide entry
//! points ([`watch`], [`configuration`], [`reconfigure`], [`register`],
//! [`configure`]) operate on a thread-local default [`Watcher`];
//! multi-threaded hosts construct one watcher per thread.

/// Extension registry: ordered add-ons over three fixed events
pub mod addon;
/// Watchable components and their method slots
pub mod component;
/// Named options, defaults, and non-destructive merging
pub mod config;
/// The normalized error record
pub mod error;
/// Observer hooks and the notice they receive
pub mod hook;
/// Declaration-site macros
pub mod macros;
/// Convenience re-exports for quick starts
pub mod prelude;
/// Pre-configured wrapping profiles
pub mod profile;
/// Raised-failure values
pub mod thrown;
/// The wrapping driver and thread-local default instance
pub mod watcher;

mod closure;

/// Tracing integration (requires the `tracing` feature)
#[cfg(feature = "tracing")]
pub mod trace;

pub use addon::{AddOn, WrapSite};
pub use component::{CallResult, Component, Method, MethodFn};
pub use config::{keys, Config, ConfigError, Setting};
pub use error::{is_spyglass_error, Report, SpyglassError};
pub use hook::{Hook, Notice};
pub use profile::{configure, Profile, ProfileOpts};
pub use thrown::{Thrown, Value};
pub use watcher::{
    configuration, default_watcher, reconfigure, register, watch, Target, WatchOpts, Watcher,
};

#[doc(hidden)]
pub use serde_json as __serde_json;
