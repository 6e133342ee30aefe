//! Tracing integration for spyglass.
//!
//! The core never logs: every observable event flows through hooks and
//! add-ons. This module provides the one prebuilt add-on — a verbose tracer
//! that narrates the interception lifecycle through the three extension
//! events.
//!
//! # Feature Flag
//!
//! Requires the `tracing` feature:
//!
//! ```toml
//! [dependencies]
//! spyglass = { version = "0.4", features = ["tracing"] }
//! ```
//!
//! # Examples
//!
//! ```rust,ignore
//! spyglass::register(spyglass::trace::verbose());
//! ```

use crate::addon::AddOn;
use crate::thrown::Value;

/// An add-on that logs closure configuration, member wrapping, and
/// normalized failures.
///
/// Registers under the name `verbose`; handlers pass every value through
/// unchanged.
pub fn verbose() -> AddOn {
    AddOn::new("verbose")
        .init(|_watcher| {
            tracing::debug!("installing verbose add-on");
            Value::Null
        })
        .on_configure_closure(|config, site, _watcher| {
            tracing::debug!(
                name = ?site.name,
                id = ?site.id,
                member = site.member,
                "configuring interception closure"
            );
            config
        })
        .on_error_closure(|method, member, _config, _watcher| {
            tracing::trace!(member, "wrapping member in interception closure");
            method
        })
        .on_errorized(|error, _config, _watcher| {
            tracing::debug!(error = %error, "normalized intercepted failure");
            error
        })
}
