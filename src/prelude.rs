//! Convenience re-exports for common usage patterns.
//!
//! Import everything with:
//!
//! ```
//! use spyglass::prelude::*;
//! ```
//!
//! # What's Included
//!
//! - **Macros**: [`component!`], [`watched!`], [`raise!`]
//! - **Types**: [`Component`], [`Config`], [`Thrown`], [`SpyglassError`],
//!   [`Watcher`], [`Profile`], [`AddOn`]
//! - **Entry points**: [`watch`], [`configure`], [`configuration`],
//!   [`reconfigure`], [`register`]
//!
//! # Examples
//!
//! ```
//! use spyglass::prelude::*;
//! use serde_json::json;
//!
//! let pony = component! {
//!     trick(this, args) => { raise!("stumbled") },
//! };
//! let pony = watch(&pony, ()).unwrap();
//! let raised = pony.call("trick", &[]).unwrap_err();
//! assert_eq!(raised.message().as_deref(), Some("Error [:trick] stumbled"));
//! ```

// Macros
pub use crate::{component, raise, watched};

// Core types
pub use crate::addon::{AddOn, WrapSite};
pub use crate::component::{CallResult, Component, Method};
pub use crate::config::{Config, ConfigError, Setting};
pub use crate::error::{is_spyglass_error, Report, SpyglassError};
pub use crate::hook::{Hook, Notice};
pub use crate::profile::{Profile, ProfileOpts};
pub use crate::thrown::{Thrown, Value};
pub use crate::watcher::{Target, WatchOpts, Watcher};

// Entry points on the thread's default watcher
pub use crate::profile::configure;
pub use crate::watcher::{configuration, default_watcher, reconfigure, register, watch};
