//! Interception policy: named options, defaults, and non-destructive merging.
//!
//! A [`Config`] is an open map of option name to [`Setting`]. The options the
//! interception pipeline itself recognizes are listed in [`keys`]; add-ons
//! are free to stash their own keys alongside them, which merging carries
//! through untouched.
//!
//! Merge precedence is always *explicit per-call config, then profile or
//! watcher defaults*: a key set on the override is never replaced, and this
//! holds transitively through nested tables.
//!
//! # Examples
//!
//! ```
//! use spyglass::Config;
//!
//! let quiet = Config::new().set_rethrow(false);
//! let base = Config::new().set_rethrow(true).set_errorize(false);
//!
//! let merged = quiet.merge(&base);
//! assert!(!merged.rethrow());   // override wins
//! assert!(!merged.errorize());  // gap filled from base
//! assert!(base.rethrow());      // merging never mutates a source
//! ```

use std::cell::OnceCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::component::Component;
use crate::hook::{Hook, Notice};
use crate::thrown::Value;

/// Option names recognized by the interception pipeline.
pub mod keys {
    /// Wrap unrecognized raised payloads in a normalized error record.
    pub const ERRORIZE: &str = "errorize";
    /// Observer invoked after every intercepted failure.
    pub const ON_ERROR: &str = "on_error";
    /// Re-raise the (possibly normalized) failure after observers run.
    pub const RETHROW: &str = "rethrow";
    /// Observer invoked immediately before re-raising.
    pub const ON_RETHROW: &str = "on_rethrow";
    /// Whether member functions of the target are wrapped.
    pub const WATCH_PROPERTIES: &str = "watch_properties";
    /// Enumerate members through the whole parent chain, or own members only.
    pub const WATCH_DEEP: &str = "watch_deep";
    /// Whether a callable target is itself wrapped.
    pub const WATCH_FUNCTION: &str = "watch_function";
    /// Capture a backtrace when a failure is normalized.
    pub const ADD_STACK_TRACE: &str = "add_stack_trace";

    /// Every key the pipeline recognizes, in documentation order.
    pub const RECOGNIZED: &[&str] = &[
        ERRORIZE,
        ON_ERROR,
        RETHROW,
        ON_RETHROW,
        WATCH_PROPERTIES,
        WATCH_DEEP,
        WATCH_FUNCTION,
        ADD_STACK_TRACE,
    ];
}

/// A single configuration value.
#[derive(Debug, Clone)]
pub enum Setting {
    /// A boolean policy switch.
    Flag(bool),
    /// Explicitly unset; distinct from absent for tri-state options.
    Null,
    /// An observer callback.
    Hook(Hook),
    /// A nested configuration; merged recursively.
    Table(Config),
    /// An add-on-defined scalar carried through merges untouched.
    Data(Value),
}

impl Setting {
    fn from_value(value: Value) -> Self {
        match value {
            Value::Bool(flag) => Self::Flag(flag),
            Value::Null => Self::Null,
            Value::Object(fields) => {
                let mut table = Config::new();
                for (key, value) in fields {
                    table.entries.insert(key, Self::from_value(value));
                }
                Self::Table(table)
            }
            other => Self::Data(other),
        }
    }
}

/// Raised when a non-configuration value is supplied where a configuration
/// was required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The merge source was not an object.
    InvalidKind {
        /// JSON kind of the offending value.
        found: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidKind { found } => {
                write!(
                    f,
                    "invalid configuration source: expected an object, found {found}"
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// A set of named interception options.
///
/// An empty `Config` means "inherit everything": typed accessors fall back to
/// the documented defaults, and [`merge`](Config::merge) fills gaps from the
/// watcher or profile the config is resolved against.
///
/// | option | default | effect |
/// |---|---|---|
/// | `errorize` | `true` | normalize unrecognized raised payloads |
/// | `on_error` | unset | observer for every intercepted failure |
/// | `rethrow` | `true` | re-raise after observers run |
/// | `on_rethrow` | unset | observer fired just before re-raising |
/// | `watch_properties` | unset | `true`: always wrap members; `false`: never; unset: wrap members of plain objects only |
/// | `watch_deep` | `true` | enumerate members through the parent chain |
/// | `watch_function` | `true` | wrap a callable target itself |
/// | `add_stack_trace` | `false` | capture a backtrace while normalizing |
#[derive(Debug, Clone, Default)]
pub struct Config {
    entries: BTreeMap<String, Setting>,
}

impl Config {
    /// An empty configuration; every option inherits its default.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// A configuration with every recognized option explicitly set to its
    /// default value. This is what a fresh watcher starts from.
    pub fn defaults() -> Self {
        let mut config = Self::new();
        config.insert(keys::ERRORIZE, Setting::Flag(true));
        config.insert(keys::ON_ERROR, Setting::Null);
        config.insert(keys::RETHROW, Setting::Flag(true));
        config.insert(keys::ON_RETHROW, Setting::Null);
        config.insert(keys::WATCH_PROPERTIES, Setting::Null);
        config.insert(keys::WATCH_DEEP, Setting::Flag(true));
        config.insert(keys::WATCH_FUNCTION, Setting::Flag(true));
        config.insert(keys::ADD_STACK_TRACE, Setting::Flag(false));
        config
    }

    /// Builds a configuration from a JSON value.
    ///
    /// The value must be an object; anything else fails with
    /// [`ConfigError::InvalidKind`]. Booleans become flags, nulls become
    /// explicit unsets, nested objects become nested tables, and any other
    /// value is carried as add-on data.
    ///
    /// # Examples
    ///
    /// ```
    /// use spyglass::Config;
    /// use serde_json::json;
    ///
    /// let config = Config::from_value(json!({ "rethrow": false })).unwrap();
    /// assert!(!config.rethrow());
    ///
    /// assert!(Config::from_value(json!("rethrow")).is_err());
    /// ```
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        match value {
            Value::Object(fields) => {
                let mut config = Self::new();
                for (key, value) in fields {
                    config.entries.insert(key, Setting::from_value(value));
                }
                Ok(config)
            }
            other => Err(ConfigError::InvalidKind {
                found: json_kind(&other),
            }),
        }
    }

    /// Resolves this configuration against `base`.
    ///
    /// Produces a new configuration; neither source is mutated. Keys set here
    /// always win. Keys only in `base` are copied across: nested tables are
    /// deep-copied with the same rule applied recursively, and hooks are
    /// rebound so they observe the merged configuration when they fire (see
    /// [`Hook`]).
    pub fn merge(&self, base: &Config) -> Config {
        let cell = Rc::new(OnceCell::new());
        let mut merged = self.clone();
        let mut snapshot = self.clone();
        for (key, setting) in &base.entries {
            if merged.entries.contains_key(key) {
                continue;
            }
            snapshot
                .entries
                .insert(key.clone(), plain_copy(setting));
            merged
                .entries
                .insert(key.clone(), rebound_copy(setting, &cell));
        }
        let _ = cell.set(snapshot);
        merged
    }

    /// Looks up a raw setting; add-ons read their own keys through this.
    #[inline]
    pub fn get(&self, key: &str) -> Option<&Setting> {
        self.entries.get(key)
    }

    /// Chainable raw insert for add-on-defined keys.
    #[inline]
    pub fn set(mut self, key: impl Into<String>, setting: Setting) -> Self {
        self.entries.insert(key.into(), setting);
        self
    }

    pub(crate) fn insert(&mut self, key: &str, setting: Setting) {
        self.entries.insert(key.to_string(), setting);
    }

    /// Replaces recognized keys present in `update`, in place. Unrecognized
    /// keys are ignored.
    pub(crate) fn apply_update(&mut self, update: &Config) {
        for key in keys::RECOGNIZED {
            if let Some(setting) = update.get(key) {
                self.insert(key, setting.clone());
            }
        }
    }

    fn flag(&self, key: &str, default: bool) -> bool {
        match self.entries.get(key) {
            Some(Setting::Flag(flag)) => *flag,
            _ => default,
        }
    }

    fn hook(&self, key: &str) -> Option<&Hook> {
        match self.entries.get(key) {
            Some(Setting::Hook(hook)) => Some(hook),
            _ => None,
        }
    }

    /// Whether unrecognized raised payloads are normalized. Defaults to
    /// `true`.
    #[inline]
    pub fn errorize(&self) -> bool {
        self.flag(keys::ERRORIZE, true)
    }

    /// Whether an intercepted failure is re-raised after observers run.
    /// Defaults to `true`.
    #[inline]
    pub fn rethrow(&self) -> bool {
        self.flag(keys::RETHROW, true)
    }

    /// The failure observer, if one is set.
    #[inline]
    pub fn on_error(&self) -> Option<&Hook> {
        self.hook(keys::ON_ERROR)
    }

    /// The pre-rethrow observer, if one is set.
    #[inline]
    pub fn on_rethrow(&self) -> Option<&Hook> {
        self.hook(keys::ON_RETHROW)
    }

    /// Member-wrapping policy: `Some(true)` always, `Some(false)` never,
    /// `None` only for plain (non-callable) targets.
    #[inline]
    pub fn watch_properties(&self) -> Option<bool> {
        match self.entries.get(keys::WATCH_PROPERTIES) {
            Some(Setting::Flag(flag)) => Some(*flag),
            _ => None,
        }
    }

    /// Whether member enumeration walks the parent chain. Defaults to `true`.
    #[inline]
    pub fn watch_deep(&self) -> bool {
        self.flag(keys::WATCH_DEEP, true)
    }

    /// Whether a callable target is itself wrapped. Defaults to `true`.
    #[inline]
    pub fn watch_function(&self) -> bool {
        self.flag(keys::WATCH_FUNCTION, true)
    }

    /// Whether normalization captures a backtrace. Defaults to `false`.
    #[inline]
    pub fn add_stack_trace(&self) -> bool {
        self.flag(keys::ADD_STACK_TRACE, false)
    }

    /// Chainable setter for [`errorize`](Config::errorize).
    #[inline]
    pub fn set_errorize(mut self, errorize: bool) -> Self {
        self.insert(keys::ERRORIZE, Setting::Flag(errorize));
        self
    }

    /// Chainable setter for [`rethrow`](Config::rethrow).
    #[inline]
    pub fn set_rethrow(mut self, rethrow: bool) -> Self {
        self.insert(keys::RETHROW, Setting::Flag(rethrow));
        self
    }

    /// Installs the failure observer.
    #[inline]
    pub fn set_on_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Component, &Notice<'_>) + 'static,
    {
        self.insert(keys::ON_ERROR, Setting::Hook(Hook::new(hook)));
        self
    }

    /// Installs the pre-rethrow observer.
    #[inline]
    pub fn set_on_rethrow<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Component, &Notice<'_>) + 'static,
    {
        self.insert(keys::ON_RETHROW, Setting::Hook(Hook::new(hook)));
        self
    }

    /// Chainable setter for [`watch_properties`](Config::watch_properties);
    /// accepts `true`, `false`, or `None` to restore the tri-state default.
    #[inline]
    pub fn set_watch_properties(mut self, watch: impl Into<Option<bool>>) -> Self {
        let setting = match watch.into() {
            Some(flag) => Setting::Flag(flag),
            None => Setting::Null,
        };
        self.insert(keys::WATCH_PROPERTIES, setting);
        self
    }

    /// Chainable setter for [`watch_deep`](Config::watch_deep).
    #[inline]
    pub fn set_watch_deep(mut self, deep: bool) -> Self {
        self.insert(keys::WATCH_DEEP, Setting::Flag(deep));
        self
    }

    /// Chainable setter for [`watch_function`](Config::watch_function).
    #[inline]
    pub fn set_watch_function(mut self, watch: bool) -> Self {
        self.insert(keys::WATCH_FUNCTION, Setting::Flag(watch));
        self
    }

    /// Chainable setter for [`add_stack_trace`](Config::add_stack_trace).
    #[inline]
    pub fn set_add_stack_trace(mut self, capture: bool) -> Self {
        self.insert(keys::ADD_STACK_TRACE, Setting::Flag(capture));
        self
    }
}

/// Copy of a base setting destined for a merged configuration: tables are
/// deep-copied, hooks are rebound to `cell`.
fn rebound_copy(setting: &Setting, cell: &Rc<OnceCell<Config>>) -> Setting {
    match setting {
        Setting::Hook(hook) => Setting::Hook(hook.rebound(Rc::clone(cell))),
        Setting::Table(table) => Setting::Table(deep_copy(table)),
        other => other.clone(),
    }
}

/// Copy without rebinding, used for the snapshot rebound hooks observe. Keeps
/// the snapshot free of cycles back into its own cell.
fn plain_copy(setting: &Setting) -> Setting {
    match setting {
        Setting::Table(table) => Setting::Table(deep_copy(table)),
        other => other.clone(),
    }
}

fn deep_copy(table: &Config) -> Config {
    let cell = Rc::new(OnceCell::new());
    let mut copied = Config::new();
    let mut snapshot = Config::new();
    for (key, setting) in &table.entries {
        snapshot.entries.insert(key.clone(), plain_copy(setting));
        copied
            .entries
            .insert(key.clone(), rebound_copy(setting, &cell));
    }
    let _ = cell.set(snapshot);
    copied
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
