//! The wrapping driver and its process-wide default instance.
//!
//! A [`Watcher`] owns the two pieces of shared state the system has: a
//! default [`Config`] and the add-on registry. Most callers use the
//! thread-local default watcher through the free functions [`watch`],
//! [`configuration`], [`reconfigure`], [`register`], and
//! [`configure`](crate::configure); embeddings that want isolation (one
//! tenant per watcher, tests that must not share defaults) construct their
//! own.
//!
//! Everything here is deliberately single-threaded: handles are `Rc`-based
//! and therefore `!Send`, which turns the "single writer, no cross-thread
//! mutation" contract into a compile-time guarantee. Multi-threaded hosts
//! construct one watcher per thread.

use std::cell::RefCell;
use std::rc::Rc;

use crate::addon::{AddOn, AddOnVec};
use crate::closure::error_closure;
use crate::component::Component;
use crate::config::Config;
use crate::profile::{Profile, ProfileOpts};
use crate::thrown::Value;

/// What [`watch`] accepts: an explicit component, or a bare JSON value.
///
/// A JSON object converts to a plain data component (watchable, even if it
/// has no methods yet); any other JSON value is not watchable and makes the
/// driver return `None`.
pub enum Target {
    /// An already-built component.
    Component(Component),
    /// A raw value; only objects are watchable.
    Value(Value),
}

impl From<Component> for Target {
    #[inline]
    fn from(component: Component) -> Self {
        Self::Component(component)
    }
}

impl From<&Component> for Target {
    #[inline]
    fn from(component: &Component) -> Self {
        Self::Component(component.clone())
    }
}

impl From<Value> for Target {
    #[inline]
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

/// Naming and configuration for one [`watch`] call.
///
/// Rarely built by hand: the conversions below cover the usual call shapes,
/// so `watch(target, ())`, `watch(target, "Name")`, `watch(target, config)`,
/// `watch(target, ("Name", config))`, and `watch(target, ("Name", "id-1",
/// config))` all work directly.
#[derive(Clone, Default)]
pub struct WatchOpts {
    pub(crate) name: Option<String>,
    pub(crate) id: Option<String>,
    pub(crate) config: Option<Config>,
}

impl WatchOpts {
    /// Empty options: unnamed, watcher defaults.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the component name failures will be labeled with.
    #[inline]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the unique id distinguishing instances watched under one name.
    #[inline]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the per-call configuration override.
    #[inline]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }
}

impl From<()> for WatchOpts {
    #[inline]
    fn from((): ()) -> Self {
        Self::default()
    }
}

impl From<&str> for WatchOpts {
    #[inline]
    fn from(name: &str) -> Self {
        Self::default().name(name)
    }
}

impl From<String> for WatchOpts {
    #[inline]
    fn from(name: String) -> Self {
        Self::default().name(name)
    }
}

impl From<(&str, &str)> for WatchOpts {
    #[inline]
    fn from((name, id): (&str, &str)) -> Self {
        Self::default().name(name).id(id)
    }
}

impl From<Config> for WatchOpts {
    #[inline]
    fn from(config: Config) -> Self {
        Self::default().config(config)
    }
}

impl From<(&str, Config)> for WatchOpts {
    #[inline]
    fn from((name, config): (&str, Config)) -> Self {
        Self::default().name(name).config(config)
    }
}

impl From<(&str, &str, Config)> for WatchOpts {
    #[inline]
    fn from((name, id, config): (&str, &str, Config)) -> Self {
        Self::default().name(name).id(id).config(config)
    }
}

struct WatcherInner {
    config: RefCell<Config>,
    addons: RefCell<AddOnVec>,
}

/// The wrapping driver: default configuration plus add-on registry.
///
/// Cheap to clone; clones share state. See the [module docs](self) for the
/// threading model.
#[derive(Clone)]
pub struct Watcher {
    inner: Rc<WatcherInner>,
}

impl Watcher {
    /// A fresh watcher with default configuration and no add-ons.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(WatcherInner {
                config: RefCell::new(Config::defaults()),
                addons: RefCell::new(AddOnVec::new()),
            }),
        }
    }

    /// Snapshot of the watcher's current default configuration.
    pub fn configuration(&self) -> Config {
        self.inner.config.borrow().clone()
    }

    /// Merges recognized keys of `update` into the default configuration and
    /// returns the new current snapshot. Unrecognized keys are ignored.
    pub fn reconfigure(&self, update: Config) -> Config {
        self.inner.config.borrow_mut().apply_update(&update);
        self.configuration()
    }

    /// Registers an add-on.
    ///
    /// Fails softly with `None` when the name is already taken, leaving the
    /// registry unchanged. On success the add-on's init hook runs once, its
    /// result is returned, and the entry joins the end of the fold order.
    pub fn register(&self, addon: AddOn) -> Option<Value> {
        let taken = self
            .inner
            .addons
            .borrow()
            .iter()
            .any(|existing| existing.name() == addon.name());
        if taken {
            return None;
        }
        let result = match &addon.init {
            Some(init) => init(self),
            None => Value::Null,
        };
        self.inner.addons.borrow_mut().push(addon);
        Some(result)
    }

    /// Builds a pre-configured wrapping profile bound to this watcher.
    pub fn configure(&self, opts: impl Into<ProfileOpts>) -> Profile {
        Profile::bound(self.clone(), opts.into())
    }

    /// Wraps a target's callable surface with error interception.
    ///
    /// The per-call config resolves against this watcher's defaults. Plain
    /// object targets are mutated in place — every live handle observes the
    /// wrapping — and returned. Callable targets come back as a fresh
    /// wrapped callable (unless `watch_function` is off). A target that is
    /// neither yields `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use spyglass::{watch, Component, Thrown};
    ///
    /// let pony = Component::new().method("trick", |_this, _args| {
    ///     Err(Thrown::text("stumbled"))
    /// });
    /// let pony = watch(&pony, "OneTrickPony").unwrap();
    ///
    /// let raised = pony.call("trick", &[]).unwrap_err();
    /// assert_eq!(
    ///     raised.message().as_deref(),
    ///     Some("Error [OneTrickPony:trick] stumbled"),
    /// );
    /// ```
    pub fn watch(
        &self,
        target: impl Into<Target>,
        opts: impl Into<WatchOpts>,
    ) -> Option<Component> {
        let opts = opts.into();
        let config = match &opts.config {
            Some(config) => config.merge(&self.configuration()),
            None => self.configuration(),
        };
        self.apply(target.into(), opts.name, opts.id, config)
    }

    /// Driver shared by [`watch`](Watcher::watch) and [`Profile::watch`]:
    /// `config` is already fully resolved.
    pub(crate) fn apply(
        &self,
        target: Target,
        name: Option<String>,
        id: Option<String>,
        config: Config,
    ) -> Option<Component> {
        let component = match target {
            Target::Component(component) => component,
            Target::Value(value @ Value::Object(_)) => Component::object(value),
            Target::Value(_) => return None,
        };

        let callable = component.is_callable();
        let watched = match component.callable_slot() {
            Some(slot) if config.watch_function() => {
                let wrapped = error_closure(
                    Some(&component),
                    name.as_deref(),
                    id.as_deref(),
                    "",
                    slot.method,
                    config.clone(),
                    self,
                );
                Component::from_method(wrapped)
            }
            _ => component.clone(),
        };

        let watch_members = config.watch_properties() == Some(true)
            || (config.watch_properties() != Some(false) && !callable);
        if watch_members {
            let members = if config.watch_deep() {
                component.members()
            } else {
                component.own_members()
            };
            for member in members {
                let Some(slot) = component.find(&member) else {
                    continue;
                };
                if !slot.writable {
                    continue;
                }
                let wrapped = error_closure(
                    Some(&component),
                    name.as_deref(),
                    id.as_deref(),
                    &member,
                    slot.method,
                    config.clone(),
                    self,
                );
                watched.install(&member, wrapped);
            }
        }

        Some(watched)
    }

    pub(crate) fn addons_snapshot(&self) -> AddOnVec {
        self.inner.addons.borrow().clone()
    }
}

impl Default for Watcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Watcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Watcher")
            .field("addons", &self.inner.addons.borrow().len())
            .finish_non_exhaustive()
    }
}

thread_local! {
    static DEFAULT_WATCHER: Watcher = Watcher::new();
}

/// The thread's default watcher, shared by the free functions below.
pub fn default_watcher() -> Watcher {
    DEFAULT_WATCHER.with(Clone::clone)
}

/// [`Watcher::watch`] on the thread's default watcher.
pub fn watch(target: impl Into<Target>, opts: impl Into<WatchOpts>) -> Option<Component> {
    default_watcher().watch(target, opts)
}

/// [`Watcher::configuration`] on the thread's default watcher.
pub fn configuration() -> Config {
    default_watcher().configuration()
}

/// [`Watcher::reconfigure`] on the thread's default watcher.
pub fn reconfigure(update: Config) -> Config {
    default_watcher().reconfigure(update)
}

/// [`Watcher::register`] on the thread's default watcher.
pub fn register(addon: AddOn) -> Option<Value> {
    default_watcher().register(addon)
}
