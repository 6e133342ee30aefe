//! Add-ons: ordered extensions that intercept the wrapping pipeline itself.
//!
//! An [`AddOn`] can hook three fixed points:
//!
//! - `configure_closure` — rewrite the configuration a member is about to be
//!   wrapped with;
//! - `error_closure` — rewrap the method itself, layering instrumentation
//!   underneath the interception closure;
//! - `errorized` — rewrite a freshly normalized error before observers see
//!   it.
//!
//! Handlers fold: each receives the value the previous add-on returned, in
//! registration order. Registration failures (a duplicate name) surface as
//! `None` from [`Watcher::register`](crate::Watcher::register) rather than a
//! panic, so optionally-installed add-ons never take the host down at
//! startup.
//!
//! # Examples
//!
//! ```
//! use spyglass::AddOn;
//!
//! // An add-on that forces every wrapped member to swallow failures.
//! let muzzle = AddOn::new("muzzle").on_configure_closure(|config, _site, _watcher| {
//!     config.set_rethrow(false)
//! });
//! assert_eq!(muzzle.name(), "muzzle");
//! ```

use std::rc::Rc;

use smallvec::SmallVec;

use crate::component::{Component, Method};
use crate::config::Config;
use crate::error::SpyglassError;
use crate::thrown::Value;
use crate::watcher::Watcher;

/// Where in the driver a member is being wrapped; handed to
/// `configure_closure` handlers.
#[derive(Clone, Copy)]
pub struct WrapSite<'a> {
    /// Component name the target is being watched under.
    pub name: Option<&'a str>,
    /// Unique id the target is being watched under.
    pub id: Option<&'a str>,
    /// The member being wrapped; empty for a callable target itself.
    pub member: &'a str,
    /// The target component, absent only for detached rewraps.
    pub target: Option<&'a Component>,
}

pub(crate) type InitFn = dyn Fn(&Watcher) -> Value;
pub(crate) type ConfigureClosureFn = dyn Fn(Config, &WrapSite<'_>, &Watcher) -> Config;
pub(crate) type ErrorClosureFn = dyn Fn(Method, &str, &Config, &Watcher) -> Method;
pub(crate) type ErrorizedFn = dyn Fn(SpyglassError, &Config, &Watcher) -> SpyglassError;

/// A named extension entry. Built fluently, registered once, never removed.
#[derive(Clone)]
pub struct AddOn {
    name: String,
    pub(crate) init: Option<Rc<InitFn>>,
    pub(crate) configure_closure: Option<Rc<ConfigureClosureFn>>,
    pub(crate) error_closure: Option<Rc<ErrorClosureFn>>,
    pub(crate) errorized: Option<Rc<ErrorizedFn>>,
}

impl AddOn {
    /// A new entry with the given unique name and no handlers.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            init: None,
            configure_closure: None,
            error_closure: None,
            errorized: None,
        }
    }

    /// The registry-unique name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Installation hook, run once at registration; its result is handed
    /// back to whoever registered the add-on.
    pub fn init<F>(mut self, f: F) -> Self
    where
        F: Fn(&Watcher) -> Value + 'static,
    {
        self.init = Some(Rc::new(f));
        self
    }

    /// Handler for the `configure_closure` event.
    pub fn on_configure_closure<F>(mut self, f: F) -> Self
    where
        F: Fn(Config, &WrapSite<'_>, &Watcher) -> Config + 'static,
    {
        self.configure_closure = Some(Rc::new(f));
        self
    }

    /// Handler for the `error_closure` event.
    pub fn on_error_closure<F>(mut self, f: F) -> Self
    where
        F: Fn(Method, &str, &Config, &Watcher) -> Method + 'static,
    {
        self.error_closure = Some(Rc::new(f));
        self
    }

    /// Handler for the `errorized` event.
    pub fn on_errorized<F>(mut self, f: F) -> Self
    where
        F: Fn(SpyglassError, &Config, &Watcher) -> SpyglassError + 'static,
    {
        self.errorized = Some(Rc::new(f));
        self
    }
}

impl std::fmt::Debug for AddOn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddOn")
            .field("name", &self.name)
            .field("init", &self.init.is_some())
            .field("configure_closure", &self.configure_closure.is_some())
            .field("error_closure", &self.error_closure.is_some())
            .field("errorized", &self.errorized.is_some())
            .finish()
    }
}

/// Registration-ordered add-on list; order is fold order.
pub(crate) type AddOnVec = SmallVec<[AddOn; 2]>;

pub(crate) fn fold_configure_closure(
    addons: &AddOnVec,
    seed: Config,
    site: &WrapSite<'_>,
    owner: &Watcher,
) -> Config {
    addons
        .iter()
        .filter_map(|addon| addon.configure_closure.as_ref())
        .fold(seed, |config, handler| handler(config, site, owner))
}

pub(crate) fn fold_error_closure(
    addons: &AddOnVec,
    seed: Method,
    member: &str,
    config: &Config,
    owner: &Watcher,
) -> Method {
    addons
        .iter()
        .filter_map(|addon| addon.error_closure.as_ref())
        .fold(seed, |method, handler| handler(method, member, config, owner))
}

pub(crate) fn fold_errorized(
    addons: &AddOnVec,
    seed: SpyglassError,
    config: &Config,
    owner: &Watcher,
) -> SpyglassError {
    addons
        .iter()
        .filter_map(|addon| addon.errorized.as_ref())
        .fold(seed, |error, handler| handler(error, config, owner))
}
