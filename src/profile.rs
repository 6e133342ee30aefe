//! Pre-configured wrapping profiles.
//!
//! A [`Profile`] is a wrapping entry point bound to a fixed name and/or
//! configuration override: watching through it defaults the name to the
//! profile's, and resolves per-call configuration against the profile's
//! override instead of the watcher-wide defaults. Profiles compose — a
//! profile can be narrowed again into a further-bound profile — which is
//! what definition-time adapters like [`watched!`](crate::watched) build on.
//!
//! # Examples
//!
//! ```
//! use spyglass::{configure, Component, Config, Thrown};
//!
//! let quiet = configure(Config::new().set_rethrow(false));
//! let pony = Component::new().method("trick", |_this, _args| Err(Thrown::text("stumbled")));
//!
//! let pony = quiet.watch(&pony, "OneTrickPony").unwrap();
//! assert!(pony.call("trick", &[]).unwrap().is_null());
//! ```

use crate::component::Component;
use crate::config::Config;
use crate::watcher::{default_watcher, Target, WatchOpts, Watcher};

/// Name and configuration overrides used to build or narrow a profile.
#[derive(Clone, Default)]
pub struct ProfileOpts {
    pub(crate) name: Option<String>,
    pub(crate) config: Option<Config>,
}

impl ProfileOpts {
    /// Empty overrides.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default component name.
    #[inline]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the configuration override.
    #[inline]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }
}

impl From<()> for ProfileOpts {
    #[inline]
    fn from((): ()) -> Self {
        Self::default()
    }
}

impl From<&str> for ProfileOpts {
    #[inline]
    fn from(name: &str) -> Self {
        Self::default().name(name)
    }
}

impl From<String> for ProfileOpts {
    #[inline]
    fn from(name: String) -> Self {
        Self::default().name(name)
    }
}

impl From<Config> for ProfileOpts {
    #[inline]
    fn from(config: Config) -> Self {
        Self::default().config(config)
    }
}

impl From<(&str, Config)> for ProfileOpts {
    #[inline]
    fn from((name, config): (&str, Config)) -> Self {
        Self::default().name(name).config(config)
    }
}

/// A wrapping entry point bound to fixed name/configuration defaults.
///
/// Being a distinct type is itself the composition marker: anything holding
/// a `Profile` knows it holds pre-configured wrapping, so chained adapters
/// narrow it with [`reconfigure`](Profile::reconfigure) instead of wrapping
/// it again.
#[derive(Clone)]
pub struct Profile {
    name: Option<String>,
    config: Config,
    watcher: Watcher,
}

impl Profile {
    pub(crate) fn bound(watcher: Watcher, opts: ProfileOpts) -> Self {
        Self {
            name: opts.name,
            config: opts.config.unwrap_or_default(),
            watcher,
        }
    }

    /// The name targets watched through this profile default to.
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The profile's configuration override.
    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Wraps a target like [`Watcher::watch`], with this profile's defaults.
    ///
    /// A caller-supplied name wins over the profile's; a caller-supplied
    /// config merges onto the profile's override, *not* onto the watcher
    /// defaults.
    pub fn watch(
        &self,
        target: impl Into<Target>,
        opts: impl Into<WatchOpts>,
    ) -> Option<Component> {
        let opts = opts.into();
        let name = opts.name.or_else(|| self.name.clone());
        let config = match &opts.config {
            Some(config) => config.merge(&self.config),
            None => self.config.clone(),
        };
        self.watcher.apply(target.into(), name, opts.id, config)
    }

    /// Narrows this profile into a further-bound one; the curried
    /// re-configuration path. Overrides merge the same way `watch` merges.
    pub fn reconfigure(&self, opts: impl Into<ProfileOpts>) -> Profile {
        let opts = opts.into();
        Profile {
            name: opts.name.or_else(|| self.name.clone()),
            config: match opts.config {
                Some(config) => config.merge(&self.config),
                None => self.config.clone(),
            },
            watcher: self.watcher.clone(),
        }
    }
}

impl std::fmt::Debug for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Profile")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// [`Watcher::configure`] on the thread's default watcher.
pub fn configure(opts: impl Into<ProfileOpts>) -> Profile {
    default_watcher().configure(opts)
}
