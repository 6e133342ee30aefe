//! Observer callbacks and the payload they receive.
//!
//! A [`Hook`] is the caller-supplied side channel of the interception
//! pipeline: `on_error` fires after every intercepted failure, `on_rethrow`
//! immediately before a failure is re-raised. Hooks run in the context of the
//! watched component (the receiver parameter is the `this`-equivalent of the
//! original call) and receive a [`Notice`] bundling everything known about
//! the interception.

use std::cell::OnceCell;
use std::fmt;
use std::rc::Rc;

use crate::component::Component;
use crate::config::Config;
use crate::thrown::{Thrown, Value};
use crate::watcher::Watcher;

/// Everything an observer gets to see about one intercepted failure.
///
/// `config` is the configuration that was active for the wrapped member, with
/// every default filled in, so a shared hook can inspect the policy it is
/// running under.
#[derive(Clone, Copy)]
pub struct Notice<'a> {
    /// The failure, errorized or raw depending on configuration.
    pub error: &'a Thrown,
    /// Component name the target was watched under, if any.
    pub name: Option<&'a str>,
    /// Unique id the target was watched under, if any.
    pub id: Option<&'a str>,
    /// Member that raised; empty for a wrapped bare function.
    pub member: &'a str,
    /// Snapshot of the arguments of the failing call.
    pub args: &'a [Value],
    /// The configuration active for this interception.
    pub config: &'a Config,
    /// The watcher that produced the wrapping.
    pub watcher: &'a Watcher,
}

impl fmt::Debug for Notice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notice")
            .field("error", &self.error)
            .field("name", &self.name)
            .field("id", &self.id)
            .field("member", &self.member)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

pub(crate) type HookFn = dyn Fn(&Component, &Notice<'_>);

/// A cheaply-cloned observer callback.
///
/// Configuration setters accept plain closures, so `Hook` rarely needs to be
/// built by hand; it exists so hooks can be stored inside a [`Config`] and
/// shared between merged configurations.
///
/// A hook copied out of a base configuration during a merge is *rebound*: when
/// it later fires, the notice it observes carries the merged configuration it
/// was resolved into rather than the base it came from. The first binding
/// wins if the same hook travels through several merges.
#[derive(Clone)]
pub struct Hook {
    f: Rc<HookFn>,
    bound: Option<Rc<OnceCell<Config>>>,
}

impl Hook {
    /// Wraps a closure as an observer hook.
    #[inline]
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Component, &Notice<'_>) + 'static,
    {
        Self {
            f: Rc::new(f),
            bound: None,
        }
    }

    /// Invokes the hook in the context of `receiver`.
    pub fn call(&self, receiver: &Component, notice: &Notice<'_>) {
        match self.bound.as_ref().and_then(|cell| cell.get()) {
            Some(config) => {
                let rebound = Notice {
                    error: notice.error,
                    name: notice.name,
                    id: notice.id,
                    member: notice.member,
                    args: notice.args,
                    config,
                    watcher: notice.watcher,
                };
                (self.f)(receiver, &rebound);
            }
            None => (self.f)(receiver, notice),
        }
    }

    /// Copy of this hook bound to a merged configuration; an existing binding
    /// is kept.
    pub(crate) fn rebound(&self, cell: Rc<OnceCell<Config>>) -> Self {
        Self {
            f: Rc::clone(&self.f),
            bound: Some(self.bound.clone().unwrap_or(cell)),
        }
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook")
            .field("bound", &self.bound.is_some())
            .finish_non_exhaustive()
    }
}
