//! The interception closure: what a wrapped method actually becomes.
//!
//! The closure is functionally transparent on the happy path — it forwards
//! the receiver and arguments to the original method and hands its result
//! back untouched. Only a raise enters the pipeline: short-circuit when
//! nobody is listening and nothing re-raises, errorize, notify, then
//! propagate once or swallow.

use std::rc::Rc;

use crate::addon::{fold_configure_closure, fold_error_closure, fold_errorized, WrapSite};
use crate::component::{Component, Method, WeakComponent};
use crate::config::Config;
use crate::error::{is_spyglass_error, SpyglassError};
use crate::hook::Notice;
use crate::thrown::{Thrown, Value};
use crate::watcher::Watcher;

/// Wraps `method` in the interception closure for one member of `target`.
///
/// Registered add-ons get two wrap-time rewrites (the configuration, then
/// the method itself) before the closure is built around the results.
pub(crate) fn error_closure(
    target: Option<&Component>,
    name: Option<&str>,
    id: Option<&str>,
    member: &str,
    method: Method,
    config: Config,
    watcher: &Watcher,
) -> Method {
    let addons = watcher.addons_snapshot();
    let (config, method) = if addons.is_empty() {
        (config, method)
    } else {
        let site = WrapSite {
            name,
            id,
            member,
            target,
        };
        let config = fold_configure_closure(&addons, config, &site, watcher);
        let method = fold_error_closure(&addons, method, member, &config, watcher);
        (config, method)
    };

    let name = name.map(str::to_owned);
    let id = id.map(str::to_owned);
    let member = member.to_owned();
    // Weak, so a wrapped member does not keep its own component alive
    // through the slot that holds it.
    let target: Option<WeakComponent> = target.map(Component::downgrade);
    let watcher = watcher.clone();

    Rc::new(move |receiver: &Component, args: &[Value]| {
        match method(receiver, args) {
            Ok(value) => Ok(value),
            Err(raised) => {
                // Nothing to report to and no re-raise requested: swallow.
                if !config.rethrow() && config.on_error().is_none() {
                    return Ok(Value::Null);
                }

                let mut error = raised;
                if !is_spyglass_error(&error) && config.errorize() {
                    let alive = target.as_ref().and_then(WeakComponent::upgrade);
                    let mut normalized = SpyglassError::normalize(
                        error,
                        name.as_deref(),
                        id.as_deref(),
                        &member,
                        alive.as_ref(),
                    );
                    if config.add_stack_trace() {
                        normalized = normalized.with_backtrace();
                    }
                    // errorized runs against the registry as it is now, not
                    // as it was at wrap time.
                    let addons = watcher.addons_snapshot();
                    if !addons.is_empty() {
                        normalized = fold_errorized(&addons, normalized, &config, &watcher);
                    }
                    error = Thrown::Error(Rc::new(normalized));
                }

                // Observers run in the context of the wrap-time target; the
                // runtime receiver stands in if that component is gone.
                let context = target
                    .as_ref()
                    .and_then(WeakComponent::upgrade)
                    .unwrap_or_else(|| receiver.clone());
                let notice = Notice {
                    error: &error,
                    name: name.as_deref(),
                    id: id.as_deref(),
                    member: &member,
                    args,
                    config: &config,
                    watcher: &watcher,
                };
                if let Some(hook) = config.on_error() {
                    hook.call(&context, &notice);
                }

                if config.rethrow() {
                    if let Some(hook) = config.on_rethrow() {
                        hook.call(&context, &notice);
                    }
                    if let Some(normalized) = error.downcast_ref::<SpyglassError>() {
                        normalized.mark_rethrown();
                    }
                    Err(error)
                } else {
                    Ok(Value::Null)
                }
            }
        }
    })
}
