use serde_json::json;
use spyglass::{
    component, raise, Component, Config, ConfigError, Hook, Notice, Setting, Thrown, Watcher,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[test]
fn accessors_fall_back_to_documented_defaults() {
    let config = Config::new();
    assert!(config.errorize());
    assert!(config.rethrow());
    assert!(config.on_error().is_none());
    assert!(config.on_rethrow().is_none());
    assert_eq!(config.watch_properties(), None);
    assert!(config.watch_deep());
    assert!(config.watch_function());
    assert!(!config.add_stack_trace());
}

#[test]
fn defaults_spell_every_recognized_key_out() {
    let config = Config::defaults();
    for key in spyglass::keys::RECOGNIZED {
        assert!(config.get(key).is_some(), "missing default for {key}");
    }
}

#[test]
fn merge_lets_explicit_keys_win_and_fills_gaps() {
    let over = Config::new().set_rethrow(false);
    let base = Config::new().set_rethrow(true).set_errorize(false);

    let merged = over.merge(&base);
    assert!(!merged.rethrow());
    assert!(!merged.errorize());
}

#[test]
fn merge_is_non_destructive() {
    let over = Config::new().set_rethrow(false);
    let base = Config::new().set_errorize(false);

    let _ = over.merge(&base);

    // Neither source gained or lost keys.
    assert!(over.get(spyglass::keys::ERRORIZE).is_none());
    assert!(base.get(spyglass::keys::RETHROW).is_none());
    assert!(!base.errorize());
    assert!(!over.rethrow());
}

#[test]
fn merge_is_idempotent_over_the_base() {
    let over = Config::new().set_rethrow(false);
    let base = Config::new()
        .set_rethrow(true)
        .set_errorize(false)
        .set_watch_deep(false);

    let once = over.merge(&base);
    let twice = once.merge(&base);

    assert_eq!(once.rethrow(), twice.rethrow());
    assert_eq!(once.errorize(), twice.errorize());
    assert_eq!(once.watch_deep(), twice.watch_deep());
    assert_eq!(once.watch_properties(), twice.watch_properties());
}

#[test]
fn nested_tables_merge_recursively_and_override_wins_wholesale() {
    let over = Config::new().set(
        "policy",
        Setting::Table(Config::new().set("strict", Setting::Flag(true))),
    );
    let base = Config::new().set(
        "policy",
        Setting::Table(
            Config::new()
                .set("strict", Setting::Flag(false))
                .set("limit", Setting::Data(json!(3))),
        ),
    );

    // The key exists on the override, so the base table is not consulted.
    let merged = over.merge(&base);
    let Some(Setting::Table(policy)) = merged.get("policy") else {
        panic!("policy should still be a table");
    };
    assert!(matches!(policy.get("strict"), Some(Setting::Flag(true))));
    assert!(policy.get("limit").is_none());

    // A base-only table is copied across whole.
    let merged = Config::new().merge(&base);
    let Some(Setting::Table(policy)) = merged.get("policy") else {
        panic!("policy should have been copied");
    };
    assert!(matches!(policy.get("strict"), Some(Setting::Flag(false))));
    assert!(matches!(policy.get("limit"), Some(Setting::Data(v)) if v == &json!(3)));
}

#[test]
fn unrecognized_keys_ride_along_through_merges() {
    let over = Config::new().set("custom", Setting::Data(json!("mine")));
    let base = Config::new().set("shared", Setting::Data(json!(7)));

    let merged = over.merge(&base);
    assert!(matches!(merged.get("custom"), Some(Setting::Data(v)) if v == &json!("mine")));
    assert!(matches!(merged.get("shared"), Some(Setting::Data(v)) if v == &json!(7)));
}

#[test]
fn from_value_accepts_objects_only() {
    let config = Config::from_value(json!({
        "rethrow": false,
        "watch_properties": null,
        "policy": { "strict": true },
        "limit": 3,
    }))
    .unwrap();

    assert!(!config.rethrow());
    assert_eq!(config.watch_properties(), None);
    assert!(matches!(config.get("policy"), Some(Setting::Table(_))));
    assert!(matches!(config.get("limit"), Some(Setting::Data(v)) if v == &json!(3)));

    let err = Config::from_value(json!("rethrow")).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidKind { .. }));
    assert!(err.to_string().contains("expected an object"));

    assert!(Config::from_value(json!(42)).is_err());
    assert!(Config::from_value(json!([true])).is_err());
    assert!(Config::from_value(json!(null)).is_err());
}

#[test]
fn hooks_copied_from_a_base_observe_the_merged_configuration() {
    let seen = Rc::new(Cell::new(true));
    let observer = seen.clone();
    let base = Config::new().set(
        spyglass::keys::ON_ERROR,
        Setting::Hook(Hook::new(move |_receiver, notice| {
            observer.set(notice.config.rethrow());
        })),
    );
    let merged = Config::new().set_rethrow(false).merge(&base);

    // Invoke the copied hook with a notice carrying some *other* config; the
    // rebinding makes it see the merged one regardless.
    let watcher = Watcher::new();
    let error = Thrown::text("boom");
    let unrelated = Config::new();
    let notice = Notice {
        error: &error,
        name: None,
        id: None,
        member: "trick",
        args: &[],
        config: &unrelated,
        watcher: &watcher,
    };
    merged
        .on_error()
        .expect("hook copied from base")
        .call(&Component::new(), &notice);

    assert!(!seen.get());
}

#[test]
fn reconfigure_replaces_recognized_keys_only() {
    let watcher = Watcher::new();
    let update = Config::new()
        .set_rethrow(false)
        .set("custom", Setting::Flag(true));

    let current = watcher.reconfigure(update);
    assert!(!current.rethrow());
    assert!(current.get("custom").is_none());

    // And the new default applies to subsequent watches.
    let pony = component! {
        trick(this, args) => { raise!("stumbled") },
    };
    let pony = watcher.watch(pony, ()).unwrap();
    assert!(pony.call("trick", &[]).unwrap().is_null());
}

#[test]
fn per_call_overrides_beat_watcher_defaults() {
    let watcher = Watcher::new();
    watcher.reconfigure(Config::new().set_rethrow(false));

    let pony = component! {
        trick(this, args) => { raise!("stumbled") },
    };
    let pony = watcher
        .watch(pony, Config::new().set_rethrow(true))
        .unwrap();
    assert!(pony.call("trick", &[]).unwrap_err().is_error());
}

#[test]
fn watcher_default_hooks_apply_to_every_watched_object() {
    let watcher = Watcher::new();
    let fired = Rc::new(Cell::new(0));
    let observer = fired.clone();
    watcher.reconfigure(
        Config::new()
            .set_rethrow(false)
            .set_on_error(move |_receiver, _notice| observer.set(observer.get() + 1)),
    );

    let first = watcher
        .watch(
            component! { trick(this, args) => { raise!("stumbled") } },
            (),
        )
        .unwrap();
    let second = watcher
        .watch(
            component! { trick(this, args) => { raise!("stumbled") } },
            (),
        )
        .unwrap();

    first.call("trick", &[]).unwrap();
    second.call("trick", &[]).unwrap();
    assert_eq!(fired.get(), 2);
}

#[test]
fn observers_can_inspect_the_resolved_configuration() {
    let watcher = Watcher::new();
    let seen = Rc::new(RefCell::new(None));
    let observer = seen.clone();
    let config = Config::new()
        .set_rethrow(false)
        .set_on_error(move |_receiver, notice| {
            *observer.borrow_mut() = Some((
                notice.config.errorize(),
                notice.config.watch_deep(),
                notice.config.rethrow(),
            ));
        });

    let pony = component! {
        trick(this, args) => { raise!("stumbled") },
    };
    let pony = watcher.watch(pony, config).unwrap();
    pony.call("trick", &[]).unwrap();

    // The notice carries the fully resolved config: the explicit override
    // plus every default filled in from the watcher.
    assert_eq!(seen.borrow().clone(), Some((true, true, false)));
}
