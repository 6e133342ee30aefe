use serde_json::json;
use spyglass::{component, raise, AddOn, Component, Config, Method, SpyglassError, Value, Watcher};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[test]
fn registration_returns_the_init_result() {
    let watcher = Watcher::new();
    let installed = Rc::new(Cell::new(0));
    let seen = installed.clone();

    let result = watcher.register(
        AddOn::new("tally").init(move |_watcher| {
            seen.set(seen.get() + 1);
            json!("installed")
        }),
    );

    assert_eq!(result, Some(json!("installed")));
    assert_eq!(installed.get(), 1);
}

#[test]
fn registration_without_an_init_yields_null() {
    let watcher = Watcher::new();
    assert_eq!(watcher.register(AddOn::new("bare")), Some(Value::Null));
}

#[test]
fn duplicate_names_are_refused_softly() {
    let watcher = Watcher::new();
    assert!(watcher.register(AddOn::new("tally")).is_some());

    let installed = Rc::new(Cell::new(false));
    let seen = installed.clone();
    let refused = watcher.register(AddOn::new("tally").init(move |_watcher| {
        seen.set(true);
        Value::Null
    }));

    assert!(refused.is_none());
    assert!(!installed.get());
}

#[test]
fn error_closure_handlers_can_count_every_call() {
    let watcher = Watcher::new();
    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();

    watcher.register(AddOn::new("counter").on_error_closure(
        move |method, _member, _config, _watcher| {
            let count = counter.clone();
            let wrapped: Method = Rc::new(move |receiver: &Component, args: &[Value]| {
                count.set(count.get() + 1);
                method(receiver, args)
            });
            wrapped
        },
    ));

    let pony = component! {
        trick(this, args) => { Ok(json!("ta-da")) },
        stumble(this, args) => { raise!("stumbled") },
    };
    let pony = watcher
        .watch(pony, Config::new().set_rethrow(false))
        .unwrap();

    pony.call("trick", &[]).unwrap();
    pony.call("trick", &[]).unwrap();
    pony.call("stumble", &[]).unwrap();

    // Successes and failures alike pass through the counting closure once.
    assert_eq!(calls.get(), 3);
}

#[test]
fn configure_closure_handlers_rewrite_the_wrap_time_config() {
    let watcher = Watcher::new();
    watcher.register(
        AddOn::new("muzzle")
            .on_configure_closure(|config, _site, _watcher| config.set_rethrow(false)),
    );

    let pony = component! {
        trick(this, args) => { raise!("stumbled") },
    };
    // The caller asked for rethrowing; the add-on overrules it.
    let pony = watcher
        .watch(pony, Config::new().set_rethrow(true))
        .unwrap();
    assert!(pony.call("trick", &[]).unwrap().is_null());
}

#[test]
fn configure_closure_handlers_see_the_wrap_site() {
    let watcher = Watcher::new();
    let sites: Rc<RefCell<Vec<(Option<String>, String)>>> = Rc::new(RefCell::new(Vec::new()));
    let log = sites.clone();
    watcher.register(AddOn::new("surveyor").on_configure_closure(
        move |config, site, _watcher| {
            log.borrow_mut()
                .push((site.name.map(str::to_owned), site.member.to_owned()));
            config
        },
    ));

    let pony = component! {
        trick(this, args) => { Ok(json!("ta-da")) },
    };
    watcher.watch(pony, "Ninja").unwrap();

    assert_eq!(
        sites.borrow().clone(),
        vec![(Some("Ninja".to_string()), "trick".to_string())]
    );
}

#[test]
fn errorized_handlers_can_rewrite_the_normalized_error() {
    let watcher = Watcher::new();
    watcher.register(AddOn::new("redactor").on_errorized(|error, _config, _watcher| {
        SpyglassError::normalize(
            error.original().clone(),
            Some("Redacted"),
            None,
            error.member(),
            error.target(),
        )
    }));

    let pony = component! {
        trick(this, args) => { raise!("stumbled") },
    };
    let pony = watcher.watch(pony, "Ninja").unwrap();

    let raised = pony.call("trick", &[]).unwrap_err();
    assert_eq!(
        raised.message().as_deref(),
        Some("Error [Redacted:trick] stumbled")
    );
}

#[test]
fn handlers_fold_in_registration_order() {
    let watcher = Watcher::new();
    let order: Rc<RefCell<Vec<&'static str>>> = Rc::new(RefCell::new(Vec::new()));

    let first = order.clone();
    watcher.register(AddOn::new("first").on_errorized(move |error, _config, _watcher| {
        first.borrow_mut().push("first");
        error
    }));
    let second = order.clone();
    watcher.register(AddOn::new("second").on_errorized(move |error, _config, _watcher| {
        second.borrow_mut().push("second");
        error
    }));

    let pony = component! {
        trick(this, args) => { raise!("stumbled") },
    };
    let pony = watcher
        .watch(pony, Config::new().set_rethrow(false).set_on_error(|_, _| {}))
        .unwrap();
    pony.call("trick", &[]).unwrap();

    assert_eq!(*order.borrow(), vec!["first", "second"]);
}

#[test]
fn errorized_only_fires_for_payloads_that_get_normalized() {
    let watcher = Watcher::new();
    let fired = Rc::new(Cell::new(0));
    let counter = fired.clone();
    watcher.register(AddOn::new("tally").on_errorized(move |error, _config, _watcher| {
        counter.set(counter.get() + 1);
        error
    }));

    let pony = component! {
        trick(this, args) => { raise!("stumbled") },
    };
    let pony = watcher
        .watch(
            pony,
            Config::new()
                .set_rethrow(false)
                .set_errorize(false)
                .set_on_error(|_, _| {}),
        )
        .unwrap();
    pony.call("trick", &[]).unwrap();

    assert_eq!(fired.get(), 0);
}

#[test]
fn addons_registered_after_wrapping_still_see_new_failures() {
    let watcher = Watcher::new();
    let pony = component! {
        trick(this, args) => { raise!("stumbled") },
    };
    let pony = watcher.watch(pony, "Ninja").unwrap();

    // Registered after the wrap: errorized folds against the live registry.
    watcher.register(AddOn::new("late").on_errorized(|error, _config, _watcher| {
        SpyglassError::normalize(
            error.original().clone(),
            Some("Late"),
            None,
            error.member(),
            error.target(),
        )
    }));

    let raised = pony.call("trick", &[]).unwrap_err();
    assert_eq!(
        raised.message().as_deref(),
        Some("Error [Late:trick] stumbled")
    );
}
