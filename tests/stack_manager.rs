use drawer_stack::domain::{CloseBehavior, DrawerOptions, DrawerRecord, Placement};
use drawer_stack::stack::{StackManager, Subscription};
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
struct Panel {
    title: String,
}

fn titled(key: &str, title: &str) -> DrawerRecord<Panel> {
    DrawerRecord::with_options(
        key,
        DrawerOptions::new().data(Panel {
            title: title.to_string(),
        }),
    )
}

fn keys<T: Clone + 'static>(manager: &StackManager<T>) -> Vec<String> {
    manager
        .get_state()
        .keys()
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn counting<T: Clone + 'static>(manager: &StackManager<T>) -> Rc<Cell<usize>> {
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    let _subscription = manager.subscribe(move |_| counter.set(counter.get() + 1));
    calls
}

#[test]
fn open_appends_and_returns_key() {
    let manager: StackManager = StackManager::new();
    assert_eq!(manager.open(DrawerRecord::new("settings")), "settings");
    assert_eq!(manager.open(DrawerRecord::new("profile")), "profile");
    assert_eq!(keys(&manager), vec!["settings", "profile"]);
    assert_eq!(manager.top_key().as_deref(), Some("profile"));
}

#[test]
fn open_sequence_never_duplicates_keys() {
    let manager: StackManager = StackManager::new();
    for key in ["a", "b", "a", "c", "b", "a", "a"] {
        manager.open(DrawerRecord::new(key));
        let state = manager.get_state();
        let unique: HashSet<&str> = state.keys().into_iter().collect();
        assert_eq!(unique.len(), state.len());
    }
    assert_eq!(keys(&manager), vec!["c", "b", "a"]);
}

#[test]
fn reopening_identical_record_keeps_it_on_top() {
    let manager: StackManager = StackManager::new();
    manager.open(DrawerRecord::new("other"));
    manager.open(DrawerRecord::new("x"));
    let first = manager.get_state();
    manager.open(DrawerRecord::new("x"));
    let second = manager.get_state();

    assert_eq!(first.top().map(DrawerRecord::key), Some("x"));
    assert_eq!(second.top().map(DrawerRecord::key), Some("x"));
    assert_eq!(first.len(), second.len());
    assert!(!Rc::ptr_eq(&first, &second));
}

#[test]
fn open_existing_moves_to_top_with_new_fields() {
    let manager = StackManager::new();
    manager.open(titled("a", "A"));
    manager.open(titled("b", "B"));

    manager.open(titled("a", "X"));

    assert_eq!(keys(&manager), vec!["b", "a"]);
    let a = manager.get_drawer("a").unwrap();
    assert_eq!(a.data().unwrap().title, "X");
}

#[test]
fn update_options_keeps_position() {
    let manager = StackManager::new();
    manager.open(titled("a", "A"));
    manager.open(titled("b", "B"));

    manager.update_options("a", |current| {
        let mut next = (**current).clone();
        next.data = Some(Panel {
            title: "X".to_string(),
        });
        Rc::new(next)
    });

    assert_eq!(keys(&manager), vec!["a", "b"]);
    assert_eq!(manager.get_drawer("a").unwrap().data().unwrap().title, "X");
}

#[test]
fn update_options_returning_same_rc_is_silent() {
    let manager = StackManager::new();
    manager.open(titled("a", "A"));
    let before = manager.get_state();
    let calls = counting(&manager);

    manager.update_options("a", Rc::clone);

    assert_eq!(calls.get(), 0);
    assert!(Rc::ptr_eq(&before, &manager.get_state()));
}

#[test]
fn update_options_on_missing_key_does_not_call_updater() {
    let manager = StackManager::new();
    manager.open(titled("a", "A"));
    let called = Cell::new(false);

    manager.update_options("missing", |current| {
        called.set(true);
        Rc::clone(current)
    });

    assert!(!called.get());
}

#[test]
fn no_op_operations_do_not_notify() {
    let manager: StackManager = StackManager::new();
    let calls = counting(&manager);

    manager.close(None);
    manager.close(Some("missing"));
    manager.close_all();
    assert_eq!(calls.get(), 0);

    manager.open(DrawerRecord::new("a"));
    manager.open(DrawerRecord::new("b"));
    assert_eq!(calls.get(), 2);

    manager.close(Some("missing"));
    manager.bring_to_top("missing");
    manager.bring_to_top("b");
    manager.update_options("a", Rc::clone);
    assert_eq!(calls.get(), 2);
}

#[test]
fn bring_to_top_single_drawer_is_silent() {
    let manager: StackManager = StackManager::new();
    manager.open(DrawerRecord::new("only"));
    let calls = counting(&manager);

    manager.bring_to_top("only");

    assert_eq!(calls.get(), 0);
}

#[test]
fn close_without_key_drops_top() {
    let manager: StackManager = StackManager::new();
    for key in ["a", "b", "c"] {
        manager.open(DrawerRecord::new(key));
    }

    manager.close_top();

    assert_eq!(keys(&manager), vec!["a", "b"]);
}

#[test]
fn close_all_empties_and_notifies_once() {
    let manager: StackManager = StackManager::new();
    for key in ["a", "b", "c"] {
        manager.open(DrawerRecord::new(key));
    }
    let calls = counting(&manager);

    manager.close_all();
    manager.close_all();

    assert!(manager.get_state().stack().is_empty());
    assert_eq!(calls.get(), 1);
}

#[test]
fn bring_to_top_reorders() {
    let manager: StackManager = StackManager::new();
    for key in ["a", "b", "c"] {
        manager.open(DrawerRecord::new(key));
    }
    let generation = manager.get_drawer("a").unwrap().generation();

    manager.bring_to_top("a");

    assert_eq!(keys(&manager), vec!["b", "c", "a"]);
    assert_eq!(manager.get_drawer("a").unwrap().generation(), generation);
}

#[test]
fn defaults_merge_under_explicit_fields() {
    let defaults = DrawerOptions::new()
        .placement(Placement::Left)
        .close_on_escape_key(true);
    let manager: StackManager = StackManager::with_state(Vec::new(), Some(defaults));

    manager.open(DrawerRecord::with_options(
        "x",
        DrawerOptions::new().placement(Placement::Right),
    ));

    let x = manager.get_drawer("x").unwrap();
    assert_eq!(x.placement(), Placement::Right);
    assert!(matches!(
        x.options().close_on_escape_key,
        Some(CloseBehavior::Fixed(true))
    ));
}

#[test]
fn update_default_options_only_affects_future_opens() {
    let manager: StackManager = StackManager::new();
    manager.open(DrawerRecord::new("before"));
    let calls = counting(&manager);

    manager.update_default_options(|previous| {
        assert!(previous.is_none());
        DrawerOptions::new().placement(Placement::Bottom)
    });
    assert_eq!(calls.get(), 0);

    manager.open(DrawerRecord::new("after"));

    assert_eq!(manager.get_drawer("before").unwrap().placement(), Placement::Right);
    assert_eq!(manager.get_drawer("after").unwrap().placement(), Placement::Bottom);
    assert_eq!(
        manager.get_default_options().unwrap().placement,
        Some(Placement::Bottom)
    );
}

#[test]
fn old_snapshots_are_never_mutated() {
    let manager: StackManager = StackManager::new();
    manager.open(DrawerRecord::new("a"));
    let held = manager.get_state();

    manager.open(DrawerRecord::new("b"));
    manager.close(Some("a"));

    assert_eq!(held.keys(), vec!["a"]);
    assert_eq!(manager.get_state().keys(), vec!["b"]);
}

#[test]
fn unsubscribe_is_idempotent_and_targeted() {
    let manager: StackManager = StackManager::new();
    let first = Rc::new(Cell::new(0));
    let second = Rc::new(Cell::new(0));

    let c1 = Rc::clone(&first);
    let sub1 = manager.subscribe(move |_| c1.set(c1.get() + 1));
    let c2 = Rc::clone(&second);
    let _sub2 = manager.subscribe(move |_| c2.set(c2.get() + 1));

    manager.open(DrawerRecord::new("a"));
    sub1.unsubscribe();
    sub1.unsubscribe();
    assert!(!sub1.is_active());
    manager.open(DrawerRecord::new("b"));

    assert_eq!(first.get(), 1);
    assert_eq!(second.get(), 2);
    assert_eq!(manager.listener_count(), 1);
}

#[test]
fn listener_receives_new_snapshot() {
    let manager: StackManager = StackManager::new();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let _sub = manager.subscribe(move |snapshot| {
        sink.borrow_mut().push(snapshot.keys().join(","));
    });

    manager.open(DrawerRecord::new("a"));
    manager.open(DrawerRecord::new("b"));
    manager.close(Some("a"));

    assert_eq!(*seen.borrow(), vec!["a", "a,b", "b"]);
}

#[test]
fn reentrant_close_from_listener_runs_its_own_round() {
    let manager: StackManager = StackManager::new();
    let rounds = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&rounds);
    let handle = manager.clone();
    let _sub = manager.subscribe(move |snapshot| {
        sink.borrow_mut().push(snapshot.len());
        if snapshot.contains("transient") {
            handle.close(Some("transient"));
        }
    });

    manager.open(DrawerRecord::new("keep"));
    manager.open(DrawerRecord::new("transient"));

    assert_eq!(manager.get_state().keys(), vec!["keep"]);
    assert_eq!(*rounds.borrow(), vec![1, 2, 1]);
}

#[test]
fn open_then_close_scenario() {
    let manager: StackManager = StackManager::new();
    manager.open(DrawerRecord::new("settings"));
    manager.open(DrawerRecord::new("profile"));
    manager.close(Some("settings"));

    assert_eq!(keys(&manager), vec!["profile"]);
}

#[test]
fn initial_state_collapses_duplicate_keys() {
    let manager: StackManager = StackManager::with_state(
        vec![
            DrawerRecord::new("a"),
            DrawerRecord::new("b"),
            DrawerRecord::new("a"),
        ],
        None,
    );

    assert_eq!(keys(&manager), vec!["b", "a"]);
}

#[test]
fn from_json_seeds_stack() {
    let manager: StackManager = StackManager::from_json(
        r#"[
            {"key": "cart", "placement": "left", "close_on_escape_key": false},
            {"key": "help", "extra_attributes": {"data-test": "help", "data-index": 2}}
        ]"#,
        None,
    )
    .unwrap();

    assert_eq!(keys(&manager), vec!["cart", "help"]);
    let cart = manager.get_drawer("cart").unwrap();
    assert_eq!(cart.placement(), Placement::Left);
    assert!(!cart.closes_on_escape_key());
    assert!(cart.closes_on_backdrop_click());
}

#[test]
fn from_json_rejects_malformed_input() {
    let result: drawer_stack::Result<StackManager> = StackManager::from_json("{not json", None);
    assert!(matches!(result, Err(drawer_stack::DrawerError::Seed(_))));
}

#[test]
fn dynamic_close_behavior_sees_record() {
    let record: DrawerRecord<Panel> = DrawerRecord::with_options(
        "guarded",
        DrawerOptions::new()
            .data(Panel {
                title: "dirty".to_string(),
            })
            .close_on_escape_key(CloseBehavior::dynamic(|record: &DrawerRecord<Panel>| {
                record.data().is_some_and(|panel| panel.title != "dirty")
            })),
    );

    assert!(!record.closes_on_escape_key());
    assert!(record.closes_on_backdrop_click());
}

#[test]
fn listener_unsubscribed_mid_round_is_skipped() {
    let manager: StackManager = StackManager::new();
    let victim: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
    let slot = Rc::clone(&victim);
    let _remover = manager.subscribe(move |_| {
        if let Some(subscription) = slot.borrow().as_ref() {
            subscription.unsubscribe();
        }
    });
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    *victim.borrow_mut() = Some(manager.subscribe(move |_| counter.set(counter.get() + 1)));

    manager.open(DrawerRecord::new("a"));
    manager.open(DrawerRecord::new("b"));

    assert_eq!(calls.get(), 0);
    assert_eq!(manager.listener_count(), 1);
}
