use drawer_stack::domain::{AttrValue, CloseBehavior, DrawerOptions, DrawerRecord};
use drawer_stack::presentation::{
    AnimationEnd, Coordinator, ElementId, ExitMode, InputEvent, RESERVED_ATTRIBUTE_PREFIX,
};
use drawer_stack::stack::StackManager;
use std::cell::RefCell;
use std::rc::Rc;

const PANEL: ElementId = ElementId(1);
const CHILD: ElementId = ElementId(2);

fn animated(keys: &[&str]) -> (StackManager, Coordinator) {
    let manager: StackManager = StackManager::new();
    let coordinator = Coordinator::bind(&manager, ExitMode::Animated);
    for key in keys {
        manager.open(DrawerRecord::new(*key));
    }
    (manager, coordinator)
}

fn exit_done(coordinator: &Coordinator, key: &str) -> bool {
    coordinator.handle_input(&InputEvent::AnimationEnd {
        key: key.to_string(),
        event: AnimationEnd::on_panel("drawer-exit-right", PANEL),
    })
}

fn top_keys(coordinator: &Coordinator) -> Vec<String> {
    coordinator
        .views()
        .into_iter()
        .filter(|view| view.is_top)
        .map(|view| view.key)
        .collect()
}

#[test]
fn close_all_keeps_drawers_rendered_until_each_exit_finishes() {
    let (manager, coordinator) = animated(&["a", "b", "c"]);

    manager.close_all();

    assert!(manager.is_empty());
    assert!(coordinator.is_bulk_closing());
    assert_eq!(coordinator.render_keys(), vec!["a", "b", "c"]);
    assert_eq!(coordinator.closing_keys(), vec!["a", "b", "c"]);

    assert!(exit_done(&coordinator, "a"));
    assert!(exit_done(&coordinator, "b"));
    assert!(coordinator.is_bulk_closing());
    assert_eq!(coordinator.render_keys(), vec!["a", "b", "c"]);

    assert!(exit_done(&coordinator, "c"));
    assert!(!coordinator.is_bulk_closing());
    assert!(coordinator.render_keys().is_empty());
    assert!(coordinator.closing_keys().is_empty());
}

#[test]
fn closing_last_drawer_singly_is_not_a_bulk_close() {
    let (manager, coordinator) = animated(&["only"]);

    assert!(coordinator.close_with_animation("only"));
    assert!(manager.contains("only"));
    assert!(!coordinator.is_bulk_closing());

    assert!(exit_done(&coordinator, "only"));
    assert!(manager.is_empty());
    assert!(!coordinator.is_bulk_closing());
    assert!(coordinator.render_keys().is_empty());
}

#[test]
fn single_close_never_marks_other_drawers() {
    let (manager, coordinator) = animated(&["d1", "d2"]);

    coordinator.close_with_animation("d2");
    assert_eq!(coordinator.closing_keys(), vec!["d2"]);

    exit_done(&coordinator, "d2");

    assert!(!coordinator.is_closing("d1"));
    assert!(!coordinator.is_bulk_closing());
    assert_eq!(coordinator.render_keys(), vec!["d1"]);
    assert_eq!(manager.get_state().keys(), vec!["d1"]);
}

#[test]
fn closing_top_promotes_drawer_below_immediately() {
    let (manager, coordinator) = animated(&["a", "b"]);

    coordinator.close_with_animation("b");

    assert_eq!(coordinator.next_top_key().as_deref(), Some("a"));
    assert_eq!(top_keys(&coordinator), vec!["a"]);
    assert_eq!(manager.top_key().as_deref(), Some("b"));

    exit_done(&coordinator, "b");

    assert_eq!(coordinator.next_top_key(), None);
    assert_eq!(coordinator.render_keys(), vec!["a"]);
    assert_eq!(top_keys(&coordinator), vec!["a"]);
}

#[test]
fn closing_non_top_drawer_leaves_top_alone() {
    let (manager, coordinator) = animated(&["a", "b"]);

    coordinator.close_with_animation("a");

    assert_eq!(coordinator.next_top_key(), None);
    assert_eq!(top_keys(&coordinator), vec!["b"]);

    exit_done(&coordinator, "a");
    assert_eq!(manager.get_state().keys(), vec!["b"]);
}

#[test]
fn reopen_during_exit_wins_over_deferred_close() {
    let (manager, coordinator) = animated(&["a", "b"]);
    coordinator.close_with_animation("b");

    manager.open(DrawerRecord::new("b"));

    assert!(!coordinator.is_closing("b"));
    assert!(coordinator.is_entering("b"));
    assert_eq!(coordinator.next_top_key(), None);

    assert!(!exit_done(&coordinator, "b"));
    assert_eq!(manager.get_state().keys(), vec!["a", "b"]);
    assert_eq!(top_keys(&coordinator), vec!["b"]);
}

#[test]
fn authoritative_close_while_animating_clears_closing_mark() {
    let (manager, coordinator) = animated(&["a", "b"]);
    coordinator.close_with_animation("a");

    manager.close(Some("a"));

    assert!(!coordinator.is_closing("a"));
    assert_eq!(coordinator.render_keys(), vec!["b"]);
    assert!(!exit_done(&coordinator, "a"));
}

#[test]
fn bubbled_and_unrelated_animation_ends_are_ignored() {
    let (manager, coordinator) = animated(&["a"]);
    coordinator.close_with_animation("a");
    let handle = coordinator.views()[0].handle.clone();

    assert!(!handle.on_panel_animation_end(&AnimationEnd::bubbled("drawer-exit-right", CHILD, PANEL)));
    assert!(!handle.on_panel_animation_end(&AnimationEnd::on_panel("spinner", PANEL)));
    assert!(manager.contains("a"));
    assert!(coordinator.is_closing("a"));

    assert!(handle.on_panel_animation_end(&AnimationEnd::on_panel("drawer-exit-right", PANEL)));
    assert!(manager.is_empty());
}

#[test]
fn enter_animation_end_clears_entering_mark() {
    let (_manager, coordinator) = animated(&["a"]);
    assert!(coordinator.is_entering("a"));

    let handle = coordinator.views()[0].handle.clone();
    assert!(handle.on_panel_animation_end(&AnimationEnd::on_panel("drawer-enter-left", PANEL)));

    assert!(!coordinator.is_entering("a"));
    assert!(coordinator.entering_keys().is_empty());
}

#[test]
fn drawers_present_at_bind_time_are_not_entering() {
    let manager: StackManager = StackManager::new();
    manager.open(DrawerRecord::new("early"));

    let coordinator = Coordinator::bind(&manager, ExitMode::Animated);

    assert_eq!(coordinator.render_keys(), vec!["early"]);
    assert!(!coordinator.is_entering("early"));
}

#[test]
fn escape_closes_only_the_top_drawer() {
    let (manager, coordinator) = animated(&["a", "b"]);

    assert!(coordinator.on_escape_key());

    assert_eq!(coordinator.closing_keys(), vec!["b"]);
    assert!(!coordinator.is_closing("a"));
    assert_eq!(manager.len(), 2);
}

#[test]
fn escape_respects_top_drawer_predicate() {
    let manager: StackManager = StackManager::new();
    let coordinator = Coordinator::bind(&manager, ExitMode::Animated);
    manager.open(DrawerRecord::new("a"));
    manager.open(DrawerRecord::with_options(
        "locked",
        DrawerOptions::new().close_on_escape_key(false),
    ));

    assert!(!coordinator.on_escape_key());

    assert!(coordinator.closing_keys().is_empty());
}

#[test]
fn escape_evaluates_dynamic_predicate_against_record() {
    let manager: StackManager<bool> = StackManager::new();
    let coordinator = Coordinator::bind(&manager, ExitMode::Animated);
    let only_when_clean = || {
        DrawerOptions::<bool>::new().close_on_escape_key(CloseBehavior::dynamic(
            |record: &DrawerRecord<bool>| record.data().copied() != Some(true),
        ))
    };
    manager.open(DrawerRecord::with_options("form", only_when_clean().data(true)));

    assert!(!coordinator.on_escape_key());

    manager.open(DrawerRecord::with_options("form", only_when_clean().data(false)));
    assert!(coordinator.on_escape_key());
    assert!(coordinator.is_closing("form"));
}

#[test]
fn repeated_escape_walks_down_the_stack() {
    let (_manager, coordinator) = animated(&["a", "b"]);

    coordinator.on_escape_key();
    coordinator.on_escape_key();

    assert_eq!(coordinator.closing_keys(), vec!["a", "b"]);
    assert!(!coordinator.on_escape_key());
}

#[test]
fn backdrop_click_respects_predicate() {
    let manager: StackManager = StackManager::new();
    let coordinator = Coordinator::bind(&manager, ExitMode::Animated);
    manager.open(DrawerRecord::with_options(
        "sticky",
        DrawerOptions::new().close_on_backdrop_click(false),
    ));
    manager.open(DrawerRecord::new("loose"));

    let views = coordinator.views();
    assert!(!views[0].handle.on_backdrop_click());
    assert!(views[1].handle.on_backdrop_click());

    assert_eq!(coordinator.closing_keys(), vec!["loose"]);
}

#[test]
fn close_with_animation_is_noop_for_unknown_or_closing_keys() {
    let (_manager, coordinator) = animated(&["a"]);

    assert!(!coordinator.close_with_animation("missing"));
    assert!(coordinator.close_with_animation("a"));
    assert!(!coordinator.close_with_animation("a"));
    assert!(!coordinator.finalize_close("missing"));
}

#[test]
fn bulk_close_ignores_requests_for_outgoing_drawers() {
    let (manager, coordinator) = animated(&["a", "b"]);
    manager.close_all();

    assert!(!coordinator.close_with_animation("a"));
    assert!(!coordinator.on_escape_key());
}

#[test]
fn opening_during_bulk_close_renders_above_closing_drawers() {
    let (manager, coordinator) = animated(&["a", "b"]);
    manager.close_all();

    manager.open(DrawerRecord::new("fresh"));

    assert!(coordinator.is_bulk_closing());
    assert_eq!(coordinator.render_keys(), vec!["a", "b", "fresh"]);
    assert!(coordinator.is_entering("fresh"));

    exit_done(&coordinator, "a");
    exit_done(&coordinator, "b");

    assert!(!coordinator.is_bulk_closing());
    assert_eq!(coordinator.render_keys(), vec!["fresh"]);
    assert_eq!(manager.get_state().keys(), vec!["fresh"]);
}

#[test]
fn headless_mode_mirrors_manager_without_animation() {
    let manager: StackManager = StackManager::new();
    let coordinator = Coordinator::bind(&manager, ExitMode::Immediate);
    manager.open(DrawerRecord::new("a"));
    manager.open(DrawerRecord::new("b"));

    assert!(coordinator.entering_keys().is_empty());

    assert!(coordinator.close_with_animation("b"));
    assert_eq!(manager.get_state().keys(), vec!["a"]);
    assert_eq!(coordinator.render_keys(), vec!["a"]);
    assert!(coordinator.closing_keys().is_empty());

    manager.close_all();
    assert!(!coordinator.is_bulk_closing());
    assert!(coordinator.render_keys().is_empty());
}

#[test]
fn coordinators_on_one_manager_are_independent() {
    let manager: StackManager = StackManager::new();
    let left = Coordinator::bind(&manager, ExitMode::Animated);
    let right = Coordinator::bind(&manager, ExitMode::Animated);
    manager.open(DrawerRecord::new("a"));
    manager.open(DrawerRecord::new("b"));

    left.close_with_animation("b");

    assert!(left.is_closing("b"));
    assert!(!right.is_closing("b"));

    exit_done(&left, "b");
    assert_eq!(left.render_keys(), vec!["a"]);
    assert_eq!(right.render_keys(), vec!["a"]);
}

#[test]
fn reserved_attributes_are_not_forwarded() {
    let reserved = format!("{RESERVED_ATTRIBUTE_PREFIX}top");
    let manager: StackManager = StackManager::new();
    let coordinator = Coordinator::bind(&manager, ExitMode::Animated);
    manager.open(DrawerRecord::with_options(
        "a",
        DrawerOptions::new()
            .aria_label("Settings")
            .attribute("data-test", "settings")
            .attribute(reserved.clone(), true),
    ));

    let view = &coordinator.views()[0];

    assert_eq!(view.aria_label.as_deref(), Some("Settings"));
    assert_eq!(
        view.attributes.get("data-test"),
        Some(&AttrValue::from("settings"))
    );
    assert!(!view.attributes.contains_key(&reserved));
}

#[test]
fn render_hook_sees_every_change() {
    let (manager, coordinator) = animated(&[]);
    let renders = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&renders);
    coordinator.set_render_hook(move |views| {
        let line: Vec<String> = views
            .iter()
            .map(|view| format!("{}{}", view.key, if view.is_closing { "-" } else { "" }))
            .collect();
        sink.borrow_mut().push(line.join(","));
    });

    manager.open(DrawerRecord::new("a"));
    coordinator.close_with_animation("a");
    exit_done(&coordinator, "a");

    let renders = renders.borrow();
    assert_eq!(renders[..2], ["a", "a-"]);
    assert_eq!(renders.last().map(String::as_str), Some(""));
}

#[test]
fn detach_stops_reconciliation() {
    let (manager, coordinator) = animated(&["a"]);
    assert!(coordinator.is_attached());

    coordinator.detach();
    coordinator.detach();
    manager.open(DrawerRecord::new("b"));

    assert!(!coordinator.is_attached());
    assert_eq!(coordinator.render_keys(), vec!["a"]);
    assert_eq!(manager.listener_count(), 0);
}

#[test]
fn dropping_coordinator_unsubscribes_and_disarms_handles() {
    let (manager, coordinator) = animated(&["a"]);
    let handle = coordinator.views()[0].handle.clone();

    drop(coordinator);

    assert_eq!(manager.listener_count(), 0);
    assert!(!handle.on_backdrop_click());
    assert!(manager.contains("a"));
}

fn close_bottom_when_crowded(manager: &StackManager) {
    let handle = manager.clone();
    let _sub = manager.subscribe(move |snapshot| {
        if snapshot.len() > 2 {
            let bottom = snapshot.stack()[0].key().to_string();
            handle.close(Some(&bottom));
        }
    });
}

#[test]
fn reentrant_listener_ahead_of_coordinators_keeps_them_in_sync() {
    let manager: StackManager = StackManager::new();
    close_bottom_when_crowded(&manager);
    let immediate = Coordinator::bind(&manager, ExitMode::Immediate);
    let animated = Coordinator::bind(&manager, ExitMode::Animated);

    for key in ["a", "b", "c"] {
        manager.open(DrawerRecord::new(key));
    }

    assert_eq!(manager.get_state().keys(), vec!["b", "c"]);
    assert_eq!(immediate.render_keys(), vec!["b", "c"]);
    assert_eq!(animated.render_keys(), vec!["b", "c"]);
    assert!(animated.closing_keys().is_empty());
    assert!(!animated.is_bulk_closing());
}

#[test]
fn drawer_opened_during_bulk_close_can_be_dismissed() {
    let (manager, coordinator) = animated(&["a"]);
    manager.close_all();
    manager.open(DrawerRecord::new("fresh"));

    assert!(coordinator.on_escape_key());
    assert_eq!(coordinator.closing_keys(), vec!["a", "fresh"]);
    assert!(manager.contains("fresh"));

    assert!(exit_done(&coordinator, "fresh"));
    assert!(manager.is_empty());
    assert!(coordinator.is_bulk_closing());
    assert_eq!(coordinator.render_keys(), vec!["a"]);

    assert!(exit_done(&coordinator, "a"));
    assert!(!coordinator.is_bulk_closing());
    assert!(coordinator.render_keys().is_empty());
}

#[test]
fn backdrop_click_during_bulk_close_dismisses_new_drawer() {
    let (manager, coordinator) = animated(&["a", "b"]);
    manager.close_all();
    manager.open(DrawerRecord::new("fresh"));

    let views = coordinator.views();
    let fresh = views.last().unwrap();
    assert_eq!(fresh.key, "fresh");
    assert!(fresh.handle.on_backdrop_click());
    assert!(!views[0].handle.on_backdrop_click());

    assert!(exit_done(&coordinator, "a"));
    assert!(exit_done(&coordinator, "b"));
    assert!(coordinator.is_bulk_closing());
    assert_eq!(coordinator.closing_keys(), vec!["fresh"]);
    assert!(manager.contains("fresh"));

    assert!(exit_done(&coordinator, "fresh"));
    assert!(manager.is_empty());
    assert!(!coordinator.is_bulk_closing());
    assert!(coordinator.render_keys().is_empty());
}
