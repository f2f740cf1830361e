//! Navigation tracker tests.

use clicktoplay::navigation::{resolve_url, NavigationKind, NavigationState, NavigationTracker};
use clicktoplay::page::BLANK_URL;

const PAGE: &str = "http://mochi.test:8888/plugins/plugin_add_dynamically.html";

fn loaded_with_objects(count: usize) -> NavigationTracker {
    let mut tracker = NavigationTracker::new();
    tracker.full_load(PAGE);
    for _ in 0..count {
        tracker.page_mut().add_object("http://mochi.test:8888");
    }
    tracker.page_mut().activate(0).expect("activate first object");
    tracker
}

#[test]
fn starts_initial_with_blank_page() {
    let tracker = NavigationTracker::new();
    assert_eq!(tracker.state(), NavigationState::Initial);
    assert_eq!(tracker.page().url(), BLANK_URL);
    assert!(tracker.page().is_empty());
}

#[test]
fn full_load_resets_page() {
    let mut tracker = loaded_with_objects(2);
    assert_eq!(tracker.state(), NavigationState::Loaded);

    let outcome = tracker.full_load("http://other.test/index.html");
    assert!(outcome.reset);
    assert!(tracker.page().is_empty());
    assert_eq!(tracker.page().url(), "http://other.test/index.html");
}

#[test]
fn hash_change_keeps_objects_and_activation() {
    let mut tracker = loaded_with_objects(2);

    let outcome = tracker.hash_change("#anchorNavigation");
    assert!(!outcome.reset);
    assert_eq!(outcome.kind, NavigationKind::Hash);
    assert_eq!(tracker.page().len(), 2);
    assert!(tracker.page().object_at(0).expect("object 0").activated);
    assert_eq!(
        tracker.page().url(),
        "http://mochi.test:8888/plugins/plugin_add_dynamically.html#anchorNavigation"
    );
}

#[test]
fn history_replace_keeps_objects_and_activation() {
    let mut tracker = loaded_with_objects(3);

    let outcome = tracker.history_replace("replacedState");
    assert!(!outcome.reset);
    assert_eq!(tracker.page().len(), 3);
    assert!(tracker.page().object_at(0).expect("object 0").activated);
    assert_eq!(
        tracker.page().url(),
        "http://mochi.test:8888/plugins/replacedState"
    );
}

#[test]
fn navigate_dispatches_by_kind() {
    for kind in [NavigationKind::Hash, NavigationKind::Replace] {
        let mut tracker = loaded_with_objects(1);
        assert!(!tracker.navigate(kind, "#x").reset);
        assert_eq!(tracker.page().len(), 1);
    }

    let mut tracker = loaded_with_objects(1);
    assert!(tracker.navigate(NavigationKind::Full, PAGE).reset);
    assert!(tracker.page().is_empty());
}

#[test]
fn only_full_is_destructive() {
    assert!(NavigationKind::Full.is_destructive());
    assert!(!NavigationKind::Hash.is_destructive());
    assert!(!NavigationKind::Replace.is_destructive());
}

#[test]
fn kind_parses_from_str() {
    assert_eq!("full".parse::<NavigationKind>(), Ok(NavigationKind::Full));
    assert_eq!("hash".parse::<NavigationKind>(), Ok(NavigationKind::Hash));
    assert_eq!(
        "replace".parse::<NavigationKind>(),
        Ok(NavigationKind::Replace)
    );
    assert!("reload".parse::<NavigationKind>().is_err());
}

#[test]
fn resolve_url_falls_back_to_raw_target() {
    assert_eq!(resolve_url(BLANK_URL, "url#x"), "url#x");
    assert_eq!(resolve_url("url", "url2"), "url2");
    assert_eq!(
        resolve_url("url", "http://abs.test/page"),
        "http://abs.test/page"
    );
}
