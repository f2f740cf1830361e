//! Notification gate tests.

use clicktoplay::notification::{GateError, NotificationGate, NotificationKind};
use clicktoplay::page::{PageError, PageModel};
use clicktoplay::permission::{InMemoryPermissions, Permission, PermissionStore};

const ORIGIN: &str = "http://mochi.test:8888";

fn page_with(origins: &[&str]) -> PageModel {
    let mut page = PageModel::new("http://mochi.test:8888/page.html");
    for origin in origins {
        page.add_object(*origin);
    }
    page
}

#[test]
fn hidden_for_empty_page() {
    let gate = NotificationGate::new();
    let perms = InMemoryPermissions::new();
    assert!(!gate.should_show(&PageModel::default(), &perms));
}

#[test]
fn shown_while_an_object_is_pending() {
    let gate = NotificationGate::new();
    let perms = InMemoryPermissions::new();
    assert!(gate.should_show(&page_with(&[ORIGIN]), &perms));
}

#[test]
fn hidden_when_pending_origin_is_allowed() {
    let gate = NotificationGate::new();
    let mut perms = InMemoryPermissions::new();
    perms.set(ORIGIN, Permission::Allowed);
    assert!(!gate.should_show(&page_with(&[ORIGIN]), &perms));
}

#[test]
fn activate_clicked_activates_all_pending_of_origin_only() {
    let mut gate = NotificationGate::new();
    let perms = InMemoryPermissions::new();
    let mut page = page_with(&[ORIGIN, "http://other.test", ORIGIN]);

    let activated = gate
        .on_activate_clicked(&mut page, &perms, ORIGIN)
        .expect("origin has pending objects");

    assert_eq!(activated, 2);
    assert!(page.object_at(0).expect("object 0").activated);
    assert!(!page.object_at(1).expect("object 1").activated);
    assert!(page.object_at(2).expect("object 2").activated);
    assert_eq!(
        gate.effective_permission(ORIGIN, &perms),
        Some(Permission::Allowed)
    );
    assert_eq!(perms.get(ORIGIN), None, "click must not persist a permission");
}

#[test]
fn activate_clicked_without_pending_is_unknown_origin() {
    let mut gate = NotificationGate::new();
    let perms = InMemoryPermissions::new();
    let mut page = page_with(&[ORIGIN]);

    let err = gate
        .on_activate_clicked(&mut page, &perms, "http://nobody.test")
        .expect_err("nothing pending for that origin");
    assert_eq!(
        err,
        GateError::UnknownOrigin {
            origin: "http://nobody.test".to_owned()
        }
    );
    assert!(!page.object_at(0).expect("object 0").activated);
    assert_eq!(gate.effective_permission("http://nobody.test", &perms), None);
}

#[test]
fn second_activate_click_is_a_no_op() {
    let mut gate = NotificationGate::new();
    let perms = InMemoryPermissions::new();
    let mut page = page_with(&[ORIGIN]);

    assert_eq!(gate.on_activate_clicked(&mut page, &perms, ORIGIN), Ok(1));
    assert!(gate.on_activate_clicked(&mut page, &perms, ORIGIN).is_err());
    assert!(page.object_at(0).expect("object 0").activated);
}

#[test]
fn announce_fires_once_per_origin() {
    let mut gate = NotificationGate::new();
    assert!(gate.announce(ORIGIN));
    assert!(!gate.announce(ORIGIN));
    assert!(gate.announce("http://other.test"));
    assert_eq!(gate.events().len(), 2);

    gate.forget(ORIGIN);
    assert!(gate.announce(ORIGIN));
    assert_eq!(gate.events().len(), 3);
}

#[test]
fn refresh_records_hidden_transition() {
    let mut gate = NotificationGate::new();
    let perms = InMemoryPermissions::new();
    let mut page = page_with(&[ORIGIN]);

    gate.announce(ORIGIN);
    assert!(gate.is_visible());
    gate.on_activate_clicked(&mut page, &perms, ORIGIN)
        .expect("pending object");

    assert!(!gate.is_visible());
    let kinds: Vec<_> = gate.events().iter().map(|e| e.kind.clone()).collect();
    assert_eq!(
        kinds,
        vec![
            NotificationKind::Shown {
                origin: ORIGIN.to_owned()
            },
            NotificationKind::Hidden,
        ]
    );
}

#[test]
fn clear_drops_page_grants_and_events() {
    let mut gate = NotificationGate::new();
    let perms = InMemoryPermissions::new();
    let mut page = page_with(&[ORIGIN]);
    gate.announce(ORIGIN);
    gate.on_activate_clicked(&mut page, &perms, ORIGIN)
        .expect("pending object");

    gate.clear();
    assert!(gate.events().is_empty());
    assert!(!gate.is_visible());
    assert_eq!(gate.effective_permission(ORIGIN, &perms), None);
}

#[test]
fn blocked_still_blocked_tracks_activation() {
    let mut page = page_with(&[ORIGIN]);
    assert_eq!(NotificationGate::is_blocked_still_blocked(&page, 0), Ok(true));
    page.activate(0).expect("activate");
    assert_eq!(NotificationGate::is_blocked_still_blocked(&page, 0), Ok(false));
    assert_eq!(
        NotificationGate::is_blocked_still_blocked(&page, 5),
        Err(PageError::IndexOutOfRange { index: 5, len: 1 })
    );
}

#[test]
fn refresh_never_hides_what_was_not_shown() {
    let mut gate = NotificationGate::new();
    let mut perms = InMemoryPermissions::new();
    let page = page_with(&[ORIGIN]);

    perms.set(ORIGIN, Permission::Blocked);
    gate.refresh(&page, &perms);
    assert!(!gate.is_visible());

    perms.set(ORIGIN, Permission::Allowed);
    gate.refresh(&page, &perms);
    assert!(gate.events().is_empty());
}
