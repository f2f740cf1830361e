//! Activation policy tests.

use clicktoplay::permission::{InMemoryPermissions, Permission, PermissionStore};
use clicktoplay::policy::{decide, Activation, ActivationPolicy};

#[test]
fn click_to_play_off_always_activates() {
    for permission in [None, Some(Permission::Allowed), Some(Permission::Blocked)] {
        let decision = decide(false, permission);
        assert_eq!(decision.activation, Activation::Active);
        assert!(!decision.prompt);
    }
}

#[test]
fn unknown_origin_is_blocked_and_prompts() {
    let decision = decide(true, None);
    assert_eq!(decision.activation, Activation::Blocked);
    assert!(decision.prompt);
}

#[test]
fn allowed_origin_runs() {
    let decision = decide(true, Some(Permission::Allowed));
    assert!(decision.is_active());
    assert!(!decision.prompt);
}

#[test]
fn blocked_origin_stays_quiet() {
    let decision = decide(true, Some(Permission::Blocked));
    assert_eq!(decision.activation, Activation::Blocked);
    assert!(!decision.prompt, "blocked origins must not prompt again");
}

#[test]
fn policy_struct_matches_free_function() {
    let policy = ActivationPolicy::default();
    assert!(policy.click_to_play());
    assert_eq!(policy.decide(None), decide(true, None));

    let off = ActivationPolicy::new(false);
    assert!(off.decide(None).is_active());
}

#[test]
fn in_memory_store_round_trips_and_clears() {
    let mut store = InMemoryPermissions::new();
    assert!(store.is_empty());

    store.set("http://a.test", Permission::Blocked);
    store.set("http://a.test", Permission::Allowed);
    assert_eq!(store.get("http://a.test"), Some(Permission::Allowed));
    assert_eq!(store.get("http://b.test"), None);
    assert_eq!(store.len(), 1);

    assert_eq!(store.clear(), vec!["http://a.test".to_owned()]);
    assert!(store.is_empty());
    assert!(store.clear().is_empty());
}

#[test]
fn permission_parses_from_str() {
    assert_eq!("allowed".parse::<Permission>(), Ok(Permission::Allowed));
    assert_eq!("block".parse::<Permission>(), Ok(Permission::Blocked));
    assert!("maybe".parse::<Permission>().is_err());
    assert_eq!(Permission::Blocked.to_string(), "blocked");
}
