//! Tab-level facade tying the page, policy, navigation and notification
//! together.
//!
//! [`ClickToPlaySession`] is what a test drives: load pages, insert plugin
//! objects, navigate, click the notification's activate button and query
//! the resulting state.

use tracing::{debug, info, warn};

use crate::navigation::{NavigationKind, NavigationOutcome, NavigationState, NavigationTracker};
use crate::notification::{activate_pending, GateError, NotificationEvent, NotificationGate};
use crate::page::{PageError, PageModel};
use crate::permission::{InMemoryPermissions, Permission, PermissionStore};
use crate::policy::ActivationPolicy;

/// One browser tab under click-to-play control.
#[derive(Debug)]
pub struct ClickToPlaySession<P = InMemoryPermissions> {
    policy: ActivationPolicy,
    tracker: NavigationTracker,
    gate: NotificationGate,
    permissions: P,
}

impl ClickToPlaySession<InMemoryPermissions> {
    /// Create a session with an empty in-memory permission store.
    pub fn new(policy: ActivationPolicy) -> Self {
        Self::with_permissions(policy, InMemoryPermissions::new())
    }
}

impl<P: PermissionStore> ClickToPlaySession<P> {
    /// Create a session backed by an existing permission store.
    pub fn with_permissions(policy: ActivationPolicy, permissions: P) -> Self {
        Self {
            policy,
            tracker: NavigationTracker::new(),
            gate: NotificationGate::new(),
            permissions,
        }
    }

    /// Load `url` as a fresh document.
    pub fn new_page(&mut self, url: &str) -> NavigationOutcome {
        self.navigate(NavigationKind::Full, url)
    }

    /// Apply a navigation. Only [`NavigationKind::Full`] discards state.
    pub fn navigate(&mut self, kind: NavigationKind, url: &str) -> NavigationOutcome {
        let outcome = self.tracker.navigate(kind, url);
        if outcome.reset {
            self.gate.clear();
        }
        outcome
    }

    /// Insert a plugin object from `origin`, returning its index.
    ///
    /// The object starts running or blocked according to the policy.
    pub fn add_object(&mut self, origin: &str) -> usize {
        let decision = self
            .policy
            .decide(self.gate.effective_permission(origin, &self.permissions));
        let index = self
            .tracker
            .page_mut()
            .add_object_with(origin, decision.is_active())
            .index;
        debug!(origin, index, activation = ?decision.activation, "object inserted");

        if decision.prompt {
            self.gate.announce(origin);
        }
        self.gate.refresh(self.tracker.page(), &self.permissions);
        index
    }

    /// Press the notification's activate button for `origin`.
    ///
    /// The grant lasts until the next full load. Returns the number of
    /// objects activated. An origin with nothing pending is a no-op
    /// returning 0.
    pub fn click_activate(&mut self, origin: &str) -> usize {
        match self
            .gate
            .on_activate_clicked(self.tracker.page_mut(), &self.permissions, origin)
        {
            Ok(count) => count,
            Err(GateError::UnknownOrigin { origin }) => {
                warn!(origin = %origin, "activate clicked with nothing pending, ignoring");
                0
            }
        }
    }

    /// Record a user decision for `origin` made outside the notification.
    ///
    /// Allowing an origin activates its pending objects on the live page.
    /// Returns the number of objects activated.
    pub fn set_permission(&mut self, origin: &str, permission: Permission) -> usize {
        let previous = self.permissions.get(origin);
        self.permissions.set(origin, permission);
        if previous != Some(permission) {
            self.gate.forget(origin);
        }

        let activated = match permission {
            Permission::Allowed => activate_pending(self.tracker.page_mut(), origin),
            Permission::Blocked => 0,
        };
        info!(origin, permission = %permission, activated, "permission updated");
        self.gate.refresh(self.tracker.page(), &self.permissions);
        activated
    }

    /// Drop every stored permission.
    ///
    /// Objects already running keep running. Only origins that had an entry
    /// may be announced again.
    pub fn clear_permissions(&mut self) {
        let removed = self.permissions.clear();
        debug!(removed = removed.len(), "permissions cleared");
        for origin in &removed {
            self.gate.forget(origin);
        }
        self.gate.refresh(self.tracker.page(), &self.permissions);
    }

    /// Whether the object at `index` is running.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::IndexOutOfRange`] if no object has that index.
    pub fn is_activated(&self, index: usize) -> Result<bool, PageError> {
        self.tracker.page().object_at(index).map(|o| o.activated)
    }

    /// Whether the object at `index` is still waiting for consent.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::IndexOutOfRange`] if no object has that index.
    pub fn is_blocked_still_blocked(&self, index: usize) -> Result<bool, PageError> {
        NotificationGate::is_blocked_still_blocked(self.tracker.page(), index)
    }

    /// Whether the click-to-play notification should be visible.
    pub fn notification_visible(&self) -> bool {
        self.gate.should_show(self.tracker.page(), &self.permissions)
    }

    /// Notification events recorded for the live page.
    pub fn events(&self) -> &[NotificationEvent] {
        self.gate.events()
    }

    /// The live page.
    pub fn page(&self) -> &PageModel {
        self.tracker.page()
    }

    /// Navigation lifecycle state.
    pub fn state(&self) -> NavigationState {
        self.tracker.state()
    }

    /// The policy in effect.
    pub fn policy(&self) -> ActivationPolicy {
        self.policy
    }

    /// The backing permission store.
    pub fn permissions(&self) -> &P {
        &self.permissions
    }
}
