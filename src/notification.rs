//! Click-to-play notification gate.
//!
//! Tracks whether the blocked-plugin notification should be visible for the
//! live page, records shown/hidden events, and applies the user's
//! "activate" action to every pending object of an origin.
//!
//! Activating from the notification grants the origin for the current page
//! only. Those grants sit on top of the persisted [`PermissionStore`] and
//! are dropped with the page, so a full load prompts again.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::page::{PageError, PageModel};
use crate::permission::{InMemoryPermissions, Permission, PermissionStore};

/// Errors from notification actions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    /// The activate action named an origin with nothing pending.
    #[error("no blocked plugin pending for origin {origin}")]
    UnknownOrigin {
        /// Origin the action was issued for.
        origin: String,
    },
}

/// Observable notification transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum NotificationKind {
    /// The notification appeared for an origin.
    Shown {
        /// Origin whose plugins are blocked.
        origin: String,
    },
    /// The notification no longer has anything blocked to offer.
    Hidden,
}

/// A recorded notification transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationEvent {
    /// What happened.
    #[serde(flatten)]
    pub kind: NotificationKind,
    /// When it happened.
    pub at: DateTime<Utc>,
}

/// Notification state for the live page.
#[derive(Debug, Clone, Default)]
pub struct NotificationGate {
    /// Origins already announced on this page.
    announced: HashSet<String>,
    /// Origins allowed from the notification on this page.
    page_grants: InMemoryPermissions,
    visible: bool,
    events: Vec<NotificationEvent>,
}

impl NotificationGate {
    /// Create a gate with nothing announced.
    pub fn new() -> Self {
        Self::default()
    }

    /// Permission in effect for `origin`: a page grant, else the persisted
    /// entry.
    pub fn effective_permission(
        &self,
        origin: &str,
        persisted: &dyn PermissionStore,
    ) -> Option<Permission> {
        self.page_grants
            .get(origin)
            .or_else(|| persisted.get(origin))
    }

    /// Whether `page` has any object whose origin is not yet allowed and
    /// which is not running.
    pub fn should_show(&self, page: &PageModel, persisted: &dyn PermissionStore) -> bool {
        page.objects().iter().any(|o| {
            !o.activated
                && self.effective_permission(&o.origin, persisted) != Some(Permission::Allowed)
        })
    }

    /// Whether the object at `index` is still waiting for consent.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::IndexOutOfRange`] if no object has that index.
    pub fn is_blocked_still_blocked(page: &PageModel, index: usize) -> Result<bool, PageError> {
        page.object_at(index).map(|o| !o.activated)
    }

    /// Record a prompt for `origin`.
    ///
    /// Emits a `Shown` event only the first time the origin is announced on
    /// the current page. Returns `true` if an event was emitted.
    pub fn announce(&mut self, origin: &str) -> bool {
        if !self.announced.insert(origin.to_owned()) {
            return false;
        }
        self.visible = true;
        info!(origin, "click-to-play notification shown");
        self.push(NotificationKind::Shown {
            origin: origin.to_owned(),
        });
        true
    }

    /// Apply the notification's activate action for `origin`.
    ///
    /// Activates every pending object from `origin` on `page` and allows
    /// the origin for the rest of the page's life. Returns the number of
    /// objects activated.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::UnknownOrigin`] if nothing from `origin` is
    /// pending. Nothing is changed in that case.
    pub fn on_activate_clicked(
        &mut self,
        page: &mut PageModel,
        persisted: &dyn PermissionStore,
        origin: &str,
    ) -> Result<usize, GateError> {
        if page.pending_for(origin).is_empty() {
            return Err(GateError::UnknownOrigin {
                origin: origin.to_owned(),
            });
        }
        self.page_grants.set(origin, Permission::Allowed);
        let activated = activate_pending(page, origin);
        info!(origin, activated, "activated blocked plugins");
        self.refresh(page, persisted);
        Ok(activated)
    }

    /// Re-evaluate visibility after the page or permissions changed.
    ///
    /// Only hides. The notification becomes visible through [`announce`],
    /// so every `Hidden` event follows a `Shown`.
    ///
    /// [`announce`]: Self::announce
    pub fn refresh(&mut self, page: &PageModel, persisted: &dyn PermissionStore) {
        if self.visible && !self.should_show(page, persisted) {
            debug!("click-to-play notification hidden");
            self.push(NotificationKind::Hidden);
            self.visible = false;
        }
    }

    /// Allow `origin` to be announced again after its permission changed.
    pub fn forget(&mut self, origin: &str) {
        self.announced.remove(origin);
    }

    /// Forget all page state. Used when the document is replaced.
    pub fn clear(&mut self) {
        self.announced.clear();
        self.page_grants = InMemoryPermissions::new();
        self.visible = false;
        self.events.clear();
    }

    /// Whether a `Shown` notification is still up.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Events recorded since the page was loaded, oldest first.
    pub fn events(&self) -> &[NotificationEvent] {
        &self.events
    }

    fn push(&mut self, kind: NotificationKind) {
        self.events.push(NotificationEvent {
            kind,
            at: Utc::now(),
        });
    }
}

/// Activate every pending object from `origin`, returning how many changed
/// state.
pub(crate) fn activate_pending(page: &mut PageModel, origin: &str) -> usize {
    page.pending_for(origin)
        .into_iter()
        .filter_map(|i| page.activate(i).ok())
        .filter(|&newly| newly)
        .count()
}
