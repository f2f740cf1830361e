//! Navigation state machine over the current page.
//!
//! Only a full load replaces the document. Fragment navigation and
//! `history.replaceState` keep the same [`PageModel`] so activation already
//! granted on the page survives them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::page::PageModel;

/// Kind of navigation applied to the current tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationKind {
    /// Load a new document.
    Full,
    /// Change only the URL fragment.
    Hash,
    /// `history.replaceState` on the current document.
    Replace,
}

impl NavigationKind {
    /// Stable lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Hash => "hash",
            Self::Replace => "replace",
        }
    }

    /// Whether this navigation tears the document down.
    pub fn is_destructive(self) -> bool {
        self == Self::Full
    }
}

impl fmt::Display for NavigationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NavigationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(Self::Full),
            "hash" => Ok(Self::Hash),
            "replace" => Ok(Self::Replace),
            other => Err(format!("unknown navigation kind: {other}")),
        }
    }
}

/// Tracker lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationState {
    /// No document has been loaded yet.
    Initial,
    /// A document is loaded.
    Loaded,
}

/// Result of applying one navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationOutcome {
    /// Navigation kind that was applied.
    pub kind: NavigationKind,
    /// Resolved document URL after the navigation.
    pub url: String,
    /// Whether the page and its objects were discarded.
    pub reset: bool,
}

/// Applies navigations to the page of a single tab.
#[derive(Debug, Clone)]
pub struct NavigationTracker {
    state: NavigationState,
    page: PageModel,
}

impl NavigationTracker {
    /// Create a tracker holding an empty `about:blank` page.
    pub fn new() -> Self {
        Self {
            state: NavigationState::Initial,
            page: PageModel::blank(),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> NavigationState {
        self.state
    }

    /// The live page.
    pub fn page(&self) -> &PageModel {
        &self.page
    }

    /// Mutable access to the live page.
    pub fn page_mut(&mut self) -> &mut PageModel {
        &mut self.page
    }

    /// Apply a navigation of `kind` to `url`.
    pub fn navigate(&mut self, kind: NavigationKind, url: &str) -> NavigationOutcome {
        match kind {
            NavigationKind::Full => self.full_load(url),
            NavigationKind::Hash => self.hash_change(url),
            NavigationKind::Replace => self.history_replace(url),
        }
    }

    /// Load a new document, discarding every object on the current page.
    pub fn full_load(&mut self, url: &str) -> NavigationOutcome {
        let resolved = resolve_url(self.page.url(), url);
        let dropped = self.page.len();
        self.page = PageModel::new(resolved.clone());
        self.state = NavigationState::Loaded;
        info!(url = %resolved, dropped, "full load");
        NavigationOutcome {
            kind: NavigationKind::Full,
            url: resolved,
            reset: true,
        }
    }

    /// Move to a new fragment on the same document.
    pub fn hash_change(&mut self, url: &str) -> NavigationOutcome {
        self.in_place(NavigationKind::Hash, url)
    }

    /// Rewrite the document URL through `history.replaceState`.
    pub fn history_replace(&mut self, url: &str) -> NavigationOutcome {
        self.in_place(NavigationKind::Replace, url)
    }

    fn in_place(&mut self, kind: NavigationKind, url: &str) -> NavigationOutcome {
        let resolved = resolve_url(self.page.url(), url);
        self.page.set_url(resolved.clone());
        debug!(
            kind = %kind,
            url = %resolved,
            objects = self.page.len(),
            "in-page navigation keeps page state"
        );
        NavigationOutcome {
            kind,
            url: resolved,
            reset: false,
        }
    }
}

impl Default for NavigationTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve `target` against `base` the way a browser resolves a link.
///
/// Falls back to `target` verbatim when `base` is not an absolute URL or
/// the join fails.
pub fn resolve_url(base: &str, target: &str) -> String {
    if let Ok(absolute) = Url::parse(target) {
        return absolute.to_string();
    }
    match Url::parse(base).and_then(|b| b.join(target)) {
        Ok(joined) => joined.to_string(),
        Err(_) => target.to_owned(),
    }
}
