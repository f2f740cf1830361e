//! Scripted click-to-play scenarios.
//!
//! A [`Scenario`] is a TOML list of steps replayed against a fresh
//! [`ClickToPlaySession`]. Expectations are checked through
//! [`wait_for_condition`], so a state that never materialises fails with a
//! timeout naming the step.
//!
//! ```toml
//! name = "activation survives anchors"
//!
//! [[steps]]
//! action = "new_page"
//! url = "http://mochi.test:8888/plugin_add_dynamically.html"
//!
//! [[steps]]
//! action = "add_object"
//! origin = "http://mochi.test:8888"
//!
//! [[steps]]
//! action = "expect_activated"
//! index = 0
//! activated = false
//! ```

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, info_span, Instrument};

use crate::navigation::NavigationKind;
use crate::notification::NotificationEvent;
use crate::page::{PageError, PageModel};
use crate::permission::Permission;
use crate::policy::ActivationPolicy;
use crate::session::ClickToPlaySession;
use crate::wait::{wait_for_condition, WaitError, WaitOptions};

/// Test page used by the built-in scenario.
pub const BUILTIN_PAGE: &str =
    "http://mochi.test:8888/browser/browser/base/content/test/plugins/plugin_add_dynamically.html";

/// Plugin origin used by the built-in scenario.
pub const BUILTIN_ORIGIN: &str = "http://mochi.test:8888";

/// Errors from loading or running a scenario.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    /// The scenario file could not be read.
    #[error("failed to read scenario {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The scenario text is not valid.
    #[error("failed to parse scenario: {0}")]
    Parse(#[from] toml::de::Error),

    /// A step referenced an object that does not exist.
    #[error("step {step}: {source}")]
    Page {
        /// One-based step number.
        step: usize,
        /// Underlying error.
        source: PageError,
    },

    /// An expectation did not hold in time.
    #[error("step {step}: {source}")]
    Expectation {
        /// One-based step number.
        step: usize,
        /// Underlying error.
        source: WaitError,
    },
}

/// One scripted action or check.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Load a fresh document.
    NewPage {
        /// Document URL.
        url: String,
    },
    /// Insert a plugin object.
    AddObject {
        /// Plugin origin.
        origin: String,
    },
    /// Navigate the current tab.
    Navigate {
        /// Navigation kind.
        kind: NavigationKind,
        /// Target URL, resolved against the current document.
        url: String,
    },
    /// Press the notification's activate button.
    ClickActivate {
        /// Origin to activate.
        origin: String,
    },
    /// Store a persistent permission.
    SetPermission {
        /// Origin to update.
        origin: String,
        /// Decision to store.
        permission: Permission,
    },
    /// Drop all stored permissions.
    ClearPermissions,
    /// Wait until an object reaches the given activation state.
    ExpectActivated {
        /// Object index.
        index: usize,
        /// Expected state.
        #[serde(default = "default_true")]
        activated: bool,
    },
    /// Wait until the notification reaches the given visibility.
    ExpectNotification {
        /// Expected visibility.
        visible: bool,
    },
    /// Check that the page has no objects.
    ExpectEmpty,
}

impl Step {
    /// Short human-readable description used in logs and errors.
    pub fn describe(&self) -> String {
        match self {
            Self::NewPage { url } => format!("load {url}"),
            Self::AddObject { origin } => format!("add plugin from {origin}"),
            Self::Navigate { kind, url } => format!("{kind} navigation to {url}"),
            Self::ClickActivate { origin } => format!("activate {origin}"),
            Self::SetPermission { origin, permission } => {
                format!("set {origin} to {permission}")
            }
            Self::ClearPermissions => "clear permissions".to_owned(),
            Self::ExpectActivated { index, activated } => {
                if *activated {
                    format!("waited too long for plugin {index} activation")
                } else {
                    format!("plugin {index} should not be activated")
                }
            }
            Self::ExpectNotification { visible } => {
                if *visible {
                    "waited too long for plugin notification".to_owned()
                } else {
                    "plugin notification should be hidden".to_owned()
                }
            }
            Self::ExpectEmpty => "page should have no plugins".to_owned(),
        }
    }
}

/// A named list of steps.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,

    /// Overrides the configured click-to-play flag.
    #[serde(default)]
    pub click_to_play: Option<bool>,

    /// Steps in order.
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Scenario {
    /// Parse a scenario from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Parse`] if the text is not a valid scenario.
    pub fn from_toml(text: &str) -> Result<Self, ScenarioError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a scenario file.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::Io`] or [`ScenarioError::Parse`].
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let text = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Plugin activation must survive anchor navigation and
    /// `history.replaceState`, and must be asked for again after a full
    /// load.
    pub fn navigation_persistence() -> Self {
        let origin = BUILTIN_ORIGIN.to_owned();
        let add = || Step::AddObject {
            origin: origin.clone(),
        };
        let expect = |index, activated| Step::ExpectActivated { index, activated };

        let steps = vec![
            Step::NewPage {
                url: BUILTIN_PAGE.to_owned(),
            },
            Step::ExpectNotification { visible: false },
            add(),
            Step::ExpectNotification { visible: true },
            expect(0, false),
            Step::ClickActivate {
                origin: origin.clone(),
            },
            expect(0, true),
            add(),
            expect(1, true),
            Step::Navigate {
                kind: NavigationKind::Hash,
                url: "#anchorNavigation".to_owned(),
            },
            add(),
            expect(2, true),
            Step::Navigate {
                kind: NavigationKind::Replace,
                url: "replacedState".to_owned(),
            },
            add(),
            expect(3, true),
            Step::Navigate {
                kind: NavigationKind::Full,
                url: BUILTIN_PAGE.to_owned(),
            },
            Step::ExpectEmpty,
            Step::ExpectNotification { visible: false },
            add(),
            expect(0, false),
            Step::ExpectNotification { visible: true },
        ];

        Self {
            name: "navigation keeps click-to-play activation".to_owned(),
            click_to_play: Some(true),
            steps,
        }
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    /// Scenario name.
    pub name: String,
    /// Number of steps executed.
    pub steps_run: usize,
    /// Run start.
    pub started_at: DateTime<Utc>,
    /// Run end.
    pub finished_at: DateTime<Utc>,
    /// Page state at the end of the run.
    pub page: PageModel,
    /// Notification events recorded for the final page.
    pub events: Vec<NotificationEvent>,
}

/// Replay `scenario` against a fresh session.
///
/// `default_policy` applies unless the scenario sets `click_to_play`.
///
/// # Errors
///
/// Stops at the first failing step and returns its error.
pub async fn run(
    scenario: &Scenario,
    default_policy: ActivationPolicy,
    wait: &WaitOptions,
) -> Result<ScenarioReport, ScenarioError> {
    let policy = scenario
        .click_to_play
        .map(ActivationPolicy::new)
        .unwrap_or(default_policy);
    let mut session = ClickToPlaySession::new(policy);
    let started_at = Utc::now();

    async {
        for (i, step) in scenario.steps.iter().enumerate() {
            let number = i.saturating_add(1);
            info!(step = number, "{}", step.describe());
            apply(&mut session, step, number, wait).await?;
        }
        info!(steps = scenario.steps.len(), "scenario passed");
        Ok::<(), ScenarioError>(())
    }
    .instrument(info_span!("scenario", name = %scenario.name))
    .await?;

    Ok(ScenarioReport {
        name: scenario.name.clone(),
        steps_run: scenario.steps.len(),
        started_at,
        finished_at: Utc::now(),
        page: session.page().clone(),
        events: session.events().to_vec(),
    })
}

async fn apply(
    session: &mut ClickToPlaySession,
    step: &Step,
    number: usize,
    wait: &WaitOptions,
) -> Result<(), ScenarioError> {
    let expectation = |source| ScenarioError::Expectation {
        step: number,
        source,
    };

    match step {
        Step::NewPage { url } => {
            session.new_page(url);
        }
        Step::AddObject { origin } => {
            session.add_object(origin);
        }
        Step::Navigate { kind, url } => {
            session.navigate(*kind, url);
        }
        Step::ClickActivate { origin } => {
            session.click_activate(origin);
        }
        Step::SetPermission { origin, permission } => {
            session.set_permission(origin, *permission);
        }
        Step::ClearPermissions => session.clear_permissions(),
        Step::ExpectActivated { index, activated } => {
            session
                .is_activated(*index)
                .map_err(|source| ScenarioError::Page {
                    step: number,
                    source,
                })?;
            let session = &*session;
            wait_for_condition(
                || session.is_activated(*index) == Ok(*activated),
                wait,
                &step.describe(),
            )
            .await
            .map_err(expectation)?;
        }
        Step::ExpectNotification { visible } => {
            let session = &*session;
            wait_for_condition(
                || session.notification_visible() == *visible,
                wait,
                &step.describe(),
            )
            .await
            .map_err(expectation)?;
        }
        Step::ExpectEmpty => {
            let session = &*session;
            wait_for_condition(|| session.page().is_empty(), wait, &step.describe())
                .await
                .map_err(expectation)?;
        }
    }
    Ok(())
}

fn default_true() -> bool {
    true
}
