//! Activation policy for newly inserted plugin objects.
//!
//! The policy decides whether an object starts running or waits behind the
//! click-to-play notification, based on the global click-to-play flag and
//! the stored permission for the object's origin.

use serde::Serialize;

use crate::permission::Permission;

// ---------------------------------------------------------------------------
// Decision
// ---------------------------------------------------------------------------

/// Initial state assigned to an inserted object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    /// The plugin waits for user consent.
    Blocked,
    /// The plugin runs immediately.
    Active,
}

/// Outcome of a policy check for one object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    /// Initial activation state.
    pub activation: Activation,
    /// Whether the user should be asked about this origin.
    ///
    /// False for origins the user already blocked.
    pub prompt: bool,
}

impl Decision {
    const ACTIVE: Self = Self {
        activation: Activation::Active,
        prompt: false,
    };

    /// Whether the object starts running.
    pub fn is_active(self) -> bool {
        self.activation == Activation::Active
    }
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Click-to-play policy gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivationPolicy {
    click_to_play: bool,
}

impl ActivationPolicy {
    /// Create a policy with the given global click-to-play flag.
    pub fn new(click_to_play: bool) -> Self {
        Self { click_to_play }
    }

    /// Whether click-to-play is enabled.
    pub fn click_to_play(&self) -> bool {
        self.click_to_play
    }

    /// Decide the initial state of an object whose origin has `permission`.
    pub fn decide(&self, permission: Option<Permission>) -> Decision {
        decide(self.click_to_play, permission)
    }
}

impl Default for ActivationPolicy {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Evaluate the click-to-play rules.
///
/// With the flag off every plugin runs. With it on, only origins the user
/// allowed run; unknown origins prompt and blocked origins stay quiet.
pub fn decide(click_to_play: bool, permission: Option<Permission>) -> Decision {
    if !click_to_play {
        return Decision::ACTIVE;
    }
    match permission {
        Some(Permission::Allowed) => Decision::ACTIVE,
        Some(Permission::Blocked) => Decision {
            activation: Activation::Blocked,
            prompt: false,
        },
        None => Decision {
            activation: Activation::Blocked,
            prompt: true,
        },
    }
}
