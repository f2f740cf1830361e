//! Clicktoplay — click-to-play plugin activation tracker.
//!
//! Models the decision "does embedded plugin content get to run" for one
//! browser tab: objects inserted into a page start blocked or active
//! according to the click-to-play policy and per-origin permissions, the
//! notification offers to activate them, and navigation decides what
//! state survives.
//!
//! See `DESIGN.md` for architecture notes.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod logging;

pub mod navigation;
pub mod notification;
pub mod page;
pub mod permission;
pub mod policy;
pub mod session;

pub mod scenario;
pub mod wait;

pub use navigation::NavigationKind;
pub use permission::Permission;
pub use session::ClickToPlaySession;
