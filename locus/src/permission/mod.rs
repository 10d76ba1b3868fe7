//! Permission negotiation.
//!
//! The platform owns the user's grant level; this module only reads it and
//! decides what the service should do next.
//!
//! # State Machine
//!
//! ```text
//! Undetermined ──────────────────────────────► RequestPermission(mode)
//! Denied / Restricted ───────────────────────► PromptUser(Disabled → mode)
//! GrantedAlways      + WhileInUse ───────────► PromptUser(Always → While In Use)
//! GrantedWhileInUse  + AlwaysOn ─────────────► PromptUser(While In Use → Always)
//! GrantedAlways      + AlwaysOn ─────────────► BeginUpdates
//! GrantedWhileInUse  + WhileInUse ───────────► BeginUpdates
//! ```
//!
//! Transitions happen only when the platform reports a new grant level. A
//! prompt is a descriptor for the caller to render; it never changes state.

mod machine;
mod prompt;
mod types;

pub use machine::{evaluate, Action, PermissionStateMachine};
pub use prompt::{PromptAction, PromptMode, SettingsPrompt};
pub use types::{GrantLevel, OperatingMode};
