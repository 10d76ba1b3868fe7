//! Corrective prompt descriptor.
//!
//! When the grant does not match the operating mode the service hands the
//! caller a [`SettingsPrompt`]. Rendering it, and sending the user to the
//! platform's settings surface, is the caller's job.

use std::fmt;

use super::types::OperatingMode;

/// Access scope as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptMode {
    /// Location access is denied or restricted.
    Disabled,
    /// Background access.
    Always,
    /// Foreground-only access.
    WhileInUse,
}

impl PromptMode {
    /// User-facing label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Disabled => "Disabled",
            Self::Always => "Always",
            Self::WhileInUse => "While In Use",
        }
    }
}

impl From<OperatingMode> for PromptMode {
    fn from(mode: OperatingMode) -> Self {
        match mode {
            OperatingMode::WhileInUse => Self::WhileInUse,
            OperatingMode::AlwaysOn => Self::Always,
        }
    }
}

impl fmt::Display for PromptMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A button offered by the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptAction {
    /// Dismiss without changing anything.
    Cancel,
    /// Open the application's settings page.
    OpenSettings,
}

impl PromptAction {
    /// Button label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Cancel => "Cancel",
            Self::OpenSettings => "Open Settings",
        }
    }
}

/// Renderable descriptor asking the user to change location access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SettingsPrompt {
    /// What the user has granted today.
    pub current: PromptMode,
    /// What the application needs.
    pub desired: PromptMode,
}

impl SettingsPrompt {
    /// Create a prompt from `current` to `desired`.
    pub fn new(current: PromptMode, desired: PromptMode) -> Self {
        Self { current, desired }
    }

    /// Alert title, e.g. `Background Location Disabled`.
    pub fn title(&self) -> String {
        format!("Background Location {}", self.current)
    }

    /// Alert body naming the access level to pick in settings.
    pub fn message(&self) -> String {
        format!(
            "Please open this app's settings and set location access to '{}'.",
            self.desired
        )
    }

    /// Buttons in display order.
    pub fn actions(&self) -> [PromptAction; 2] {
        [PromptAction::Cancel, PromptAction::OpenSettings]
    }
}
