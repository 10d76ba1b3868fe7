//! Grant evaluation.

use super::prompt::{PromptMode, SettingsPrompt};
use super::types::{GrantLevel, OperatingMode};

/// What the service should do for a given grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Ask the platform to show its permission dialog for this mode.
    RequestPermission(OperatingMode),
    /// The grant does not match; show the user a corrective prompt.
    PromptUser(SettingsPrompt),
    /// Permission is adequate; start receiving samples.
    BeginUpdates,
}

impl Action {
    /// The prompt to render, if this action blocks on the user.
    pub fn prompt(&self) -> Option<&SettingsPrompt> {
        match self {
            Self::PromptUser(prompt) => Some(prompt),
            _ => None,
        }
    }
}

/// Decide the next action for `desired` given the platform's `grant`.
///
/// Pure: identical inputs always produce the identical action. An over-grant
/// (Always while the app wants While In Use) still prompts, since the two
/// modes carry different background semantics.
pub fn evaluate(desired: OperatingMode, grant: GrantLevel) -> Action {
    match (grant, desired) {
        (GrantLevel::Undetermined, mode) => Action::RequestPermission(mode),
        (GrantLevel::Denied | GrantLevel::Restricted, mode) => {
            Action::PromptUser(SettingsPrompt::new(PromptMode::Disabled, mode.into()))
        }
        (GrantLevel::GrantedAlways, OperatingMode::WhileInUse) => Action::PromptUser(
            SettingsPrompt::new(PromptMode::Always, PromptMode::WhileInUse),
        ),
        (GrantLevel::GrantedWhileInUse, OperatingMode::AlwaysOn) => Action::PromptUser(
            SettingsPrompt::new(PromptMode::WhileInUse, PromptMode::Always),
        ),
        (GrantLevel::GrantedAlways, OperatingMode::AlwaysOn)
        | (GrantLevel::GrantedWhileInUse, OperatingMode::WhileInUse) => Action::BeginUpdates,
    }
}

/// Tracks the last grant the platform reported against a fixed mode.
///
/// The machine never assumes a transition: `grant` only changes through
/// [`observe`](Self::observe).
#[derive(Debug, Clone)]
pub struct PermissionStateMachine {
    mode: OperatingMode,
    grant: GrantLevel,
}

impl PermissionStateMachine {
    /// Create a machine for `mode` with no grant observed yet.
    pub fn new(mode: OperatingMode) -> Self {
        Self {
            mode,
            grant: GrantLevel::Undetermined,
        }
    }

    /// The operating mode this machine evaluates against.
    pub fn mode(&self) -> OperatingMode {
        self.mode
    }

    /// The last grant reported by the platform.
    pub fn grant(&self) -> GrantLevel {
        self.grant
    }

    /// Record a grant reported by the platform and evaluate it.
    pub fn observe(&mut self, grant: GrantLevel) -> Action {
        if grant != self.grant {
            tracing::debug!(from = %self.grant, to = %grant, "Grant level changed");
        }
        self.grant = grant;
        self.action()
    }

    /// Evaluate the last observed grant.
    pub fn action(&self) -> Action {
        evaluate(self.mode, self.grant)
    }

    /// True when the observed grant allows updates for this mode.
    pub fn is_satisfied(&self) -> bool {
        self.grant.satisfies(self.mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt(current: PromptMode, desired: PromptMode) -> Action {
        Action::PromptUser(SettingsPrompt::new(current, desired))
    }

    #[test]
    fn test_evaluate_table() {
        use GrantLevel::*;
        use OperatingMode::*;

        assert_eq!(
            evaluate(WhileInUse, Undetermined),
            Action::RequestPermission(WhileInUse)
        );
        assert_eq!(
            evaluate(AlwaysOn, Undetermined),
            Action::RequestPermission(AlwaysOn)
        );
        assert_eq!(
            evaluate(AlwaysOn, Denied),
            prompt(PromptMode::Disabled, PromptMode::Always)
        );
        assert_eq!(
            evaluate(WhileInUse, Restricted),
            prompt(PromptMode::Disabled, PromptMode::WhileInUse)
        );
        assert_eq!(
            evaluate(WhileInUse, GrantedAlways),
            prompt(PromptMode::Always, PromptMode::WhileInUse)
        );
        assert_eq!(
            evaluate(AlwaysOn, GrantedWhileInUse),
            prompt(PromptMode::WhileInUse, PromptMode::Always)
        );
        assert_eq!(evaluate(AlwaysOn, GrantedAlways), Action::BeginUpdates);
        assert_eq!(evaluate(WhileInUse, GrantedWhileInUse), Action::BeginUpdates);
    }

    #[test]
    fn test_evaluate_is_deterministic() {
        let modes = [OperatingMode::WhileInUse, OperatingMode::AlwaysOn];
        let grants = [
            GrantLevel::Undetermined,
            GrantLevel::Denied,
            GrantLevel::Restricted,
            GrantLevel::GrantedWhileInUse,
            GrantLevel::GrantedAlways,
        ];
        for mode in modes {
            for grant in grants {
                assert_eq!(evaluate(mode, grant), evaluate(mode, grant));
            }
        }
    }

    #[test]
    fn test_machine_starts_undetermined() {
        let machine = PermissionStateMachine::new(OperatingMode::AlwaysOn);
        assert_eq!(machine.grant(), GrantLevel::Undetermined);
        assert_eq!(
            machine.action(),
            Action::RequestPermission(OperatingMode::AlwaysOn)
        );
        assert!(!machine.is_satisfied());
    }

    #[test]
    fn test_lowered_grant_reenters_disabled() {
        let mut machine = PermissionStateMachine::new(OperatingMode::AlwaysOn);
        assert_eq!(machine.observe(GrantLevel::GrantedAlways), Action::BeginUpdates);
        assert!(machine.is_satisfied());

        let action = machine.observe(GrantLevel::Denied);
        assert_eq!(action, prompt(PromptMode::Disabled, PromptMode::Always));
        assert!(!machine.is_satisfied());
    }

    #[test]
    fn test_action_prompt_accessor() {
        assert!(Action::BeginUpdates.prompt().is_none());
        let action = evaluate(OperatingMode::WhileInUse, GrantLevel::Denied);
        assert_eq!(
            action.prompt().map(|p| p.title()),
            Some("Background Location Disabled".to_string())
        );
    }
}
