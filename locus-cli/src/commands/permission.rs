//! Permission command - show what the service does for a mode and grant.

use locus::permission::{evaluate, Action, GrantLevel, OperatingMode};

use super::common::{GrantArg, ModeArg};
use crate::error::CliError;

/// Arguments for the permission command.
pub struct PermissionArgs {
    pub mode: ModeArg,
    pub grant: GrantArg,
}

/// Run the permission command.
pub fn run(args: PermissionArgs) -> Result<(), CliError> {
    let mode = OperatingMode::from(args.mode);
    let grant = GrantLevel::from(args.grant);

    println!("Mode:  {}", mode);
    println!("Grant: {}", grant);
    println!();
    println!("{}", describe(evaluate(mode, grant)));
    Ok(())
}

fn describe(action: Action) -> String {
    match action {
        Action::RequestPermission(mode) => {
            format!("Action: request permission ({})", mode)
        }
        Action::BeginUpdates => "Action: begin updates".to_string(),
        Action::PromptUser(prompt) => {
            let buttons: Vec<_> = prompt.actions().iter().map(|a| a.label()).collect();
            format!(
                "Action: prompt user\n  {}\n  {}\n  [{}]",
                prompt.title(),
                prompt.message(),
                buttons.join("] [")
            )
        }
    }
}
