//! Common types and utilities shared across CLI commands.

use std::path::Path;

use clap::ValueEnum;
use locus::config::{default_config_path, ServiceConfig};
use locus::permission::{GrantLevel, OperatingMode};
use locus::service::ActivityProfile;

use crate::error::CliError;

/// Operating mode selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum ModeArg {
    /// Foreground-only access
    WhileInUse,
    /// Background-capable access
    AlwaysOn,
}

impl From<ModeArg> for OperatingMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::WhileInUse => OperatingMode::WhileInUse,
            ModeArg::AlwaysOn => OperatingMode::AlwaysOn,
        }
    }
}

/// Grant level reported by the simulated platform.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum GrantArg {
    /// The user has not been asked yet
    Undetermined,
    /// The user refused access
    Denied,
    /// Access is blocked by policy
    Restricted,
    /// Foreground access granted
    WhileInUse,
    /// Background access granted
    Always,
}

impl From<GrantArg> for GrantLevel {
    fn from(grant: GrantArg) -> Self {
        match grant {
            GrantArg::Undetermined => GrantLevel::Undetermined,
            GrantArg::Denied => GrantLevel::Denied,
            GrantArg::Restricted => GrantLevel::Restricted,
            GrantArg::WhileInUse => GrantLevel::GrantedWhileInUse,
            GrantArg::Always => GrantLevel::GrantedAlways,
        }
    }
}

/// Activity profile handed to the platform.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum ActivityArg {
    /// No particular use
    Generic,
    /// Driving directions
    Car,
    /// Walking, running, cycling
    Fitness,
    /// Boats, trains and other vehicles
    OtherNavigation,
}

impl From<ActivityArg> for ActivityProfile {
    fn from(activity: ActivityArg) -> Self {
        match activity {
            ActivityArg::Generic => ActivityProfile::Generic,
            ActivityArg::Car => ActivityProfile::AutomotiveNavigation,
            ActivityArg::Fitness => ActivityProfile::Fitness,
            ActivityArg::OtherNavigation => ActivityProfile::OtherNavigation,
        }
    }
}

/// Resolve service settings from CLI args and config.
///
/// An explicit `--config` must load. Otherwise the default config file is used
/// if it exists. CLI flags take precedence over either.
pub fn resolve_config(
    config_path: Option<&Path>,
    mode: Option<ModeArg>,
    activity: Option<ActivityArg>,
) -> Result<ServiceConfig, CliError> {
    let mut config = match config_path {
        Some(path) => ServiceConfig::load(path)?,
        None => match default_config_path().filter(|p| p.exists()) {
            Some(path) => ServiceConfig::load(&path)?,
            None => ServiceConfig::default(),
        },
    };

    if let Some(mode) = mode {
        config = config.with_mode(mode.into());
    }
    if let Some(activity) = activity {
        config = config.with_activity(activity.into());
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_cli_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(
            &path,
            "[location]\nmode = always_on\nactivity = fitness\n[geocode]\ntimeout_secs = 4\n",
        )
        .unwrap();

        let config = resolve_config(Some(&path), Some(ModeArg::WhileInUse), None).unwrap();

        assert_eq!(config.mode, OperatingMode::WhileInUse);
        assert_eq!(config.activity, ActivityProfile::Fitness);
        assert_eq!(config.geocode_timeout, Duration::from_secs(4));
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = resolve_config(Some(&dir.path().join("absent.ini")), None, None);
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn test_grant_arg_mapping() {
        assert_eq!(GrantLevel::from(GrantArg::Always), GrantLevel::GrantedAlways);
        assert_eq!(
            GrantLevel::from(GrantArg::WhileInUse),
            GrantLevel::GrantedWhileInUse
        );
    }
}
