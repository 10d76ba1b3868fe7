//! Operating mode and grant level.

use std::fmt;
use std::str::FromStr;

/// Access scope the application intends to use.
///
/// Fixed when the service is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OperatingMode {
    /// Foreground-only access.
    #[default]
    WhileInUse,
    /// Background-capable access.
    AlwaysOn,
}

impl fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WhileInUse => write!(f, "while_in_use"),
            Self::AlwaysOn => write!(f, "always_on"),
        }
    }
}

impl FromStr for OperatingMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "while_in_use" | "when_in_use" => Ok(Self::WhileInUse),
            "always_on" | "always" => Ok(Self::AlwaysOn),
            _ => Err(()),
        }
    }
}

/// The user's current decision about location access.
///
/// Owned by the platform; the service only reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GrantLevel {
    /// The user has not been asked yet.
    #[default]
    Undetermined,
    /// The user refused access.
    Denied,
    /// Access is blocked by policy (parental controls, MDM, ...).
    Restricted,
    /// Foreground access granted.
    GrantedWhileInUse,
    /// Background access granted.
    GrantedAlways,
}

impl GrantLevel {
    /// True if this grant is exactly what `mode` asks for.
    pub fn satisfies(&self, mode: OperatingMode) -> bool {
        matches!(
            (self, mode),
            (Self::GrantedWhileInUse, OperatingMode::WhileInUse)
                | (Self::GrantedAlways, OperatingMode::AlwaysOn)
        )
    }
}

impl fmt::Display for GrantLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undetermined => write!(f, "Undetermined"),
            Self::Denied => write!(f, "Denied"),
            Self::Restricted => write!(f, "Restricted"),
            Self::GrantedWhileInUse => write!(f, "GrantedWhileInUse"),
            Self::GrantedAlways => write!(f, "GrantedAlways"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parse_accepts_config_spellings() {
        assert_eq!("while_in_use".parse(), Ok(OperatingMode::WhileInUse));
        assert_eq!("While-In-Use".parse(), Ok(OperatingMode::WhileInUse));
        assert_eq!("always_on".parse(), Ok(OperatingMode::AlwaysOn));
        assert_eq!("always".parse(), Ok(OperatingMode::AlwaysOn));
        assert!("sometimes".parse::<OperatingMode>().is_err());
    }

    #[test]
    fn test_mode_display_round_trips() {
        for mode in [OperatingMode::WhileInUse, OperatingMode::AlwaysOn] {
            assert_eq!(mode.to_string().parse(), Ok(mode));
        }
    }

    #[test]
    fn test_grant_satisfies_only_exact_match() {
        assert!(GrantLevel::GrantedAlways.satisfies(OperatingMode::AlwaysOn));
        assert!(GrantLevel::GrantedWhileInUse.satisfies(OperatingMode::WhileInUse));
        assert!(!GrantLevel::GrantedAlways.satisfies(OperatingMode::WhileInUse));
        assert!(!GrantLevel::GrantedWhileInUse.satisfies(OperatingMode::AlwaysOn));
        assert!(!GrantLevel::Denied.satisfies(OperatingMode::WhileInUse));
    }
}
