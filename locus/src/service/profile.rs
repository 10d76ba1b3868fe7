//! Activity profiles.

use std::fmt;
use std::str::FromStr;

/// What the location data will be used for.
///
/// Opaque to the service: it is passed to the platform so it can tune its
/// sensor filtering and power use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ActivityProfile {
    /// No particular use.
    #[default]
    Generic,
    /// Driving directions.
    AutomotiveNavigation,
    /// Walking, running, cycling.
    Fitness,
    /// Other vehicular navigation (boats, trains, ...).
    OtherNavigation,
}

impl fmt::Display for ActivityProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generic => write!(f, "generic"),
            Self::AutomotiveNavigation => write!(f, "automotive_navigation"),
            Self::Fitness => write!(f, "fitness"),
            Self::OtherNavigation => write!(f, "other_navigation"),
        }
    }
}

impl FromStr for ActivityProfile {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "generic" | "other" => Ok(Self::Generic),
            "automotive_navigation" | "automotive" | "car" => Ok(Self::AutomotiveNavigation),
            "fitness" | "pedestrian" => Ok(Self::Fitness),
            "other_navigation" => Ok(Self::OtherNavigation),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("car".parse(), Ok(ActivityProfile::AutomotiveNavigation));
        assert_eq!("Pedestrian".parse(), Ok(ActivityProfile::Fitness));
        assert_eq!("other-navigation".parse(), Ok(ActivityProfile::OtherNavigation));
        assert!("skydiving".parse::<ActivityProfile>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for profile in [
            ActivityProfile::Generic,
            ActivityProfile::AutomotiveNavigation,
            ActivityProfile::Fitness,
            ActivityProfile::OtherNavigation,
        ] {
            assert_eq!(profile.to_string().parse(), Ok(profile));
        }
    }
}
