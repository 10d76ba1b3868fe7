//! `ServiceConfig` and its setup presets.

use std::path::Path;
use std::time::Duration;

use ini::Ini;

use super::parser::parse_ini;
use crate::error::ConfigError;
use crate::permission::OperatingMode;
use crate::service::ActivityProfile;

/// Deadline for the blocking reverse-geocode call.
pub const DEFAULT_GEOCODE_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest geocode deadline a config file may set.
pub const MAX_GEOCODE_TIMEOUT: Duration = Duration::from_secs(600);

/// Configuration for a [`LocationService`](crate::service::LocationService).
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// Access scope the application needs.
    pub mode: OperatingMode,

    /// Intended use, passed through to the platform.
    pub activity: ActivityProfile,

    /// How long `current_address` waits for the geocoder.
    pub geocode_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            mode: OperatingMode::WhileInUse,
            activity: ActivityProfile::Generic,
            geocode_timeout: DEFAULT_GEOCODE_TIMEOUT,
        }
    }
}

impl ServiceConfig {
    /// Foreground-only access for `activity`.
    pub fn while_in_use(activity: ActivityProfile) -> Self {
        Self {
            mode: OperatingMode::WhileInUse,
            activity,
            ..Default::default()
        }
    }

    /// Background access for `activity`.
    pub fn always_on(activity: ActivityProfile) -> Self {
        Self {
            mode: OperatingMode::AlwaysOn,
            activity,
            ..Default::default()
        }
    }

    fn preset(activity: ActivityProfile, background: bool) -> Self {
        if background {
            Self::always_on(activity)
        } else {
            Self::while_in_use(activity)
        }
    }

    /// Generic use; background access if `background`.
    pub fn default_setup(background: bool) -> Self {
        Self::preset(ActivityProfile::Generic, background)
    }

    /// Turn-by-turn driving.
    pub fn for_car_navigation(background: bool) -> Self {
        Self::preset(ActivityProfile::AutomotiveNavigation, background)
    }

    /// Walking directions. Uses the fitness profile.
    pub fn for_pedestrian_navigation(background: bool) -> Self {
        Self::preset(ActivityProfile::Fitness, background)
    }

    /// Workout tracking.
    pub fn for_fitness(background: bool) -> Self {
        Self::preset(ActivityProfile::Fitness, background)
    }

    /// Set the operating mode.
    pub fn with_mode(mut self, mode: OperatingMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the activity profile.
    pub fn with_activity(mut self, activity: ActivityProfile) -> Self {
        self.activity = activity;
        self
    }

    /// Set the reverse-geocode deadline.
    pub fn with_geocode_timeout(mut self, timeout: Duration) -> Self {
        self.geocode_timeout = timeout;
        self
    }

    /// Load from an INI file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file(path).map_err(|e| match e {
            ini::Error::Io(io) => ConfigError::Io(io),
            ini::Error::Parse(parse) => ConfigError::Parse(parse.to_string()),
        })?;
        let config = parse_ini(&ini)?;
        tracing::debug!(path = %path.display(), ?config, "Loaded service config");
        Ok(config)
    }

    /// Parse INI text. Missing keys keep their defaults.
    pub fn from_ini_str(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        parse_ini(&ini)
    }
}
