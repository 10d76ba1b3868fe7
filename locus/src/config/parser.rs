//! INI → `ServiceConfig`.
//!
//! The single place where INI key names map to config fields.

use std::time::Duration;

use ini::Ini;

use super::settings::{ServiceConfig, MAX_GEOCODE_TIMEOUT};
use crate::error::ConfigError;

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Overlay the values found in `ini` onto `ServiceConfig::default()`.
pub(super) fn parse_ini(ini: &Ini) -> Result<ServiceConfig, ConfigError> {
    let mut config = ServiceConfig::default();

    // [location] section
    if let Some(section) = ini.section(Some("location")) {
        if let Some(v) = section.get("mode") {
            config.mode = v.parse().map_err(|_| {
                invalid(
                    "location",
                    "mode",
                    v,
                    "must be 'while_in_use' or 'always_on'",
                )
            })?;
        }
        if let Some(v) = section.get("activity") {
            config.activity = v.parse().map_err(|_| {
                invalid(
                    "location",
                    "activity",
                    v,
                    "must be one of: generic, automotive_navigation, fitness, other_navigation",
                )
            })?;
        }
    }

    // [geocode] section
    if let Some(section) = ini.section(Some("geocode")) {
        if let Some(v) = section.get("timeout_secs") {
            let secs: u64 = v
                .trim()
                .parse()
                .ok()
                .filter(|s| *s > 0 && *s <= MAX_GEOCODE_TIMEOUT.as_secs())
                .ok_or_else(|| {
                    invalid(
                        "geocode",
                        "timeout_secs",
                        v,
                        &format!(
                            "must be an integer from 1 to {} (seconds)",
                            MAX_GEOCODE_TIMEOUT.as_secs()
                        ),
                    )
                })?;
            config.geocode_timeout = Duration::from_secs(secs);
        }
    }

    Ok(config)
}
