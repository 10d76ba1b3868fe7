//! Error types for the location service.
//!
//! Absence of data is never an error here: no estimate yet, an empty geocode
//! result or a timed-out lookup all surface as `None` at the façade. The types
//! below cover precondition violations, bridge outcomes and configuration.

use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by [`LocationService`](crate::service::LocationService).
#[derive(Debug, Error)]
pub enum LocationError {
    /// `start` was called before `configure`.
    #[error("Location service is not configured")]
    NotConfigured,

    /// `configure` was called after `start`; the operating mode is fixed.
    #[error("Location service already started; operating mode cannot change")]
    AlreadyStarted,

    /// A bridged call did not produce a value.
    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Outcome of a bridged call that did not resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// The deadline elapsed before the completion handler resolved the call.
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// The waiter abandoned the call.
    #[error("Cancelled")]
    Cancelled,

    /// Every completion handle was dropped without resolving.
    #[error("Completion handler dropped without a result")]
    Dropped,
}

/// Errors that can occur while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error reading the file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid INI.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A key holds a value outside its accepted set.
    #[error("Invalid value '{value}' for [{section}] {key}: {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_error_display() {
        let err = LocationError::NotConfigured;
        assert!(err.to_string().contains("not configured"));
    }

    #[test]
    fn test_location_error_from_bridge_error() {
        let err: LocationError = BridgeError::Timeout(Duration::from_secs(10)).into();
        assert!(matches!(
            err,
            LocationError::Bridge(BridgeError::Timeout(_))
        ));
        assert!(err.to_string().contains("Timed out"));
    }

    #[test]
    fn test_invalid_value_display_names_key() {
        let err = ConfigError::InvalidValue {
            section: "location".to_string(),
            key: "mode".to_string(),
            value: "sometimes".to_string(),
            reason: "must be 'while_in_use' or 'always_on'".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("[location] mode"));
        assert!(msg.contains("sometimes"));
    }
}
