//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use locus::geocode::GeocodeError;
use locus::{ConfigError, LocationError};

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration file could not be loaded
    Config(ConfigError),
    /// Gazetteer file could not be loaded
    Gazetteer(GeocodeError),
    /// Failed to read the sample file
    SampleRead { path: String, error: std::io::Error },
    /// A sample line is not valid JSON
    SampleParse {
        path: String,
        line: usize,
        error: serde_json::Error,
    },
    /// The service rejected a call
    Service(LocationError),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        if let CliError::SampleParse { .. } = self {
            eprintln!();
            eprintln!("Each line must be a JSON array of samples, for example:");
            eprintln!(
                r#"  [{{"latitude": 45.5, "longitude": -73.6, "horizontal_accuracy": 12.0}}]"#
            );
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::Gazetteer(e) => write!(f, "Failed to load places: {}", e),
            CliError::SampleRead { path, error } => {
                write!(f, "Failed to read samples '{}': {}", path, error)
            }
            CliError::SampleParse { path, line, error } => {
                write!(f, "Invalid sample batch at {}:{}: {}", path, line, error)
            }
            CliError::Service(e) => write!(f, "Location service error: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Gazetteer(e) => Some(e),
            CliError::SampleRead { error, .. } => Some(error),
            CliError::SampleParse { error, .. } => Some(error),
            CliError::Service(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LocationError> for CliError {
    fn from(e: LocationError) -> Self {
        CliError::Service(e)
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e)
    }
}
