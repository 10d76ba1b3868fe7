//! Service configuration.
//!
//! [`ServiceConfig`] carries everything fixed at configuration time: the
//! operating mode, the activity profile handed to the platform and the
//! reverse-geocoding deadline. It can be built in code, from one of the setup
//! presets, or loaded from an INI file:
//!
//! ```ini
//! [location]
//! mode = always_on
//! activity = fitness
//!
//! [geocode]
//! timeout_secs = 10
//! ```

mod parser;
mod settings;

use std::path::PathBuf;

pub use settings::{ServiceConfig, DEFAULT_GEOCODE_TIMEOUT, MAX_GEOCODE_TIMEOUT};

/// Default config file location: `<config dir>/locus/config.ini`.
///
/// Returns `None` if the platform has no config directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("locus").join("config.ini"))
}
