//! Locus - location acquisition for applications that need to know where they are
//!
//! This library turns a platform's permission model and raw sensor samples into
//! a single, shared best-known location with reverse geocoding on demand.
//!
//! # High-Level API
//!
//! For most use cases, the [`service`] module provides a simplified facade:
//!
//! ```
//! use std::sync::Arc;
//! use locus::config::ServiceConfig;
//! use locus::geocode::GazetteerGeocoder;
//! use locus::permission::GrantLevel;
//! use locus::platform::SimulatedPlatform;
//! use locus::sample::RawSample;
//! use locus::service::{ActivityProfile, LocationService};
//!
//! let platform = Arc::new(SimulatedPlatform::new(GrantLevel::GrantedWhileInUse));
//! let geocoder = Arc::new(GazetteerGeocoder::new(Vec::new()));
//! let service = LocationService::new(platform, geocoder);
//!
//! service.configure(ServiceConfig::while_in_use(ActivityProfile::Fitness)).unwrap();
//! service.start(|prompt| println!("{}", prompt.message())).unwrap();
//!
//! service.on_samples_delivered(&[RawSample::new(45.5, -73.6, 12.0)]);
//! assert!(service.current_location().is_some());
//! ```

pub mod bridge;
pub mod broadcast;
pub mod config;
pub mod error;
pub mod geocode;
pub mod logging;
pub mod permission;
pub mod platform;
pub mod sample;
pub mod service;

pub use error::{BridgeError, ConfigError, LocationError};
pub use service::LocationService;

/// Version of the locus library and CLI.
///
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
