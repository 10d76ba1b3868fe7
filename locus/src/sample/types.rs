//! Sample and estimate types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees (-90 to 90).
    pub latitude: f64,
    /// Longitude in degrees (-180 to 180).
    pub longitude: f64,
}

impl Coordinate {
    /// Mean Earth radius used for great-circle distances.
    pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

    /// Create a coordinate.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle (haversine) distance to `other` in meters.
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlat = lat2 - lat1;
        let dlon = (other.longitude - self.longitude).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        Self::EARTH_RADIUS_M * c
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

/// One reading from the platform's location sensor.
///
/// Transient: samples are reduced per batch and never stored individually.
/// A non-positive `horizontal_accuracy` marks the reading as invalid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Altitude in meters.
    #[serde(default)]
    pub altitude: f64,
    /// Horizontal accuracy radius in meters.
    pub horizontal_accuracy: f64,
    /// Vertical accuracy in meters.
    #[serde(default)]
    pub vertical_accuracy: f64,
    /// Course over ground in degrees.
    #[serde(default)]
    pub course: f64,
    /// Speed in meters per second.
    #[serde(default)]
    pub speed: f64,
    /// When the platform took the reading.
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl RawSample {
    /// Create a sample at `latitude`/`longitude` with the given horizontal
    /// accuracy. Other fields are zero and the timestamp is now.
    pub fn new(latitude: f64, longitude: f64, horizontal_accuracy: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude: 0.0,
            horizontal_accuracy,
            vertical_accuracy: 0.0,
            course: 0.0,
            speed: 0.0,
            timestamp: Utc::now(),
        }
    }

    /// Set altitude and vertical accuracy.
    pub fn with_altitude(mut self, altitude: f64, vertical_accuracy: f64) -> Self {
        self.altitude = altitude;
        self.vertical_accuracy = vertical_accuracy;
        self
    }

    /// Set course and speed.
    pub fn with_motion(mut self, course: f64, speed: f64) -> Self {
        self.course = course;
        self.speed = speed;
        self
    }

    /// Whether this sample may contribute to an estimate.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.horizontal_accuracy > 0.0
    }

    /// The sample's position.
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// The smoothed current location.
///
/// Same shape as [`RawSample`]; `timestamp` is when the aggregation ran, not
/// when any sample was taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationEstimate {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
    pub horizontal_accuracy: f64,
    pub vertical_accuracy: f64,
    pub course: f64,
    pub speed: f64,
    pub timestamp: DateTime<Utc>,
    /// Number of samples that contributed.
    pub sample_count: usize,
}

impl LocationEstimate {
    /// The estimate's position.
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

impl fmt::Display for LocationEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ±{:.1}m alt {:.1}m ({} samples)",
            self.coordinate(),
            self.horizontal_accuracy,
            self.altitude,
            self.sample_count
        )
    }
}
