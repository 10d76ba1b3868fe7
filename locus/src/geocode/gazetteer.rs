//! Offline geocoder over a fixed list of places.
//!
//! Answers with every known place within `max_distance_m` of the query,
//! nearest first. Completions run on a background thread after an optional
//! simulated latency, so callers see the same threading as with a network
//! geocoder.

use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use super::{GeocodeCompletion, GeocodeError, Geocoder, Placemark};
use crate::sample::Coordinate;

/// Default search radius (meters).
pub const DEFAULT_MAX_DISTANCE_M: f64 = 5_000.0;

/// Geocoder answering from an in-memory gazetteer.
#[derive(Debug, Clone)]
pub struct GazetteerGeocoder {
    places: Arc<Vec<Placemark>>,
    max_distance_m: f64,
    latency: Duration,
}

impl GazetteerGeocoder {
    /// Create a geocoder over `places` with the default radius and no latency.
    pub fn new(places: Vec<Placemark>) -> Self {
        Self {
            places: Arc::new(places),
            max_distance_m: DEFAULT_MAX_DISTANCE_M,
            latency: Duration::ZERO,
        }
    }

    /// Parse a JSON array of placemarks.
    pub fn from_json(json: &str) -> Result<Self, GeocodeError> {
        let places: Vec<Placemark> = serde_json::from_str(json)
            .map_err(|e| GeocodeError::Unavailable(format!("invalid gazetteer: {}", e)))?;
        Ok(Self::new(places))
    }

    /// Load a JSON array of placemarks from `path`.
    pub fn load(path: &Path) -> Result<Self, GeocodeError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            GeocodeError::Unavailable(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    /// Set the search radius.
    pub fn with_max_distance(mut self, meters: f64) -> Self {
        self.max_distance_m = meters;
        self
    }

    /// Delay every answer by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Number of known places.
    pub fn len(&self) -> usize {
        self.places.len()
    }

    /// True if the gazetteer has no places.
    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    /// Places within range of `coordinate`, nearest first.
    pub fn lookup(&self, coordinate: Coordinate) -> Vec<Placemark> {
        nearby(&self.places, coordinate, self.max_distance_m)
    }
}

fn nearby(places: &[Placemark], coordinate: Coordinate, max_distance_m: f64) -> Vec<Placemark> {
    let mut hits: Vec<(f64, &Placemark)> = places
        .iter()
        .map(|p| (coordinate.distance_to(&p.coordinate), p))
        .filter(|(d, _)| *d <= max_distance_m)
        .collect();
    hits.sort_by(|a, b| a.0.total_cmp(&b.0));
    hits.into_iter().map(|(_, p)| p.clone()).collect()
}

impl Geocoder for GazetteerGeocoder {
    fn reverse_geocode(&self, coordinate: Coordinate, completion: GeocodeCompletion) {
        let places = Arc::clone(&self.places);
        let max_distance_m = self.max_distance_m;
        let latency = self.latency;

        thread::spawn(move || {
            if !latency.is_zero() {
                thread::sleep(latency);
            }
            let hits = nearby(&places, coordinate, max_distance_m);
            tracing::trace!(%coordinate, candidates = hits.len(), "Gazetteer lookup");
            completion(Ok(hits));
        });
    }
}
