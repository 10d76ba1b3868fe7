//! Reverse geocoding collaborator.
//!
//! The service only consumes the first candidate a [`Geocoder`] returns. A
//! failed lookup and an empty one look the same to callers: no placemark.

mod gazetteer;
mod placemark;

use thiserror::Error;

use crate::sample::Coordinate;

pub use gazetteer::GazetteerGeocoder;
pub use placemark::Placemark;

/// Errors a geocoder may report to its completion handler.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GeocodeError {
    /// The backing service could not be reached.
    #[error("Geocoding service unavailable: {0}")]
    Unavailable(String),

    /// The lookup ran but failed.
    #[error("Lookup failed: {0}")]
    Failed(String),
}

/// Outcome of a reverse geocode: candidates, best first.
pub type GeocodeResult = Result<Vec<Placemark>, GeocodeError>;

/// Completion handler invoked once with the lookup outcome.
pub type GeocodeCompletion = Box<dyn FnOnce(GeocodeResult) + Send + 'static>;

/// Callback-based reverse geocoder.
///
/// Implementations may invoke `completion` inline or from any other thread,
/// but must not block the caller waiting for it.
pub trait Geocoder: Send + Sync {
    /// Resolve `coordinate` to zero or more candidate places.
    fn reverse_geocode(&self, coordinate: Coordinate, completion: GeocodeCompletion);
}

/// Keep the first candidate; errors and empty results become `None`.
pub(crate) fn first_candidate(result: GeocodeResult) -> Option<Placemark> {
    match result {
        Ok(candidates) => candidates.into_iter().next(),
        Err(e) => {
            tracing::debug!(error = %e, "Reverse geocode failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_candidate_takes_head() {
        let a = Placemark::named("A", Coordinate::new(0.0, 0.0));
        let b = Placemark::named("B", Coordinate::new(1.0, 1.0));
        assert_eq!(first_candidate(Ok(vec![a.clone(), b])), Some(a));
    }

    #[test]
    fn test_empty_and_failed_lookups_are_indistinguishable() {
        assert_eq!(first_candidate(Ok(Vec::new())), None);
        assert_eq!(
            first_candidate(Err(GeocodeError::Failed("boom".to_string()))),
            None
        );
    }
}
