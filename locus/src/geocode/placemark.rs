//! Human-readable place descriptions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sample::Coordinate;

/// A place resolved from a coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placemark {
    /// Display name (street address, landmark, ...).
    pub name: String,
    /// City or town.
    #[serde(default)]
    pub locality: Option<String>,
    /// State, province or region.
    #[serde(default)]
    pub administrative_area: Option<String>,
    /// Country name.
    #[serde(default)]
    pub country: Option<String>,
    /// Where the place is.
    pub coordinate: Coordinate,
}

impl Placemark {
    /// Create a placemark with only a name.
    pub fn named(name: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            name: name.into(),
            locality: None,
            administrative_area: None,
            country: None,
            coordinate,
        }
    }

    /// Set the locality.
    pub fn with_locality(mut self, locality: impl Into<String>) -> Self {
        self.locality = Some(locality.into());
        self
    }

    /// Set the administrative area.
    pub fn with_administrative_area(mut self, area: impl Into<String>) -> Self {
        self.administrative_area = Some(area.into());
        self
    }

    /// Set the country.
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }
}

impl fmt::Display for Placemark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for part in [&self.locality, &self.administrative_area, &self.country]
            .into_iter()
            .flatten()
        {
            write!(f, ", {}", part)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_skips_missing_parts() {
        let place = Placemark::named("Mont Royal", Coordinate::new(45.5, -73.59))
            .with_locality("Montreal")
            .with_country("Canada");
        assert_eq!(place.to_string(), "Mont Royal, Montreal, Canada");
    }
}
