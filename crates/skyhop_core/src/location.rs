use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum LocationError {
    #[error("Latitude {0} is outside [-90, 90]")]
    Latitude(f64),
    #[error("Longitude {0} is outside [-180, 180]")]
    Longitude(f64),
}

/// A longitude/latitude pair, in that order, as map libraries expect it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

impl From<LngLat> for geo_types::Coord<f64> {
    fn from(value: LngLat) -> Self {
        geo_types::Coord {
            x: value.lng,
            y: value.lat,
        }
    }
}

impl From<&LngLat> for geo_types::Point {
    fn from(value: &LngLat) -> Self {
        geo_types::Point::new(value.lng, value.lat)
    }
}

impl From<LngLat> for [f64; 2] {
    fn from(value: LngLat) -> Self {
        [value.lng, value.lat]
    }
}

/// A selected place. Immutable once built; a new selection replaces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    name: String,
    lat: f64,
    lng: f64,
}

impl Location {
    pub fn new(name: impl Into<String>, lat: f64, lng: f64) -> Result<Self, LocationError> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(LocationError::Latitude(lat));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(LocationError::Longitude(lng));
        }

        Ok(Self {
            name: name.into(),
            lat,
            lng,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }

    pub fn lng_lat(&self) -> LngLat {
        LngLat::new(self.lng, self.lat)
    }
}

impl From<&Location> for geo_types::Point {
    fn from(location: &Location) -> Self {
        geo_types::Point::new(location.lng, location.lat)
    }
}

impl From<&Location> for LngLat {
    fn from(location: &Location) -> Self {
        location.lng_lat()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationPair {
    pub from: Location,
    pub to: Location,
}

/// Identifies which location pair is live. Bumped on every pair change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn next(self) -> Self {
        Generation(self.0 + 1)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Ties an async lookup to the pair that issued it.
#[derive(Debug, Clone)]
pub struct PairTicket {
    generation: Generation,
    pair: LocationPair,
}

impl PairTicket {
    pub(crate) fn new(generation: Generation, pair: LocationPair) -> Self {
        Self { generation, pair }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn pair(&self) -> &LocationPair {
        &self.pair
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_coordinates() {
        assert_eq!(
            Location::new("north", 90.5, 0.0),
            Err(LocationError::Latitude(90.5))
        );
        assert_eq!(
            Location::new("east", 0.0, -181.0),
            Err(LocationError::Longitude(-181.0))
        );
        assert!(Location::new("nan", f64::NAN, 0.0).is_err());
    }

    #[test]
    fn accepts_boundary_coordinates() {
        let location = Location::new("corner", -90.0, 180.0).unwrap();
        assert_eq!(location.lat(), -90.0);
        assert_eq!(location.lng(), 180.0);
        assert_eq!(location.lng_lat(), LngLat::new(180.0, -90.0));
    }

    #[test]
    fn generation_increases() {
        let first = Generation::default();
        assert!(first.next() > first);
        assert_eq!(first.next().value(), 1);
    }
}
