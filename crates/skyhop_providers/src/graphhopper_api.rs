use std::fmt::Display;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use skyhop_core::{
    location::{LngLat, Location},
    path::PathGeometry,
    providers::PlaceSuggestion,
};
use thiserror::Error;
use tracing::debug;

pub type GHPoint = [f64; 2];

#[derive(Debug, Deserialize, Serialize, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum GraphHopperProfile {
    #[default]
    Car,
}

impl Display for GraphHopperProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                GraphHopperProfile::Car => "car",
            }
        )
    }
}

#[derive(Debug, Error)]
pub enum GraphHopperError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("No path found")]
    NoPath,

    #[error("Deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize)]
pub struct MatrixRequestBody {
    pub from_points: Vec<GHPoint>,
    pub to_points: Vec<GHPoint>,

    /// Which arrays to return: "weights", "times", "distances"
    pub out_arrays: Vec<String>,

    pub profile: String,

    /// Fail fast on unreachable points
    pub fail_fast: bool,
}

#[derive(Debug, Deserialize)]
pub struct MatrixSolution {
    /// Travel times in seconds, `null` for unreachable pairs
    pub times: Vec<Vec<Option<f64>>>,
}

#[derive(Debug, Deserialize)]
pub struct RouteResponse {
    pub paths: Vec<RoutePath>,
}

#[derive(Debug, Deserialize)]
pub struct RoutePath {
    /// Meters
    pub distance: f64,
    /// Milliseconds
    pub time: u64,
    pub points: RoutePoints,
}

/// GeoJSON LineString, as returned with `points_encoded=false`.
#[derive(Debug, Deserialize)]
pub struct RoutePoints {
    pub coordinates: Vec<Vec<f64>>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeResponse {
    pub hits: Vec<GeocodeHit>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeHit {
    pub point: GeocodePoint,
    pub name: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub countrycode: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodePoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeocodeHit {
    pub fn label(&self) -> String {
        let mut parts = vec![self.name.as_str()];
        for part in [&self.city, &self.state, &self.country].into_iter().flatten() {
            if !parts.contains(&part.as_str()) {
                parts.push(part);
            }
        }
        parts.join(", ")
    }
}

pub struct GraphHopperClientParams {
    pub api_key: String,
    pub profile: GraphHopperProfile,
    pub locale: String,
    pub suggestion_limit: u32,
}

pub const GRAPHHOPPER_MATRIX_SYNC_API_URL: &str = "https://graphhopper.com/api/1/matrix";
pub const GRAPHHOPPER_ROUTE_API_URL: &str = "https://graphhopper.com/api/1/route";
pub const GRAPHHOPPER_GEOCODE_API_URL: &str = "https://graphhopper.com/api/1/geocode";

pub struct GraphHopperClient {
    params: GraphHopperClientParams,
    client: reqwest::Client,
}

impl GraphHopperClient {
    pub fn new(params: GraphHopperClientParams) -> Self {
        Self {
            params,
            client: reqwest::Client::new(),
        }
    }

    pub async fn fetch_duration(
        &self,
        from: &Location,
        to: &Location,
    ) -> Result<f64, GraphHopperError> {
        let body = MatrixRequestBody {
            from_points: vec![gh_point(from)],
            to_points: vec![gh_point(to)],
            out_arrays: vec![String::from("times")],
            profile: self.params.profile.to_string(),
            fail_fast: false,
        };

        let response = self
            .client
            .post(GRAPHHOPPER_MATRIX_SYNC_API_URL)
            .query(&[("key", &self.params.api_key)])
            .json(&body)
            .send()
            .await?;

        let solution: MatrixSolution = handle_response(response).await?;
        debug!("GraphHopperApi: Received matrix solution");

        first_time(&solution)
    }

    pub async fn fetch_route(
        &self,
        from: &Location,
        to: &Location,
    ) -> Result<PathGeometry, GraphHopperError> {
        let profile = self.params.profile.to_string();
        let (from_point, to_point) = (route_point(from), route_point(to));
        let response = self
            .client
            .get(GRAPHHOPPER_ROUTE_API_URL)
            .query(&[
                ("point", from_point.as_str()),
                ("point", to_point.as_str()),
                ("profile", profile.as_str()),
                ("points_encoded", "false"),
                ("instructions", "false"),
                ("key", self.params.api_key.as_str()),
            ])
            .send()
            .await?;

        let route: RouteResponse = handle_response(response).await?;
        route_geometry(route)
    }

    pub async fn geocode(
        &self,
        query: &str,
        country: &str,
    ) -> Result<Vec<PlaceSuggestion>, GraphHopperError> {
        let limit = self.params.suggestion_limit.to_string();
        let response = self
            .client
            .get(GRAPHHOPPER_GEOCODE_API_URL)
            .query(&[
                ("q", query),
                ("locale", self.params.locale.as_str()),
                ("limit", limit.as_str()),
                ("key", self.params.api_key.as_str()),
            ])
            .send()
            .await?;

        let geocode: GeocodeResponse = handle_response(response).await?;
        Ok(suggestions_in_country(geocode, country))
    }
}

async fn handle_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, GraphHopperError> {
    if response.status().is_success() {
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    } else {
        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        Err(GraphHopperError::Api { status, message })
    }
}

fn gh_point(location: &Location) -> GHPoint {
    [location.lng(), location.lat()]
}

/// The route API takes `lat,lng`, unlike the matrix API.
fn route_point(location: &Location) -> String {
    format!("{},{}", location.lat(), location.lng())
}

pub fn first_time(solution: &MatrixSolution) -> Result<f64, GraphHopperError> {
    solution
        .times
        .first()
        .and_then(|row| row.first())
        .copied()
        .flatten()
        .ok_or(GraphHopperError::NoPath)
}

pub fn route_geometry(route: RouteResponse) -> Result<PathGeometry, GraphHopperError> {
    let path = route.paths.into_iter().next().ok_or(GraphHopperError::NoPath)?;

    let points: Vec<LngLat> = path
        .points
        .coordinates
        .into_iter()
        .filter_map(|coordinate| match coordinate.as_slice() {
            [lng, lat, ..] => Some(LngLat::new(*lng, *lat)),
            _ => None,
        })
        .collect();

    debug!(
        "GraphHopperApi: Route with {} points, {:.0} m, {} ms",
        points.len(),
        path.distance,
        path.time
    );
    Ok(PathGeometry::new(points))
}

pub fn suggestions_in_country(geocode: GeocodeResponse, country: &str) -> Vec<PlaceSuggestion> {
    geocode
        .hits
        .into_iter()
        .filter(|hit| {
            hit.countrycode
                .as_deref()
                .is_some_and(|code| code.eq_ignore_ascii_case(country))
        })
        .map(|hit| PlaceSuggestion {
            label: hit.label(),
            lat: hit.point.lat,
            lng: hit.point.lng,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_use_the_driving_profile() {
        assert_eq!(GraphHopperProfile::default(), GraphHopperProfile::Car);
        assert_eq!(GraphHopperProfile::Car.to_string(), "car");
    }

    #[test]
    fn parses_matrix_times() {
        let solution: MatrixSolution =
            serde_json::from_str(r#"{"times":[[51243]],"info":{"copyrights":["GraphHopper"]}}"#)
                .unwrap();
        assert_eq!(first_time(&solution).unwrap(), 51243.0);
    }

    #[test]
    fn unreachable_matrix_entry_is_no_path() {
        let solution: MatrixSolution = serde_json::from_str(r#"{"times":[[null]]}"#).unwrap();
        assert!(matches!(first_time(&solution), Err(GraphHopperError::NoPath)));
    }

    #[test]
    fn parses_unencoded_route_points() {
        let route: RouteResponse = serde_json::from_str(
            r#"{
                "paths": [{
                    "distance": 1409871.2,
                    "time": 72000000,
                    "points": {
                        "type": "LineString",
                        "coordinates": [[72.8777, 19.076], [74.5, 23.1], [77.1025, 28.7041]]
                    }
                }]
            }"#,
        )
        .unwrap();

        let geometry = route_geometry(route).unwrap();
        assert_eq!(geometry.len(), 3);
        assert_eq!(geometry.last(), Some(&LngLat::new(77.1025, 28.7041)));
    }

    #[test]
    fn empty_paths_is_no_path() {
        let route: RouteResponse = serde_json::from_str(r#"{"paths":[]}"#).unwrap();
        assert!(matches!(route_geometry(route), Err(GraphHopperError::NoPath)));
    }

    #[test]
    fn geocode_hits_are_filtered_by_country() {
        let geocode: GeocodeResponse = serde_json::from_str(
            r#"{
                "hits": [
                    {"point": {"lat": 19.07, "lng": 72.87}, "name": "Mumbai",
                     "state": "Maharashtra", "country": "India", "countrycode": "IN"},
                    {"point": {"lat": 40.2, "lng": -74.8}, "name": "Mumbai Grill",
                     "city": "Trenton", "country": "United States", "countrycode": "US"},
                    {"point": {"lat": 0.0, "lng": 0.0}, "name": "Somewhere"}
                ]
            }"#,
        )
        .unwrap();

        let suggestions = suggestions_in_country(geocode, "in");
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].label, "Mumbai, Maharashtra, India");
        assert_eq!(suggestions[0].lat, 19.07);
    }

    #[test]
    fn label_skips_repeated_parts() {
        let hit = GeocodeHit {
            point: GeocodePoint { lat: 28.6, lng: 77.2 },
            name: String::from("Delhi"),
            city: Some(String::from("Delhi")),
            state: Some(String::from("Delhi")),
            country: Some(String::from("India")),
            countrycode: Some(String::from("IN")),
        };
        assert_eq!(hit.label(), "Delhi, India");
    }
}
