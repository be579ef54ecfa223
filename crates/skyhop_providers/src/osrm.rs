use serde::{Deserialize, de::DeserializeOwned};
use skyhop_core::{
    location::{LngLat, Location},
    path::PathGeometry,
};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum OsrmError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("OSRM returned {code}: {message}")]
    Status { code: String, message: String },

    #[error("Incomplete response")]
    IncompleteResponse,
}

#[derive(Debug, Deserialize)]
pub struct TableResponse {
    pub code: String,
    pub message: Option<String>,
    /// Seconds, `null` when no route was found
    pub durations: Option<Vec<Vec<Option<f64>>>>,
}

#[derive(Debug, Deserialize)]
pub struct RouteResponse {
    pub code: String,
    pub message: Option<String>,
    #[serde(default)]
    pub routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
pub struct OsrmRoute {
    pub duration: f64,
    pub distance: f64,
    pub geometry: OsrmGeometry,
}

#[derive(Debug, Deserialize)]
pub struct OsrmGeometry {
    pub coordinates: Vec<[f64; 2]>,
}

pub struct OsrmClientParams {
    pub osrm_url: String,
}

pub const OSRM_TABLE_API_PATH: &str = "/table/v1/driving/";
pub const OSRM_ROUTE_API_PATH: &str = "/route/v1/driving/";

pub struct OsrmClient {
    params: OsrmClientParams,
    client: reqwest::Client,
}

impl OsrmClient {
    pub fn new(params: OsrmClientParams) -> Self {
        Self {
            params,
            client: reqwest::Client::new(),
        }
    }

    pub async fn fetch_duration(&self, from: &Location, to: &Location) -> Result<f64, OsrmError> {
        let url = self.url(OSRM_TABLE_API_PATH, &[from, to]);
        let response = self
            .client
            .get(url)
            .query(&[
                ("sources", "0"),
                ("destinations", "1"),
                ("annotations", "duration"),
            ])
            .send()
            .await?;

        let table: TableResponse = parse_body(response).await?;
        table_duration(table)
    }

    pub async fn fetch_route(
        &self,
        from: &Location,
        to: &Location,
    ) -> Result<PathGeometry, OsrmError> {
        let url = self.url(OSRM_ROUTE_API_PATH, &[from, to]);
        let response = self
            .client
            .get(url)
            .query(&[("overview", "full"), ("geometries", "geojson")])
            .send()
            .await?;

        let route: RouteResponse = parse_body(response).await?;
        route_geometry(route)
    }

    fn url(&self, path: &str, points: &[&Location]) -> String {
        let mut url = self.params.osrm_url.trim_end_matches('/').to_string();
        url.push_str(path);

        for (i, point) in points.iter().enumerate() {
            let point: geo_types::Point = (*point).into();
            url.push_str(&format!("{},{}", point.x(), point.y()));

            if i < points.len() - 1 {
                url.push(';');
            }
        }

        url
    }
}

/// OSRM answers errors such as `NoRoute` with a JSON body and a 4xx status, so
/// the body is decoded regardless of the HTTP status.
async fn parse_body<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, OsrmError> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn check_code(code: String, message: Option<String>) -> Result<(), OsrmError> {
    if code == "Ok" {
        return Ok(());
    }

    Err(OsrmError::Status {
        code,
        message: message.unwrap_or_default(),
    })
}

pub fn table_duration(table: TableResponse) -> Result<f64, OsrmError> {
    check_code(table.code, table.message)?;

    table
        .durations
        .and_then(|rows| rows.into_iter().next())
        .and_then(|row| row.into_iter().next())
        .flatten()
        .ok_or(OsrmError::IncompleteResponse)
}

pub fn route_geometry(route: RouteResponse) -> Result<PathGeometry, OsrmError> {
    check_code(route.code, route.message)?;

    let route = route
        .routes
        .into_iter()
        .next()
        .ok_or(OsrmError::IncompleteResponse)?;

    debug!(
        "Osrm: Route with {} points, {:.0} m, {:.0} s",
        route.geometry.coordinates.len(),
        route.distance,
        route.duration
    );

    Ok(PathGeometry::new(
        route
            .geometry
            .coordinates
            .into_iter()
            .map(|[lng, lat]| LngLat::new(lng, lat))
            .collect(),
    ))
}
