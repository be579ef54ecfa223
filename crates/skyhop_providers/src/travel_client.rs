use serde::{Serialize, de::DeserializeOwned};
use skyhop_core::{
    config::{DirectionsBackend, SkyhopConfig},
    location::{LngLat, Location},
    path::PathGeometry,
    providers::{
        DirectionsProvider, DrivingTimeProvider, PlaceSuggestion, PlacesProvider, ProviderError,
    },
};
use tracing::{debug, info, warn};

use crate::{
    cache::{FileCache, LookupKind},
    graphhopper_api::{
        GraphHopperClient, GraphHopperClientParams, GraphHopperError, GraphHopperProfile,
    },
    osrm::{OsrmClient, OsrmClientParams, OsrmError},
};

const SUGGESTION_LIMIT: u32 = 5;

impl From<GraphHopperError> for ProviderError {
    fn from(err: GraphHopperError) -> Self {
        match err {
            GraphHopperError::Request(err) => ProviderError::Request(err.to_string()),
            GraphHopperError::Api { status, message } => ProviderError::Status {
                status: status.to_string(),
                message,
            },
            GraphHopperError::NoPath => ProviderError::NoRoute,
            GraphHopperError::Deserialize(err) => ProviderError::Decode(err.to_string()),
        }
    }
}

impl From<OsrmError> for ProviderError {
    fn from(err: OsrmError) -> Self {
        match err {
            OsrmError::Request(err) => ProviderError::Request(err.to_string()),
            OsrmError::Deserialize(err) => ProviderError::Decode(err.to_string()),
            OsrmError::Status { code, message } => ProviderError::Status {
                status: code,
                message,
            },
            OsrmError::IncompleteResponse => ProviderError::NoRoute,
        }
    }
}

enum Directions {
    GraphHopper,
    Osrm(OsrmClient),
}

/// Driving lookups against the configured backend, and place search through
/// GraphHopper when a key is available.
pub struct TravelClient {
    backend: DirectionsBackend,
    directions: Directions,
    graphhopper: Option<GraphHopperClient>,
    cache: Option<FileCache>,
}

impl TravelClient {
    /// `None` when the configured backend has no credential.
    pub fn from_config(config: &SkyhopConfig) -> Option<Self> {
        let graphhopper = config.directions.graphhopper_api_key.as_ref().map(|api_key| {
            GraphHopperClient::new(GraphHopperClientParams {
                api_key: api_key.clone(),
                profile: GraphHopperProfile::Car,
                locale: String::from("en"),
                suggestion_limit: SUGGESTION_LIMIT,
            })
        });

        let directions = match config.directions.backend {
            DirectionsBackend::GraphHopper if graphhopper.is_none() => {
                warn!("GRAPHHOPPER_API_KEY is not set, driving lookups are unavailable");
                return None;
            }
            DirectionsBackend::GraphHopper => Directions::GraphHopper,
            DirectionsBackend::Osrm => Directions::Osrm(OsrmClient::new(OsrmClientParams {
                osrm_url: config.directions.osrm_url.clone(),
            })),
        };

        let cache = config
            .cache_folder
            .as_ref()
            .and_then(|folder| match FileCache::new(folder) {
                Ok(cache) => Some(cache),
                Err(err) => {
                    warn!("Lookup cache disabled: {err}");
                    None
                }
            });

        info!("Driving lookups use {}", config.directions.backend);

        Some(Self {
            backend: config.directions.backend,
            directions,
            graphhopper,
            cache,
        })
    }

    pub fn backend(&self) -> DirectionsBackend {
        self.backend
    }

    pub fn has_places(&self) -> bool {
        self.graphhopper.is_some()
    }

    fn cached<T: DeserializeOwned>(&self, points: &[LngLat], kind: LookupKind) -> Option<T> {
        let cache = self.cache.as_ref()?;
        match cache.get(points, self.backend, kind) {
            Ok(value) => {
                if value.is_some() {
                    debug!("Cache hit for {kind:?}");
                }
                value
            }
            Err(err) => {
                warn!("Failed to read cached {kind:?}: {err}");
                None
            }
        }
    }

    fn store<T: Serialize>(&self, points: &[LngLat], kind: LookupKind, value: &T) {
        if let Some(cache) = &self.cache {
            if let Err(err) = cache.put(points, self.backend, kind, value) {
                warn!("Failed to cache {kind:?}: {err}");
            }
        }
    }

    fn graphhopper(&self) -> Result<&GraphHopperClient, ProviderError> {
        self.graphhopper.as_ref().ok_or(ProviderError::NotLoaded)
    }
}

impl DrivingTimeProvider for TravelClient {
    async fn driving_seconds(&self, from: &Location, to: &Location) -> Result<f64, ProviderError> {
        let points = [from.lng_lat(), to.lng_lat()];
        if let Some(seconds) = self.cached(&points, LookupKind::DrivingTime) {
            return Ok(seconds);
        }

        let seconds = match &self.directions {
            Directions::GraphHopper => self.graphhopper()?.fetch_duration(from, to).await?,
            Directions::Osrm(osrm) => osrm.fetch_duration(from, to).await?,
        };

        self.store(&points, LookupKind::DrivingTime, &seconds);
        Ok(seconds)
    }
}

impl DirectionsProvider for TravelClient {
    async fn driving_route(
        &self,
        from: &Location,
        to: &Location,
    ) -> Result<PathGeometry, ProviderError> {
        let points = [from.lng_lat(), to.lng_lat()];
        if let Some(route) = self.cached(&points, LookupKind::DrivingRoute) {
            return Ok(route);
        }

        let route = match &self.directions {
            Directions::GraphHopper => self.graphhopper()?.fetch_route(from, to).await?,
            Directions::Osrm(osrm) => osrm.fetch_route(from, to).await?,
        };

        self.store(&points, LookupKind::DrivingRoute, &route);
        Ok(route)
    }
}

impl PlacesProvider for TravelClient {
    async fn autocomplete(
        &self,
        query: &str,
        country: &str,
    ) -> Result<Vec<PlaceSuggestion>, ProviderError> {
        Ok(self.graphhopper()?.geocode(query, country).await?)
    }
}
