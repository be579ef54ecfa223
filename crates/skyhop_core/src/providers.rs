//! Capabilities backed by external services. Implementations live outside the core
//! so that it can be exercised with fakes.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{location::Location, path::PathGeometry};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    #[error("Provider is not loaded")]
    NotLoaded,

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Provider returned status {status}: {message}")]
    Status { status: String, message: String },

    #[error("No driving route between the requested points")]
    NoRoute,

    #[error("No answer within {0:?}")]
    Timeout(Duration),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

/// Driving distance/time lookup between two points.
pub trait DrivingTimeProvider {
    /// Driving duration in seconds.
    fn driving_seconds(
        &self,
        from: &Location,
        to: &Location,
    ) -> impl Future<Output = Result<f64, ProviderError>> + Send;
}

/// Driving directions between two points.
pub trait DirectionsProvider {
    fn driving_route(
        &self,
        from: &Location,
        to: &Location,
    ) -> impl Future<Output = Result<PathGeometry, ProviderError>> + Send;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceSuggestion {
    pub label: String,
    pub lat: f64,
    pub lng: f64,
}

/// Place autocomplete restricted to a country (ISO 3166-1 alpha-2, case-insensitive).
pub trait PlacesProvider {
    fn autocomplete(
        &self,
        query: &str,
        country: &str,
    ) -> impl Future<Output = Result<Vec<PlaceSuggestion>, ProviderError>> + Send;
}

impl<P: DrivingTimeProvider + Sync> DrivingTimeProvider for &P {
    async fn driving_seconds(&self, from: &Location, to: &Location) -> Result<f64, ProviderError> {
        (**self).driving_seconds(from, to).await
    }
}

impl<P: DirectionsProvider + Sync> DirectionsProvider for &P {
    async fn driving_route(
        &self,
        from: &Location,
        to: &Location,
    ) -> Result<PathGeometry, ProviderError> {
        (**self).driving_route(from, to).await
    }
}

impl<P: PlacesProvider + Sync> PlacesProvider for &P {
    async fn autocomplete(
        &self,
        query: &str,
        country: &str,
    ) -> Result<Vec<PlaceSuggestion>, ProviderError> {
        (**self).autocomplete(query, country).await
    }
}

/// An absent provider answers every search with [`ProviderError::NotLoaded`].
impl<P: PlacesProvider + Sync> PlacesProvider for Option<P> {
    async fn autocomplete(
        &self,
        query: &str,
        country: &str,
    ) -> Result<Vec<PlaceSuggestion>, ProviderError> {
        match self {
            Some(places) => places.autocomplete(query, country).await,
            None => Err(ProviderError::NotLoaded),
        }
    }
}
