use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    constants::{CRUISE_SPEED_KMH, DEFAULT_PROVIDER_TIMEOUT_MS},
    geo::haversine_distance_km,
    location::{Location, LocationPair},
    path::PathGeometry,
    providers::{DirectionsProvider, DrivingTimeProvider, ProviderError},
};

/// Travel times for the live pair. `cab_minutes` stays `None` until the driving
/// lookup resolves, and when it fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RouteComparison {
    pub flying_minutes: u32,
    pub cab_minutes: Option<u32>,
    pub distance_km: u32,
}

impl RouteComparison {
    /// Minutes saved by flying, when the driving time is known.
    pub fn minutes_saved(&self) -> Option<i64> {
        self.cab_minutes
            .map(|cab| cab as i64 - self.flying_minutes as i64)
    }
}

/// Aerial figures for `pair`. The cab time is filled in once the lookup resolves.
pub fn compare(pair: &LocationPair) -> RouteComparison {
    let distance_km = haversine_distance_km(&pair.from, &pair.to);
    RouteComparison {
        flying_minutes: flying_minutes(distance_km),
        cab_minutes: None,
        distance_km,
    }
}

pub fn flying_minutes(distance_km: u32) -> u32 {
    (distance_km as f64 / CRUISE_SPEED_KMH * 60.0).round() as u32
}

fn minutes_from_seconds(seconds: f64) -> Option<u32> {
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }
    Some((seconds / 60.0).round() as u32)
}

/// Result of the driving lookups issued for one pair.
#[derive(Debug, Clone, Default)]
pub struct DrivingLookup {
    pub cab_minutes: Option<u32>,
    pub route: Option<PathGeometry>,
}

pub struct TimeEstimator<P> {
    provider: Option<P>,
    timeout: Duration,
}

impl<P> TimeEstimator<P> {
    pub fn new(provider: Option<P>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    /// Estimator with no provider loaded: every driving figure is unavailable.
    pub fn unloaded() -> Self {
        Self::new(None, Duration::from_millis(DEFAULT_PROVIDER_TIMEOUT_MS))
    }

    pub fn is_loaded(&self) -> bool {
        self.provider.is_some()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn call<T, F>(&self, lookup: &'static str, request: F) -> Result<T, ProviderError>
    where
        F: Future<Output = Result<T, ProviderError>>,
    {
        let result = match tokio::time::timeout(self.timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(self.timeout)),
        };

        result.inspect_err(|err| warn!("{lookup} unavailable: {err}"))
    }
}

impl<P: DrivingTimeProvider> TimeEstimator<P> {
    pub async fn cab_minutes(&self, from: &Location, to: &Location) -> Option<u32> {
        let Some(provider) = &self.provider else {
            debug!("Driving time provider not loaded");
            return None;
        };

        let seconds = self
            .call("driving time", provider.driving_seconds(from, to))
            .await
            .ok()?;

        minutes_from_seconds(seconds)
    }
}

impl<P: DirectionsProvider> TimeEstimator<P> {
    pub async fn driving_route(&self, from: &Location, to: &Location) -> Option<PathGeometry> {
        let Some(provider) = &self.provider else {
            debug!("Directions provider not loaded");
            return None;
        };

        let route = self
            .call("driving route", provider.driving_route(from, to))
            .await
            .ok()?;

        if route.len() < 2 {
            warn!("driving route unavailable: {} points", route.len());
            return None;
        }

        Some(route)
    }
}

impl<P: DrivingTimeProvider + DirectionsProvider> TimeEstimator<P> {
    /// Runs both driving lookups for a pair concurrently.
    pub async fn lookup_driving(&self, pair: &LocationPair) -> DrivingLookup {
        let (cab_minutes, route) = tokio::join!(
            self.cab_minutes(&pair.from, &pair.to),
            self.driving_route(&pair.from, &pair.to)
        );

        DrivingLookup { cab_minutes, route }
    }
}
