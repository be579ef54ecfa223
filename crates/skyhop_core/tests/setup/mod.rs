use std::time::Duration;

use skyhop_core::{
    config::MapConfig,
    location::Location,
    path::PathGeometry,
    providers::{DirectionsProvider, DrivingTimeProvider, ProviderError},
    renderer::MapRenderer,
    style_viewport::StyleViewport,
    view::TravelView,
};

/// Canned answer for one destination.
#[derive(Clone)]
pub struct FakeRoute {
    pub destination: &'static str,
    pub delay: Duration,
    pub result: Result<f64, ProviderError>,
}

/// Driving provider answering by destination name, after the configured delay.
pub struct FakeRoads {
    pub routes: Vec<FakeRoute>,
}

impl FakeRoads {
    pub fn new(routes: Vec<FakeRoute>) -> Self {
        Self { routes }
    }

    fn route_to(&self, to: &Location) -> Result<&FakeRoute, ProviderError> {
        self.routes
            .iter()
            .find(|route| route.destination == to.name())
            .ok_or(ProviderError::NoRoute)
    }
}

impl DrivingTimeProvider for FakeRoads {
    async fn driving_seconds(&self, _: &Location, to: &Location) -> Result<f64, ProviderError> {
        let route = self.route_to(to)?;
        tokio::time::sleep(route.delay).await;
        route.result.clone()
    }
}

impl DirectionsProvider for FakeRoads {
    async fn driving_route(
        &self,
        from: &Location,
        to: &Location,
    ) -> Result<PathGeometry, ProviderError> {
        let route = self.route_to(to)?;
        tokio::time::sleep(route.delay).await;
        route.result.clone()?;

        let midpoint = skyhop_core::location::LngLat::new(
            (from.lng() + to.lng()) / 2.0,
            (from.lat() + to.lat()) / 2.0 - 0.5,
        );
        Ok(PathGeometry::new(vec![from.lng_lat(), midpoint, to.lng_lat()]))
    }
}

pub fn ok_after(destination: &'static str, delay_ms: u64, seconds: f64) -> FakeRoute {
    FakeRoute {
        destination,
        delay: Duration::from_millis(delay_ms),
        result: Ok(seconds),
    }
}

pub fn mumbai() -> Location {
    Location::new("Mumbai", 19.0760, 72.8777).unwrap()
}

pub fn delhi() -> Location {
    Location::new("Delhi", 28.7041, 77.1025).unwrap()
}

pub fn pune() -> Location {
    Location::new("Pune", 18.5204, 73.8567).unwrap()
}

pub fn create_view() -> TravelView<StyleViewport> {
    let config = MapConfig {
        access_token: Some(String::from("pk.test")),
        ..MapConfig::default()
    };
    let viewport = StyleViewport::with_streets_basemap("mapbox://styles/test", 1280.0, 720.0);
    let mut renderer = MapRenderer::initialize(viewport, &config).unwrap();
    renderer.on_style_load().unwrap();

    TravelView::new(renderer)
}
