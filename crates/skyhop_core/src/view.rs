use tracing::debug;

use crate::{
    animator::{AnimationTiming, RouteAnimator},
    constants::{AERIAL_PATH_STEPS, CURVE_HEIGHT_FACTOR},
    estimator::{DrivingLookup, RouteComparison},
    geo::AerialArc,
    location::{Location, PairTicket},
    path::PathGeometry,
    renderer::{MapRenderer, RenderError},
    session::{PairChange, TravelSession},
    viewport::MapViewport,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewSettings {
    pub curve_height_factor: f64,
    pub aerial_path_steps: usize,
    pub timing: AnimationTiming,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            curve_height_factor: CURVE_HEIGHT_FACTOR,
            aerial_path_steps: AERIAL_PATH_STEPS,
            timing: AnimationTiming::default(),
        }
    }
}

/// Keeps the session, the map and the animations in step with the selected pair.
pub struct TravelView<V: MapViewport> {
    session: TravelSession,
    renderer: MapRenderer<V>,
    animator: RouteAnimator,
    settings: ViewSettings,
}

impl<V: MapViewport> TravelView<V> {
    pub fn new(renderer: MapRenderer<V>) -> Self {
        Self::with_settings(renderer, ViewSettings::default())
    }

    pub fn with_settings(renderer: MapRenderer<V>, settings: ViewSettings) -> Self {
        Self {
            session: TravelSession::new(),
            renderer,
            animator: RouteAnimator::new(settings.timing),
            settings,
        }
    }

    /// Returns the ticket the driving lookups for the new pair must carry.
    pub fn on_locations_changed(
        &mut self,
        from: Option<Location>,
        to: Option<Location>,
    ) -> Result<Option<PairTicket>, RenderError> {
        match self.session.set_locations(from, to) {
            PairChange::Unchanged => Ok(None),
            PairChange::Cleared => {
                self.animator.cancel();
                self.renderer.clear_pair()?;
                Ok(None)
            }
            PairChange::Ready(ticket) => {
                self.animator.cancel();

                let pair = ticket.pair();
                let arc = AerialArc::new(
                    pair.from.lng_lat(),
                    pair.to.lng_lat(),
                    self.settings.curve_height_factor,
                );
                let path = arc.sample(self.settings.aerial_path_steps);

                if let Err(err) = self.renderer.show_pair(pair, &path) {
                    self.session.reset();
                    return Err(err);
                }
                self.animator.start(arc);
                Ok(Some(ticket))
            }
        }
    }

    /// Runs the frames due at `timestamp_ms`. Returns whether more frames are wanted.
    pub fn on_frame(&mut self, timestamp_ms: f64) -> Result<bool, RenderError> {
        for update in self.animator.on_frame(timestamp_ms) {
            self.renderer.apply(update)?;
        }
        Ok(!self.animator.is_idle())
    }

    pub fn apply_cab_minutes(&mut self, ticket: &PairTicket, cab_minutes: Option<u32>) -> bool {
        self.session.apply_cab_minutes(ticket, cab_minutes)
    }

    pub fn apply_driving_route(
        &mut self,
        ticket: &PairTicket,
        route: Option<PathGeometry>,
    ) -> Result<bool, RenderError> {
        if !self.session.apply_driving_route(ticket, route) {
            return Ok(false);
        }

        match self.session.driving_path() {
            Some(path) => self.renderer.show_driving_route(path)?,
            None => self.renderer.clear_driving_route()?,
        }
        Ok(true)
    }

    pub fn apply_lookup(
        &mut self,
        ticket: &PairTicket,
        lookup: DrivingLookup,
    ) -> Result<bool, RenderError> {
        let applied = self.apply_cab_minutes(ticket, lookup.cab_minutes);
        Ok(self.apply_driving_route(ticket, lookup.route)? && applied)
    }

    pub fn comparison(&self) -> Option<&RouteComparison> {
        self.session.comparison()
    }

    pub fn session(&self) -> &TravelSession {
        &self.session
    }

    pub fn renderer(&self) -> &MapRenderer<V> {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut MapRenderer<V> {
        &mut self.renderer
    }

    pub fn animator(&self) -> &RouteAnimator {
        &self.animator
    }

    /// Cancels every pending frame, forgets the pair and removes it from the map.
    pub fn teardown(&mut self) -> Result<(), RenderError> {
        self.animator.cancel();
        self.session.reset();
        self.renderer.teardown()
    }

    pub fn unmount(mut self) -> Result<V, RenderError> {
        self.teardown()?;
        debug!("Travel view unmounted");
        Ok(self.renderer.into_viewport())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        animator::{MarkerState, RevealState},
        config::MapConfig,
        renderer::{AERIAL_SOURCE, DRIVING_SOURCE},
        style_viewport::StyleViewport,
        viewport::{SourceSpec, ViewportError},
    };

    fn view() -> TravelView<StyleViewport> {
        let config = MapConfig {
            access_token: Some(String::from("pk.test")),
            ..MapConfig::default()
        };
        let viewport = StyleViewport::with_streets_basemap("mapbox://styles/test", 1280.0, 720.0);
        let mut renderer = MapRenderer::initialize(viewport, &config).unwrap();
        renderer.on_style_load().unwrap();
        TravelView::new(renderer)
    }

    fn mumbai() -> Location {
        Location::new("Mumbai", 19.0760, 72.8777).unwrap()
    }

    fn delhi() -> Location {
        Location::new("Delhi", 28.7041, 77.1025).unwrap()
    }

    #[test]
    fn pair_change_draws_arc_and_starts_animations() {
        let mut view = view();
        let ticket = view
            .on_locations_changed(Some(mumbai()), Some(delhi()))
            .unwrap();

        assert!(ticket.is_some());
        assert_eq!(view.animator().marker_state(), MarkerState::Running);
        assert_eq!(view.animator().reveal_state(), RevealState::Revealing);
        assert_eq!(view.comparison().unwrap().flying_minutes, 277);
        assert!(view.renderer().viewport().has_layer(AERIAL_SOURCE));
    }

    #[test]
    fn reveal_completes_and_marker_keeps_running() {
        let mut view = view();
        view.on_locations_changed(Some(mumbai()), Some(delhi()))
            .unwrap();

        assert!(view.on_frame(0.0).unwrap());
        assert!(view.on_frame(2_500.0).unwrap());
        assert!(view.on_frame(5_000.0).unwrap());

        assert_eq!(view.animator().reveal_state(), RevealState::Complete);
        let layer = view.renderer().viewport().layer(AERIAL_SOURCE).unwrap();
        assert!(layer.paint.get("line-gradient").is_none());
        assert!(layer.paint.get("line-color").is_some());

        assert!(view.on_frame(7_500.0).unwrap());
        assert_eq!(view.animator().marker_state(), MarkerState::Running);
    }

    #[test]
    fn clearing_a_location_stops_animations() {
        let mut view = view();
        view.on_locations_changed(Some(mumbai()), Some(delhi()))
            .unwrap();
        view.on_locations_changed(Some(mumbai()), None).unwrap();

        assert!(view.animator().is_idle());
        assert!(view.comparison().is_none());
        assert!(view.renderer().viewport().markers().is_empty());
        assert!(!view.on_frame(1_000.0).unwrap());
    }

    #[test]
    fn stale_driving_route_is_not_drawn() {
        let mut view = view();
        let stale = view
            .on_locations_changed(Some(mumbai()), Some(delhi()))
            .unwrap()
            .unwrap();
        let pune = Location::new("Pune", 18.5204, 73.8567).unwrap();
        view.on_locations_changed(Some(mumbai()), Some(pune))
            .unwrap();

        let route = PathGeometry::new(vec![mumbai().lng_lat(), delhi().lng_lat()]);
        assert!(!view.apply_driving_route(&stale, Some(route)).unwrap());
        assert_eq!(
            view.renderer().viewport().source_data(DRIVING_SOURCE),
            Some(&crate::path::empty_geojson())
        );
    }

    #[test]
    fn unmount_cancels_frames() {
        let mut view = view();
        view.on_locations_changed(Some(mumbai()), Some(delhi()))
            .unwrap();
        view.on_frame(0.0).unwrap();

        let viewport = view.unmount().unwrap();
        assert!(viewport.markers().is_empty());
        assert!(!viewport.has_layer(AERIAL_SOURCE));
    }

    #[test]
    fn teardown_then_same_pair_draws_again() {
        let mut view = view();
        view.on_locations_changed(Some(mumbai()), Some(delhi()))
            .unwrap();
        view.teardown().unwrap();

        assert!(view.session().pair().is_none());
        assert!(view.comparison().is_none());

        let ticket = view
            .on_locations_changed(Some(mumbai()), Some(delhi()))
            .unwrap();
        assert!(ticket.is_some());
        assert!(view.renderer().viewport().has_layer(AERIAL_SOURCE));
        assert_eq!(view.renderer().viewport().markers().len(), 3);
        assert!(!view.animator().is_idle());
    }

    #[test]
    fn failed_draw_leaves_no_live_pair() {
        let config = MapConfig {
            access_token: Some(String::from("pk.test")),
            ..MapConfig::default()
        };
        let mut viewport = StyleViewport::new("mapbox://styles/test", 1280.0, 720.0);
        viewport
            .add_source(
                AERIAL_SOURCE,
                SourceSpec::Vector {
                    url: String::from("mapbox://mapbox.mapbox-streets-v8"),
                },
            )
            .unwrap();
        let mut view = TravelView::new(MapRenderer::initialize(viewport, &config).unwrap());

        for _ in 0..2 {
            let result = view.on_locations_changed(Some(mumbai()), Some(delhi()));
            assert!(matches!(
                result,
                Err(RenderError::Viewport(ViewportError::NotGeoJson(ref id))) if id == AERIAL_SOURCE
            ));
            assert!(view.session().pair().is_none());
            assert!(view.comparison().is_none());
            assert!(view.animator().is_idle());
        }
    }
}
