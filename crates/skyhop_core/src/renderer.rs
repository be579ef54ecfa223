use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::{
    animator::FrameUpdate,
    config::MapConfig,
    constants::{
        BASEMAP_DIM_OPACITY, FIT_DURATION_MS, FIT_PADDING_PX, FIT_PITCH_DEG, TERRAIN_EXAGGERATION,
    },
    location::{LngLat, LocationPair},
    path::{LngLatBounds, PathGeometry, empty_geojson},
    viewport::{
        FitBoundsOptions, LayerSpec, LayerType, MapViewport, MarkerId, MarkerKind, MarkerSpec,
        SourceSpec, TerrainSpec, ViewportError,
    },
};

pub const AERIAL_SOURCE: &str = "aerial-route";
pub const DRIVING_SOURCE: &str = "driving-route";
pub const DEM_SOURCE: &str = "mapbox-dem";
pub const SKY_LAYER: &str = "sky";

const DEM_URL: &str = "mapbox://mapbox.mapbox-terrain-dem-v1";
const DEM_TILE_SIZE: u32 = 512;
const DEM_MAX_ZOOM: u8 = 14;

const REVEALED_COLOR: &str = "rgba(56, 189, 248, 1)";
const HIDDEN_COLOR: &str = "rgba(56, 189, 248, 0)";
const DRIVING_COLOR: &str = "#f59e0b";
/// Width of the soft edge between the revealed and hidden parts of the arc.
const REVEAL_EDGE: f64 = 0.001;

const STRIPPED_SYMBOL_KEYWORDS: [&str; 3] = ["label", "place", "poi"];

#[derive(Debug, Error, PartialEq)]
pub enum RenderError {
    #[error("Map tile access token is missing, the map cannot be rendered")]
    MissingTileToken,

    #[error(transparent)]
    Viewport(#[from] ViewportError),
}

/// Owns the viewport. Every map side effect goes through here.
pub struct MapRenderer<V: MapViewport> {
    viewport: V,
    vehicle: Option<MarkerId>,
    endpoints: Vec<MarkerId>,
    style_loaded: bool,
}

impl<V: MapViewport> MapRenderer<V> {
    pub fn initialize(mut viewport: V, config: &MapConfig) -> Result<Self, RenderError> {
        if let Err(err) = config.require_token() {
            error!("Cannot initialize map: {err}");
            return Err(RenderError::MissingTileToken);
        }

        viewport.fly_to(config.default_camera);
        info!("Map initialized with style {}", config.style_url);

        Ok(Self {
            viewport,
            vehicle: None,
            endpoints: Vec::new(),
            style_loaded: false,
        })
    }

    pub fn viewport(&self) -> &V {
        &self.viewport
    }

    pub fn into_viewport(self) -> V {
        self.viewport
    }

    pub fn vehicle(&self) -> Option<MarkerId> {
        self.vehicle
    }

    pub fn is_style_loaded(&self) -> bool {
        self.style_loaded
    }

    /// Restyles the basemap once its style has loaded. Later calls do nothing.
    pub fn on_style_load(&mut self) -> Result<(), RenderError> {
        if self.style_loaded {
            return Ok(());
        }

        let mut stripped = 0;
        for (id, kind) in self.viewport.layers() {
            match kind {
                LayerType::Symbol if is_stripped_symbol(&id) => {
                    self.viewport.remove_layer(&id)?;
                    stripped += 1;
                }
                LayerType::Line if id.starts_with("road") || id.starts_with("bridge") => {
                    self.viewport
                        .set_paint_property(&id, "line-opacity", json!(BASEMAP_DIM_OPACITY))?;
                }
                LayerType::Fill if id.contains("building") => {
                    self.viewport
                        .set_paint_property(&id, "fill-opacity", json!(BASEMAP_DIM_OPACITY))?;
                }
                LayerType::FillExtrusion => {
                    self.viewport.set_paint_property(
                        &id,
                        "fill-extrusion-opacity",
                        json!(BASEMAP_DIM_OPACITY),
                    )?;
                }
                _ => {}
            }
        }
        debug!("Stripped {stripped} symbol layers");

        if !self.viewport.has_source(DEM_SOURCE) {
            self.viewport.add_source(
                DEM_SOURCE,
                SourceSpec::RasterDem {
                    url: String::from(DEM_URL),
                    tile_size: DEM_TILE_SIZE,
                    maxzoom: DEM_MAX_ZOOM,
                },
            )?;
        }
        self.viewport.set_terrain(Some(TerrainSpec {
            source: String::from(DEM_SOURCE),
            exaggeration: TERRAIN_EXAGGERATION,
        }));

        if !self.viewport.has_layer(SKY_LAYER) {
            self.viewport.add_layer(
                LayerSpec::new(SKY_LAYER, LayerType::Sky)
                    .with_paint("sky-type", json!("atmosphere"))
                    .with_paint("sky-atmosphere-sun", json!([0.0, 0.0]))
                    .with_paint("sky-atmosphere-sun-intensity", json!(15)),
            )?;
        }

        self.style_loaded = true;
        info!("Map style loaded, terrain enabled");
        Ok(())
    }

    /// Draws a new pair: endpoint markers, the vehicle at the origin and the
    /// aerial arc with its reveal reset. Any driving route is blanked.
    pub fn show_pair(
        &mut self,
        pair: &LocationPair,
        aerial_path: &PathGeometry,
    ) -> Result<(), RenderError> {
        self.remove_markers()?;

        let origin = pair.from.lng_lat();
        let destination = pair.to.lng_lat();

        self.endpoints.push(self.viewport.add_marker(MarkerSpec {
            kind: MarkerKind::Origin,
            position: origin,
            rotation: 0.0,
            label: Some(pair.from.name().to_string()),
        }));
        self.endpoints.push(self.viewport.add_marker(MarkerSpec {
            kind: MarkerKind::Destination,
            position: destination,
            rotation: 0.0,
            label: Some(pair.to.name().to_string()),
        }));

        // The driving layer sits below the arc.
        self.upsert_route(DRIVING_SOURCE, empty_geojson(), driving_layer)?;
        self.upsert_route(AERIAL_SOURCE, aerial_path.to_geojson(), aerial_layer)?;
        self.viewport
            .set_paint_property(AERIAL_SOURCE, "line-color", Value::Null)?;
        self.set_reveal_progress(0.0)?;
        self.set_route_visibility(true)?;

        self.vehicle = Some(self.viewport.add_marker(MarkerSpec {
            kind: MarkerKind::Vehicle,
            position: origin,
            rotation: 0.0,
            label: None,
        }));

        if let Some(bounds) = LngLatBounds::from_points(&[origin, destination]) {
            self.viewport.fit_bounds(
                bounds,
                FitBoundsOptions {
                    padding: FIT_PADDING_PX,
                    pitch: FIT_PITCH_DEG,
                    duration_ms: FIT_DURATION_MS,
                },
            );
        }

        info!("Showing {} -> {}", pair.from.name(), pair.to.name());
        Ok(())
    }

    /// Removes everything drawn for the current pair.
    pub fn clear_pair(&mut self) -> Result<(), RenderError> {
        self.remove_markers()?;

        for source in [AERIAL_SOURCE, DRIVING_SOURCE] {
            if self.viewport.has_source(source) {
                self.viewport.set_source_data(source, empty_geojson())?;
            }
        }
        self.set_route_visibility(false)
    }

    pub fn show_driving_route(&mut self, path: &PathGeometry) -> Result<(), RenderError> {
        self.upsert_route(DRIVING_SOURCE, path.to_geojson(), driving_layer)?;
        debug!("Driving route drawn with {} points", path.len());
        Ok(())
    }

    pub fn clear_driving_route(&mut self) -> Result<(), RenderError> {
        if self.viewport.has_source(DRIVING_SOURCE) {
            self.viewport.set_source_data(DRIVING_SOURCE, empty_geojson())?;
        }
        Ok(())
    }

    pub fn set_reveal_progress(&mut self, progress: f64) -> Result<(), RenderError> {
        self.viewport
            .set_paint_property(AERIAL_SOURCE, "line-gradient", reveal_gradient(progress))?;
        Ok(())
    }

    /// Swaps the gradient for a solid line.
    pub fn finish_reveal(&mut self) -> Result<(), RenderError> {
        self.viewport
            .set_paint_property(AERIAL_SOURCE, "line-gradient", Value::Null)?;
        self.viewport
            .set_paint_property(AERIAL_SOURCE, "line-color", json!(REVEALED_COLOR))?;
        Ok(())
    }

    pub fn move_vehicle(&mut self, position: LngLat, bearing: f64) -> Result<(), RenderError> {
        let Some(vehicle) = self.vehicle else {
            return Ok(());
        };

        self.viewport.set_marker_position(vehicle, position)?;
        self.viewport.set_marker_rotation(vehicle, bearing)?;
        Ok(())
    }

    pub fn apply(&mut self, update: FrameUpdate) -> Result<(), RenderError> {
        match update {
            FrameUpdate::Vehicle { position, bearing } => self.move_vehicle(position, bearing),
            FrameUpdate::Reveal { progress } => self.set_reveal_progress(progress),
            FrameUpdate::RevealComplete => self.finish_reveal(),
        }
    }

    /// Removes markers and route layers. The basemap styling stays.
    pub fn teardown(&mut self) -> Result<(), RenderError> {
        self.clear_pair()?;

        for layer in [AERIAL_SOURCE, DRIVING_SOURCE] {
            if self.viewport.has_layer(layer) {
                self.viewport.remove_layer(layer)?;
            }
        }
        debug!("Map renderer torn down");
        Ok(())
    }

    fn set_route_visibility(&mut self, visible: bool) -> Result<(), RenderError> {
        let visibility = if visible { "visible" } else { "none" };
        for layer in [AERIAL_SOURCE, DRIVING_SOURCE] {
            if self.viewport.has_layer(layer) {
                self.viewport
                    .set_layout_property(layer, "visibility", json!(visibility))?;
            }
        }
        Ok(())
    }

    fn remove_markers(&mut self) -> Result<(), RenderError> {
        for marker in self.vehicle.take().into_iter().chain(self.endpoints.drain(..)) {
            self.viewport.remove_marker(marker)?;
        }
        Ok(())
    }

    /// Updates the source in place, creating it and its layer when missing.
    fn upsert_route(
        &mut self,
        id: &str,
        data: geojson::GeoJson,
        layer: fn(&str) -> LayerSpec,
    ) -> Result<(), RenderError> {
        if self.viewport.has_source(id) {
            self.viewport.set_source_data(id, data)?;
        } else {
            self.viewport.add_source(
                id,
                SourceSpec::Geojson {
                    data,
                    line_metrics: true,
                },
            )?;
        }

        if !self.viewport.has_layer(id) {
            self.viewport.add_layer(layer(id))?;
        }
        Ok(())
    }
}

fn is_stripped_symbol(id: &str) -> bool {
    STRIPPED_SYMBOL_KEYWORDS
        .iter()
        .any(|keyword| id.contains(keyword))
}

fn aerial_layer(id: &str) -> LayerSpec {
    LayerSpec::new(id, LayerType::Line)
        .with_source(id)
        .with_layout("line-cap", json!("round"))
        .with_layout("line-join", json!("round"))
        .with_paint("line-width", json!(4))
        .with_paint("line-gradient", reveal_gradient(0.0))
}

fn driving_layer(id: &str) -> LayerSpec {
    LayerSpec::new(id, LayerType::Line)
        .with_source(id)
        .with_layout("line-cap", json!("round"))
        .with_layout("line-join", json!("round"))
        .with_paint("line-width", json!(3))
        .with_paint("line-color", json!(DRIVING_COLOR))
        .with_paint("line-dasharray", json!([2, 1]))
}

/// Line gradient showing the arc drawn up to `progress`.
pub fn reveal_gradient(progress: f64) -> Value {
    let progress = if progress.is_nan() { 0.0 } else { progress };

    let stops = if progress <= 0.0 {
        json!([0.0, HIDDEN_COLOR, 1.0, HIDDEN_COLOR])
    } else if progress >= 1.0 {
        json!([0.0, REVEALED_COLOR, 1.0, REVEALED_COLOR])
    } else {
        let edge = (progress + REVEAL_EDGE).min(1.0);
        let mut stops = vec![
            json!(0.0),
            json!(REVEALED_COLOR),
            json!(progress),
            json!(REVEALED_COLOR),
            json!(edge),
            json!(HIDDEN_COLOR),
        ];
        if edge < 1.0 {
            stops.extend([json!(1.0), json!(HIDDEN_COLOR)]);
        }
        Value::Array(stops)
    };

    let mut expression = vec![json!("interpolate"), json!(["linear"]), json!(["line-progress"])];
    if let Value::Array(stops) = stops {
        expression.extend(stops);
    }
    Value::Array(expression)
}
