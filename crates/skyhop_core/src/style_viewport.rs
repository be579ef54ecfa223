use std::{collections::BTreeMap, f64::consts::PI};

use geojson::GeoJson;
use serde::Serialize;
use serde_json::{Value, json};

use crate::{
    location::LngLat,
    path::LngLatBounds,
    viewport::{
        CameraOptions, FitBoundsOptions, LayerSpec, LayerType, MapViewport, MarkerId, MarkerSpec,
        SourceSpec, TerrainSpec, ViewportError,
    },
};

const TILE_SIZE_PX: f64 = 512.0;
const MAX_ZOOM: f64 = 22.0;
const MERCATOR_LAT_LIMIT: f64 = 85.0511;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraState {
    pub center: LngLat,
    pub zoom: f64,
    pub pitch: f64,
    pub bearing: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CameraTransition {
    FlyTo(CameraOptions),
    FitBounds {
        bounds: LngLatBounds,
        options: FitBoundsOptions,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedMarker {
    pub id: MarkerId,
    #[serde(flatten)]
    pub spec: MarkerSpec,
}

/// In-memory viewport holding a Mapbox-GL-style document. Camera transitions
/// complete immediately.
#[derive(Debug, Clone, Serialize)]
pub struct StyleViewport {
    version: u8,
    style_url: String,
    width_px: f64,
    height_px: f64,
    camera: CameraState,
    transitions: Vec<CameraTransition>,
    sources: BTreeMap<String, SourceSpec>,
    layers: Vec<LayerSpec>,
    terrain: Option<TerrainSpec>,
    markers: Vec<PlacedMarker>,
    #[serde(skip)]
    next_marker_id: u64,
}

impl StyleViewport {
    pub fn new(style_url: impl Into<String>, width_px: f64, height_px: f64) -> Self {
        Self {
            version: 8,
            style_url: style_url.into(),
            width_px,
            height_px,
            camera: CameraState {
                center: LngLat::new(0.0, 0.0),
                zoom: 0.0,
                pitch: 0.0,
                bearing: 0.0,
            },
            transitions: Vec::new(),
            sources: BTreeMap::new(),
            layers: Vec::new(),
            terrain: None,
            markers: Vec::new(),
            next_marker_id: 0,
        }
    }

    /// Viewport preloaded with the layers of a typical streets basemap.
    pub fn with_streets_basemap(style_url: impl Into<String>, width_px: f64, height_px: f64) -> Self {
        let mut viewport = Self::new(style_url, width_px, height_px);
        viewport.sources.insert(
            String::from("composite"),
            SourceSpec::Vector {
                url: String::from("mapbox://mapbox.mapbox-streets-v8"),
            },
        );
        viewport.layers = streets_basemap_layers();
        viewport
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn transitions(&self) -> &[CameraTransition] {
        &self.transitions
    }

    pub fn source(&self, id: &str) -> Option<&SourceSpec> {
        self.sources.get(id)
    }

    pub fn source_data(&self, id: &str) -> Option<&GeoJson> {
        match self.source(id)? {
            SourceSpec::Geojson { data, .. } => Some(data),
            SourceSpec::Vector { .. } | SourceSpec::RasterDem { .. } => None,
        }
    }

    pub fn layer(&self, id: &str) -> Option<&LayerSpec> {
        self.layers.iter().find(|layer| layer.id == id)
    }

    pub fn terrain(&self) -> Option<&TerrainSpec> {
        self.terrain.as_ref()
    }

    pub fn markers(&self) -> &[PlacedMarker] {
        &self.markers
    }

    pub fn marker(&self, id: MarkerId) -> Option<&MarkerSpec> {
        self.markers
            .iter()
            .find(|marker| marker.id == id)
            .map(|marker| &marker.spec)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    fn layer_mut(&mut self, id: &str) -> Result<&mut LayerSpec, ViewportError> {
        self.layers
            .iter_mut()
            .find(|layer| layer.id == id)
            .ok_or_else(|| ViewportError::MissingLayer(id.to_string()))
    }

    fn marker_mut(&mut self, id: MarkerId) -> Result<&mut MarkerSpec, ViewportError> {
        self.markers
            .iter_mut()
            .find(|marker| marker.id == id)
            .map(|marker| &mut marker.spec)
            .ok_or(ViewportError::MissingMarker(id))
    }

    /// Zoom at which `bounds` fits in the viewport minus `padding` on every side.
    fn zoom_to_fit(&self, bounds: &LngLatBounds, padding: f64) -> f64 {
        let (x1, y1) = mercator(bounds.south_west);
        let (x2, y2) = mercator(bounds.north_east);
        let span_x = (x2 - x1).abs() * TILE_SIZE_PX;
        let span_y = (y2 - y1).abs() * TILE_SIZE_PX;

        let usable_x = (self.width_px - 2.0 * padding).max(1.0);
        let usable_y = (self.height_px - 2.0 * padding).max(1.0);

        let scale = match (span_x > 0.0, span_y > 0.0) {
            (false, false) => return MAX_ZOOM,
            (true, false) => usable_x / span_x,
            (false, true) => usable_y / span_y,
            (true, true) => (usable_x / span_x).min(usable_y / span_y),
        };

        scale.log2().clamp(0.0, MAX_ZOOM)
    }
}

/// Web-mercator world coordinates in [0, 1].
fn mercator(point: LngLat) -> (f64, f64) {
    let lat = point
        .lat
        .clamp(-MERCATOR_LAT_LIMIT, MERCATOR_LAT_LIMIT)
        .to_radians();
    let x = (point.lng + 180.0) / 360.0;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0;
    (x, y)
}

impl MapViewport for StyleViewport {
    fn fly_to(&mut self, camera: CameraOptions) {
        self.camera = CameraState {
            center: camera.center,
            zoom: camera.zoom,
            pitch: camera.pitch,
            bearing: camera.bearing,
        };
        self.transitions.push(CameraTransition::FlyTo(camera));
    }

    fn fit_bounds(&mut self, bounds: LngLatBounds, options: FitBoundsOptions) {
        self.camera = CameraState {
            center: bounds.center(),
            zoom: self.zoom_to_fit(&bounds, options.padding),
            pitch: options.pitch,
            bearing: self.camera.bearing,
        };
        self.transitions
            .push(CameraTransition::FitBounds { bounds, options });
    }

    fn layers(&self) -> Vec<(String, LayerType)> {
        self.layers
            .iter()
            .map(|layer| (layer.id.clone(), layer.kind))
            .collect()
    }

    fn has_layer(&self, id: &str) -> bool {
        self.layer(id).is_some()
    }

    fn add_layer(&mut self, layer: LayerSpec) -> Result<(), ViewportError> {
        if self.has_layer(&layer.id) {
            return Err(ViewportError::DuplicateLayer(layer.id));
        }
        if let Some(source) = &layer.source {
            if !self.has_source(source) {
                return Err(ViewportError::MissingSource(source.clone()));
            }
        }

        self.layers.push(layer);
        Ok(())
    }

    fn remove_layer(&mut self, id: &str) -> Result<(), ViewportError> {
        let before = self.layers.len();
        self.layers.retain(|layer| layer.id != id);

        if self.layers.len() == before {
            return Err(ViewportError::MissingLayer(id.to_string()));
        }
        Ok(())
    }

    fn set_paint_property(
        &mut self,
        layer: &str,
        name: &str,
        value: Value,
    ) -> Result<(), ViewportError> {
        let layer = self.layer_mut(layer)?;
        if value.is_null() {
            layer.paint.remove(name);
        } else {
            layer.paint.insert(name.to_string(), value);
        }
        Ok(())
    }

    fn set_layout_property(
        &mut self,
        layer: &str,
        name: &str,
        value: Value,
    ) -> Result<(), ViewportError> {
        let layer = self.layer_mut(layer)?;
        if value.is_null() {
            layer.layout.remove(name);
        } else {
            layer.layout.insert(name.to_string(), value);
        }
        Ok(())
    }

    fn has_source(&self, id: &str) -> bool {
        self.source(id).is_some()
    }

    fn add_source(&mut self, id: &str, source: SourceSpec) -> Result<(), ViewportError> {
        if self.has_source(id) {
            return Err(ViewportError::DuplicateSource(id.to_string()));
        }

        self.sources.insert(id.to_string(), source);
        Ok(())
    }

    fn set_source_data(&mut self, id: &str, data: GeoJson) -> Result<(), ViewportError> {
        let source = self
            .sources
            .get_mut(id)
            .ok_or_else(|| ViewportError::MissingSource(id.to_string()))?;

        match source {
            SourceSpec::Geojson { data: current, .. } => {
                *current = data;
                Ok(())
            }
            SourceSpec::Vector { .. } | SourceSpec::RasterDem { .. } => {
                Err(ViewportError::NotGeoJson(id.to_string()))
            }
        }
    }

    fn set_terrain(&mut self, terrain: Option<TerrainSpec>) {
        self.terrain = terrain;
    }

    fn add_marker(&mut self, marker: MarkerSpec) -> MarkerId {
        let id = MarkerId(self.next_marker_id);
        self.next_marker_id += 1;
        self.markers.push(PlacedMarker { id, spec: marker });
        id
    }

    fn set_marker_position(&mut self, id: MarkerId, position: LngLat) -> Result<(), ViewportError> {
        self.marker_mut(id)?.position = position;
        Ok(())
    }

    fn set_marker_rotation(&mut self, id: MarkerId, bearing: f64) -> Result<(), ViewportError> {
        self.marker_mut(id)?.rotation = bearing;
        Ok(())
    }

    fn remove_marker(&mut self, id: MarkerId) -> Result<(), ViewportError> {
        let before = self.markers.len();
        self.markers.retain(|marker| marker.id != id);

        if self.markers.len() == before {
            return Err(ViewportError::MissingMarker(id));
        }
        Ok(())
    }
}

fn streets_basemap_layers() -> Vec<LayerSpec> {
    let layer = |id: &str, kind: LayerType| LayerSpec::new(id, kind).with_source("composite");

    vec![
        LayerSpec::new("land", LayerType::Background)
            .with_paint("background-color", json!("#0f172a")),
        layer("water", LayerType::Fill).with_paint("fill-color", json!("#1e293b")),
        layer("landuse", LayerType::Fill),
        layer("road-minor", LayerType::Line),
        layer("road-primary", LayerType::Line),
        layer("road-motorway-trunk", LayerType::Line),
        layer("bridge-primary", LayerType::Line),
        layer("building", LayerType::Fill),
        layer("building-extrusion", LayerType::FillExtrusion),
        layer("road-label", LayerType::Symbol),
        layer("waterway-label", LayerType::Symbol),
        layer("poi-label", LayerType::Symbol),
        layer("transit-label", LayerType::Symbol),
        layer("settlement-minor-label", LayerType::Symbol),
        layer("place-label", LayerType::Symbol),
        layer("country-label", LayerType::Symbol),
        layer("road-number-shield", LayerType::Symbol),
    ]
}
