//! The map viewport capability: camera, sources and layers, terrain and markers.
//! Modelled after the Mapbox GL style API.

use geojson::GeoJson;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::{location::LngLat, path::LngLatBounds};

#[derive(Debug, Error, PartialEq)]
pub enum ViewportError {
    #[error("Source {0} does not exist")]
    MissingSource(String),
    #[error("Source {0} already exists")]
    DuplicateSource(String),
    #[error("Source {0} does not hold GeoJSON")]
    NotGeoJson(String),
    #[error("Layer {0} does not exist")]
    MissingLayer(String),
    #[error("Layer {0} already exists")]
    DuplicateLayer(String),
    #[error("Marker {0:?} does not exist")]
    MissingMarker(MarkerId),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraOptions {
    pub center: LngLat,
    pub zoom: f64,
    pub pitch: f64,
    pub bearing: f64,
    pub duration_ms: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitBoundsOptions {
    pub padding: f64,
    pub pitch: f64,
    pub duration_ms: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayerType {
    Background,
    Fill,
    FillExtrusion,
    Line,
    Symbol,
    Raster,
    Sky,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: LayerType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub layout: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub paint: Map<String, Value>,
}

impl LayerSpec {
    pub fn new(id: impl Into<String>, kind: LayerType) -> Self {
        Self {
            id: id.into(),
            kind,
            source: None,
            layout: Map::new(),
            paint: Map::new(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_layout(mut self, name: &str, value: Value) -> Self {
        self.layout.insert(name.to_string(), value);
        self
    }

    pub fn with_paint(mut self, name: &str, value: Value) -> Self {
        self.paint.insert(name.to_string(), value);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SourceSpec {
    Geojson {
        data: GeoJson,
        #[serde(rename = "lineMetrics")]
        line_metrics: bool,
    },
    Vector {
        url: String,
    },
    RasterDem {
        url: String,
        #[serde(rename = "tileSize")]
        tile_size: u32,
        maxzoom: u8,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainSpec {
    pub source: String,
    pub exaggeration: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MarkerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    Vehicle,
    Origin,
    Destination,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerSpec {
    pub kind: MarkerKind,
    pub position: LngLat,
    pub rotation: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

pub trait MapViewport {
    fn fly_to(&mut self, camera: CameraOptions);
    fn fit_bounds(&mut self, bounds: LngLatBounds, options: FitBoundsOptions);

    /// Ids and types of the style layers, bottom to top.
    fn layers(&self) -> Vec<(String, LayerType)>;
    fn has_layer(&self, id: &str) -> bool;
    fn add_layer(&mut self, layer: LayerSpec) -> Result<(), ViewportError>;
    fn remove_layer(&mut self, id: &str) -> Result<(), ViewportError>;

    /// A `Value::Null` unsets the property.
    fn set_paint_property(&mut self, layer: &str, name: &str, value: Value)
    -> Result<(), ViewportError>;
    fn set_layout_property(
        &mut self,
        layer: &str,
        name: &str,
        value: Value,
    ) -> Result<(), ViewportError>;

    fn has_source(&self, id: &str) -> bool;
    fn add_source(&mut self, id: &str, source: SourceSpec) -> Result<(), ViewportError>;
    fn set_source_data(&mut self, id: &str, data: GeoJson) -> Result<(), ViewportError>;

    fn set_terrain(&mut self, terrain: Option<TerrainSpec>);

    fn add_marker(&mut self, marker: MarkerSpec) -> MarkerId;
    fn set_marker_position(&mut self, id: MarkerId, position: LngLat) -> Result<(), ViewportError>;
    fn set_marker_rotation(&mut self, id: MarkerId, bearing: f64) -> Result<(), ViewportError>;
    fn remove_marker(&mut self, id: MarkerId) -> Result<(), ViewportError>;
}
