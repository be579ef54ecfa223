use geo::BoundingRect;
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, Value};
use serde::{Deserialize, Serialize};

use crate::location::LngLat;

/// Ordered (lng, lat) points forming a discretized route.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathGeometry {
    points: Vec<LngLat>,
}

impl PathGeometry {
    pub fn new(points: Vec<LngLat>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[LngLat] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&LngLat> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&LngLat> {
        self.points.last()
    }

    pub fn bounds(&self) -> Option<LngLatBounds> {
        LngLatBounds::from_points(&self.points)
    }

    pub fn to_geojson(&self) -> GeoJson {
        let coordinates: Vec<Vec<f64>> = self
            .points
            .iter()
            .map(|point| vec![point.lng, point.lat])
            .collect();

        let feature = Feature {
            bbox: None,
            properties: None,
            foreign_members: None,
            id: None,
            geometry: Some(Geometry::new(Value::LineString(coordinates))),
        };

        GeoJson::FeatureCollection(FeatureCollection {
            bbox: None,
            features: vec![feature],
            foreign_members: None,
        })
    }
}

/// GeoJSON with no features, used to blank a source without removing it.
pub fn empty_geojson() -> GeoJson {
    GeoJson::FeatureCollection(FeatureCollection {
        bbox: None,
        features: vec![],
        foreign_members: None,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLatBounds {
    pub south_west: LngLat,
    pub north_east: LngLat,
}

impl LngLatBounds {
    pub fn from_points(points: &[LngLat]) -> Option<Self> {
        let multi_point: geo_types::MultiPoint = points
            .iter()
            .map(geo_types::Point::<f64>::from)
            .collect();

        multi_point.bounding_rect().map(|rect| LngLatBounds {
            south_west: LngLat::new(rect.min().x, rect.min().y),
            north_east: LngLat::new(rect.max().x, rect.max().y),
        })
    }

    pub fn center(&self) -> LngLat {
        LngLat::new(
            (self.south_west.lng + self.north_east.lng) / 2.0,
            (self.south_west.lat + self.north_east.lat) / 2.0,
        )
    }
}
