//! Great-circle distance, the curved aerial arc and bearings.
//!
//! The drawn aerial polyline and the moving vehicle marker both come from
//! [`AerialArc`], so the marker always sits exactly on the drawn curve.

use geo::{Bearing, Distance, HaversineMeasure, Point};

use crate::{
    constants::{BEARING_LOOKAHEAD, EARTH_RADIUS_KM},
    location::{LngLat, Location},
    path::PathGeometry,
};

fn haversine() -> HaversineMeasure {
    HaversineMeasure::new(EARTH_RADIUS_KM * 1_000.0)
}

/// Haversine distance in kilometers, rounded to the nearest kilometer.
pub fn haversine_distance_km(a: &Location, b: &Location) -> u32 {
    let (a, b): (Point, Point) = (a.into(), b.into());
    (haversine().distance(a, b) / 1_000.0).round() as u32
}

/// Initial bearing from `p1` towards `p2`, in degrees clockwise from north, in [0, 360).
pub fn bearing_degrees(p1: LngLat, p2: LngLat) -> f64 {
    let (p1, p2): (Point, Point) = ((&p1).into(), (&p2).into());
    let bearing = haversine().bearing(p1, p2);
    if bearing >= 360.0 { 0.0 } else { bearing }
}

/// Parametric position used to orient the marker, never past the end of the arc.
pub fn lookahead_t(t: f64) -> f64 {
    (t + BEARING_LOOKAHEAD).min(1.0)
}

/// Point on the quadratic Bézier arc between `a` and `b` at `t`.
pub fn bezier_point(a: &Location, b: &Location, curve_height_factor: f64, t: f64) -> LngLat {
    AerialArc::new(a.lng_lat(), b.lng_lat(), curve_height_factor).point_at(t)
}

/// Sample the arc between `a` and `b` at `steps` equal intervals (`steps + 1` points).
pub fn bezier_path(a: &Location, b: &Location, curve_height_factor: f64, steps: usize) -> PathGeometry {
    AerialArc::new(a.lng_lat(), b.lng_lat(), curve_height_factor).sample(steps)
}

/// Quadratic Bézier arc bulging north of the straight line between its endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AerialArc {
    start: LngLat,
    control: LngLat,
    end: LngLat,
}

impl AerialArc {
    pub fn new(start: LngLat, end: LngLat, curve_height_factor: f64) -> Self {
        let delta_lng = end.lng - start.lng;
        let delta_lat = end.lat - start.lat;
        let planar_distance = (delta_lng * delta_lng + delta_lat * delta_lat).sqrt();

        let control = LngLat::new(
            (start.lng + end.lng) / 2.0,
            (start.lat + end.lat) / 2.0 + planar_distance * curve_height_factor,
        );

        Self {
            start,
            control,
            end,
        }
    }

    pub fn start(&self) -> LngLat {
        self.start
    }

    pub fn control(&self) -> LngLat {
        self.control
    }

    pub fn end(&self) -> LngLat {
        self.end
    }

    pub fn point_at(&self, t: f64) -> LngLat {
        if t.is_nan() || t <= 0.0 || self.start == self.end {
            return self.start;
        }
        if t >= 1.0 {
            return self.end;
        }

        let u = 1.0 - t;
        let w_start = u * u;
        let w_control = 2.0 * u * t;
        let w_end = t * t;

        LngLat::new(
            w_start * self.start.lng + w_control * self.control.lng + w_end * self.end.lng,
            w_start * self.start.lat + w_control * self.control.lat + w_end * self.end.lat,
        )
    }

    /// Heading of travel at `t`, measured towards a point slightly further along the arc.
    pub fn heading_at(&self, t: f64) -> f64 {
        bearing_degrees(self.point_at(t), self.point_at(lookahead_t(t)))
    }

    pub fn sample(&self, steps: usize) -> PathGeometry {
        let steps = steps.max(1);
        let points = (0..=steps)
            .map(|step| self.point_at(step as f64 / steps as f64))
            .collect();

        PathGeometry::new(points)
    }
}
