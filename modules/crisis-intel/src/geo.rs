//! Radius-to-rectangle approximation used for proximity lookups.
//!
//! Known limitation: the longitude span is `radius / (111 * |lat| / 90)`,
//! a latitude-ratio heuristic rather than the `cos(lat)` scaling of a real
//! projection. It overestimates the span near the equator and underestimates
//! it toward the poles. No exact-distance post-filter is applied, so events in
//! a box corner can lie beyond the requested radius.

use serde::{Deserialize, Serialize};

/// One degree of latitude, everywhere.
pub const KM_PER_DEGREE: f64 = 111.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    /// Rectangle centered on (`lat`, `lng`) that stands in for a `radius_km` circle.
    pub fn around(lat: f64, lng: f64, radius_km: f64) -> Self {
        let lat_delta = lat_delta(radius_km);
        let lng_delta = lng_delta(lat, radius_km);
        Self {
            min_lat: lat - lat_delta,
            max_lat: lat + lat_delta,
            min_lng: lng - lng_delta,
            max_lng: lng + lng_delta,
        }
    }

    /// Inclusive on every edge.
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lng >= self.min_lng && lng <= self.max_lng
    }
}

pub fn lat_delta(radius_km: f64) -> f64 {
    radius_km / KM_PER_DEGREE
}

pub fn lng_delta(lat: f64, radius_km: f64) -> f64 {
    if lat == 0.0 {
        lat_delta(radius_km)
    } else {
        radius_km / (KM_PER_DEGREE * lat.abs() / 90.0)
    }
}
