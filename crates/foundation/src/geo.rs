//! Geographic primitives in WGS84 degrees.

use serde::{Deserialize, Serialize};

/// A geographic point in degrees.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Per-axis closeness test used to group co-located points.
    pub fn approx_eq(&self, other: LatLng, eps_deg: f64) -> bool {
        (self.lat - other.lat).abs() <= eps_deg && (self.lng - other.lng).abs() <= eps_deg
    }
}

/// Geographic bounding box.
///
/// Convention:
/// - Bounds are closed: points exactly on an edge are inside.
/// - No antimeridian wrapping; `min_lng <= max_lng` is expected.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub min_lat: f64,
    pub min_lng: f64,
    pub max_lat: f64,
    pub max_lng: f64,
}

impl GeoBounds {
    pub fn new(min_lat: f64, min_lng: f64, max_lat: f64, max_lng: f64) -> Self {
        Self {
            min_lat,
            min_lng,
            max_lat,
            max_lng,
        }
    }

    /// Builds bounds from two opposite corners in any order.
    pub fn from_corners(a: LatLng, b: LatLng) -> Self {
        Self {
            min_lat: a.lat.min(b.lat),
            min_lng: a.lng.min(b.lng),
            max_lat: a.lat.max(b.lat),
            max_lng: a.lng.max(b.lng),
        }
    }

    pub fn contains(&self, p: LatLng) -> bool {
        p.lat >= self.min_lat && p.lat <= self.max_lat && p.lng >= self.min_lng && p.lng <= self.max_lng
    }
}
