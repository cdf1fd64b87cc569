use catalog::MapLocation;
use foundation::geo::GeoBounds;

/// Snapshot of the map camera.
///
/// A new `Viewport` is taken on every pan/zoom end; it is never patched in
/// place.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub bounds: GeoBounds,
    pub zoom: f64,
}

impl Viewport {
    pub fn new(bounds: GeoBounds, zoom: f64) -> Self {
        Self { bounds, zoom }
    }
}

/// Locations whose coordinate lies inside `bounds` (edges inclusive).
///
/// Ordering contract:
/// - Output preserves input order, which downstream passes use as the
///   tie-breaker for equal ratings and scores.
pub fn visible_locations(locations: &[MapLocation], bounds: &GeoBounds) -> Vec<MapLocation> {
    locations
        .iter()
        .filter(|loc| bounds.contains(loc.coord))
        .cloned()
        .collect()
}
