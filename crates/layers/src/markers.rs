//! Card/Dot classification.
//!
//! Decides which visible locations get a large card marker and which fall
//! back to a dot, without a pixel projection: a card's on-screen size is
//! approximated by a footprint in degrees that halves with every zoom level.

use std::collections::BTreeMap;

use catalog::{MapLocation, MarkerKey};
use foundation::precision::descending_f64;
use scene::marker_state::{ActiveMarker, Representation};

/// Card footprint in degrees at `reference_zoom`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FootprintConfig {
    pub base_lat_deg: f64,
    pub base_lng_deg: f64,
    pub reference_zoom: f64,
}

impl Default for FootprintConfig {
    fn default() -> Self {
        Self {
            base_lat_deg: 0.012,
            base_lng_deg: 0.018,
            reference_zoom: 12.0,
        }
    }
}

impl FootprintConfig {
    /// `[lat, lng]` footprint at `zoom`.
    pub fn footprint_at(&self, zoom: f64) -> [f64; 2] {
        let scale = 2f64.powf(zoom - self.reference_zoom);
        [self.base_lat_deg / scale, self.base_lng_deg / scale]
    }
}

/// Greedy card placement.
///
/// Locations are walked by descending studio rating (input order breaks
/// ties). A location becomes a card if its footprint does not overlap any
/// card accepted before it, otherwise a dot. There is no cap on the number of
/// cards; only overlap throttles them.
///
/// Every input key receives exactly one representation.
pub fn classify_markers(
    visible: &[MapLocation],
    zoom: f64,
    config: &FootprintConfig,
) -> BTreeMap<MarkerKey, Representation> {
    let [foot_lat, foot_lng] = config.footprint_at(zoom);

    let mut order: Vec<&MapLocation> = visible.iter().collect();
    order.sort_by(|a, b| descending_f64(a.rating, b.rating));

    let mut occupied: Vec<[f64; 2]> = Vec::new();
    let mut out = BTreeMap::new();

    for loc in order {
        let center = [loc.coord.lat, loc.coord.lng];
        let blocked = occupied.iter().any(|card| {
            (card[0] - center[0]).abs() < foot_lat && (card[1] - center[1]).abs() < foot_lng
        });

        let representation = if blocked {
            Representation::Dot
        } else {
            occupied.push(center);
            Representation::Card
        };
        out.insert(loc.key, representation);
    }

    out
}

/// Pairs each visible location with its assigned representation, keeping the
/// visible-list order.
pub fn active_markers(
    visible: &[MapLocation],
    assignment: &BTreeMap<MarkerKey, Representation>,
) -> Vec<ActiveMarker> {
    visible
        .iter()
        .filter_map(|loc| {
            assignment.get(&loc.key).map(|&representation| ActiveMarker {
                key: loc.key,
                coord: loc.coord,
                representation,
            })
        })
        .collect()
}
