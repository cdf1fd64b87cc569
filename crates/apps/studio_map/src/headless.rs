//! Offline collaborators for running a map session without a map engine.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use catalog::MarkerKey;
use controller::{Geocoder, LabelContent, MapProvider};
use foundation::geo::{GeoBounds, LatLng};
use layers::symbology::Appearance;
use scene::marker_state::Representation;
use tracing::debug;

const TILE_SIZE_PX: f64 = 256.0;
const MAX_MERCATOR_LAT: f64 = 85.051_128_78;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RenderedMarker {
    pub kind: Representation,
    pub coord: LatLng,
    pub appearance: Appearance,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedLabel {
    pub text: String,
    pub visible: bool,
    pub z_index: i32,
}

/// Keeps the last written state of every marker and label and logs each
/// write. Projects with Web Mercator at 256 px tiles.
#[derive(Debug, Clone)]
pub struct HeadlessProvider {
    bounds: GeoBounds,
    zoom: f64,
    markers: BTreeMap<MarkerKey, RenderedMarker>,
    labels: BTreeMap<MarkerKey, RenderedLabel>,
    writes: u64,
}

impl HeadlessProvider {
    pub fn new(bounds: GeoBounds, zoom: f64) -> Self {
        Self {
            bounds,
            zoom,
            markers: BTreeMap::new(),
            labels: BTreeMap::new(),
            writes: 0,
        }
    }

    pub fn markers(&self) -> &BTreeMap<MarkerKey, RenderedMarker> {
        &self.markers
    }

    pub fn labels(&self) -> &BTreeMap<MarkerKey, RenderedLabel> {
        &self.labels
    }

    pub fn writes(&self) -> u64 {
        self.writes
    }
}

impl MapProvider for HeadlessProvider {
    fn viewport_bounds(&self) -> Option<GeoBounds> {
        Some(self.bounds)
    }

    fn zoom(&self) -> Option<f64> {
        Some(self.zoom)
    }

    fn to_pixel(&self, coord: LatLng) -> Option<[f64; 2]> {
        if !coord.is_finite() {
            return None;
        }
        let world = TILE_SIZE_PX * 2f64.powf(self.zoom);
        let lat = coord.lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
        let x = (coord.lng + 180.0) / 360.0 * world;
        let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * world;
        Some([x, y])
    }

    fn place_marker(
        &mut self,
        key: MarkerKey,
        kind: Representation,
        coord: LatLng,
        appearance: Appearance,
    ) {
        debug!(%key, ?kind, lat = coord.lat, lng = coord.lng, "place marker");
        self.writes += 1;
        self.markers.insert(
            key,
            RenderedMarker {
                kind,
                coord,
                appearance,
            },
        );
    }

    fn set_marker_appearance(&mut self, key: MarkerKey, appearance: Appearance) {
        debug!(%key, emphasis = ?appearance.emphasis, "restyle marker");
        self.writes += 1;
        if let Some(marker) = self.markers.get_mut(&key) {
            marker.appearance = appearance;
        }
    }

    fn remove_marker(&mut self, key: MarkerKey) {
        debug!(%key, "remove marker");
        self.writes += 1;
        self.markers.remove(&key);
    }

    fn place_label(&mut self, key: MarkerKey, _coord: LatLng, content: &LabelContent) {
        debug!(%key, text = %content.text, "place label");
        self.writes += 1;
        self.labels.insert(
            key,
            RenderedLabel {
                text: content.text.clone(),
                visible: false,
                z_index: 0,
            },
        );
    }

    fn set_label_visible(&mut self, key: MarkerKey, visible: bool) {
        debug!(%key, visible, "label visibility");
        self.writes += 1;
        if let Some(label) = self.labels.get_mut(&key) {
            label.visible = visible;
        }
    }

    fn set_label_z_index(&mut self, key: MarkerKey, z_index: i32) {
        self.writes += 1;
        if let Some(label) = self.labels.get_mut(&key) {
            label.z_index = z_index;
        }
    }
}

/// Answers lookups from a fixed `address -> coordinate` table.
#[derive(Debug, Clone, Default)]
pub struct TableGeocoder {
    table: BTreeMap<String, LatLng>,
}

impl TableGeocoder {
    pub fn new(table: BTreeMap<String, LatLng>) -> Self {
        Self { table }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }
}

impl Geocoder for TableGeocoder {
    fn geocode(&self, address: &str) -> impl Future<Output = Option<LatLng>> {
        let hit = self.table.get(address).copied();
        async move { hit }
    }
}
