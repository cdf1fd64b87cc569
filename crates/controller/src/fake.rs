//! Recording provider for controller tests.

use catalog::MarkerKey;
use foundation::geo::{GeoBounds, LatLng};
use layers::symbology::Appearance;
use scene::marker_state::Representation;

use crate::provider::{LabelContent, MapProvider};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    PlaceMarker {
        key: MarkerKey,
        kind: Representation,
        coord: LatLng,
        appearance: Appearance,
    },
    SetMarkerAppearance {
        key: MarkerKey,
        appearance: Appearance,
    },
    RemoveMarker(MarkerKey),
    PlaceLabel {
        key: MarkerKey,
        coord: LatLng,
        text: String,
    },
    SetLabelVisible(MarkerKey, bool),
    SetLabelZIndex(MarkerKey, i32),
}

/// Linear projection: `px_per_deg` pixels per degree, origin at the
/// south-west corner of the bounds, y grows southward.
#[derive(Debug, Clone)]
pub struct FakeProvider {
    pub bounds: Option<GeoBounds>,
    pub zoom: Option<f64>,
    pub px_per_deg: f64,
    pub projection_available: bool,
    pub calls: Vec<Call>,
}

impl FakeProvider {
    pub fn new(bounds: GeoBounds, zoom: f64) -> Self {
        Self {
            bounds: Some(bounds),
            zoom: Some(zoom),
            px_per_deg: 10_000.0,
            projection_available: true,
            calls: Vec::new(),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            bounds: None,
            zoom: None,
            px_per_deg: 10_000.0,
            projection_available: false,
            calls: Vec::new(),
        }
    }

    pub fn take_calls(&mut self) -> Vec<Call> {
        std::mem::take(&mut self.calls)
    }

    pub fn last_label_visibility(&self, key: MarkerKey) -> Option<bool> {
        self.calls.iter().rev().find_map(|c| match c {
            Call::SetLabelVisible(k, v) if *k == key => Some(*v),
            _ => None,
        })
    }

    pub fn last_appearance(&self, key: MarkerKey) -> Option<Appearance> {
        self.calls.iter().rev().find_map(|c| match c {
            Call::PlaceMarker { key: k, appearance, .. }
            | Call::SetMarkerAppearance { key: k, appearance }
                if *k == key =>
            {
                Some(*appearance)
            }
            _ => None,
        })
    }
}

impl MapProvider for FakeProvider {
    fn viewport_bounds(&self) -> Option<GeoBounds> {
        self.bounds
    }

    fn zoom(&self) -> Option<f64> {
        self.zoom
    }

    fn to_pixel(&self, coord: LatLng) -> Option<[f64; 2]> {
        if !self.projection_available {
            return None;
        }
        let bounds = self.bounds?;
        Some([
            (coord.lng - bounds.min_lng) * self.px_per_deg,
            (bounds.max_lat - coord.lat) * self.px_per_deg,
        ])
    }

    fn place_marker(
        &mut self,
        key: MarkerKey,
        kind: Representation,
        coord: LatLng,
        appearance: Appearance,
    ) {
        self.calls.push(Call::PlaceMarker {
            key,
            kind,
            coord,
            appearance,
        });
    }

    fn set_marker_appearance(&mut self, key: MarkerKey, appearance: Appearance) {
        self.calls
            .push(Call::SetMarkerAppearance { key, appearance });
    }

    fn remove_marker(&mut self, key: MarkerKey) {
        self.calls.push(Call::RemoveMarker(key));
    }

    fn place_label(&mut self, key: MarkerKey, coord: LatLng, content: &LabelContent) {
        self.calls.push(Call::PlaceLabel {
            key,
            coord,
            text: content.text.clone(),
        });
    }

    fn set_label_visible(&mut self, key: MarkerKey, visible: bool) {
        self.calls.push(Call::SetLabelVisible(key, visible));
    }

    fn set_label_z_index(&mut self, key: MarkerKey, z_index: i32) {
        self.calls.push(Call::SetLabelZIndex(key, z_index));
    }
}
