use catalog::MarkerKey;
use foundation::geo::{GeoBounds, LatLng};
use layers::labels::LabelProjector;
use layers::symbology::Appearance;
use scene::marker_state::Representation;

/// Text shown in a floating label next to a dot marker.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelContent {
    pub text: String,
    pub rating: f64,
}

/// The map engine the controller drives.
///
/// Queries return `None` while the provider is still loading. Writes are
/// treated as a write-only sink: the controller never reads marker or label
/// state back, and every write is idempotent ("set X to Y").
///
/// Placing a marker or label under a key that already exists replaces it.
/// Labels are created hidden.
pub trait MapProvider {
    fn viewport_bounds(&self) -> Option<GeoBounds>;
    fn zoom(&self) -> Option<f64>;
    /// Pixel position at the current zoom, if a projection is available.
    fn to_pixel(&self, coord: LatLng) -> Option<[f64; 2]>;

    fn place_marker(
        &mut self,
        key: MarkerKey,
        kind: Representation,
        coord: LatLng,
        appearance: Appearance,
    );
    fn set_marker_appearance(&mut self, key: MarkerKey, appearance: Appearance);
    fn remove_marker(&mut self, key: MarkerKey);

    fn place_label(&mut self, key: MarkerKey, coord: LatLng, content: &LabelContent);
    fn set_label_visible(&mut self, key: MarkerKey, visible: bool);
    /// Stacking order of a label; providers without z-order can ignore it.
    fn set_label_z_index(&mut self, _key: MarkerKey, _z_index: i32) {}
}

/// Adapts a provider's projection to the label declutter pass.
pub struct ProviderProjector<'a, P: MapProvider>(pub &'a P);

impl<P: MapProvider> LabelProjector for ProviderProjector<'_, P> {
    fn project(&self, coord: LatLng) -> Option<[f64; 2]> {
        self.0.to_pixel(coord)
    }
}
