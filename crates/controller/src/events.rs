use catalog::{LocationId, MarkerKey, Studio, StudioId};
use foundation::geo::LatLng;

use crate::geocoding::{GeocodeRequest, GeocodeRequestId};
use crate::scroll::ListLayout;

/// Everything that can happen to the controller from the outside.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// Pan or zoom ended.
    ViewportChanged,
    MarkerClicked(MarkerKey),
    MarkerHoverEnter(MarkerKey),
    MarkerHoverLeave(MarkerKey),
    /// Click on the map background.
    MapClicked,
    /// The list re-rendered or was scrolled by the user.
    ListLayoutChanged(ListLayout),
    GeocodeResolved {
        request: GeocodeRequestId,
        result: Option<LatLng>,
    },
}

/// Notifications for the surrounding application, drained by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    /// The studios the list should render, in display order.
    DisplayedStudiosChanged(Vec<Studio>),
    /// A marker was clicked; open the expanded card for it.
    MarkerActivated {
        studio: StudioId,
        location: Option<LocationId>,
    },
    /// New list scroll offset for this animation frame.
    ListScrolled { offset: f64 },
    /// Show or hide the map loading indicator.
    LoadingChanged(bool),
    /// The host should run this lookup and report back with
    /// [`MapEvent::GeocodeResolved`].
    GeocodeRequested(GeocodeRequest),
}
