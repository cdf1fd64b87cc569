use foundation::geo::LatLng;
use serde::{Deserialize, Serialize};

use crate::key::{LocationId, MarkerKey, StudioId};

/// Coordinate stored by the backend when a location was never geocoded.
pub const UNSET_COORD: LatLng = LatLng::new(0.0, 0.0);

/// Returns `true` for the "unset" sentinel (and for non-finite input, which
/// cannot be rendered either).
pub fn is_unset(coord: LatLng) -> bool {
    !coord.is_finite() || (coord.lat == UNSET_COORD.lat && coord.lng == UNSET_COORD.lng)
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Venue,
    Photo,
    Video,
    Music,
    Dance,
    #[default]
    #[serde(other)]
    Other,
}

impl Category {
    pub fn is_venue(self) -> bool {
        self == Category::Venue
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lng: f64,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    /// Display convention only; zero or several mains are tolerated.
    #[serde(default)]
    pub is_main: bool,
}

impl Location {
    pub fn coord(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Studio {
    pub id: StudioId,
    pub name: String,
    /// 0..=5
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lng: f64,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub locations: Vec<Location>,
}

impl Studio {
    pub fn coord(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }

    /// Every renderable location of this studio.
    ///
    /// A studio without listed locations yields exactly one synthetic location
    /// built from its own coordinate and address, so the result is never empty.
    pub fn map_locations(&self) -> Vec<MapLocation> {
        if self.locations.is_empty() {
            return vec![MapLocation {
                key: MarkerKey::synthetic(self.id),
                coord: self.coord(),
                name: self.name.clone(),
                rating: self.rating,
                review_count: self.review_count,
                category: self.category,
                address: self.address.clone(),
                city: self.city.clone(),
                is_main: true,
            }];
        }

        self.locations
            .iter()
            .map(|loc| MapLocation {
                key: MarkerKey::new(self.id, loc.id),
                coord: loc.coord(),
                name: self.name.clone(),
                rating: self.rating,
                review_count: self.review_count,
                category: self.category,
                address: loc.address.clone(),
                city: loc.city.clone().or_else(|| self.city.clone()),
                is_main: loc.is_main,
            })
            .collect()
    }
}

/// A location flattened together with the studio attributes the map needs
/// (rating for card priority, score inputs and text for labels).
#[derive(Debug, Clone, PartialEq)]
pub struct MapLocation {
    pub key: MarkerKey,
    pub coord: LatLng,
    pub name: String,
    pub rating: f64,
    pub review_count: u32,
    pub category: Category,
    pub address: Option<String>,
    pub city: Option<String>,
    pub is_main: bool,
}

impl MapLocation {
    pub fn studio(&self) -> StudioId {
        self.key.studio
    }

    pub fn has_coord(&self) -> bool {
        !is_unset(self.coord)
    }

    /// Best-effort address for geocoding: `"city, address"`, else whichever
    /// part is present.
    pub fn full_address(&self) -> Option<String> {
        let address = non_blank(self.address.as_deref());
        let city = non_blank(self.city.as_deref());
        match (city, address) {
            (Some(city), Some(address)) => Some(format!("{city}, {address}")),
            (None, Some(address)) => Some(address.to_string()),
            (Some(city), None) => Some(city.to_string()),
            (None, None) => None,
        }
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn studio(locations: Vec<Location>) -> Studio {
        Studio {
            id: StudioId(1),
            name: "Loft".into(),
            rating: 4.5,
            review_count: 12,
            category: Category::Photo,
            lat: 55.79,
            lng: 49.12,
            address: Some("Kremlin St 1".into()),
            city: Some("Kazan".into()),
            locations,
        }
    }

    fn location(id: u64, lat: f64, lng: f64) -> Location {
        Location {
            id: LocationId(id),
            lat,
            lng,
            address: None,
            city: None,
            is_main: false,
        }
    }

    #[test]
    fn studio_without_locations_gets_one_synthetic_location() {
        let locs = studio(Vec::new()).map_locations();
        assert_eq!(locs.len(), 1);
        assert_eq!(locs[0].key, MarkerKey::synthetic(StudioId(1)));
        assert_eq!(locs[0].coord, LatLng::new(55.79, 49.12));
        assert!(locs[0].is_main);
        assert_eq!(locs[0].full_address().as_deref(), Some("Kazan, Kremlin St 1"));
    }

    #[test]
    fn listed_locations_inherit_studio_attributes() {
        let locs = studio(vec![location(10, 55.0, 49.0), location(11, 56.0, 50.0)]).map_locations();
        let keys: Vec<String> = locs.iter().map(|l| l.key.to_string()).collect();
        assert_eq!(keys, vec!["1-10", "1-11"]);
        assert_eq!(locs[1].rating, 4.5);
        assert_eq!(locs[1].city.as_deref(), Some("Kazan"));
    }

    #[test]
    fn full_address_prefers_city_then_address() {
        let mut loc = studio(Vec::new()).map_locations().remove(0);
        loc.city = Some("Kazan".into());
        loc.address = Some("Bauman St 17".into());
        assert_eq!(loc.full_address().as_deref(), Some("Kazan, Bauman St 17"));

        loc.city = Some("  ".into());
        assert_eq!(loc.full_address().as_deref(), Some("Bauman St 17"));

        loc.city = Some("Kazan".into());
        loc.address = None;
        assert_eq!(loc.full_address().as_deref(), Some("Kazan"));

        loc.city = None;
        assert_eq!(loc.full_address(), None);
    }

    #[test]
    fn sentinel_and_non_finite_coords_are_unset() {
        assert!(is_unset(UNSET_COORD));
        assert!(is_unset(LatLng::new(f64::NAN, 10.0)));
        assert!(!is_unset(LatLng::new(0.0, 10.0)));
    }

    #[test]
    fn unknown_category_falls_back_to_other() {
        let c: Category = serde_json::from_str("\"karaoke\"").unwrap();
        assert_eq!(c, Category::Other);
        let v: Category = serde_json::from_str("\"venue\"").unwrap();
        assert!(v.is_venue());
    }
}
