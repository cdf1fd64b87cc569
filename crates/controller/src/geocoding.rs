//! Geocoding fallback for locations stored without coordinates.
//!
//! Lookups are asynchronous I/O owned by the host. The controller only plans
//! requests and validates results: a result is applied only while its
//! location still carries the unset sentinel, so a late answer can never
//! overwrite a coordinate that arrived through a newer dataset.

use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;

use catalog::{MapLocation, MarkerKey, StudioCatalog, is_unset};
use foundation::geo::LatLng;
use futures_util::future::join_all;

/// Address → coordinate lookup service.
pub trait Geocoder {
    fn geocode(&self, address: &str) -> impl Future<Output = Option<LatLng>>;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GeocodeRequestId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeocodeRequest {
    pub id: GeocodeRequestId,
    pub key: MarkerKey,
    pub address: String,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GeocodeOutcome {
    pub request: GeocodeRequestId,
    pub result: Option<LatLng>,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum GeocodeApply {
    Applied { key: MarkerKey, coord: LatLng },
    Failed { key: MarkerKey },
    /// Unknown request, or the location no longer needs a coordinate.
    Stale,
}

/// Bookkeeping of in-flight and failed lookups for the session.
///
/// A location is requested at most once at a time, and a failed location is
/// never requested again until [`GeocodeFallback::reset`].
#[derive(Debug, Default)]
pub struct GeocodeFallback {
    next_id: u64,
    pending: BTreeMap<GeocodeRequestId, MarkerKey>,
    in_flight: BTreeSet<MarkerKey>,
    failed: BTreeSet<MarkerKey>,
}

impl GeocodeFallback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_failed(&self, key: MarkerKey) -> bool {
        self.failed.contains(&key)
    }

    /// New requests for unset locations that are neither in flight nor failed.
    ///
    /// A location without any address text cannot be looked up; it is marked
    /// failed immediately.
    pub fn plan(&mut self, locations: &[MapLocation]) -> Vec<GeocodeRequest> {
        let mut out = Vec::new();
        for loc in locations {
            if !is_unset(loc.coord)
                || self.in_flight.contains(&loc.key)
                || self.failed.contains(&loc.key)
            {
                continue;
            }
            let Some(address) = loc.full_address() else {
                self.failed.insert(loc.key);
                continue;
            };

            let id = GeocodeRequestId(self.next_id);
            self.next_id = self.next_id.wrapping_add(1);
            self.pending.insert(id, loc.key);
            self.in_flight.insert(loc.key);
            out.push(GeocodeRequest {
                id,
                key: loc.key,
                address,
            });
        }
        out
    }

    /// Applies a lookup result to `catalog` if it is still wanted.
    pub fn resolve(&mut self, outcome: GeocodeOutcome, catalog: &mut StudioCatalog) -> GeocodeApply {
        let Some(key) = self.pending.remove(&outcome.request) else {
            return GeocodeApply::Stale;
        };
        self.in_flight.remove(&key);

        if !catalog.is_awaiting_coord(key) {
            return GeocodeApply::Stale;
        }

        match outcome.result {
            Some(coord) if !is_unset(coord) && catalog.set_working_coord(key, coord) => {
                GeocodeApply::Applied { key, coord }
            }
            _ => {
                self.failed.insert(key);
                GeocodeApply::Failed { key }
            }
        }
    }

    /// Forgets everything; results of earlier requests become stale.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.in_flight.clear();
        self.failed.clear();
    }
}

/// Runs every request concurrently and collects the outcomes in request order.
pub async fn resolve_all<G: Geocoder>(
    geocoder: &G,
    requests: &[GeocodeRequest],
) -> Vec<GeocodeOutcome> {
    let lookups = requests.iter().map(move |req| async move {
        GeocodeOutcome {
            request: req.id,
            result: geocoder.geocode(&req.address).await,
        }
    });
    join_all(lookups).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::{Location, LocationId, Studio, StudioId};
    use std::collections::HashMap;

    struct TableGeocoder(HashMap<String, LatLng>);

    impl Geocoder for TableGeocoder {
        fn geocode(&self, address: &str) -> impl Future<Output = Option<LatLng>> {
            let hit = self.0.get(address).copied();
            async move { hit }
        }
    }

    fn catalog() -> StudioCatalog {
        StudioCatalog::from_studios(vec![Studio {
            id: StudioId(1),
            name: "Loft".into(),
            rating: 4.0,
            review_count: 0,
            category: Default::default(),
            lat: 55.79,
            lng: 49.12,
            address: None,
            city: Some("Kazan".into()),
            locations: vec![
                Location {
                    id: LocationId(1),
                    lat: 0.0,
                    lng: 0.0,
                    address: Some("Bauman St 17".into()),
                    city: Some("Kazan".into()),
                    is_main: true,
                },
                Location {
                    id: LocationId(2),
                    lat: 55.8,
                    lng: 49.1,
                    address: None,
                    city: None,
                    is_main: false,
                },
            ],
        }])
        .unwrap()
    }

    fn key(location: u64) -> MarkerKey {
        MarkerKey::new(StudioId(1), LocationId(location))
    }

    #[test]
    fn plans_one_request_per_unset_location() {
        let cat = catalog();
        let mut fb = GeocodeFallback::new();
        let reqs = fb.plan(&cat.map_locations());
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].key, key(1));
        assert_eq!(reqs[0].address, "Kazan, Bauman St 17");
        assert!(fb.plan(&cat.map_locations()).is_empty());
    }

    #[test]
    fn success_overrides_the_working_coordinate() {
        let mut cat = catalog();
        let mut fb = GeocodeFallback::new();
        let req = fb.plan(&cat.map_locations()).remove(0);
        let coord = LatLng::new(55.787, 49.122);
        let applied = fb.resolve(
            GeocodeOutcome {
                request: req.id,
                result: Some(coord),
            },
            &mut cat,
        );
        assert_eq!(applied, GeocodeApply::Applied { key: key(1), coord });
        assert_eq!(cat.working_coord(key(1)), Some(coord));
        assert_eq!(fb.pending_len(), 0);
    }

    #[test]
    fn failure_is_never_retried() {
        let mut cat = catalog();
        let mut fb = GeocodeFallback::new();
        let req = fb.plan(&cat.map_locations()).remove(0);
        let outcome = GeocodeOutcome {
            request: req.id,
            result: None,
        };
        assert_eq!(fb.resolve(outcome, &mut cat), GeocodeApply::Failed { key: key(1) });
        assert!(fb.is_failed(key(1)));
        assert!(fb.plan(&cat.map_locations()).is_empty());
        assert_eq!(fb.resolve(outcome, &mut cat), GeocodeApply::Stale);
    }

    #[test]
    fn result_for_an_already_located_point_is_discarded() {
        let mut cat = catalog();
        let mut fb = GeocodeFallback::new();
        let req = fb.plan(&cat.map_locations()).remove(0);
        let corrected = LatLng::new(55.70, 49.20);
        cat.set_working_coord(key(1), corrected);

        let outcome = GeocodeOutcome {
            request: req.id,
            result: Some(LatLng::new(1.0, 1.0)),
        };
        assert_eq!(fb.resolve(outcome, &mut cat), GeocodeApply::Stale);
        assert_eq!(cat.working_coord(key(1)), Some(corrected));
    }

    #[test]
    fn reset_makes_outstanding_results_stale() {
        let mut cat = catalog();
        let mut fb = GeocodeFallback::new();
        let req = fb.plan(&cat.map_locations()).remove(0);
        fb.reset();
        let outcome = GeocodeOutcome {
            request: req.id,
            result: Some(LatLng::new(55.0, 49.0)),
        };
        assert_eq!(fb.resolve(outcome, &mut cat), GeocodeApply::Stale);
        assert!(cat.is_awaiting_coord(key(1)));
    }

    #[test]
    fn location_without_address_fails_immediately() {
        let mut studio = catalog().studios()[0].clone();
        studio.city = None;
        studio.locations[0].address = None;
        studio.locations[0].city = None;
        let cat = StudioCatalog::from_studios(vec![studio]).unwrap();
        let mut fb = GeocodeFallback::new();
        assert!(fb.plan(&cat.map_locations()).is_empty());
        assert!(fb.is_failed(key(1)));
    }

    #[tokio::test]
    async fn resolve_all_keeps_request_order() {
        let mut table = HashMap::new();
        table.insert("Kazan, Bauman St 17".to_string(), LatLng::new(55.787, 49.122));
        let geocoder = TableGeocoder(table);
        let requests = vec![
            GeocodeRequest {
                id: GeocodeRequestId(4),
                key: key(1),
                address: "Kazan, Bauman St 17".into(),
            },
            GeocodeRequest {
                id: GeocodeRequestId(5),
                key: key(2),
                address: "Nowhere".into(),
            },
        ];
        let outcomes = resolve_all(&geocoder, &requests).await;
        assert_eq!(
            outcomes,
            vec![
                GeocodeOutcome {
                    request: GeocodeRequestId(4),
                    result: Some(LatLng::new(55.787, 49.122)),
                },
                GeocodeOutcome {
                    request: GeocodeRequestId(5),
                    result: None,
                },
            ]
        );
    }
}
