use std::collections::{BTreeMap, BTreeSet};

use foundation::geo::LatLng;

use crate::CatalogError;
use crate::key::{MarkerKey, StudioId};
use crate::model::{MapLocation, Studio, is_unset};

/// The working dataset for one browsing session.
///
/// Studios are immutable once loaded; the only session-local mutation is a
/// per-marker coordinate override written by the geocoding fallback. Overrides
/// are never persisted.
///
/// Ordering contract:
/// - `studios()` and `map_locations()` preserve the input order.
#[derive(Debug, Default, Clone)]
pub struct StudioCatalog {
    studios: Vec<Studio>,
    index: BTreeMap<StudioId, usize>,
    overrides: BTreeMap<MarkerKey, LatLng>,
}

impl StudioCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog, rejecting duplicate studio ids, location ids repeated
    /// within one studio (they would share a marker key) and out-of-range
    /// ratings.
    pub fn from_studios(studios: Vec<Studio>) -> Result<Self, CatalogError> {
        let mut index = BTreeMap::new();
        for (pos, studio) in studios.iter().enumerate() {
            if !(0.0..=5.0).contains(&studio.rating) {
                return Err(CatalogError::InvalidRating {
                    studio: studio.id,
                    rating: studio.rating.to_string(),
                });
            }
            if index.insert(studio.id, pos).is_some() {
                return Err(CatalogError::DuplicateStudio(studio.id));
            }
            let mut seen = BTreeSet::new();
            for loc in &studio.locations {
                if !seen.insert(loc.id) {
                    return Err(CatalogError::DuplicateLocation {
                        studio: studio.id,
                        location: loc.id,
                    });
                }
            }
        }
        Ok(Self {
            studios,
            index,
            overrides: BTreeMap::new(),
        })
    }

    /// Parses a JSON array of studios.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let studios: Vec<Studio> =
            serde_json::from_str(json).map_err(|e| CatalogError::Parse(e.to_string()))?;
        Self::from_studios(studios)
    }

    pub fn len(&self) -> usize {
        self.studios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.studios.is_empty()
    }

    pub fn studios(&self) -> &[Studio] {
        &self.studios
    }

    pub fn studio(&self, id: StudioId) -> Option<&Studio> {
        self.index.get(&id).map(|&pos| &self.studios[pos])
    }

    pub fn contains(&self, id: StudioId) -> bool {
        self.index.contains_key(&id)
    }

    /// All renderable locations with their working coordinates.
    pub fn map_locations(&self) -> Vec<MapLocation> {
        self.studios
            .iter()
            .flat_map(|studio| studio.map_locations())
            .map(|loc| self.with_override(loc))
            .collect()
    }

    pub fn map_location(&self, key: MarkerKey) -> Option<MapLocation> {
        let studio = self.studio(key.studio)?;
        studio
            .map_locations()
            .into_iter()
            .find(|loc| loc.key == key)
            .map(|loc| self.with_override(loc))
    }

    /// Current coordinate for `key`: the session override if one exists,
    /// otherwise the stored one.
    pub fn working_coord(&self, key: MarkerKey) -> Option<LatLng> {
        self.map_location(key).map(|loc| loc.coord)
    }

    /// Returns `true` if `key` exists and still carries the unset sentinel.
    pub fn is_awaiting_coord(&self, key: MarkerKey) -> bool {
        self.working_coord(key).is_some_and(is_unset)
    }

    /// Records a session-local coordinate for `key`.
    ///
    /// Returns `false` (and records nothing) if the key is unknown.
    pub fn set_working_coord(&mut self, key: MarkerKey, coord: LatLng) -> bool {
        if self.map_location(key).is_none() {
            return false;
        }
        self.overrides.insert(key, coord);
        true
    }

    fn with_override(&self, mut loc: MapLocation) -> MapLocation {
        if let Some(coord) = self.overrides.get(&loc.key) {
            loc.coord = *coord;
        }
        loc
    }
}
