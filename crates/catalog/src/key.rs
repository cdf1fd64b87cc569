use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudioId(pub u64);

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationId(pub u64);

impl fmt::Display for StudioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Composite identity of one map marker: a studio plus one of its locations.
///
/// `location` is `None` for the synthetic location of a studio that lists no
/// locations of its own.
///
/// Ordering contract:
/// - Keys order by studio id, then the synthetic location, then location id.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerKey {
    pub studio: StudioId,
    pub location: Option<LocationId>,
}

impl MarkerKey {
    pub fn new(studio: StudioId, location: LocationId) -> Self {
        Self {
            studio,
            location: Some(location),
        }
    }

    pub fn synthetic(studio: StudioId) -> Self {
        Self {
            studio,
            location: None,
        }
    }
}

impl fmt::Display for MarkerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(location) => write!(f, "{}-{}", self.studio, location),
            None => write!(f, "{}-main", self.studio),
        }
    }
}
