use std::collections::{BTreeMap, BTreeSet};

use catalog::{MarkerKey, StudioId};
use foundation::geo::LatLng;

/// Interaction flags of one marker.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct MarkerState {
    pub selected: bool,
    pub hovered: bool,
    pub viewed: bool,
}

/// Which visual a marker shows, by precedence `selected > hovered > viewed`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Emphasis {
    Selected,
    Hovered,
    Viewed,
    Default,
}

impl MarkerState {
    pub fn emphasis(self) -> Emphasis {
        if self.selected {
            Emphasis::Selected
        } else if self.hovered {
            Emphasis::Hovered
        } else if self.viewed {
            Emphasis::Viewed
        } else {
            Emphasis::Default
        }
    }

    pub fn is_active(self) -> bool {
        self.selected || self.hovered
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Representation {
    Card,
    Dot,
}

/// A marker that belongs in the active set for the current viewport.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ActiveMarker {
    pub key: MarkerKey,
    pub coord: LatLng,
    pub representation: Representation,
}

/// A rendering-layer write produced by the state machine.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MarkerMutation {
    /// Create the marker, or replace it when its kind or position changed.
    Place {
        key: MarkerKey,
        representation: Representation,
        coord: LatLng,
        state: MarkerState,
    },
    /// Appearance-only update of an existing marker.
    Restyle { key: MarkerKey, state: MarkerState },
    Remove { key: MarkerKey },
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MarkerRecord {
    pub key: MarkerKey,
    pub representation: Representation,
    pub coord: LatLng,
    /// State at the last write issued for this marker.
    pub state: MarkerState,
}

impl MarkerRecord {
    pub fn studio(&self) -> StudioId {
        self.key.studio
    }
}

/// Last-written state of every marker in the active set.
///
/// The rendering layer is a write-only sink, so this store is the only memory
/// of what is on screen. Every write is gated by a diff against it:
/// - an unchanged `(representation, coord)` never re-places a marker;
/// - an unchanged `(selected, hovered, viewed)` tuple never restyles one.
///
/// A `viewed` flip on an idle marker is a tuple change and does restyle (the
/// color token moves from unvisited to visited).
///
/// Ordering contract:
/// - Removals come first, in ascending key order; then places/restyles in the
///   order of the active list.
#[derive(Debug, Clone, Default)]
pub struct MarkerStore {
    records: BTreeMap<MarkerKey, MarkerRecord>,
}

impl MarkerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, key: MarkerKey) -> Option<&MarkerRecord> {
        self.records.get(&key)
    }

    pub fn representation(&self, key: MarkerKey) -> Option<Representation> {
        self.records.get(&key).map(|r| r.representation)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MarkerRecord> + '_ {
        self.records.values()
    }

    /// All active marker keys of one studio (a studio can have several).
    pub fn keys_of_studio(&self, studio: StudioId) -> Vec<MarkerKey> {
        self.records
            .keys()
            .filter(|k| k.studio == studio)
            .copied()
            .collect()
    }

    /// Replaces the active set wholesale with `active`.
    ///
    /// Markers missing from `active` are removed and forgotten: a marker outside
    /// the viewport has no representation at all.
    pub fn reconcile(
        &mut self,
        active: &[ActiveMarker],
        state_of: impl Fn(StudioId) -> MarkerState,
    ) -> Vec<MarkerMutation> {
        let keep: BTreeSet<MarkerKey> = active.iter().map(|m| m.key).collect();
        let mut out = Vec::new();

        let stale: Vec<MarkerKey> = self
            .records
            .keys()
            .filter(|k| !keep.contains(k))
            .copied()
            .collect();
        for key in stale {
            self.records.remove(&key);
            out.push(MarkerMutation::Remove { key });
        }

        for marker in active {
            let state = state_of(marker.key.studio);
            match self.records.get_mut(&marker.key) {
                Some(record)
                    if record.representation == marker.representation
                        && record.coord == marker.coord =>
                {
                    if record.state != state {
                        record.state = state;
                        out.push(MarkerMutation::Restyle {
                            key: marker.key,
                            state,
                        });
                    }
                }
                _ => {
                    self.records.insert(
                        marker.key,
                        MarkerRecord {
                            key: marker.key,
                            representation: marker.representation,
                            coord: marker.coord,
                            state,
                        },
                    );
                    out.push(MarkerMutation::Place {
                        key: marker.key,
                        representation: marker.representation,
                        coord: marker.coord,
                        state,
                    });
                }
            }
        }

        out
    }

    /// State-only pass over the current active set (hover/select changes).
    pub fn restyle(&mut self, state_of: impl Fn(StudioId) -> MarkerState) -> Vec<MarkerMutation> {
        let mut out = Vec::new();
        for record in self.records.values_mut() {
            let state = state_of(record.key.studio);
            if record.state != state {
                record.state = state;
                out.push(MarkerMutation::Restyle {
                    key: record.key,
                    state,
                });
            }
        }
        out
    }
}
