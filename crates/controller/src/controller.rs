use std::collections::BTreeMap;

use catalog::{CatalogError, MapLocation, MarkerKey, Studio, StudioCatalog, StudioId};
use foundation::time::Millis;
use layers::labels::{LabelCandidate, LabelMemo, LabelRecord, place_labels};
use layers::markers::{active_markers, classify_markers};
use layers::symbology::{LABEL_Z_ACCEPTED, LABEL_Z_HIDDEN, LABEL_Z_HOVERED, marker_appearance};
use runtime::debounce::Debouncer;
use runtime::event_bus::EventBus;
use runtime::metrics::{Metrics, MetricsSnapshot};
use scene::marker_state::{MarkerMutation, MarkerStore, Representation};
use scene::selection::SelectionState;
use scene::visibility::{Viewport, visible_locations};
use tracing::{debug, info, warn};

use crate::config::MapConfig;
use crate::events::{ControllerEvent, MapEvent};
use crate::geocoding::{GeocodeApply, GeocodeFallback, GeocodeOutcome};
use crate::provider::{LabelContent, MapProvider, ProviderProjector};
use crate::scroll::ListScrollSync;

pub const METRIC_RECOMPUTE: &str = "recompute";
pub const METRIC_RECOMPUTE_SKIPPED: &str = "recompute_skipped";
pub const METRIC_VIEWPORT_EVENTS: &str = "viewport_events";
pub const METRIC_MARKERS_PLACED: &str = "markers_placed";
pub const METRIC_MARKERS_REMOVED: &str = "markers_removed";
pub const METRIC_APPEARANCE_WRITES: &str = "appearance_writes";
pub const METRIC_APPEARANCE_SUPPRESSED: &str = "appearance_suppressed";
pub const METRIC_LABEL_PASSES: &str = "label_passes";
pub const METRIC_LABEL_PASSES_SKIPPED: &str = "label_passes_skipped";
pub const METRIC_LABELS_ACCEPTED: &str = "labels_accepted";
pub const METRIC_GEOCODE_REQUESTED: &str = "geocode_requested";
pub const METRIC_GEOCODE_APPLIED: &str = "geocode_applied";
pub const METRIC_GEOCODE_FAILED: &str = "geocode_failed";
pub const METRIC_GEOCODE_STALE: &str = "geocode_stale";
pub const GAUGE_ACTIVE_MARKERS: &str = "active_markers";
pub const GAUGE_VISIBLE_LABELS: &str = "visible_labels";

#[derive(Debug, Copy, Clone, Default)]
struct LoadingState {
    since: Option<Millis>,
    timed_out: bool,
}

/// Owns all per-map state and keeps the provider, the marker store and the
/// studio list consistent.
///
/// Single-threaded and event driven. Time only advances through the `now`
/// arguments:
/// - `handle` consumes one provider/list event;
/// - `tick` fires the viewport debounce and the loading timeout;
/// - `on_animation_frame` advances list scrolling.
///
/// Every full recompute replaces the previous result; nothing is merged.
pub struct MapController<P: MapProvider> {
    provider: P,
    config: MapConfig,
    catalog: StudioCatalog,
    selection: SelectionState,
    markers: MarkerStore,
    representations: BTreeMap<MarkerKey, Representation>,
    labels: BTreeMap<MarkerKey, LabelRecord>,
    label_memo: LabelMemo,
    debounce: Debouncer,
    scroll: ListScrollSync,
    geocoding: GeocodeFallback,
    viewport: Option<Viewport>,
    visible: Vec<MapLocation>,
    in_viewport: Vec<StudioId>,
    focus: Option<Vec<StudioId>>,
    displayed: Vec<StudioId>,
    loading: LoadingState,
    events: EventBus<ControllerEvent>,
    metrics: Metrics,
}

impl<P: MapProvider> MapController<P> {
    pub fn new(provider: P, config: MapConfig) -> Self {
        Self {
            debounce: Debouncer::new(config.debounce_ms),
            scroll: ListScrollSync::new(config.scroll()),
            provider,
            config,
            catalog: StudioCatalog::new(),
            selection: SelectionState::new(),
            markers: MarkerStore::new(),
            representations: BTreeMap::new(),
            labels: BTreeMap::new(),
            label_memo: LabelMemo::new(),
            geocoding: GeocodeFallback::new(),
            viewport: None,
            visible: Vec::new(),
            in_viewport: Vec::new(),
            focus: None,
            displayed: Vec::new(),
            loading: LoadingState::default(),
            events: EventBus::new(),
            metrics: Metrics::new(),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn catalog(&self) -> &StudioCatalog {
        &self.catalog
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn markers(&self) -> &MarkerStore {
        &self.markers
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    pub fn displayed(&self) -> &[StudioId] {
        &self.displayed
    }

    pub fn label(&self, key: MarkerKey) -> Option<&LabelRecord> {
        self.labels.get(&key)
    }

    pub fn label_memo(&self) -> &LabelMemo {
        &self.label_memo
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn drain_events(&mut self) -> Vec<ControllerEvent> {
        self.events.drain()
    }

    /// Replaces the dataset and recomputes immediately.
    pub fn set_studios(&mut self, studios: Vec<Studio>, now: Millis) -> Result<(), CatalogError> {
        let catalog = StudioCatalog::from_studios(studios)?;
        self.set_catalog(catalog, now);
        Ok(())
    }

    pub fn set_catalog(&mut self, catalog: StudioCatalog, now: Millis) {
        info!(studios = catalog.len(), "studio dataset replaced");
        self.catalog = catalog;
        self.geocoding.reset();
        let catalog = &self.catalog;
        self.selection.retain_known(|id| catalog.contains(id));
        if let Some(group) = &mut self.focus {
            group.retain(|id| catalog.contains(*id));
            if group.is_empty() {
                self.focus = None;
            }
        }
        self.debounce.cancel();
        self.recompute(now);
    }

    /// List-side selection.
    pub fn select(&mut self, studio: Option<StudioId>) {
        if studio.is_none() {
            self.focus = None;
        }
        if self.selection.select(studio) {
            self.restyle_markers();
        }
        self.update_displayed();
    }

    /// List-side hover: the studio's whole marker group follows.
    pub fn hover(&mut self, studio: Option<StudioId>) {
        if self.selection.hover(studio) {
            self.on_hover_changed();
        }
    }

    /// Clears selection, hover, co-location focus and the viewed set.
    pub fn show_all(&mut self) {
        self.selection.show_all();
        self.focus = None;
        self.on_hover_changed();
        self.update_displayed();
    }

    pub fn handle(&mut self, event: MapEvent, now: Millis) {
        match event {
            MapEvent::ViewportChanged => {
                self.metrics.inc(METRIC_VIEWPORT_EVENTS);
                self.debounce.arm(now);
            }
            MapEvent::MarkerClicked(key) => self.on_marker_click(key, now),
            MapEvent::MarkerHoverEnter(key) => {
                if self.selection.hover(Some(key.studio)) {
                    self.on_hover_changed();
                }
                self.scroll_list_to(key.studio, now);
            }
            MapEvent::MarkerHoverLeave(key) => {
                if self.selection.hover_leave(key.studio) {
                    self.on_hover_changed();
                }
            }
            MapEvent::MapClicked => self.select(None),
            MapEvent::ListLayoutChanged(layout) => self.scroll.set_layout(layout),
            MapEvent::GeocodeResolved { request, result } => {
                self.on_geocode_resolved(GeocodeOutcome { request, result }, now)
            }
        }
    }

    pub fn tick(&mut self, now: Millis) {
        if self.debounce.poll(now) {
            self.recompute(now);
        }

        if let Some(since) = self.loading.since
            && now.since(since) >= self.config.loading_timeout_ms
        {
            warn!(
                waited_ms = now.since(since),
                "map provider still not ready, hiding loading indicator"
            );
            self.loading = LoadingState {
                since: None,
                timed_out: true,
            };
            self.events.emit(ControllerEvent::LoadingChanged(false));
        }
    }

    pub fn on_animation_frame(&mut self, now: Millis) {
        if let Some(offset) = self.scroll.on_frame(now) {
            self.events.emit(ControllerEvent::ListScrolled { offset });
        }
    }

    /// Full pipeline: visibility → card/dot → labels → marker diff → list.
    pub fn recompute(&mut self, now: Millis) {
        let (Some(bounds), Some(zoom)) = (self.provider.viewport_bounds(), self.provider.zoom())
        else {
            self.metrics.inc(METRIC_RECOMPUTE_SKIPPED);
            debug!("viewport not available yet, keeping previous render");
            self.begin_loading(now);
            return;
        };
        let viewport = Viewport::new(bounds, zoom);
        self.viewport = Some(viewport);

        let (renderable, awaiting): (Vec<MapLocation>, Vec<MapLocation>) = self
            .catalog
            .map_locations()
            .into_iter()
            .partition(MapLocation::has_coord);

        for request in self.geocoding.plan(&awaiting) {
            debug!(key = %request.key, address = %request.address, "requesting geocode");
            self.metrics.inc(METRIC_GEOCODE_REQUESTED);
            self.events.emit(ControllerEvent::GeocodeRequested(request));
        }

        let visible = visible_locations(&renderable, &viewport.bounds);
        let assignment = classify_markers(&visible, viewport.zoom, &self.config.footprint());
        let active = active_markers(&visible, &assignment);
        let cards = assignment
            .values()
            .filter(|r| **r == Representation::Card)
            .count();

        self.visible = visible;
        self.representations = assignment;
        self.refresh_labels();

        let selection = &self.selection;
        let mutations = self
            .markers
            .reconcile(&active, |id| selection.marker_state(id));
        let written = mutations
            .iter()
            .filter(|m| !matches!(m, MarkerMutation::Remove { .. }))
            .count();
        self.metrics.add(
            METRIC_APPEARANCE_SUPPRESSED,
            active.len().saturating_sub(written) as u64,
        );
        self.apply_marker_mutations(mutations);

        self.in_viewport = Vec::new();
        for loc in &self.visible {
            if !self.in_viewport.contains(&loc.studio()) {
                self.in_viewport.push(loc.studio());
            }
        }
        self.update_displayed();

        self.metrics.inc(METRIC_RECOMPUTE);
        self.metrics
            .set_gauge(GAUGE_ACTIVE_MARKERS, self.markers.len() as i64);
        debug!(
            zoom,
            visible = self.visible.len(),
            cards,
            "recomputed map"
        );
        self.end_loading();
    }

    fn on_marker_click(&mut self, key: MarkerKey, now: Millis) {
        let Some(record) = self.markers.get(key).copied() else {
            debug!(%key, "click on a marker outside the active set");
            return;
        };
        let studio = key.studio;

        if self.selection.select(Some(studio)) {
            self.restyle_markers();
        }

        let eps = self.config.colocation_epsilon_deg;
        let mut group = vec![studio];
        for loc in self.catalog.map_locations() {
            if loc.has_coord()
                && loc.coord.approx_eq(record.coord, eps)
                && !group.contains(&loc.studio())
            {
                group.push(loc.studio());
            }
        }
        self.focus = Some(group);
        self.update_displayed();

        self.events.emit(ControllerEvent::MarkerActivated {
            studio,
            location: key.location,
        });
        self.scroll_list_to(studio, now);
    }

    fn on_hover_changed(&mut self) {
        self.restyle_markers();
        self.refresh_labels();
    }

    fn on_geocode_resolved(&mut self, outcome: GeocodeOutcome, now: Millis) {
        match self.geocoding.resolve(outcome, &mut self.catalog) {
            GeocodeApply::Applied { key, coord } => {
                info!(%key, lat = coord.lat, lng = coord.lng, "geocoded location");
                self.metrics.inc(METRIC_GEOCODE_APPLIED);
                self.debounce.arm(now);
            }
            GeocodeApply::Failed { key } => {
                warn!(%key, "geocoding failed, location skipped for this session");
                self.metrics.inc(METRIC_GEOCODE_FAILED);
            }
            GeocodeApply::Stale => {
                debug!(request = outcome.request.0, "discarding stale geocode result");
                self.metrics.inc(METRIC_GEOCODE_STALE);
            }
        }
    }

    fn scroll_list_to(&mut self, studio: StudioId, now: Millis) {
        if self.scroll.scroll_to(studio, now) {
            debug!(%studio, "scrolling list card into view");
        }
    }

    fn restyle_markers(&mut self) {
        let selection = &self.selection;
        let mutations = self.markers.restyle(|id| selection.marker_state(id));
        self.metrics.add(
            METRIC_APPEARANCE_SUPPRESSED,
            self.markers.len().saturating_sub(mutations.len()) as u64,
        );
        self.apply_marker_mutations(mutations);
    }

    fn apply_marker_mutations(&mut self, mutations: Vec<MarkerMutation>) {
        for mutation in mutations {
            match mutation {
                MarkerMutation::Place {
                    key,
                    representation,
                    coord,
                    state,
                } => {
                    let appearance = marker_appearance(state, representation);
                    self.provider
                        .place_marker(key, representation, coord, appearance);
                    self.metrics.inc(METRIC_MARKERS_PLACED);
                }
                MarkerMutation::Restyle { key, state } => {
                    let Some(representation) = self.markers.representation(key) else {
                        continue;
                    };
                    self.provider
                        .set_marker_appearance(key, marker_appearance(state, representation));
                    self.metrics.inc(METRIC_APPEARANCE_WRITES);
                }
                MarkerMutation::Remove { key } => {
                    self.provider.remove_marker(key);
                    self.metrics.inc(METRIC_MARKERS_REMOVED);
                }
            }
        }
    }

    /// Syncs label records with the locations classified as dots, then runs
    /// the declutter pass. A failed projection leaves visibility untouched.
    fn refresh_labels(&mut self) {
        if !self.config.labels_enabled {
            return;
        }
        let Some(viewport) = self.viewport else {
            return;
        };

        let dots: Vec<&MapLocation> = self
            .visible
            .iter()
            .filter(|loc| self.representations.get(&loc.key) == Some(&Representation::Dot))
            .collect();

        let gone: Vec<MarkerKey> = self
            .labels
            .keys()
            .filter(|key| !dots.iter().any(|loc| loc.key == **key))
            .copied()
            .collect();
        for key in gone {
            if let Some(record) = self.labels.remove(&key)
                && record.visible
            {
                self.provider.set_label_visible(key, false);
            }
        }

        let mut candidates = Vec::with_capacity(dots.len());
        for loc in dots {
            let candidate = LabelCandidate::from_location(loc);
            let needs_place = self
                .labels
                .get(&loc.key)
                .is_none_or(|record| record.coord != loc.coord);
            if needs_place {
                let content = LabelContent {
                    text: loc.name.clone(),
                    rating: loc.rating,
                };
                self.provider.place_label(loc.key, loc.coord, &content);
                self.labels.insert(
                    loc.key,
                    LabelRecord {
                        key: loc.key,
                        coord: loc.coord,
                        visible: false,
                        z_index: LABEL_Z_HIDDEN,
                    },
                );
            }
            candidates.push(candidate);
        }

        let placement = place_labels(
            &candidates,
            viewport.zoom,
            self.selection.hovered(),
            &ProviderProjector(&self.provider),
            &self.config.label_layout(),
        );
        let Some(placement) = placement else {
            self.metrics.inc(METRIC_LABEL_PASSES_SKIPPED);
            debug!("projection unavailable, label visibility left unchanged");
            return;
        };

        self.label_memo.replace(&placement);
        let mut shown = 0i64;
        for record in self.labels.values_mut() {
            let visible = placement.is_visible(record.key);
            let z_index = if placement.forced.contains(&record.key) {
                LABEL_Z_HOVERED
            } else if self.label_memo.contains(record.key) {
                LABEL_Z_ACCEPTED
            } else {
                LABEL_Z_HIDDEN
            };
            if record.visible != visible {
                record.visible = visible;
                self.provider.set_label_visible(record.key, visible);
            }
            if record.z_index != z_index {
                record.z_index = z_index;
                self.provider.set_label_z_index(record.key, z_index);
            }
            if visible {
                shown += 1;
            }
        }
        self.metrics.inc(METRIC_LABEL_PASSES);
        self.metrics
            .add(METRIC_LABELS_ACCEPTED, placement.accepted.len() as u64);
        self.metrics.set_gauge(GAUGE_VISIBLE_LABELS, shown);
    }

    fn update_displayed(&mut self) {
        let next = match &self.focus {
            Some(group) => group.clone(),
            None => self.in_viewport.clone(),
        };
        if next == self.displayed {
            return;
        }
        self.displayed = next;
        let studios: Vec<Studio> = self
            .displayed
            .iter()
            .filter_map(|id| self.catalog.studio(*id).cloned())
            .collect();
        self.events
            .emit(ControllerEvent::DisplayedStudiosChanged(studios));
    }

    fn begin_loading(&mut self, now: Millis) {
        if self.loading.since.is_some() || self.loading.timed_out {
            return;
        }
        self.loading.since = Some(now);
        self.events.emit(ControllerEvent::LoadingChanged(true));
    }

    fn end_loading(&mut self) {
        self.loading.timed_out = false;
        if self.loading.since.take().is_some() {
            self.events.emit(ControllerEvent::LoadingChanged(false));
        }
    }
}
