use std::collections::BTreeSet;

use catalog::{Category, MapLocation, MarkerKey, StudioId};
use foundation::bounds::Aabb2;
use foundation::geo::LatLng;
use foundation::precision::descending_f64;
use runtime::budget::Budget;

/// Zoom thresholds (exclusive upper bound) and the label budget below each.
/// At or above the last threshold labels are unlimited.
const LABEL_BUDGET_TIERS: [(f64, u32); 4] = [(11.0, 5), (12.0, 10), (13.0, 20), (14.0, 40)];

const VENUE_BONUS: f64 = 100.0;
const REVIEW_SCORE_CAP: f64 = 50.0;

/// Geographic → pixel projection at the current zoom.
///
/// Returns `None` while the provider has no projection (still loading).
pub trait LabelProjector {
    fn project(&self, coord: LatLng) -> Option<[f64; 2]>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelCandidate {
    pub key: MarkerKey,
    pub coord: LatLng,
    pub rating: f64,
    pub review_count: u32,
    pub category: Category,
}

impl LabelCandidate {
    pub fn from_location(loc: &MapLocation) -> Self {
        Self {
            key: loc.key,
            coord: loc.coord,
            rating: loc.rating,
            review_count: loc.review_count,
            category: loc.category,
        }
    }

    pub fn studio(&self) -> StudioId {
        self.key.studio
    }

    /// `rating + min(reviews / 10, 50) + 100 for venues`.
    pub fn score(&self) -> f64 {
        let reviews = (f64::from(self.review_count) / 10.0).min(REVIEW_SCORE_CAP);
        let bonus = if self.category.is_venue() {
            VENUE_BONUS
        } else {
            0.0
        };
        self.rating + reviews + bonus
    }
}

pub fn label_budget(zoom: f64) -> Budget {
    LABEL_BUDGET_TIERS
        .iter()
        .find(|(below, _)| zoom < *below)
        .map(|(_, slots)| Budget::new(*slots))
        .unwrap_or_else(Budget::unlimited)
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LabelLayoutConfig {
    /// Full label box, width × height.
    pub label_size_px: [f64; 2],
    /// Extra clearance required between accepted labels on both axes.
    pub min_distance_px: f64,
}

impl Default for LabelLayoutConfig {
    fn default() -> Self {
        Self {
            label_size_px: [120.0, 24.0],
            min_distance_px: 8.0,
        }
    }
}

impl LabelLayoutConfig {
    fn collision_box(&self, center: [f64; 2]) -> Aabb2 {
        Aabb2::from_center(
            center,
            [
                self.label_size_px[0] + self.min_distance_px,
                self.label_size_px[1] + self.min_distance_px,
            ],
        )
    }
}

/// Outcome of one declutter pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelPlacement {
    /// Accepted labels in score order.
    pub accepted: Vec<MarkerKey>,
    /// Labels of the hovered studio; always shown, outside the budget.
    pub forced: Vec<MarkerKey>,
}

impl LabelPlacement {
    pub fn is_visible(&self, key: MarkerKey) -> bool {
        self.forced.contains(&key) || self.accepted.contains(&key)
    }
}

/// Greedy, score-ordered label declutter.
///
/// - Hovered-studio labels are forced visible and take no part in the
///   overlap bookkeeping: they neither consume budget nor block others.
/// - Other candidates are accepted in descending score (input order breaks
///   ties) while their collision box clears every accepted box and the zoom
///   budget has slots left.
/// - Returns `None` if any candidate cannot be projected; the caller must keep
///   its previous visibility untouched in that case.
pub fn place_labels<P: LabelProjector>(
    candidates: &[LabelCandidate],
    zoom: f64,
    hovered: Option<StudioId>,
    projector: &P,
    config: &LabelLayoutConfig,
) -> Option<LabelPlacement> {
    let mut forced = Vec::new();
    let mut ranked: Vec<(&LabelCandidate, f64, [f64; 2])> = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        if Some(candidate.studio()) == hovered {
            forced.push(candidate.key);
            continue;
        }
        let screen = projector.project(candidate.coord)?;
        if !screen[0].is_finite() || !screen[1].is_finite() {
            return None;
        }
        ranked.push((candidate, candidate.score(), screen));
    }

    ranked.sort_by(|a, b| descending_f64(a.1, b.1));

    let mut budget = label_budget(zoom);
    let mut placed: Vec<Aabb2> = Vec::new();
    let mut accepted = Vec::new();

    for (candidate, _score, screen) in ranked {
        if budget.is_exhausted() {
            break;
        }
        let bbox = config.collision_box(screen);
        if placed.iter().any(|other| other.overlaps(&bbox)) {
            continue;
        }
        if budget.try_consume() {
            placed.push(bbox);
            accepted.push(candidate.key);
        }
    }

    Some(LabelPlacement { accepted, forced })
}

/// Last state written for one dot marker's label.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LabelRecord {
    pub key: MarkerKey,
    pub coord: LatLng,
    pub visible: bool,
    pub z_index: i32,
}

/// The labels accepted by the most recent pass.
///
/// Rebuilt from scratch on every pass; it never accumulates across passes and
/// only drives z-order, never visibility.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelMemo {
    keys: BTreeSet<MarkerKey>,
}

impl LabelMemo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, placement: &LabelPlacement) {
        self.keys.clear();
        self.keys.extend(placement.accepted.iter().copied());
    }

    pub fn contains(&self, key: MarkerKey) -> bool {
        self.keys.contains(&key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Maps lng/lat straight to x/y pixels.
    struct IdentityProjector;

    impl LabelProjector for IdentityProjector {
        fn project(&self, coord: LatLng) -> Option<[f64; 2]> {
            Some([coord.lng, coord.lat])
        }
    }

    struct BrokenProjector {
        calls: Cell<usize>,
    }

    impl LabelProjector for BrokenProjector {
        fn project(&self, _coord: LatLng) -> Option<[f64; 2]> {
            self.calls.set(self.calls.get() + 1);
            None
        }
    }

    fn candidate(id: u64, rating: f64, reviews: u32, x: f64, y: f64) -> LabelCandidate {
        LabelCandidate {
            key: MarkerKey::synthetic(StudioId(id)),
            coord: LatLng::new(y, x),
            rating,
            review_count: reviews,
            category: Category::Other,
        }
    }

    fn ids(keys: &[MarkerKey]) -> Vec<u64> {
        keys.iter().map(|k| k.studio.0).collect()
    }

    #[test]
    fn score_combines_rating_reviews_and_venue_bonus() {
        let mut c = candidate(1, 4.5, 120, 0.0, 0.0);
        assert_eq!(c.score(), 16.5);
        c.review_count = 10_000;
        assert_eq!(c.score(), 54.5);
        c.category = Category::Venue;
        assert_eq!(c.score(), 154.5);
    }

    #[test]
    fn budget_tiers_follow_zoom() {
        assert_eq!(label_budget(3.0).remaining(), Some(5));
        assert_eq!(label_budget(10.99).remaining(), Some(5));
        assert_eq!(label_budget(11.0).remaining(), Some(10));
        assert_eq!(label_budget(12.5).remaining(), Some(20));
        assert_eq!(label_budget(13.0).remaining(), Some(40));
        assert_eq!(label_budget(14.0).remaining(), None);
        assert_eq!(label_budget(18.0).remaining(), None);
    }

    #[test]
    fn budget_keeps_top_scores_when_nothing_overlaps() {
        // Scores 120, 110, 90, 80, 70, 60, 50, 40 via review counts (rating 0).
        let scores = [40u32, 120, 60, 110, 50, 90, 80, 70];
        let candidates: Vec<LabelCandidate> = scores
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let mut c = candidate(i as u64, 0.0, 0, i as f64 * 1_000.0, 0.0);
                if *s > 50 {
                    c.category = Category::Venue;
                    c.rating = f64::from(*s) - 100.0;
                } else {
                    c.review_count = s * 10;
                }
                c
            })
            .collect();
        let got: Vec<f64> = candidates.iter().map(|c| c.score()).collect();
        assert_eq!(got, vec![40.0, 120.0, 60.0, 110.0, 50.0, 90.0, 80.0, 70.0]);

        let placement = place_labels(
            &candidates,
            10.0,
            None,
            &IdentityProjector,
            &LabelLayoutConfig::default(),
        )
        .unwrap();
        assert_eq!(ids(&placement.accepted), vec![1, 3, 5, 6, 7]);
        assert!(placement.forced.is_empty());
    }

    #[test]
    fn overlapping_lower_score_is_rejected() {
        let candidates = vec![
            candidate(1, 1.0, 0, 100.0, 100.0),
            candidate(2, 5.0, 0, 150.0, 110.0),
            candidate(3, 3.0, 0, 400.0, 100.0),
        ];
        let placement = place_labels(
            &candidates,
            15.0,
            None,
            &IdentityProjector,
            &LabelLayoutConfig::default(),
        )
        .unwrap();
        assert_eq!(ids(&placement.accepted), vec![2, 3]);
    }

    #[test]
    fn margin_counts_towards_overlap() {
        let cfg = LabelLayoutConfig::default();
        // 124 px apart horizontally: clear of the 120 px box, inside the 128 px clearance.
        let near = vec![candidate(1, 5.0, 0, 0.0, 0.0), candidate(2, 4.0, 0, 124.0, 0.0)];
        let placement = place_labels(&near, 15.0, None, &IdentityProjector, &cfg).unwrap();
        assert_eq!(ids(&placement.accepted), vec![1]);

        let far = vec![candidate(1, 5.0, 0, 0.0, 0.0), candidate(2, 4.0, 0, 128.0, 0.0)];
        let placement = place_labels(&far, 15.0, None, &IdentityProjector, &cfg).unwrap();
        assert_eq!(ids(&placement.accepted), vec![1, 2]);
    }

    #[test]
    fn hovered_label_is_forced_and_blocks_nothing() {
        let candidates = vec![
            candidate(1, 5.0, 0, 0.0, 0.0),
            candidate(2, 1.0, 0, 10.0, 0.0),
        ];
        let placement = place_labels(
            &candidates,
            15.0,
            Some(StudioId(1)),
            &IdentityProjector,
            &LabelLayoutConfig::default(),
        )
        .unwrap();
        assert_eq!(ids(&placement.forced), vec![1]);
        assert_eq!(ids(&placement.accepted), vec![2]);
        assert!(placement.is_visible(MarkerKey::synthetic(StudioId(1))));
        assert!(placement.is_visible(MarkerKey::synthetic(StudioId(2))));
        assert!(!placement.is_visible(MarkerKey::synthetic(StudioId(3))));
    }

    #[test]
    fn hovered_label_does_not_consume_budget() {
        let candidates: Vec<LabelCandidate> = (0..7)
            .map(|i| candidate(i, 5.0 - i as f64 * 0.1, 0, i as f64 * 500.0, 0.0))
            .collect();
        let placement = place_labels(
            &candidates,
            10.0,
            Some(StudioId(0)),
            &IdentityProjector,
            &LabelLayoutConfig::default(),
        )
        .unwrap();
        assert_eq!(placement.accepted.len(), 5);
        assert_eq!(ids(&placement.forced), vec![0]);
        assert!(!placement.accepted.contains(&MarkerKey::synthetic(StudioId(0))));
    }

    #[test]
    fn missing_projection_skips_the_whole_pass() {
        let candidates = vec![candidate(1, 5.0, 0, 0.0, 0.0)];
        let projector = BrokenProjector { calls: Cell::new(0) };
        let placement = place_labels(
            &candidates,
            12.0,
            None,
            &projector,
            &LabelLayoutConfig::default(),
        );
        assert_eq!(placement, None);
        assert_eq!(projector.calls.get(), 1);
    }

    #[test]
    fn accepted_boxes_never_overlap_and_budget_holds() {
        let cfg = LabelLayoutConfig::default();
        let candidates: Vec<LabelCandidate> = (0..200)
            .map(|i| {
                let f = i as f64;
                candidate(i, (f * 0.7) % 5.0, i as u32 * 3, (f * 37.0) % 900.0, (f * 53.0) % 700.0)
            })
            .collect();
        for zoom in [9.0, 11.5, 12.5, 13.5, 16.0] {
            let placement =
                place_labels(&candidates, zoom, None, &IdentityProjector, &cfg).unwrap();
            if let Some(limit) = label_budget(zoom).remaining() {
                assert!(placement.accepted.len() <= limit as usize);
            }
            let boxes: Vec<Aabb2> = placement
                .accepted
                .iter()
                .map(|k| {
                    let c = &candidates[k.studio.0 as usize];
                    cfg.collision_box([c.coord.lng, c.coord.lat])
                })
                .collect();
            for (i, a) in boxes.iter().enumerate() {
                for b in &boxes[i + 1..] {
                    assert!(!a.overlaps(b));
                }
            }
        }
    }

    #[test]
    fn memo_is_replaced_not_merged() {
        let mut memo = LabelMemo::new();
        let first = LabelPlacement {
            accepted: vec![MarkerKey::synthetic(StudioId(1)), MarkerKey::synthetic(StudioId(2))],
            forced: Vec::new(),
        };
        memo.replace(&first);
        assert_eq!(memo.len(), 2);

        let second = LabelPlacement {
            accepted: vec![MarkerKey::synthetic(StudioId(3))],
            forced: vec![MarkerKey::synthetic(StudioId(1))],
        };
        memo.replace(&second);
        assert_eq!(memo.len(), 1);
        assert!(memo.contains(MarkerKey::synthetic(StudioId(3))));
        assert!(!memo.contains(MarkerKey::synthetic(StudioId(1))));
    }
}
