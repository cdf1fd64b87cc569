use std::collections::BTreeSet;

use catalog::StudioId;

use crate::marker_state::MarkerState;

/// Studios the user has activated during this session.
///
/// The set only grows; the single way to shrink it is [`ViewedSet::reset`],
/// which empties it wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewedSet {
    ids: BTreeSet<StudioId>,
}

impl ViewedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: StudioId) -> bool {
        self.ids.contains(&id)
    }

    /// Returns `true` if the set changed.
    pub fn insert(&mut self, id: StudioId) -> bool {
        self.ids.insert(id)
    }

    pub fn reset(&mut self) {
        self.ids.clear();
    }
}

/// Exclusive selected/hovered ids plus the session's viewed set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    selected: Option<StudioId>,
    hovered: Option<StudioId>,
    viewed: ViewedSet,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<StudioId> {
        self.selected
    }

    pub fn hovered(&self) -> Option<StudioId> {
        self.hovered
    }

    pub fn viewed(&self) -> &ViewedSet {
        &self.viewed
    }

    /// Makes `id` the selected studio.
    ///
    /// The previously selected studio, if different, enters the viewed set
    /// before the new one becomes selected. Clearing the selection counts as
    /// leaving the previous studio too.
    ///
    /// Returns `true` if anything changed.
    pub fn select(&mut self, id: Option<StudioId>) -> bool {
        if self.selected == id {
            return false;
        }
        if let Some(prev) = self.selected {
            self.viewed.insert(prev);
        }
        self.selected = id;
        true
    }

    /// Returns `true` if the hovered id changed.
    pub fn hover(&mut self, id: Option<StudioId>) -> bool {
        if self.hovered == id {
            return false;
        }
        self.hovered = id;
        true
    }

    /// Clears the hover only if `id` is the one currently hovered, so a late
    /// leave event for another marker cannot cancel a newer hover.
    pub fn hover_leave(&mut self, id: StudioId) -> bool {
        if self.hovered == Some(id) {
            self.hovered = None;
            return true;
        }
        false
    }

    /// Drops selected/hovered ids that no longer exist in the dataset.
    pub fn retain_known(&mut self, mut known: impl FnMut(StudioId) -> bool) {
        if self.selected.is_some_and(|id| !known(id)) {
            self.selected = None;
        }
        if self.hovered.is_some_and(|id| !known(id)) {
            self.hovered = None;
        }
    }

    /// "Show all": forget selection, hover and every viewed studio.
    pub fn show_all(&mut self) {
        self.selected = None;
        self.hovered = None;
        self.viewed.reset();
    }

    pub fn marker_state(&self, id: StudioId) -> MarkerState {
        MarkerState {
            selected: self.selected == Some(id),
            hovered: self.hovered == Some(id),
            viewed: self.viewed.contains(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SelectionState;
    use catalog::StudioId;

    const A: StudioId = StudioId(1);
    const B: StudioId = StudioId(2);

    #[test]
    fn selecting_another_studio_marks_previous_viewed() {
        let mut s = SelectionState::new();
        assert!(s.select(Some(A)));
        assert!(!s.viewed().contains(A));
        assert!(s.select(Some(B)));
        assert!(s.viewed().contains(A));
        assert_eq!(s.selected(), Some(B));

        let a = s.marker_state(A);
        let b = s.marker_state(B);
        assert!(!a.selected && a.viewed);
        assert!(b.selected && !b.viewed);
    }

    #[test]
    fn reselecting_same_studio_is_a_no_op() {
        let mut s = SelectionState::new();
        s.select(Some(A));
        assert!(!s.select(Some(A)));
        assert!(s.viewed().is_empty());
    }

    #[test]
    fn hover_never_touches_selection_or_viewed() {
        let mut s = SelectionState::new();
        s.select(Some(A));
        assert!(s.hover(Some(B)));
        assert!(!s.hover_leave(A));
        assert_eq!(s.hovered(), Some(B));
        assert!(s.hover_leave(B));
        assert_eq!(s.hovered(), None);
        assert_eq!(s.selected(), Some(A));
        assert!(s.viewed().is_empty());
    }

    #[test]
    fn viewed_only_grows_until_show_all() {
        let mut s = SelectionState::new();
        let mut sizes = Vec::new();
        for id in [1, 2, 3, 1, 2, 4] {
            s.select(Some(StudioId(id)));
            sizes.push(s.viewed().len());
        }
        s.select(None);
        sizes.push(s.viewed().len());
        assert!(sizes.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(s.viewed().len(), 4);

        s.show_all();
        assert!(s.viewed().is_empty());
        assert_eq!(s.selected(), None);
    }

    #[test]
    fn retain_known_drops_stale_ids() {
        let mut s = SelectionState::new();
        s.select(Some(A));
        s.hover(Some(B));
        s.retain_known(|id| id == B);
        assert_eq!(s.selected(), None);
        assert_eq!(s.hovered(), Some(B));
    }
}
