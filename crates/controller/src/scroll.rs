use catalog::StudioId;
use foundation::time::Millis;
use runtime::tween::Tween;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScrollConfig {
    pub duration_ms: u64,
    pub margin_px: f64,
    pub min_items: usize,
}

/// Vertical extent of one card inside the scrollable list content.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CardExtent {
    pub studio: StudioId,
    pub top: f64,
    pub height: f64,
}

impl CardExtent {
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// The list geometry as last reported by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct ListLayout {
    pub cards: Vec<CardExtent>,
    pub viewport_height: f64,
    pub scroll_offset: f64,
}

impl ListLayout {
    fn max_offset(&self) -> f64 {
        let content = self.cards.iter().map(CardExtent::bottom).fold(0.0, f64::max);
        (content - self.viewport_height).max(0.0)
    }
}

/// Brings the list card of a map-activated studio into view.
///
/// Cards already fully visible are left alone, and short lists (fewer than
/// `min_items` cards) never auto-scroll. The scroll itself is an eased tween
/// advanced by the host's animation frames.
#[derive(Debug, Clone)]
pub struct ListScrollSync {
    config: ScrollConfig,
    layout: Option<ListLayout>,
    animation: Option<Tween>,
}

impl ListScrollSync {
    pub fn new(config: ScrollConfig) -> Self {
        Self {
            config,
            layout: None,
            animation: None,
        }
    }

    pub fn layout(&self) -> Option<&ListLayout> {
        self.layout.as_ref()
    }

    pub fn set_layout(&mut self, layout: ListLayout) {
        self.layout = Some(layout);
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Starts a scroll towards `studio`'s card; returns `true` if one started.
    ///
    /// A running scroll is judged by where it will stop: it is kept if the
    /// card is visible at its end, cancelled if the card is visible right
    /// now, and replaced by a scroll from the current point otherwise.
    pub fn scroll_to(&mut self, studio: StudioId, now: Millis) -> bool {
        let Some(layout) = &self.layout else {
            return false;
        };
        if layout.cards.len() < self.config.min_items {
            return false;
        }
        let Some(card) = layout.cards.iter().find(|c| c.studio == studio).copied() else {
            return false;
        };
        let fits = |offset: f64| {
            card.top >= offset && card.bottom() <= offset + layout.viewport_height
        };

        let (current, resting) = match &self.animation {
            Some(tween) => (tween.sample(now), tween.to),
            None => (layout.scroll_offset, layout.scroll_offset),
        };
        if fits(resting) {
            return false;
        }
        if fits(current) {
            self.animation = None;
            return false;
        }

        let target = if card.top < current {
            card.top - self.config.margin_px
        } else {
            card.bottom() - layout.viewport_height + self.config.margin_px
        };
        let target = target.clamp(0.0, layout.max_offset());
        if target == current {
            self.animation = None;
            return false;
        }

        self.animation = Some(Tween::new(current, target, now, self.config.duration_ms));
        true
    }

    /// Advances the running scroll; returns the offset to apply this frame.
    pub fn on_frame(&mut self, now: Millis) -> Option<f64> {
        let tween = self.animation?;
        let offset = tween.sample(now);
        if tween.is_finished(now) {
            self.animation = None;
        }
        if let Some(layout) = &mut self.layout {
            layout.scroll_offset = offset;
        }
        Some(offset)
    }
}
