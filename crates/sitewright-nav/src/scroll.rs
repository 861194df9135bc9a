//! Table of contents tracking while the page scrolls.

/// Index of the last anchor whose top is at or above `scroll + 1`.
///
/// Anchors are in document order. Returns 0 when none qualifies or there are
/// no anchors.
pub fn active_index(anchor_tops: &[f64], scroll: f64) -> usize {
    anchor_tops
        .iter()
        .position(|&top| scroll + 1.0 < top)
        .unwrap_or(anchor_tops.len())
        .saturating_sub(1)
}

/// Result of a scroll event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollUpdate {
    /// Echo of a programmatic scroll
    Ignored,
    /// Same section as before
    Unchanged(usize),
    /// Active link moved
    Changed { from: usize, to: usize },
}

/// Remembers the active section and the position within it, so a resize
/// can restore the reader's place.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollTracker {
    /// Distance from the active anchor to the viewport top
    offset: f64,
    active: usize,
    /// Target of a programmatic scroll whose event has not arrived yet
    restoring: Option<f64>,
}

impl ScrollTracker {
    pub fn new(anchor_tops: &[f64]) -> Self {
        Self {
            offset: anchor_tops.first().map_or(0.0, |top| -top),
            active: 0,
            restoring: None,
        }
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// False between [`restore_position`](Self::restore_position) and the
    /// scroll event it causes.
    pub fn is_tracking(&self) -> bool {
        self.restoring.is_none()
    }

    /// Record a scroll to `scroll`.
    ///
    /// The first event after a restore is ignored when it lands on the
    /// restored position; any other position is tracked as usual.
    pub fn on_scroll(&mut self, anchor_tops: &[f64], scroll: f64) -> ScrollUpdate {
        if let Some(target) = self.restoring.take() {
            if (scroll - target).abs() < 1.0 {
                return ScrollUpdate::Ignored;
            }
        }

        let index = active_index(anchor_tops, scroll);
        self.offset = match anchor_tops.get(index) {
            Some(top) => scroll - top,
            None => scroll,
        };

        if index == self.active {
            return ScrollUpdate::Unchanged(index);
        }
        let from = std::mem::replace(&mut self.active, index);
        ScrollUpdate::Changed { from, to: index }
    }

    /// Scroll position that keeps the active section in place after the
    /// anchors moved. Tracking pauses until the resulting scroll arrives.
    pub fn restore_position(&mut self, anchor_tops: &[f64]) -> f64 {
        let y = match anchor_tops.get(self.active) {
            Some(top) => top + self.offset,
            None => self.offset,
        };
        self.restoring = Some(y);
        y
    }
}
