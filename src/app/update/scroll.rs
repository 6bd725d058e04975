use super::super::messages::Command;
use super::super::state::Reader;
use crate::geometry::ChunkUnit;
use std::time::Instant;
use tracing::trace;

fn sanitize(value: f64) -> f64 {
    if value.is_finite() { value.max(0.0) } else { 0.0 }
}

impl Reader {
    pub(super) fn handle_scrolled(&mut self, scroll_top: f64, viewport_height: f64, now: Instant) {
        self.viewport.scroll_top = sanitize(scroll_top);
        self.viewport.viewport_height = sanitize(viewport_height);
        let caused = self.scroll.record_scroll(
            self.viewport.scroll_top,
            now,
            self.config.scroll_settle(),
        );
        trace!(scroll_top = self.viewport.scroll_top, caused, "Scroll reported");
    }

    pub(super) fn handle_resized(&mut self, viewport_width: f64, viewport_height: f64) {
        self.viewport.viewport_width = sanitize(viewport_width);
        self.viewport.viewport_height = sanitize(viewport_height);
    }

    /// Scroll offset that puts `unit` at the configured fraction of the
    /// viewport, kept within the scrollable range.
    pub(in crate::app) fn follow_target(&self, unit: &ChunkUnit) -> f64 {
        let fraction = self.config.follow_fraction.clamp(0.0, 1.0);
        let top = unit.y - self.viewport.viewport_height * fraction;
        top.min(self.viewport.max_scroll_top()).max(0.0)
    }

    /// Smooth-scroll to the active unit and flag the resulting scroll
    /// reports as reader-caused. Nothing is requested when the unit is
    /// already in place.
    pub(super) fn follow_current(&mut self, now: Instant) -> Option<Command> {
        if !self.config.auto_scroll {
            return None;
        }
        let top = self.follow_target(self.current_unit()?);
        let from = self.viewport.scroll_top;
        if (top - from).abs() < f64::EPSILON {
            return None;
        }
        self.scroll
            .mark_auto_scroll(from, top, now, self.config.auto_scroll_grace());
        Some(Command::ScrollTo { top, smooth: true })
    }
}
