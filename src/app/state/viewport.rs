use std::time::{Duration, Instant};

/// Scroll container geometry as last reported by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewportState {
    pub(in crate::app) scroll_top: f64,
    pub(in crate::app) viewport_width: f64,
    pub(in crate::app) viewport_height: f64,
    pub(in crate::app) content_height: f64,
}

impl ViewportState {
    pub(in crate::app) fn max_scroll_top(&self) -> f64 {
        (self.content_height - self.viewport_height).max(0.0)
    }
}

/// Slack allowed when matching reported offsets against a follow scroll.
const POSITION_SLACK_PX: f64 = 1.0;

/// A follow scroll the host is animating: reports on the way from `from`
/// to `target` belong to it.
#[derive(Debug, Clone, Copy, PartialEq)]
struct AutoScroll {
    from: f64,
    target: f64,
    until: Instant,
}

impl AutoScroll {
    fn covers(&self, scroll_top: f64) -> bool {
        let low = self.from.min(self.target) - POSITION_SLACK_PX;
        let high = self.from.max(self.target) + POSITION_SLACK_PX;
        (low..=high).contains(&scroll_top)
    }

    fn reached(&self, scroll_top: f64) -> bool {
        (scroll_top - self.target).abs() <= POSITION_SLACK_PX
    }
}

/// Tells reader-driven scrolls apart from the user's own.
///
/// A follow scroll records where it starts and where it lands. A report
/// counts as caused only while that scroll is in flight and only if it lies
/// on its path; arriving at the target, straying off the path, or the grace
/// window or settle timer running out all end it. Every report restarts the
/// settle timer, and only the report that was last when the timer expires
/// decides whether to pause.
#[derive(Debug, Clone, Default)]
pub struct ScrollTracker {
    auto_scroll: Option<AutoScroll>,
    last_scroll_caused: bool,
    settle_due: Option<Instant>,
}

impl ScrollTracker {
    pub(in crate::app) fn mark_auto_scroll(
        &mut self,
        from: f64,
        target: f64,
        now: Instant,
        grace: Duration,
    ) {
        self.auto_scroll = Some(AutoScroll {
            from,
            target,
            until: now + grace,
        });
    }

    /// Record a scroll report; returns whether it was reader-caused.
    pub(in crate::app) fn record_scroll(
        &mut self,
        scroll_top: f64,
        now: Instant,
        settle: Duration,
    ) -> bool {
        let caused = self
            .auto_scroll
            .is_some_and(|auto| now <= auto.until && auto.covers(scroll_top));
        let finished = self
            .auto_scroll
            .is_some_and(|auto| !caused || auto.reached(scroll_top));
        if finished {
            self.auto_scroll = None;
        }
        self.last_scroll_caused = caused;
        self.settle_due = Some(now + settle);
        caused
    }

    /// Once the settle timer has expired, report whether the final scroll
    /// was reader-caused.
    pub(in crate::app) fn take_settled(&mut self, now: Instant) -> Option<bool> {
        match self.settle_due {
            Some(due) if due <= now => {
                self.settle_due = None;
                self.auto_scroll = None;
                Some(self.last_scroll_caused)
            }
            _ => None,
        }
    }

    pub(in crate::app) fn settle_deadline(&self) -> Option<Instant> {
        self.settle_due
    }

    pub(in crate::app) fn reset(&mut self) {
        *self = Self::default();
    }
}
