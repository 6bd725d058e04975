use super::state::{Reader, ResumeOffer};
use crate::geometry::Rect;
use crate::pacer::PacerSnapshot;
use crate::timing::Granularity;
use serde::Serialize;
use ts_rs::TS;

/// Where to paint the pacer over the document, in content coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct OverlayGeometry {
    /// Band behind the active unit.
    pub highlight: Rect,
    /// Dimmed region covering everything below the active unit.
    pub fill: Rect,
}

/// Everything a front end needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct ReaderView {
    pub pacer: PacerSnapshot,
    pub current_page: usize,
    pub page_count: usize,
    pub overlay: Option<OverlayGeometry>,
    pub resume_offer: Option<ResumeOffer>,
    /// A document is open but has nothing to play yet.
    pub loading: bool,
}

impl Reader {
    pub fn overlay(&self) -> Option<OverlayGeometry> {
        let unit = self.current_unit()?;
        let content_width = self.viewport.viewport_width;
        let (x, width) = match self.config.granularity {
            Granularity::Lines => (0.0, content_width),
            Granularity::WordChunks => (unit.x, unit.width),
        };
        let highlight = Rect::new(
            x,
            unit.y,
            width,
            unit.height.max(self.config.min_highlight_height_px),
        );
        let fill = Rect::new(
            0.0,
            unit.y + unit.height + self.config.overlay_gap_px,
            content_width,
            (self.viewport.content_height - unit.y - unit.height).max(0.0),
        );
        Some(OverlayGeometry { highlight, fill })
    }

    /// 1-based page of the active unit; 1 when nothing is extracted.
    pub fn current_page(&self) -> usize {
        self.current_unit().map_or(1, |unit| unit.page_index + 1)
    }

    pub fn page_count(&self) -> usize {
        self.document.page_count
    }

    pub fn view(&self) -> ReaderView {
        ReaderView {
            pacer: self.pacer_snapshot(),
            current_page: self.current_page(),
            page_count: self.page_count(),
            overlay: self.overlay(),
            resume_offer: self.resume_offer(),
            loading: self.has_document() && !self.is_ready(),
        }
    }
}
