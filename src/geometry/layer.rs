//! The rendered text layer the extractor reads from.
//!
//! Rendering is somebody else's job: a document viewer lays pages out and
//! exposes positioned text spans. The traits here are the only capability the
//! extractor needs from it. `LayoutSnapshot` is a serialisable implementation
//! so a browser front end (or a test) can hand over a frozen copy of the layer.

use super::types::{Point, Rect};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use ts_rs::TS;

/// A text-bearing leaf element of a page.
pub trait TextSpan {
    /// Raw text as rendered, untrimmed.
    fn text(&self) -> &str;

    /// Bounding rectangle in viewport coordinates.
    fn client_rect(&self) -> Rect;

    /// Viewport rectangles covering the chars `[char_start, char_end)` of
    /// `text()`. An empty result means the range could not be resolved.
    fn range_rects(&self, char_start: usize, char_end: usize) -> Vec<Rect>;
}

/// A scroll container holding one text layer per rendered page.
pub trait TextLayer {
    type Span: TextSpan;

    /// Viewport position of the container's visible top-left corner.
    fn container_origin(&self) -> Point;

    /// Current scroll offset of the container.
    fn scroll_offset(&self) -> Point;

    /// Visible size of the container as (width, height).
    fn viewport_size(&self) -> (f64, f64);

    /// Total scrollable content height.
    fn scroll_height(&self) -> f64;

    fn page_count(&self) -> usize;

    fn page_spans(&self, page: usize) -> &[Self::Span];

    /// Convert a viewport rectangle into content coordinates.
    fn to_content(&self, rect: Rect) -> Rect {
        let origin = self.container_origin();
        let scroll = self.scroll_offset();
        rect.translate(scroll.x - origin.x, scroll.y - origin.y)
    }

    /// Convert a viewport point (e.g. a click) into content coordinates.
    fn point_to_content(&self, point: Point) -> Point {
        let origin = self.container_origin();
        let scroll = self.scroll_offset();
        Point::new(point.x - origin.x + scroll.x, point.y - origin.y + scroll.y)
    }
}

/// Frozen copy of a rendered text layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LayoutSnapshot {
    /// Client rectangle of the scroll container.
    pub container: Rect,
    #[serde(default)]
    pub scroll_left: f64,
    #[serde(default)]
    pub scroll_top: f64,
    #[serde(default)]
    pub scroll_height: f64,
    #[serde(default)]
    pub pages: Vec<PageLayer>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PageLayer {
    #[serde(default)]
    pub spans: Vec<SpanBox>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SpanBox {
    pub text: String,
    pub rect: Rect,
    /// One rectangle per `char` of `text`, when the renderer exposes them.
    #[serde(default)]
    pub glyphs: Vec<Rect>,
}

impl SpanBox {
    pub fn new(text: impl Into<String>, rect: Rect) -> Self {
        Self {
            text: text.into(),
            rect,
            glyphs: Vec::new(),
        }
    }

    /// Lay the glyphs out as equal-width cells across `rect`; good enough
    /// for monospaced test fixtures and rough dumps.
    pub fn with_uniform_glyphs(mut self) -> Self {
        let count = self.text.chars().count();
        if count == 0 {
            return self;
        }
        let cell = self.rect.width / count as f64;
        self.glyphs = (0..count)
            .map(|i| {
                Rect::new(
                    self.rect.x + cell * i as f64,
                    self.rect.y,
                    cell,
                    self.rect.height,
                )
            })
            .collect();
        self
    }
}

impl TextSpan for SpanBox {
    fn text(&self) -> &str {
        &self.text
    }

    fn client_rect(&self) -> Rect {
        self.rect
    }

    fn range_rects(&self, char_start: usize, char_end: usize) -> Vec<Rect> {
        if char_start >= char_end || char_end > self.glyphs.len() {
            return Vec::new();
        }
        if self.glyphs.len() != self.text.chars().count() {
            return Vec::new();
        }
        Rect::envelope(
            self.glyphs[char_start..char_end]
                .iter()
                .copied()
                .filter(|g| !g.is_degenerate()),
        )
        .into_iter()
        .collect()
    }
}

impl TextLayer for LayoutSnapshot {
    type Span = SpanBox;

    fn container_origin(&self) -> Point {
        Point::new(self.container.x, self.container.y)
    }

    fn scroll_offset(&self) -> Point {
        Point::new(self.scroll_left, self.scroll_top)
    }

    fn viewport_size(&self) -> (f64, f64) {
        (self.container.width, self.container.height)
    }

    fn scroll_height(&self) -> f64 {
        self.scroll_height
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_spans(&self, page: usize) -> &[SpanBox] {
        self.pages
            .get(page)
            .map(|p| p.spans.as_slice())
            .unwrap_or(&[])
    }
}

impl LayoutSnapshot {
    pub fn from_json(data: &str) -> Result<Self> {
        serde_json::from_str(data).context("Invalid layout snapshot JSON")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read layout snapshot {}", path.display()))?;
        Self::from_json(&data)
    }
}
