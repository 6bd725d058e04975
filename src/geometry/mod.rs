//! Turns a rendered text layer into the ordered sequence of pace-able units.
//!
//! Extraction runs once per rendered document and is never updated
//! incrementally; a new document means a fresh call.

pub mod hit_test;
pub mod layer;
pub mod lines;
pub mod types;
pub mod words;

pub use hit_test::nearest_unit;
pub use layer::{LayoutSnapshot, PageLayer, SpanBox, TextLayer, TextSpan};
pub use types::{ChunkUnit, Point, Rect};

use crate::config::AppConfig;
use crate::text_utils::normalize_span_text;
use crate::timing::Granularity;
use tracing::debug;

/// Knobs for one extraction pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractOptions {
    pub granularity: Granularity,
    pub line_tolerance_px: f64,
    pub word_tolerance_px: f64,
    pub words_per_chunk: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            granularity: Granularity::Lines,
            line_tolerance_px: 5.0,
            word_tolerance_px: 5.0,
            words_per_chunk: 4,
        }
    }
}

impl From<&AppConfig> for ExtractOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            granularity: config.granularity,
            line_tolerance_px: config.line_tolerance_px,
            word_tolerance_px: config.word_tolerance_px,
            words_per_chunk: config.words_per_chunk,
        }
    }
}

/// Run the extractor matching `options.granularity`.
pub fn extract<L: TextLayer>(layer: &L, options: &ExtractOptions) -> Vec<ChunkUnit> {
    let units = match options.granularity {
        Granularity::Lines => lines::extract_lines(layer, options.line_tolerance_px),
        Granularity::WordChunks => words::extract_word_chunks(
            layer,
            options.word_tolerance_px,
            options.words_per_chunk,
        ),
    };
    debug!(
        granularity = %options.granularity,
        pages = layer.page_count(),
        units = units.len(),
        "Extracted pacing units"
    );
    units
}

/// A non-empty span placed in content coordinates.
#[derive(Debug, Clone)]
pub(crate) struct SpanRecord {
    pub page_index: usize,
    pub rect: Rect,
    pub text: String,
    /// Position in document encounter order.
    pub order: usize,
}

pub(crate) fn collect_spans<L: TextLayer>(layer: &L) -> Vec<SpanRecord> {
    let mut records = Vec::new();
    for page_index in 0..layer.page_count() {
        for span in layer.page_spans(page_index) {
            let text = normalize_span_text(span.text());
            if text.is_empty() {
                continue;
            }
            records.push(SpanRecord {
                page_index,
                rect: layer.to_content(span.client_rect()),
                text,
                order: records.len(),
            });
        }
    }
    records
}
