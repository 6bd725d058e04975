//! Line detection: spans whose tops agree within a tolerance form one line.

use super::layer::TextLayer;
use super::types::{ChunkUnit, Rect};
use super::{SpanRecord, collect_spans};
use crate::text_utils::count_words;

/// Group every span of every page into visual lines, in reading order.
pub fn extract_lines<L: TextLayer>(layer: &L, tolerance_px: f64) -> Vec<ChunkUnit> {
    let mut spans = collect_spans(layer);
    if spans.is_empty() {
        return Vec::new();
    }

    // `sort_by` is stable, so spans sharing a top keep encounter order.
    spans.sort_by(|a, b| a.rect.y.total_cmp(&b.rect.y));

    let mut lines = Vec::new();
    let mut current: Vec<SpanRecord> = Vec::new();

    for span in spans {
        let starts_new_line = current
            .first()
            .is_some_and(|anchor| (span.rect.y - anchor.rect.y).abs() > tolerance_px);
        if starts_new_line {
            let group = std::mem::take(&mut current);
            lines.push(line_from_spans(group, lines.len()));
        }
        current.push(span);
    }

    if !current.is_empty() {
        lines.push(line_from_spans(current, lines.len()));
    }

    lines
}

fn line_from_spans(mut spans: Vec<SpanRecord>, index: usize) -> ChunkUnit {
    spans.sort_by_key(|s| s.order);

    let text = spans
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let bounds = Rect::envelope(spans.iter().map(|s| s.rect)).unwrap_or_default();
    let page_index = spans.first().map(|s| s.page_index).unwrap_or(0);

    ChunkUnit {
        index,
        page_index,
        x: bounds.x,
        y: bounds.y,
        width: bounds.width,
        height: bounds.height,
        word_count: count_words(&text).max(1),
        text_content: text,
    }
}
