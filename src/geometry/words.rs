//! Word-chunk detection: spans are split into per-word rectangles, bucketed
//! into visual lines and cut into fixed-size runs.

use super::layer::{TextLayer, TextSpan};
use super::types::{ChunkUnit, Rect};
use crate::text_utils::{count_words, normalize_span_text, word_spans};
use tracing::trace;

#[derive(Debug, Clone)]
struct WordBox {
    page_index: usize,
    rect: Rect,
    text: String,
    order: usize,
}

/// Split every span into word rectangles and emit runs of at most
/// `words_per_chunk` words per visual line, in reading order.
pub fn extract_word_chunks<L: TextLayer>(
    layer: &L,
    tolerance_px: f64,
    words_per_chunk: usize,
) -> Vec<ChunkUnit> {
    let mut words = collect_words(layer);
    if words.is_empty() {
        return Vec::new();
    }

    words.sort_by(|a, b| {
        a.page_index
            .cmp(&b.page_index)
            .then(a.rect.y.total_cmp(&b.rect.y))
    });

    let run_len = words_per_chunk.max(1);
    let mut chunks = Vec::new();
    for mut band in into_bands(words, tolerance_px) {
        band.sort_by(|a, b| a.rect.x.total_cmp(&b.rect.x).then(a.order.cmp(&b.order)));
        for run in band.chunks(run_len) {
            chunks.push(chunk_from_words(run, chunks.len()));
        }
    }
    chunks
}

/// Greedy vertical banding. Input must already be sorted by page then top.
fn into_bands(words: Vec<WordBox>, tolerance_px: f64) -> Vec<Vec<WordBox>> {
    let mut bands: Vec<Vec<WordBox>> = Vec::new();
    let mut current: Vec<WordBox> = Vec::new();

    for word in words {
        let starts_new_band = current.first().is_some_and(|anchor| {
            anchor.page_index != word.page_index
                || (word.rect.y - anchor.rect.y).abs() > tolerance_px
        });
        if starts_new_band {
            bands.push(std::mem::take(&mut current));
        }
        current.push(word);
    }
    if !current.is_empty() {
        bands.push(current);
    }
    bands
}

fn collect_words<L: TextLayer>(layer: &L) -> Vec<WordBox> {
    let mut words = Vec::new();
    let mut order = 0usize;

    for page_index in 0..layer.page_count() {
        for span in layer.page_spans(page_index) {
            let whole_text = normalize_span_text(span.text());
            if whole_text.is_empty() {
                continue;
            }
            let whole_rect = layer.to_content(span.client_rect());

            match split_span(layer, span) {
                Some(parts) => {
                    for (rect, text) in parts {
                        words.push(WordBox {
                            page_index,
                            rect,
                            text,
                            order,
                        });
                        order += 1;
                    }
                }
                None => {
                    words.push(WordBox {
                        page_index,
                        rect: whole_rect,
                        text: whole_text,
                        order,
                    });
                    order += 1;
                }
            }
        }
    }

    words
}

/// Resolve each word of a multi-word span to its own rectangle. `None` keeps
/// the span whole: either it holds a single word, or some word could not be
/// resolved to a non-empty rectangle.
fn split_span<L: TextLayer>(layer: &L, span: &L::Span) -> Option<Vec<(Rect, String)>> {
    let raw = span.text();
    let tokens = word_spans(raw);
    if tokens.len() < 2 {
        return None;
    }

    let mut parts = Vec::with_capacity(tokens.len());
    for token in tokens {
        let resolved = Rect::envelope(
            span.range_rects(token.char_start, token.char_end)
                .into_iter()
                .filter(|r| !r.is_degenerate()),
        );
        let Some(rect) = resolved.filter(|r| !r.is_degenerate()) else {
            trace!(word = token.text, "Falling back to whole-span rectangle");
            return None;
        };
        let text = normalize_span_text(token.text);
        if !text.is_empty() {
            parts.push((layer.to_content(rect), text));
        }
    }
    Some(parts)
}

fn chunk_from_words(words: &[WordBox], index: usize) -> ChunkUnit {
    let text = words
        .iter()
        .map(|w| w.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let bounds = Rect::envelope(words.iter().map(|w| w.rect)).unwrap_or_default();
    let page_index = words.first().map(|w| w.page_index).unwrap_or(0);

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
