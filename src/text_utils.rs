//! Word-level text helpers shared by extraction and timing.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+").unwrap());

/// A whitespace-delimited token located inside a larger string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordSpan<'a> {
    pub text: &'a str,
    /// Offsets counted in `char`s, end exclusive.
    pub char_start: usize,
    pub char_end: usize,
}

/// Count whitespace-delimited tokens. Runs of whitespace count as a single
/// separator and empty tokens are discarded.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Locate every word in `text`, reporting char offsets so callers can map a
/// word back onto per-character geometry.
pub fn word_spans(text: &str) -> Vec<WordSpan<'_>> {
    let mut spans = Vec::new();
    let mut chars_seen = 0usize;
    let mut bytes_seen = 0usize;

    for m in WORD_RE.find_iter(text) {
        chars_seen += text[bytes_seen..m.start()].chars().count();
        let char_start = chars_seen;
        let len = m.as_str().chars().count();
        chars_seen += len;
        bytes_seen = m.end();
        spans.push(WordSpan {
            text: m.as_str(),
            char_start,
            char_end: char_start + len,
        });
    }

    spans
}

/// Normalise text pulled out of a rendered text layer: compatibility
/// decomposition folds typographic ligatures (`ﬁ` -> `fi`) and outer
/// whitespace is dropped.
pub fn normalize_span_text(text: &str) -> String {
    text.nfkc().collect::<String>().trim().to_string()
}
