use super::models::LogLevel;
use crate::timing::{Granularity, LINE_FLOOR, WORD_CHUNK_FLOOR};

pub(crate) fn default_log_level() -> LogLevel {
    LogLevel::Debug
}

pub(crate) fn default_granularity() -> Granularity {
    Granularity::Lines
}

pub(crate) fn default_wpm() -> u32 {
    300
}

pub(crate) fn default_min_wpm() -> u32 {
    100
}

pub(crate) fn default_max_wpm() -> u32 {
    600
}

pub(crate) fn default_wpm_step() -> u32 {
    25
}

pub(crate) fn default_line_floor_ms() -> u64 {
    LINE_FLOOR.as_millis() as u64
}

pub(crate) fn default_word_floor_ms() -> u64 {
    WORD_CHUNK_FLOOR.as_millis() as u64
}

pub(crate) fn default_tolerance_px() -> f64 {
    5.0
}

pub(crate) fn default_words_per_chunk() -> usize {
    4
}

pub(crate) fn default_follow_fraction() -> f64 {
    1.0 / 3.0
}

pub(crate) fn default_scroll_settle_ms() -> u64 {
    100
}

pub(crate) fn default_auto_scroll_grace_ms() -> u64 {
    800
}

pub(crate) fn default_min_highlight_height_px() -> f64 {
    20.0
}

pub(crate) fn default_overlay_gap_px() -> f64 {
    2.0
}

pub(crate) fn default_auto_scroll() -> bool {
    true
}

pub(crate) fn default_cache_dir() -> String {
    ".cache".to_string()
}
