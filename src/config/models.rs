use crate::timing::{Granularity, WpmRange};
use serde::Deserialize;
use std::time::Duration;

use super::defaults;

/// High-level app configuration; deserializable from TOML.
#[derive(Debug, Clone, PartialEq, Deserialize, serde::Serialize)]
pub struct AppConfig {
    #[serde(default = "crate::config::defaults::default_log_level")]
    pub log_level: LogLevel,
    #[serde(default = "crate::config::defaults::default_granularity")]
    pub granularity: Granularity,
    #[serde(default = "crate::config::defaults::default_wpm")]
    pub default_wpm: u32,
    #[serde(default = "crate::config::defaults::default_min_wpm")]
    pub min_wpm: u32,
    #[serde(default = "crate::config::defaults::default_max_wpm")]
    pub max_wpm: u32,
    #[serde(default = "crate::config::defaults::default_wpm_step")]
    pub wpm_step: u32,
    #[serde(default = "crate::config::defaults::default_line_floor_ms")]
    pub line_floor_ms: u64,
    #[serde(default = "crate::config::defaults::default_word_floor_ms")]
    pub word_floor_ms: u64,
    #[serde(default = "crate::config::defaults::default_tolerance_px")]
    pub line_tolerance_px: f64,
    #[serde(default = "crate::config::defaults::default_tolerance_px")]
    pub word_tolerance_px: f64,
    #[serde(default = "crate::config::defaults::default_words_per_chunk")]
    pub words_per_chunk: usize,
    #[serde(default = "crate::config::defaults::default_follow_fraction")]
    pub follow_fraction: f64,
    #[serde(default = "crate::config::defaults::default_scroll_settle_ms")]
    pub scroll_settle_ms: u64,
    #[serde(default = "crate::config::defaults::default_auto_scroll_grace_ms")]
    pub auto_scroll_grace_ms: u64,
    #[serde(default = "crate::config::defaults::default_min_highlight_height_px")]
    pub min_highlight_height_px: f64,
    #[serde(default = "crate::config::defaults::default_overlay_gap_px")]
    pub overlay_gap_px: f64,
    #[serde(default = "crate::config::defaults::default_auto_scroll")]
    pub auto_scroll: bool,
    #[serde(default = "crate::config::defaults::default_cache_dir")]
    pub cache_dir: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            log_level: defaults::default_log_level(),
            granularity: defaults::default_granularity(),
            default_wpm: defaults::default_wpm(),
            min_wpm: defaults::default_min_wpm(),
            max_wpm: defaults::default_max_wpm(),
            wpm_step: defaults::default_wpm_step(),
            line_floor_ms: defaults::default_line_floor_ms(),
            word_floor_ms: defaults::default_word_floor_ms(),
            line_tolerance_px: defaults::default_tolerance_px(),
            word_tolerance_px: defaults::default_tolerance_px(),
            words_per_chunk: defaults::default_words_per_chunk(),
            follow_fraction: defaults::default_follow_fraction(),
            scroll_settle_ms: defaults::default_scroll_settle_ms(),
            auto_scroll_grace_ms: defaults::default_auto_scroll_grace_ms(),
            min_highlight_height_px: defaults::default_min_highlight_height_px(),
            overlay_gap_px: defaults::default_overlay_gap_px(),
            auto_scroll: defaults::default_auto_scroll(),
            cache_dir: defaults::default_cache_dir(),
        }
    }
}

impl AppConfig {
    pub fn wpm_range(&self) -> WpmRange {
        WpmRange::new(self.min_wpm, self.max_wpm, self.wpm_step)
    }

    /// Minimum display time per unit for the given pacing mode.
    pub fn floor_for(&self, granularity: Granularity) -> Duration {
        match granularity {
            Granularity::Lines => Duration::from_millis(self.line_floor_ms),
            Granularity::WordChunks => Duration::from_millis(self.word_floor_ms),
        }
    }

    pub fn scroll_settle(&self) -> Duration {
        Duration::from_millis(self.scroll_settle_ms)
    }

    pub fn auto_scroll_grace(&self) -> Duration {
        Duration::from_millis(self.auto_scroll_grace_ms)
    }
}

/// Supported logging verbosity levels.
#[derive(Debug, Clone, Copy, Deserialize, serde::Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Debug
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_filter_str())
    }
}

impl LogLevel {
    pub fn as_filter_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
