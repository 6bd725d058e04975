use super::defaults;
use super::models::{AppConfig, LogLevel};
use crate::timing::Granularity;
use serde::Deserialize;

/// On-disk layout of `config.toml`, one table per concern.
#[derive(Debug, Clone, Default, Deserialize, serde::Serialize)]
pub(super) struct ConfigTables {
    #[serde(default)]
    logging: LoggingConfig,
    #[serde(default)]
    pacing: PacingConfig,
    #[serde(default)]
    layout: LayoutConfig,
    #[serde(default)]
    viewer: ViewerConfig,
    #[serde(default)]
    storage: StorageConfig,
}

impl From<ConfigTables> for AppConfig {
    fn from(tables: ConfigTables) -> Self {
        AppConfig {
            log_level: tables.logging.log_level,
            granularity: tables.pacing.granularity,
            default_wpm: tables.pacing.default_wpm,
            min_wpm: tables.pacing.min_wpm,
            max_wpm: tables.pacing.max_wpm,
            wpm_step: tables.pacing.wpm_step,
            line_floor_ms: tables.pacing.line_floor_ms,
            word_floor_ms: tables.pacing.word_floor_ms,
            line_tolerance_px: tables.layout.line_tolerance_px,
            word_tolerance_px: tables.layout.word_tolerance_px,
            words_per_chunk: tables.layout.words_per_chunk,
            follow_fraction: tables.viewer.follow_fraction,
            scroll_settle_ms: tables.viewer.scroll_settle_ms,
            auto_scroll_grace_ms: tables.viewer.auto_scroll_grace_ms,
            min_highlight_height_px: tables.viewer.min_highlight_height_px,
            overlay_gap_px: tables.viewer.overlay_gap_px,
            auto_scroll: tables.viewer.auto_scroll,
            cache_dir: tables.storage.cache_dir,
        }
    }
}

impl From<&AppConfig> for ConfigTables {
    fn from(config: &AppConfig) -> Self {
        ConfigTables {
            logging: LoggingConfig {
                log_level: config.log_level,
            },
            pacing: PacingConfig {
                granularity: config.granularity,
                default_wpm: config.default_wpm,
                min_wpm: config.min_wpm,
                max_wpm: config.max_wpm,
                wpm_step: config.wpm_step,
                line_floor_ms: config.line_floor_ms,
                word_floor_ms: config.word_floor_ms,
            },
            layout: LayoutConfig {
                line_tolerance_px: config.line_tolerance_px,
                word_tolerance_px: config.word_tolerance_px,
                words_per_chunk: config.words_per_chunk,
            },
            viewer: ViewerConfig {
                follow_fraction: config.follow_fraction,
                scroll_settle_ms: config.scroll_settle_ms,
                auto_scroll_grace_ms: config.auto_scroll_grace_ms,
                min_highlight_height_px: config.min_highlight_height_px,
                overlay_gap_px: config.overlay_gap_px,
                auto_scroll: config.auto_scroll,
            },
            storage: StorageConfig {
                cache_dir: config.cache_dir.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct LoggingConfig {
    #[serde(default = "defaults::default_log_level")]
    log_level: LogLevel,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            log_level: defaults::default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct PacingConfig {
    #[serde(default = "defaults::default_granularity")]
    granularity: Granularity,
    #[serde(default = "defaults::default_wpm")]
    default_wpm: u32,
    #[serde(default = "defaults::default_min_wpm")]
    min_wpm: u32,
    #[serde(default = "defaults::default_max_wpm")]
    max_wpm: u32,
    #[serde(default = "defaults::default_wpm_step")]
    wpm_step: u32,
    #[serde(default = "defaults::default_line_floor_ms")]
    line_floor_ms: u64,
    #[serde(default = "defaults::default_word_floor_ms")]
    word_floor_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        PacingConfig {
            granularity: defaults::default_granularity(),
            default_wpm: defaults::default_wpm(),
            min_wpm: defaults::default_min_wpm(),
            max_wpm: defaults::default_max_wpm(),
            wpm_step: defaults::default_wpm_step(),
            line_floor_ms: defaults::default_line_floor_ms(),
            word_floor_ms: defaults::default_word_floor_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct LayoutConfig {
    #[serde(default = "defaults::default_tolerance_px")]
    line_tolerance_px: f64,
    #[serde(default = "defaults::default_tolerance_px")]
    word_tolerance_px: f64,
    #[serde(default = "defaults::default_words_per_chunk")]
    words_per_chunk: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            line_tolerance_px: defaults::default_tolerance_px(),
            word_tolerance_px: defaults::default_tolerance_px(),
            words_per_chunk: defaults::default_words_per_chunk(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct ViewerConfig {
    #[serde(default = "defaults::default_follow_fraction")]
    follow_fraction: f64,
    #[serde(default = "defaults::default_scroll_settle_ms")]
    scroll_settle_ms: u64,
    #[serde(default = "defaults::default_auto_scroll_grace_ms")]
    auto_scroll_grace_ms: u64,
    #[serde(default = "defaults::default_min_highlight_height_px")]
    min_highlight_height_px: f64,
    #[serde(default = "defaults::default_overlay_gap_px")]
    overlay_gap_px: f64,
    #[serde(default = "defaults::default_auto_scroll")]
    auto_scroll: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        ViewerConfig {
            follow_fraction: defaults::default_follow_fraction(),
            scroll_settle_ms: defaults::default_scroll_settle_ms(),
            auto_scroll_grace_ms: defaults::default_auto_scroll_grace_ms(),
            min_highlight_height_px: defaults::default_min_highlight_height_px(),
            overlay_gap_px: defaults::default_overlay_gap_px(),
            auto_scroll: defaults::default_auto_scroll(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, serde::Serialize)]
struct StorageConfig {
    #[serde(default = "defaults::default_cache_dir")]
    cache_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            cache_dir: defaults::default_cache_dir(),
        }
    }
}
