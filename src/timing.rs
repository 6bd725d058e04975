//! Display-duration model: how long a unit stays highlighted at a given
//! reading speed.

use crate::geometry::ChunkUnit;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use ts_rs::TS;

/// Minimum on-screen time for a whole line.
pub const LINE_FLOOR: Duration = Duration::from_millis(200);
/// Minimum on-screen time for a word chunk.
pub const WORD_CHUNK_FLOOR: Duration = Duration::from_millis(150);

/// Size of the unit the pacer steps through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum Granularity {
    /// One unit per visual line.
    #[default]
    Lines,
    /// Fixed-size runs of words within a visual line.
    WordChunks,
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Granularity::Lines => "lines",
            Granularity::WordChunks => "word-chunks",
        };
        write!(f, "{}", label)
    }
}

/// How long `unit` stays highlighted: `word_count * (60000 / wpm)`
/// milliseconds, never below `floor`.
///
/// A zero `wpm` is treated as 1; callers are expected to clamp to their
/// configured range first.
pub fn compute_duration(unit: &ChunkUnit, wpm: u32, floor: Duration) -> Duration {
    duration_for_words(unit.word_count, wpm, floor)
}

fn duration_for_words(word_count: usize, wpm: u32, floor: Duration) -> Duration {
    let ms_per_word = 60_000.0 / f64::from(wpm.max(1));
    let raw = Duration::from_secs_f64(word_count as f64 * ms_per_word / 1000.0);
    raw.max(floor)
}

/// Bounds of the speed control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WpmRange {
    pub min: u32,
    pub max: u32,
    pub step: u32,
}

impl WpmRange {
    pub fn new(min: u32, max: u32, step: u32) -> Self {
        let min = min.max(1);
        let (min, max) = if max < min { (max.max(1), min) } else { (min, max) };
        Self {
            min,
            max,
            step: step.max(1),
        }
    }

    pub fn clamp(&self, wpm: u32) -> u32 {
        wpm.clamp(self.min, self.max)
    }

    /// Clamp and round to the nearest slider step counted from `min`.
    pub fn snap(&self, wpm: u32) -> u32 {
        let clamped = self.clamp(wpm);
        let offset = clamped - self.min;
        let steps = (offset + self.step / 2) / self.step;
        self.clamp(self.min + steps * self.step)
    }
}

impl Default for WpmRange {
    fn default() -> Self {
        Self::new(100, 600, 25)
    }
}
