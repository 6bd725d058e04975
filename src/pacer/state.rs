use serde::Serialize;
use std::time::Instant;
use ts_rs::TS;

/// Where the pacer sits in its play/pause/stop cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum PlaybackPhase {
    Stopped,
    Paused,
    Playing,
}

/// What the pacer tells its owner after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacerEvent {
    IndexChanged(usize),
    /// The last unit's time ran out; playback is no longer running.
    Completed,
}

/// Identifies one armed advance. A token outlives its usefulness the moment
/// the pacer cancels or re-arms, after which firing it does nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvanceToken {
    pub(super) generation: u64,
    pub(super) index: usize,
}

#[derive(Debug, Clone, Copy)]
pub(super) struct PendingAdvance {
    pub(super) token: AdvanceToken,
    pub(super) due: Instant,
}

/// Read-only view handed to front ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct PacerSnapshot {
    pub current_index: usize,
    pub is_playing: bool,
    pub wpm: u32,
    pub unit_count: usize,
    pub phase: PlaybackPhase,
}
