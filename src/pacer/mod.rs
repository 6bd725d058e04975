//! Timer-driven pacer that walks the unit sequence at a reading speed.
//!
//! The pacer never sleeps or spawns anything. It owns a single pending
//! advance (a deadline plus an [`AdvanceToken`]) and the host either calls
//! [`Pacer::tick`] with the current time or delivers the token through
//! [`Pacer::fire`] when its own timer goes off. Every transition that leaves
//! playback, or changes the index or speed during playback, drops the pending
//! advance before anything new is armed, and a fired token is re-validated
//! against the live state before it may move the index.

mod state;

pub use state::{AdvanceToken, PacerEvent, PacerSnapshot, PlaybackPhase};

use crate::geometry::ChunkUnit;
use crate::timing::{WpmRange, compute_duration};
use state::PendingAdvance;
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub struct Pacer {
    units: Vec<ChunkUnit>,
    current_index: usize,
    phase: PlaybackPhase,
    wpm: u32,
    range: WpmRange,
    floor: Duration,
    pending: Option<PendingAdvance>,
    generation: u64,
}

impl Pacer {
    pub fn new(range: WpmRange, floor: Duration, wpm: u32) -> Self {
        Self {
            units: Vec::new(),
            current_index: 0,
            phase: PlaybackPhase::Stopped,
            wpm: range.clamp(wpm),
            range,
            floor,
            pending: None,
            generation: 0,
        }
    }

    /// Replace the sequence. Playback stops and the index returns to 0.
    pub fn load(&mut self, units: &[ChunkUnit]) {
        self.cancel();
        self.units = units.to_vec();
        self.current_index = 0;
        self.phase = PlaybackPhase::Stopped;
        debug!(units = self.units.len(), "Loaded pacer sequence");
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn is_playing(&self) -> bool {
        self.phase == PlaybackPhase::Playing
    }

    pub fn wpm(&self) -> u32 {
        self.wpm
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    pub fn snapshot(&self) -> PacerSnapshot {
        PacerSnapshot {
            current_index: self.current_index,
            is_playing: self.is_playing(),
            wpm: self.wpm,
            unit_count: self.unit_count(),
            phase: self.phase,
        }
    }

    /// How long the current unit stays up at the current speed.
    pub fn current_duration(&self) -> Option<Duration> {
        self.units
            .get(self.current_index)
            .map(|unit| compute_duration(unit, self.wpm, self.floor))
    }

    /// When the next advance is due, if one is armed.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.map(|p| p.due)
    }

    /// The armed advance, for hosts that run their own timers.
    pub fn pending_advance(&self) -> Option<(AdvanceToken, Instant)> {
        self.pending.map(|p| (p.token, p.due))
    }

    pub fn play(&mut self, now: Instant) {
        if self.units.is_empty() || self.is_playing() {
            return;
        }
        self.phase = PlaybackPhase::Playing;
        info!(index = self.current_index, wpm = self.wpm, "Starting pacer");
        self.arm(now);
    }

    /// Leave playback with the index untouched. Outside playback this only
    /// makes sure nothing is armed.
    pub fn pause(&mut self) {
        if self.is_playing() {
            info!(index = self.current_index, "Pausing pacer");
            self.phase = PlaybackPhase::Paused;
        }
        self.cancel();
    }

    pub fn toggle(&mut self, now: Instant) {
        if self.is_playing() {
            self.pause();
        } else {
            self.play(now);
        }
    }

    pub fn stop(&mut self) -> Vec<PacerEvent> {
        self.cancel();
        self.phase = PlaybackPhase::Stopped;
        self.current_index = 0;
        info!("Stopped pacer");
        vec![PacerEvent::IndexChanged(0)]
    }

    /// Move to `index`. Out-of-range targets are ignored. While playing, the
    /// new unit gets its full duration from `now`; otherwise the pacer is
    /// left paused on it.
    pub fn jump_to(&mut self, index: usize, now: Instant) -> Vec<PacerEvent> {
        if index >= self.units.len() {
            debug!(index, units = self.units.len(), "Ignoring out-of-range jump");
            return Vec::new();
        }
        self.cancel();
        self.current_index = index;
        debug!(index, playing = self.is_playing(), "Jumped to unit");
        if self.is_playing() {
            self.arm(now);
        } else {
            self.phase = PlaybackPhase::Paused;
        }
        vec![PacerEvent::IndexChanged(index)]
    }

    /// Change speed. While playing, the unit on screen is rescheduled from
    /// `now` with its full duration at the new speed. Returns the speed
    /// actually applied.
    pub fn set_wpm(&mut self, wpm: u32, now: Instant) -> u32 {
        let clamped = self.range.clamp(wpm);
        if clamped == self.wpm {
            return clamped;
        }
        self.wpm = clamped;
        info!(wpm = clamped, "Changed pacer speed");
        if self.is_playing() {
            self.cancel();
            self.arm(now);
        }
        clamped
    }

    /// Run every advance that is due by `now`. Late ticks catch up unit by
    /// unit, each one scheduled from the previous deadline.
    pub fn tick(&mut self, now: Instant) -> Vec<PacerEvent> {
        let mut events = Vec::new();
        while let Some(pending) = self.pending {
            if pending.due > now {
                break;
            }
            self.pending = None;
            let fired = self.advance(pending.token, pending.due);
            let done = fired.is_empty();
            events.extend(fired);
            if done {
                break;
            }
        }
        events
    }

    /// Deliver an advance whose external timer went off at `at`.
    pub fn fire(&mut self, token: AdvanceToken, at: Instant) -> Vec<PacerEvent> {
        match self.pending {
            Some(pending) if pending.token == token => {
                self.pending = None;
                self.advance(token, at)
            }
            _ => {
                debug!(?token, "Ignoring stale advance");
                Vec::new()
            }
        }
    }

    fn advance(&mut self, token: AdvanceToken, at: Instant) -> Vec<PacerEvent> {
        let live = self.is_playing()
            && token.generation == self.generation
            && token.index == self.current_index;
        if !live {
            debug!(?token, index = self.current_index, "Discarding advance for stale state");
            return Vec::new();
        }

        let next = self.current_index + 1;
        if next >= self.units.len() {
            self.phase = PlaybackPhase::Stopped;
            info!(index = self.current_index, "Pacer reached the end");
            return vec![PacerEvent::Completed];
        }

        self.current_index = next;
        self.arm(at);
        vec![PacerEvent::IndexChanged(next)]
    }

    fn arm(&mut self, from: Instant) {
        let Some(duration) = self.current_duration() else {
            return;
        };
        self.generation = self.generation.wrapping_add(1);
        self.pending = Some(PendingAdvance {
            token: AdvanceToken {
                generation: self.generation,
                index: self.current_index,
            },
            due: from + duration,
        });
    }

    fn cancel(&mut self) {
        if self.pending.take().is_some() {
            self.generation = self.generation.wrapping_add(1);
        }
    }
}

impl Drop for Pacer {
    fn drop(&mut self) {
        self.cancel();
    }
}
