//! Speed-reading pacer for rendered PDF text layers.
//!
//! The crate turns the positioned text spans of an already-rendered document
//! into an ordered sequence of pace-able units (whole lines or small word
//! groups), then drives a words-per-minute pacer across them:
//! - `geometry` extracts and orders the units and answers click hit-tests.
//! - `timing` and `text_utils` turn word counts into display durations.
//! - `pacer` owns the single pending advance and the play/pause/stop state.
//! - `persistence` saves and restores the reading position across restarts.
//! - `app` wires everything together the way a viewer front end needs it.

pub mod app;
pub mod config;
pub mod geometry;
pub mod pacer;
pub mod persistence;
pub mod shutdown;
pub mod source;
pub mod text_utils;
pub mod timing;
