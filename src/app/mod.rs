//! Reading-session orchestration.
//!
//! A front end owns rendering, input, and timers. It feeds [`Message`]s into
//! [`Reader::update`] together with the current time, carries out the
//! returned [`Command`]s, and draws from [`Reader::view`]. The reducer turns
//! each message into internal effects first and runs them afterwards, so
//! scrolling and saving always see the state the message produced.

#[cfg(test)]
mod fixtures;
mod messages;
mod state;
mod update;
mod view;

pub use messages::{Command, Message};
pub use state::{ExtractionState, Reader, ResumeOffer};
pub use view::{OverlayGeometry, ReaderView};
