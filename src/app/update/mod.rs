use crate::source::DocumentSource;

mod core;
mod playback;
mod scroll;
mod session;

/// Describes work that must be performed outside the pure reducer.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum Effect {
    FollowCurrent,
    SaveSession,
    ClearSession,
    RequestFrame,
    LoadSource(DocumentSource),
    NotifyFinished,
}
