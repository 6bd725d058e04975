use crate::geometry::Point;
use crate::source::DocumentSource;

/// Inputs a front end feeds to the [`Reader`](super::Reader).
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// The user picked a file or submitted a URL.
    OpenSource(DocumentSource),
    /// The renderer finished laying out every page of the open document.
    PagesRendered,
    /// A click on the document, already converted to content coordinates.
    Clicked(Point),
    Scrolled {
        scroll_top: f64,
        viewport_height: f64,
    },
    Resized {
        viewport_width: f64,
        viewport_height: f64,
    },
    Tick,
    Play,
    Pause,
    TogglePlayPause,
    Stop,
    SetWpm(u32),
    JumpTo(usize),
    Resume,
    StartFresh,
}

/// Work the reader asks its host to carry out.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    ScrollTo { top: f64, smooth: bool },
    /// Call [`Reader::extract_pending`](super::Reader::extract_pending) once
    /// layout has settled (the next frame).
    RequestFrame,
    /// Render this document; the reader already treats it as open.
    LoadSource(DocumentSource),
    PlaybackFinished,
}
