use crate::geometry::ChunkUnit;
use crate::source::DocumentSource;

/// Progress of the one extraction pass a document gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionState {
    Idle,
    /// Pages are rendered; waiting for the host's next frame.
    Pending,
    Done,
}

/// The open document and everything derived from its render.
pub struct DocumentState {
    pub(in crate::app) source: Option<DocumentSource>,
    pub(in crate::app) bytes_persisted: bool,
    pub(in crate::app) extraction: ExtractionState,
    pub(in crate::app) units: Vec<ChunkUnit>,
    pub(in crate::app) page_count: usize,
    /// Position to jump to once extraction finishes (set by resume).
    pub(in crate::app) resume_position: Option<usize>,
}

impl DocumentState {
    pub(in crate::app) fn closed() -> Self {
        Self {
            source: None,
            bytes_persisted: false,
            extraction: ExtractionState::Idle,
            units: Vec::new(),
            page_count: 0,
            resume_position: None,
        }
    }

    pub(in crate::app) fn open(source: DocumentSource) -> Self {
        Self {
            source: Some(source),
            ..Self::closed()
        }
    }

    pub(in crate::app) fn is_open(&self) -> bool {
        self.source.is_some()
    }
}
