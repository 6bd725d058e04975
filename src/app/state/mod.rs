mod document;
mod viewport;

use crate::config::AppConfig;
use crate::geometry::ChunkUnit;
use crate::pacer::{Pacer, PacerSnapshot};
use crate::persistence::{RestoredSession, SessionStore};
use crate::source::SourceRef;
use serde::Serialize;
use std::time::Instant;
use tracing::info;
use ts_rs::TS;

pub use document::ExtractionState;
pub(in crate::app) use document::DocumentState;
pub(in crate::app) use viewport::{ScrollTracker, ViewportState};

/// What the start-up prompt shows when a previous session was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct ResumeOffer {
    pub source_name: String,
    pub wpm: u32,
    pub position: usize,
}

/// Reading session orchestrator: owns the pacer, the extracted units, the
/// viewport model and the session store, and turns front-end messages into
/// host commands.
pub struct Reader {
    pub(super) config: AppConfig,
    pub(super) pacer: Pacer,
    pub(super) document: DocumentState,
    pub(super) viewport: ViewportState,
    pub(super) scroll: ScrollTracker,
    pub(super) store: SessionStore,
    pub(super) saved: Option<RestoredSession>,
    pub(super) offer_visible: bool,
}

impl Reader {
    /// Build a reader and read the saved session once.
    pub fn new(config: AppConfig, store: SessionStore) -> Self {
        let pacer = Pacer::new(
            config.wpm_range(),
            config.floor_for(config.granularity),
            config.default_wpm,
        );
        let saved = store.load();
        if let Some(restored) = &saved {
            info!(
                source = restored.session.display_name(),
                position = restored.session.position,
                wpm = restored.session.wpm,
                "Found saved reading session"
            );
        }
        let offer_visible = saved.is_some();
        Self {
            config,
            pacer,
            document: DocumentState::closed(),
            viewport: ViewportState::default(),
            scroll: ScrollTracker::default(),
            store,
            saved,
            offer_visible,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn units(&self) -> &[ChunkUnit] {
        &self.document.units
    }

    pub fn current_unit(&self) -> Option<&ChunkUnit> {
        self.document.units.get(self.pacer.current_index())
    }

    pub fn current_index(&self) -> usize {
        self.pacer.current_index()
    }

    pub fn is_playing(&self) -> bool {
        self.pacer.is_playing()
    }

    pub fn wpm(&self) -> u32 {
        self.pacer.wpm()
    }

    pub fn pacer_snapshot(&self) -> PacerSnapshot {
        self.pacer.snapshot()
    }

    pub fn has_document(&self) -> bool {
        self.document.is_open()
    }

    pub fn document_name(&self) -> Option<&str> {
        self.document.source.as_ref().map(|s| s.display_name())
    }

    pub fn extraction_state(&self) -> ExtractionState {
        self.document.extraction
    }

    /// Units are extracted and there is something to play.
    pub fn is_ready(&self) -> bool {
        self.document.extraction == ExtractionState::Done && !self.document.units.is_empty()
    }

    pub fn scroll_top(&self) -> f64 {
        self.viewport.scroll_top
    }

    /// The start-up prompt, while it should be shown.
    pub fn resume_offer(&self) -> Option<ResumeOffer> {
        if !self.offer_visible || self.document.is_open() {
            return None;
        }
        self.saved.as_ref().map(|restored| ResumeOffer {
            source_name: restored.session.display_name().to_string(),
            wpm: restored.session.wpm,
            position: restored.session.position,
        })
    }

    /// Source of the saved session, until it is resumed or discarded.
    pub fn saved_source(&self) -> Option<&SourceRef> {
        self.saved.as_ref().map(|restored| &restored.session.source)
    }

    /// Earliest instant at which a [`Message::Tick`](super::Message::Tick)
    /// has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.pacer.next_deadline(), self.scroll.settle_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}
