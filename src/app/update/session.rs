use super::super::messages::Command;
use super::super::state::{DocumentState, ExtractionState, Reader};
use super::Effect;
use crate::geometry::{ExtractOptions, TextLayer, extract};
use crate::persistence::PersistedSession;
use crate::source::{DocumentSource, SourceRef};
use std::time::Instant;
use tracing::{debug, info, warn};

impl Reader {
    /// A newly chosen document replaces whatever was open. Nothing is
    /// extracted until its pages are rendered.
    pub(super) fn handle_open_source(&mut self, source: DocumentSource) {
        info!(source = source.display_name(), "Opening document");
        self.offer_visible = false;
        self.open_document(source);
    }

    fn open_document(&mut self, source: DocumentSource) {
        self.pacer.load(&[]);
        self.document = DocumentState::open(source);
        self.scroll.reset();
        self.viewport.scroll_top = 0.0;
        self.viewport.content_height = 0.0;
    }

    pub(super) fn handle_pages_rendered(&mut self, effects: &mut Vec<Effect>) {
        if !self.document.is_open() {
            debug!("Ignoring render notice with no open document");
            return;
        }
        match self.document.extraction {
            ExtractionState::Idle => {
                self.document.extraction = ExtractionState::Pending;
                effects.push(Effect::RequestFrame);
            }
            ExtractionState::Pending => debug!("Extraction already pending"),
            ExtractionState::Done => debug!("Document already extracted"),
        }
    }

    /// Run the pending extraction against the rendered layer. Call this from
    /// the frame after [`Command::RequestFrame`]; it does nothing unless an
    /// extraction is pending.
    pub fn extract_pending<L: TextLayer>(&mut self, layer: &L, now: Instant) -> Vec<Command> {
        if self.document.extraction != ExtractionState::Pending {
            debug!(extraction = ?self.document.extraction, "No extraction pending");
            return Vec::new();
        }

        let units = extract(layer, &ExtractOptions::from(&self.config));
        let (width, height) = layer.viewport_size();
        self.viewport.viewport_width = width.max(0.0);
        self.viewport.viewport_height = height.max(0.0);
        self.viewport.content_height = layer.scroll_height().max(0.0);
        self.document.page_count = layer.page_count();
        self.pacer.load(&units);
        self.document.units = units;
        self.document.extraction = ExtractionState::Done;

        if self.document.units.is_empty() {
            info!(
                pages = self.document.page_count,
                "Rendered layer has no text to pace"
            );
        }

        let mut effects = Vec::new();
        if let Some(position) = self.document.resume_position.take() {
            if position > 0 {
                info!(position, "Restoring saved position");
                let events = self.pacer.jump_to(position, now);
                self.apply_pacer_events(events, &mut effects);
            }
        }
        self.run_effects(effects, now)
    }

    pub(super) fn handle_resume(&mut self, now: Instant, effects: &mut Vec<Effect>) {
        self.offer_visible = false;
        let Some(restored) = self.saved.take() else {
            return;
        };
        let session = restored.session;
        self.pacer.set_wpm(session.wpm, now);

        let name = session.source_name.clone();
        let source = match session.source {
            SourceRef::Remote { url } => DocumentSource {
                reference: SourceRef::Remote { url },
                name,
                bytes: None,
            },
            SourceRef::Local { name: local } => {
                let Some(bytes) = restored.file else {
                    warn!(source = %local, "Stored document is unavailable; cannot resume");
                    return;
                };
                DocumentSource {
                    name: name.or_else(|| Some(local.clone())),
                    reference: SourceRef::Local { name: local },
                    bytes: Some(bytes),
                }
            }
        };

        info!(
            source = source.display_name(),
            position = session.position,
            wpm = self.pacer.wpm(),
            "Resuming saved session"
        );
        self.open_document(source.clone());
        self.document.bytes_persisted = true;
        self.document.resume_position = Some(session.position);
        effects.push(Effect::LoadSource(source));
    }

    pub(super) fn handle_start_fresh(&mut self, effects: &mut Vec<Effect>) {
        self.offer_visible = false;
        self.saved = None;
        effects.push(Effect::ClearSession);
    }

    /// Write the current position and speed. Nothing is saved while the
    /// reader sits on the first unit. Local bytes go to the blob store once
    /// per opened document, retried on later saves until a write succeeds.
    pub(super) fn persist_session(&mut self) {
        let position = self.pacer.current_index();
        if position == 0 || self.document.units.is_empty() {
            return;
        }
        let Some(source) = self.document.source.as_ref() else {
            return;
        };
        let session = PersistedSession::new(
            source.reference.clone(),
            source.name.clone(),
            position,
            self.pacer.wpm(),
        );
        let bytes = if self.document.bytes_persisted {
            None
        } else {
            source.persistable_bytes()
        };
        if self.store.save(&session, bytes).file {
            self.document.bytes_persisted = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::super::fixtures::{line_layout, open_and_extract, reopen, shared_store};
    use super::super::super::{Command, ExtractionState, Message, Reader};
    use crate::config::AppConfig;
    use crate::geometry::LayoutSnapshot;
    use crate::persistence::{BlobStore, MemoryBlobStore, PersistedSession, SessionStore};
    use crate::source::{DocumentSource, SourceRef};
    use std::time::{Duration, Instant};

    fn seeded_store(session: &PersistedSession, file: Option<&[u8]>) -> SessionStore {
        let mut store = SessionStore::in_memory();
        store.save(session, file);
        store
    }

    fn remote_session(position: usize, wpm: u32) -> PersistedSession {
        PersistedSession::new(
            SourceRef::Remote {
                url: "https://x/y.pdf".to_string(),
            },
            None,
            position,
            wpm,
        )
    }

    #[test]
    fn saved_session_is_offered_at_start() {
        let reader = Reader::new(
            AppConfig::default(),
            seeded_store(&remote_session(5, 350), None),
        );
        let offer = reader.resume_offer().expect("resume offer");
        assert_eq!(offer.position, 5);
        assert_eq!(offer.wpm, 350);
        assert_eq!(offer.source_name, "https://x/y.pdf");
    }

    #[test]
    fn no_offer_without_a_saved_session() {
        let reader = Reader::new(AppConfig::default(), SessionStore::in_memory());
        assert!(reader.resume_offer().is_none());
    }

    #[test]
    fn resume_reopens_the_source_and_restores_position() {
        let t0 = Instant::now();
        let mut reader = Reader::new(
            AppConfig::default(),
            seeded_store(&remote_session(2, 350), None),
        );

        let commands = reader.update(Message::Resume, t0);
        assert_eq!(
            commands,
            vec![Command::LoadSource(DocumentSource::remote("https://x/y.pdf"))]
        );
        assert!(reader.resume_offer().is_none());
        assert_eq!(reader.wpm(), 350);

        assert_eq!(
            reader.update(Message::PagesRendered, t0),
            vec![Command::RequestFrame]
        );
        let commands = reader.extract_pending(&line_layout(&[0.0, 400.0, 800.0, 1200.0]), t0);
        assert_eq!(reader.current_index(), 2);
        assert!(
            commands
                .iter()
                .any(|c| matches!(c, Command::ScrollTo { top, .. } if *top > 0.0)),
            "restored position should be scrolled into view"
        );
    }

    #[test]
    fn resume_of_local_file_hands_back_stored_bytes() {
        let t0 = Instant::now();
        let session = PersistedSession::new(
            SourceRef::Local {
                name: "paper.pdf".to_string(),
            },
            Some("paper.pdf".to_string()),
            3,
            300,
        );
        let mut reader = Reader::new(
            AppConfig::default(),
            seeded_store(&session, Some(b"%PDF-1.7")),
        );
        let commands = reader.update(Message::Resume, t0);
        assert_eq!(
            commands,
            vec![Command::LoadSource(DocumentSource::local(
                "paper.pdf",
                b"%PDF-1.7".to_vec()
            ))]
        );
        assert_eq!(reader.document_name(), Some("paper.pdf"));
    }

    #[test]
    fn resume_without_stored_bytes_opens_nothing() {
        let t0 = Instant::now();
        let session = PersistedSession::new(
            SourceRef::Local {
                name: "gone.pdf".to_string(),
            },
            None,
            3,
            300,
        );
        let mut reader = Reader::new(AppConfig::default(), seeded_store(&session, None));
        assert!(reader.update(Message::Resume, t0).is_empty());
        assert!(!reader.has_document());
    }

    #[test]
    fn start_fresh_clears_storage() {
        let t0 = Instant::now();
        let (mut store, metadata, blobs) = shared_store();
        store.save(&remote_session(4, 300), None);
        let mut reader = Reader::new(AppConfig::default(), store);
        assert!(reader.resume_offer().is_some());

        reader.update(Message::StartFresh, t0);
        assert!(reader.resume_offer().is_none());
        assert!(reopen(&metadata, &blobs).load().is_none());
    }

    #[test]
    fn freshly_opened_documents_start_at_the_top() {
        let t0 = Instant::now();
        let mut reader = Reader::new(
            AppConfig::default(),
            seeded_store(&remote_session(2, 300), None),
        );
        open_and_extract(
            &mut reader,
            DocumentSource::remote("https://example.com/other.pdf"),
            &line_layout(&[0.0, 100.0, 200.0]),
            t0,
        );
        assert_eq!(reader.current_index(), 0);
        assert!(reader.resume_offer().is_none());
    }

    #[test]
    fn extraction_runs_once_per_document() {
        let t0 = Instant::now();
        let mut reader = Reader::new(AppConfig::default(), SessionStore::in_memory());
        reader.update(
            Message::OpenSource(DocumentSource::remote("https://x/y.pdf")),
            t0,
        );
        assert_eq!(
            reader.update(Message::PagesRendered, t0),
            vec![Command::RequestFrame]
        );
        assert!(
            reader.update(Message::PagesRendered, t0).is_empty(),
            "a second render notice must not queue another pass"
        );
        assert_eq!(reader.extraction_state(), ExtractionState::Pending);

        reader.extract_pending(&line_layout(&[0.0, 100.0]), t0);
        assert_eq!(reader.units().len(), 2);
        reader.extract_pending(&line_layout(&[0.0, 100.0, 200.0]), t0);
        assert_eq!(reader.units().len(), 2, "extraction is not repeated");
        assert!(reader.update(Message::PagesRendered, t0).is_empty());
    }

    #[test]
    fn render_notice_without_a_document_is_ignored() {
        let t0 = Instant::now();
        let mut reader = Reader::new(AppConfig::default(), SessionStore::in_memory());
        assert!(reader.update(Message::PagesRendered, t0).is_empty());
        assert!(reader.extract_pending(&line_layout(&[0.0]), t0).is_empty());
        assert!(reader.units().is_empty());
    }

    #[test]
    fn empty_layer_is_not_ready_to_play() {
        let t0 = Instant::now();
        let mut reader = Reader::new(AppConfig::default(), SessionStore::in_memory());
        open_and_extract(
            &mut reader,
            DocumentSource::remote("https://x/y.pdf"),
            &LayoutSnapshot::default(),
            t0,
        );
        assert_eq!(reader.extraction_state(), ExtractionState::Done);
        assert!(!reader.is_ready());
        reader.update(Message::Play, t0);
        assert!(!reader.is_playing());
    }

    #[test]
    fn opening_a_new_document_resets_playback() {
        let t0 = Instant::now();
        let mut reader = Reader::new(AppConfig::default(), SessionStore::in_memory());
        open_and_extract(
            &mut reader,
            DocumentSource::remote("https://x/y.pdf"),
            &line_layout(&[0.0, 100.0, 200.0]),
            t0,
        );
        reader.update(Message::Play, t0);
        reader.update(Message::Tick, t0 + Duration::from_millis(200));
        assert_eq!(reader.current_index(), 1);

        reader.update(
            Message::OpenSource(DocumentSource::remote("https://x/z.pdf")),
            t0 + Duration::from_millis(250),
        );
        assert!(!reader.is_playing());
        assert_eq!(reader.current_index(), 0);
        assert!(reader.units().is_empty());
        assert_eq!(reader.next_deadline(), None);
    }

    #[test]
    fn local_bytes_are_stored_once_per_document() {
        let t0 = Instant::now();
        let (store, metadata, blobs) = shared_store();
        let mut reader = Reader::new(AppConfig::default(), store);
        open_and_extract(
            &mut reader,
            DocumentSource::local("notes.pdf", b"%PDF-1.4".to_vec()),
            &line_layout(&[0.0, 100.0, 200.0]),
            t0,
        );
        reader.update(Message::JumpTo(1), t0);

        let restored = reopen(&metadata, &blobs).load().expect("saved");
        assert_eq!(restored.file.as_deref(), Some(&b"%PDF-1.4"[..]));
        assert_eq!(restored.session.source_name.as_deref(), Some("notes.pdf"));

        reader.update(Message::JumpTo(2), t0);
        let restored = reopen(&metadata, &blobs).load().expect("saved");
        assert_eq!(restored.session.position, 2);
        assert_eq!(restored.file.as_deref(), Some(&b"%PDF-1.4"[..]));
    }

    /// Fails the first `failures` writes, then behaves like `inner`.
    struct FlakyBlobs {
        failures: usize,
        inner: MemoryBlobStore,
    }

    impl BlobStore for FlakyBlobs {
        fn put(&mut self, key: &str, bytes: &[u8]) -> anyhow::Result<()> {
            if self.failures > 0 {
                self.failures -= 1;
                anyhow::bail!("disk full");
            }
            self.inner.put(key, bytes)
        }
        fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
            self.inner.get(key)
        }
        fn delete(&mut self, key: &str) -> anyhow::Result<()> {
            self.inner.delete(key)
        }
    }

    #[test]
    fn failed_byte_write_is_retried_on_the_next_save() {
        let t0 = Instant::now();
        let (_, metadata, blobs) = shared_store();
        let store = SessionStore::new(
            Box::new(metadata.clone()),
            Box::new(FlakyBlobs {
                failures: 1,
                inner: blobs.clone(),
            }),
        );
        let mut reader = Reader::new(AppConfig::default(), store);
        open_and_extract(
            &mut reader,
            DocumentSource::local("notes.pdf", b"%PDF-1.4".to_vec()),
            &line_layout(&[0.0, 100.0, 200.0]),
            t0,
        );

        reader.update(Message::JumpTo(1), t0);
        let restored = reopen(&metadata, &blobs).load().expect("metadata saved");
        assert!(restored.file.is_none());

        reader.update(Message::JumpTo(2), t0);
        let restored = reopen(&metadata, &blobs).load().expect("metadata saved");
        assert_eq!(restored.session.position, 2);
        assert_eq!(restored.file.as_deref(), Some(&b"%PDF-1.4"[..]));
    }
}
