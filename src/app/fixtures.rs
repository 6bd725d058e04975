//! Shared builders for reader tests.

use super::{Command, Message, Reader};
use crate::config::AppConfig;
use crate::geometry::{LayoutSnapshot, PageLayer, Rect, SpanBox};
use crate::persistence::{MemoryBlobStore, MemoryMetadataStore, SessionStore};
use crate::source::DocumentSource;
use std::time::Instant;

pub(crate) const VIEWPORT_WIDTH: f64 = 800.0;
pub(crate) const VIEWPORT_HEIGHT: f64 = 300.0;

/// One page with a single one-word span per entry of `ys`.
pub(crate) fn line_layout(ys: &[f64]) -> LayoutSnapshot {
    let spans = ys
        .iter()
        .enumerate()
        .map(|(i, y)| SpanBox::new(format!("word{i}"), Rect::new(40.0, *y, 500.0, 20.0)))
        .collect();
    LayoutSnapshot {
        container: Rect::new(0.0, 0.0, VIEWPORT_WIDTH, VIEWPORT_HEIGHT),
        scroll_left: 0.0,
        scroll_top: 0.0,
        scroll_height: ys.last().copied().unwrap_or(0.0) + 400.0,
        pages: vec![PageLayer { spans }],
    }
}

/// A session store plus handles onto its backing maps, so a test can build
/// a second store over the same data.
pub(crate) fn shared_store() -> (SessionStore, MemoryMetadataStore, MemoryBlobStore) {
    let metadata = MemoryMetadataStore::default();
    let blobs = MemoryBlobStore::default();
    let store = SessionStore::new(Box::new(metadata.clone()), Box::new(blobs.clone()));
    (store, metadata, blobs)
}

pub(crate) fn reopen(metadata: &MemoryMetadataStore, blobs: &MemoryBlobStore) -> SessionStore {
    SessionStore::new(Box::new(metadata.clone()), Box::new(blobs.clone()))
}

/// Open `source`, report the viewport, and run extraction over `layout`.
pub(crate) fn open_and_extract(
    reader: &mut Reader,
    source: DocumentSource,
    layout: &LayoutSnapshot,
    now: Instant,
) -> Vec<Command> {
    reader.update(Message::OpenSource(source), now);
    reader.update(
        Message::Resized {
            viewport_width: VIEWPORT_WIDTH,
            viewport_height: VIEWPORT_HEIGHT,
        },
        now,
    );
    let commands = reader.update(Message::PagesRendered, now);
    assert_eq!(commands, vec![Command::RequestFrame]);
    reader.extract_pending(layout, now)
}

/// A reader over an in-memory store with `ys` already extracted.
pub(crate) fn ready_reader(ys: &[f64], config: AppConfig, now: Instant) -> Reader {
    let mut reader = Reader::new(config, SessionStore::in_memory());
    open_and_extract(
        &mut reader,
        DocumentSource::remote("https://example.com/paper.pdf"),
        &line_layout(ys),
        now,
    );
    reader
}
