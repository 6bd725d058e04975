//! Saves and restores the reading position across restarts.
//!
//! Two storage surfaces sit behind [`SessionStore`]: a small key-value store
//! for the JSON session metadata, and a binary store holding the bytes of a
//! locally opened document. Only one document is ever persisted; every save
//! overwrites the previous one. Reads never fail loudly: anything that goes
//! wrong while loading is logged and reported as "no saved session".

mod file;
mod memory;

pub use file::{FileBlobStore, FileMetadataStore};
pub use memory::{MemoryBlobStore, MemoryMetadataStore};

use crate::source::SourceRef;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};
use ts_rs::TS;

/// Key of the metadata entry.
pub const SESSION_KEY: &str = "pdf-speed-reader-state";
/// Single slot for the stored document bytes.
pub const FILE_KEY: &str = "current-file";

/// Small synchronous key-value store for string values.
pub trait MetadataStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Binary-capable store for document bytes.
pub trait BlobStore {
    fn put(&mut self, key: &str, bytes: &[u8]) -> Result<()>;
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn delete(&mut self, key: &str) -> Result<()>;
}

/// What gets written on every position or speed change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PersistedSession {
    pub source: SourceRef,
    #[serde(default)]
    pub source_name: Option<String>,
    pub position: usize,
    pub wpm: u32,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    #[ts(type = "number")]
    pub saved_at: u64,
}

impl PersistedSession {
    pub fn new(source: SourceRef, source_name: Option<String>, position: usize, wpm: u32) -> Self {
        Self {
            source,
            source_name,
            position,
            wpm,
            saved_at: 0,
        }
    }

    pub fn display_name(&self) -> &str {
        self.source_name
            .as_deref()
            .unwrap_or_else(|| self.source.label())
    }
}

/// A loaded session plus the stored document bytes for local sources.
#[derive(Debug, Clone, PartialEq)]
pub struct RestoredSession {
    pub session: PersistedSession,
    pub file: Option<Vec<u8>>,
}

/// Which parts of a save reached storage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveOutcome {
    pub metadata: bool,
    /// Only true when bytes were handed in and stored.
    pub file: bool,
}

pub struct SessionStore {
    metadata: Box<dyn MetadataStore>,
    blobs: Box<dyn BlobStore>,
}

impl SessionStore {
    pub fn new(metadata: Box<dyn MetadataStore>, blobs: Box<dyn BlobStore>) -> Self {
        Self { metadata, blobs }
    }

    /// Store both surfaces under `dir` (the configured cache directory).
    pub fn on_disk(dir: &Path) -> Self {
        Self::new(
            Box::new(FileMetadataStore::new(dir)),
            Box::new(FileBlobStore::new(dir.join("files"))),
        )
    }

    pub fn in_memory() -> Self {
        Self::new(
            Box::new(MemoryMetadataStore::default()),
            Box::new(MemoryBlobStore::default()),
        )
    }

    /// Read the saved session, if any. Local sources also get their stored
    /// bytes back; a missing or unreadable file leaves `file` empty.
    pub fn load(&self) -> Option<RestoredSession> {
        let raw = match self.metadata.get(SESSION_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!("Failed to read saved session: {err:#}");
                return None;
            }
        };
        let session: PersistedSession = match serde_json::from_str(&raw) {
            Ok(session) => session,
            Err(err) => {
                warn!("Ignoring malformed saved session: {err}");
                return None;
            }
        };

        let file = if session.source.is_local() {
            match self.blobs.get(FILE_KEY) {
                Ok(bytes) => bytes,
                Err(err) => {
                    warn!("Failed to read stored document: {err:#}");
                    None
                }
            }
        } else {
            None
        };

        debug!(
            position = session.position,
            wpm = session.wpm,
            has_file = file.is_some(),
            "Loaded saved session"
        );
        Some(RestoredSession { session, file })
    }

    /// Write the metadata (stamping `saved_at`) and, when given, replace the
    /// stored document bytes. Failures are logged; the outcome says what
    /// actually got written.
    pub fn save(&mut self, session: &PersistedSession, file: Option<&[u8]>) -> SaveOutcome {
        let mut outcome = SaveOutcome::default();
        let mut entry = session.clone();
        entry.saved_at = now_millis();
        match serde_json::to_string(&entry) {
            Ok(json) => match self.metadata.set(SESSION_KEY, &json) {
                Ok(()) => outcome.metadata = true,
                Err(err) => warn!("Failed to save session metadata: {err:#}"),
            },
            Err(err) => warn!("Failed to serialize session: {err}"),
        }

        if let Some(bytes) = file {
            match self.blobs.put(FILE_KEY, bytes) {
                Ok(()) => outcome.file = true,
                Err(err) => {
                    warn!(bytes = bytes.len(), "Failed to store document bytes: {err:#}")
                }
            }
        }
        if outcome.metadata {
            debug!(
                position = entry.position,
                wpm = entry.wpm,
                stored_file = outcome.file,
                "Saved session"
            );
        }
        outcome
    }

    /// Forget the session and the stored document.
    pub fn clear(&mut self) {
        if let Err(err) = self.metadata.remove(SESSION_KEY) {
            warn!("Failed to clear session metadata: {err:#}");
        }
        if let Err(err) = self.blobs.delete(FILE_KEY) {
            warn!("Failed to clear stored document: {err:#}");
        }
        info!("Cleared saved session");
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
