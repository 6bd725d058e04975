//! In-process stores. Clones share their contents, which lets a test "restart"
//! by building a second `SessionStore` over the same backing maps.

use super::{BlobStore, MetadataStore};
use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, Default)]
pub struct MemoryMetadataStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    entries: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

fn lock<T>(entries: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    entries
        .lock()
        .map_err(|_| anyhow!("in-memory store lock poisoned"))
}

impl MetadataStore for MemoryMetadataStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(lock(&self.entries)?.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        lock(&self.entries)?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        lock(&self.entries)?.remove(key);
        Ok(())
    }
}

impl BlobStore for MemoryBlobStore {
    fn put(&mut self, key: &str, bytes: &[u8]) -> Result<()> {
        lock(&self.entries)?.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(lock(&self.entries)?.get(key).cloned())
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        lock(&self.entries)?.remove(key);
        Ok(())
    }
}
