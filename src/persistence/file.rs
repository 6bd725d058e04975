//! Stores backed by plain files under the cache directory.
//!
//! Metadata lives in `<dir>/<key>.json`. Document bytes live in
//! `<dir>/<key>.bin` next to a `<key>.sha256` digest; a blob whose digest no
//! longer matches is treated as missing rather than handed back corrupted.

use super::{BlobStore, MetadataStore};
use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone)]
pub struct FileMetadataStore {
    dir: PathBuf,
}

impl FileMetadataStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl MetadataStore for FileMetadataStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path(key);
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Some(data))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;
        let path = self.path(key);
        fs::write(&path, value).with_context(|| format!("Failed to write {}", path.display()))
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        remove_if_present(&self.path(key))
    }
}

#[derive(Debug, Clone)]
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn blob_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.bin"))
    }

    fn digest_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.sha256"))
    }
}

fn digest_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

impl BlobStore for FileBlobStore {
    fn put(&mut self, key: &str, bytes: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;
        let blob = self.blob_path(key);
        fs::write(&blob, bytes).with_context(|| format!("Failed to write {}", blob.display()))?;
        let digest = self.digest_path(key);
        fs::write(&digest, digest_hex(bytes))
            .with_context(|| format!("Failed to write {}", digest.display()))
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let blob = self.blob_path(key);
        if !blob.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&blob).with_context(|| format!("Failed to read {}", blob.display()))?;

        let digest = self.digest_path(key);
        let expected = fs::read_to_string(&digest).ok();
        let actual = digest_hex(&bytes);
        if expected.as_deref().map(str::trim) != Some(actual.as_str()) {
            warn!(path = %blob.display(), "Stored document failed its integrity check");
            return Ok(None);
        }
        Ok(Some(bytes))
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        remove_if_present(&self.blob_path(key))?;
        remove_if_present(&self.digest_path(key))
    }
}

fn remove_if_present(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}
