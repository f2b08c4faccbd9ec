//! Key-value persistence backends for opaque string blobs.
//!
//! Rules:
//!   - Values are opaque to the store; encoding belongs to the codec
//!   - A missing key reads as None, never as an error
//!   - FileStore fsyncs after every write
//!   - FileStore keys are restricted to [A-Za-z0-9_-]+ (file names)

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Backing key-value store for serialized registry state.
pub trait KvStore {
    /// Read the blob stored under `key`, if any.
    fn get_item(&self, key: &str) -> io::Result<Option<String>>;
    /// Store `value` under `key`, replacing any prior blob.
    fn set_item(&mut self, key: &str, value: &str) -> io::Result<()>;
    /// Remove the blob under `key`. Removing an absent key is a no-op.
    fn remove_item(&mut self, key: &str) -> io::Result<()>;
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Volatile store, mainly for tests and ephemeral registries.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl KvStore for MemoryStore {
    fn get_item(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> io::Result<()> {
        self.items.remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// File-backed store
// ---------------------------------------------------------------------------

/// Durable store: one file per key under a root directory.
///
/// Layout: `<dir>/<key>.json`. Writes fsync before returning.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn path_for(&self, key: &str) -> io::Result<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

/// Keys become file names, so restrict them to [A-Za-z0-9_-]+.
fn validate_key(key: &str) -> io::Result<()> {
    let ok = !key.is_empty()
        && key
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-');
    if ok {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Invalid store key {:?}: must match [A-Za-z0-9_-]+", key),
        ))
    }
}

impl KvStore for FileStore {
    fn get_item(&self, key: &str) -> io::Result<Option<String>> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&path).map(Some)
    }

    fn set_item(&mut self, key: &str, value: &str) -> io::Result<()> {
        let path = self.path_for(key)?;
        let mut file = File::create(&path)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> io::Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
