//! Key-value persistence for channels, the saved ledger and the API key.
//!
//! Values are JSON strings under plain string keys. Reads never fail: an
//! absent or unparsable value falls back to `T::default()`.

use anyhow::{Context, Result};
use serde::{Serialize, de::DeserializeOwned};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CHANNELS_KEY: &str = "channels";
pub const SAVED_KEY: &str = "saved";
pub const CREDENTIAL_KEY: &str = "api_key";

/// Raw string storage.
pub trait Store {
  fn get_raw(&self, key: &str) -> Option<String>;
  fn set_raw(&mut self, key: &str, value: &str) -> Result<()>;
}

/// Typed JSON access on top of any [`Store`].
pub trait StoreExt: Store {
  fn get<T: DeserializeOwned + Default>(&self, key: &str) -> T {
    let Some(raw) = self.get_raw(key) else { return T::default() };
    if raw.trim().is_empty() {
      return T::default();
    }
    match serde_json::from_str(&raw) {
      Ok(value) => value,
      Err(e) => {
        debug!(key, err = %e, "store: discarding unparsable value");
        T::default()
      }
    }
  }

  fn set<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value).with_context(|| format!("Failed to serialize value for key '{}'", key))?;
    self.set_raw(key, &raw)
  }
}

impl<S: Store + ?Sized> StoreExt for S {}

/// In-memory store for tests.
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
  values: std::collections::HashMap<String, String>,
}

#[cfg(test)]
impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

#[cfg(test)]
impl Store for MemoryStore {
  fn get_raw(&self, key: &str) -> Option<String> {
    self.values.get(key).cloned()
  }

  fn set_raw(&mut self, key: &str, value: &str) -> Result<()> {
    self.values.insert(key.to_string(), value.to_string());
    Ok(())
  }
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
  dir: PathBuf,
}

impl FileStore {
  /// Open (and create if needed) a store rooted at `dir`.
  pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
    let dir = dir.into();
    std::fs::create_dir_all(&dir).with_context(|| format!("Failed to create store directory {}", dir.display()))?;
    Ok(Self { dir })
  }

  pub fn dir(&self) -> &Path {
    &self.dir
  }

  fn path_for(&self, key: &str) -> PathBuf {
    self.dir.join(format!("{}.json", key))
  }
}

impl Store for FileStore {
  fn get_raw(&self, key: &str) -> Option<String> {
    std::fs::read_to_string(self.path_for(key)).ok()
  }

  fn set_raw(&mut self, key: &str, value: &str) -> Result<()> {
    let path = self.path_for(key);
    // Readers must never observe a partially written blob.
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, value).with_context(|| format!("Failed to write {}", tmp.display()))?;
    std::fs::rename(&tmp, &path).with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
  }
}
