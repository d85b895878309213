//! Persistent credential storage
//!
//! The credential is one string kept under a fixed key. The file backend
//! keeps a flat JSON object of string values, so other keys written by
//! other tools survive a save or clear.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{StorageError, StorageResult};

/// Storage for the bearer credential
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Read the stored credential, if any
    async fn load(&self) -> StorageResult<Option<String>>;

    /// Persist a credential, replacing any previous one
    async fn save(&self, credential: &str) -> StorageResult<()>;

    /// Remove the stored credential; removing an absent one is a no-op
    async fn clear(&self) -> StorageResult<()>;
}

/// Process-local credential store
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    slot: Mutex<Option<String>>,
}

impl MemoryCredentialStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds a credential
    pub fn with_credential(credential: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(credential.into())),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn load(&self) -> StorageResult<Option<String>> {
        Ok(self.slot.lock().await.clone())
    }

    async fn save(&self, credential: &str) -> StorageResult<()> {
        *self.slot.lock().await = Some(credential.to_string());
        Ok(())
    }

    async fn clear(&self) -> StorageResult<()> {
        self.slot.lock().await.take();
        Ok(())
    }
}

/// Credential store backed by a JSON key/value file
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    key: String,
    // Serializes read-modify-write cycles on the file
    lock: Mutex<()>,
}

impl FileCredentialStore {
    /// Create a store writing `key` into the file at `path`
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
            lock: Mutex::new(()),
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entries(&self) -> StorageResult<BTreeMap<String, String>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Entries to rewrite, and whether an unparseable file was discarded
    async fn entries_for_write(&self) -> StorageResult<(BTreeMap<String, String>, bool)> {
        match self.read_entries().await {
            Ok(entries) => Ok((entries, false)),
            Err(StorageError::Format(e)) => {
                warn!(
                    path = %self.path.display(),
                    "Overwriting unparseable storage file: {}",
                    e
                );
                Ok((BTreeMap::new(), true))
            }
            Err(e) => Err(e),
        }
    }

    async fn write_entries(&self, entries: &BTreeMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let bytes = serde_json::to_vec_pretty(entries)?;

        // Rename over the original; it is never left half-written
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        tokio::fs::write(&tmp, bytes).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> StorageResult<Option<String>> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_entries().await?;
        Ok(entries.remove(&self.key))
    }

    async fn save(&self, credential: &str) -> StorageResult<()> {
        let _guard = self.lock.lock().await;
        let (mut entries, _) = self.entries_for_write().await?;
        entries.insert(self.key.clone(), credential.to_string());
        self.write_entries(&entries).await?;
        info!(path = %self.path.display(), key = %self.key, "Credential persisted");
        Ok(())
    }

    async fn clear(&self) -> StorageResult<()> {
        let _guard = self.lock.lock().await;
        let (mut entries, discarded) = self.entries_for_write().await?;
        if entries.remove(&self.key).is_none() && !discarded {
            debug!(key = %self.key, "No credential to clear");
            return Ok(());
        }
        self.write_entries(&entries).await?;
        info!(path = %self.path.display(), key = %self.key, "Credential cleared");
        Ok(())
    }
}
