//! File-backed journal handle: load, save, append
//!
//! The whole journal lives in one JSON document. `load` never fails: a
//! missing, empty, or unreadable document reads as the empty journal.
//! `save` writes a sibling temp file and renames it into place, so the
//! document on disk is always either the old or the new version.
//!
//! `load` + `save` alone are a plain read-modify-write with no isolation:
//! two callers working from the same snapshot lose one of their updates.
//! `append` runs the same cycle under the handle's write lock, so every
//! append that goes through one shared `Journal` is kept.

use crate::error::{JournalError, JournalResult};
use crate::store::JournalStore;
use runcoach_core::{LogEntry, UserId};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

pub const DEFAULT_JOURNAL_FILE: &str = "user_data.json";

pub struct Journal {
    path: PathBuf,
    write_lock: Mutex<()>,
    tmp_seq: AtomicU64,
}

/// Aggregate counts for health reporting
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct JournalStats {
    pub users: usize,
    pub entries: usize,
}

impl Journal {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
            tmp_seq: AtomicU64::new(0),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the backing document. Absence or corruption reads as empty.
    pub async fn load(&self) -> JournalStore {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No journal at {}, starting empty", self.path.display());
                return JournalStore::default();
            }
            Err(e) => {
                warn!("Failed to read journal {}: {}, using empty journal", self.path.display(), e);
                return JournalStore::default();
            }
        };

        let content = content.trim();
        if content.is_empty() {
            return JournalStore::default();
        }

        match serde_json::from_str(content) {
            Ok(store) => store,
            Err(e) => {
                warn!("Error loading journal {}: {}, using empty journal", self.path.display(), e);
                JournalStore::default()
            }
        }
    }

    /// Replace the backing document with `store`.
    pub async fn save(&self, store: &JournalStore) -> JournalResult<()> {
        let json = serde_json::to_string_pretty(store)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| JournalError::io(parent, e))?;
            }
        }

        let tmp = self.tmp_path();
        fs::write(&tmp, json)
            .await
            .map_err(|e| JournalError::io(&tmp, e))?;
        if let Err(e) = fs::rename(&tmp, &self.path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(JournalError::io(&self.path, e));
        }

        debug!(
            "Saved journal {} ({} users, {} entries)",
            self.path.display(),
            store.user_count(),
            store.entry_count()
        );
        Ok(())
    }

    /// Append one entry to the user's log and persist. Returns the log's new length.
    pub async fn append(&self, user: &UserId, entry: LogEntry) -> JournalResult<usize> {
        let _guard = self.write_lock.lock().await;
        let mut store = self.load().await;
        let len = store.append(user, entry);
        self.save(&store).await?;
        Ok(len)
    }

    /// A snapshot of one user's log.
    pub async fn entries(&self, user: &UserId) -> Vec<LogEntry> {
        self.load().await.entries(user).to_vec()
    }

    pub async fn stats(&self) -> JournalStats {
        let store = self.load().await;
        JournalStats {
            users: store.user_count(),
            entries: store.entry_count(),
        }
    }

    // Unique per save so overlapping raw saves never share a temp file.
    fn tmp_path(&self) -> PathBuf {
        let seq = self.tmp_seq.fetch_add(1, Ordering::Relaxed);
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_JOURNAL_FILE.to_string());
        self.path
            .with_file_name(format!(".{}.{}.{}.tmp", name, std::process::id(), seq))
    }
}
