//! JSON-file SessionRepository implementation.

use anyhow::{Context, Result};
use async_trait::async_trait;
use billsplit_core::session::{SessionRepository, StoredSession};
use fs2::FileExt;
use std::fs::{self, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// A repository implementation storing all sessions in a single JSON file.
///
/// The file holds a flat array of stored-session records in insertion
/// order; `upsert` replaces a record in place so list positions are
/// stable across edits. The schema carries no version field — any future
/// versioning must be additive.
///
/// Mutations take an exclusive advisory lock on the data file for the
/// whole read-modify-write, so two processes sharing the same file cannot
/// interleave and lose each other's sessions.
pub struct JsonSessionRepository {
    path: PathBuf,
}

impl JsonSessionRepository {
    /// Creates a repository backed by the given file path.
    ///
    /// The parent directory is created if it doesn't exist; the file
    /// itself is created lazily on the first write.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).context("Failed to create sessions directory")?;
        }

        Ok(Self { path })
    }

    /// Creates a repository at the default location (`~/.billsplit/sessions.json`).
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined or the
    /// directory cannot be created.
    pub fn default_location() -> Result<Self> {
        let home_dir = dirs::home_dir().context("Failed to get home directory")?;
        Self::new(home_dir.join(".billsplit").join("sessions.json"))
    }

    fn load_collection(&self) -> Result<Vec<StoredSession>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path)
            .context(format!("Failed to read sessions file: {:?}", self.path))?;

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content)
            .context(format!("Failed to parse sessions file: {:?}", self.path))
    }

    /// Runs a read-modify-write cycle under the exclusive file lock.
    ///
    /// `mutate` returns whether the collection changed; an unchanged
    /// collection is not rewritten. Returns whether a write happened.
    fn update_collection<F>(&self, mutate: F) -> Result<bool>
    where
        F: FnOnce(&mut Vec<StoredSession>) -> bool,
    {
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&self.path)
            .context(format!("Failed to open sessions file: {:?}", self.path))?;

        file.lock_exclusive()
            .context("Failed to lock sessions file")?;

        let result: Result<bool> = (|| {
            let mut content = String::new();
            file.read_to_string(&mut content)
                .context(format!("Failed to read sessions file: {:?}", self.path))?;

            let mut sessions: Vec<StoredSession> = if content.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&content)
                    .context(format!("Failed to parse sessions file: {:?}", self.path))?
            };

            if !mutate(&mut sessions) {
                return Ok(false);
            }

            let serialized = serde_json::to_string_pretty(&sessions)
                .context("Failed to serialize sessions to JSON")?;
            file.set_len(0)
                .context("Failed to truncate sessions file")?;
            file.seek(SeekFrom::Start(0))
                .context("Failed to rewind sessions file")?;
            file.write_all(serialized.as_bytes())
                .context(format!("Failed to write sessions file: {:?}", self.path))?;
            file.flush().context("Failed to flush sessions file")?;
            Ok(true)
        })();

        let _ = fs2::FileExt::unlock(&file);
        result
    }
}

#[async_trait]
impl SessionRepository for JsonSessionRepository {
    async fn upsert(&self, session: &StoredSession) -> Result<()> {
        let mut record = session.clone();
        let now = chrono::Utc::now().timestamp_millis();

        self.update_collection(move |sessions| {
            match sessions.iter().position(|s| s.id == record.id) {
                Some(index) => {
                    // Write time never runs backwards for a given id.
                    record.last_edited_at = now.max(sessions[index].last_edited_at);
                    sessions[index] = record;
                }
                None => {
                    record.last_edited_at = now;
                    sessions.push(record);
                }
            }
            true
        })?;

        tracing::debug!(session_id = %session.id, "persisted session");
        Ok(())
    }

    async fn find_by_id(&self, session_id: &str) -> Result<Option<StoredSession>> {
        let sessions = self.load_collection()?;
        Ok(sessions.into_iter().find(|s| s.id == session_id))
    }

    async fn list_all(&self) -> Result<Vec<StoredSession>> {
        self.load_collection()
    }

    async fn delete(&self, session_id: &str) -> Result<()> {
        let removed = self.update_collection(|sessions| {
            let before = sessions.len();
            sessions.retain(|s| s.id != session_id);
            sessions.len() != before
        })?;

        if removed {
            tracing::debug!(%session_id, "deleted session");
        }

        Ok(())
    }
}
