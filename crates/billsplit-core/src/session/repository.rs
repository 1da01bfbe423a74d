//! Session repository trait.
//!
//! Defines the interface for session persistence operations.

use super::model::StoredSession;
use anyhow::Result;
use async_trait::async_trait;

/// An abstract repository for managing session persistence.
///
/// This trait defines the contract for persisting and retrieving stored
/// sessions, decoupling the application's core logic from the specific
/// storage mechanism (e.g., a JSON collection file, a database).
///
/// Persistence is write-through: callers upsert after every observable
/// mutation of the active session, one logical change per write.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Inserts or replaces a session by id.
    ///
    /// When a record with the same id exists it is replaced in place,
    /// preserving its sequence position; otherwise the session is appended.
    /// Implementations stamp `last_edited_at` with the write time.
    ///
    /// # Errors
    ///
    /// Returns an error when the write fails. Storage failures are never
    /// silently dropped.
    async fn upsert(&self, session: &StoredSession) -> Result<()>;

    /// Finds a session by its id.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(session))`: session found
    /// - `Ok(None)`: session not found
    /// - `Err(_)`: error occurred during retrieval
    async fn find_by_id(&self, session_id: &str) -> Result<Option<StoredSession>>;

    /// Lists all stored sessions in stored order.
    ///
    /// Callers sort for display, typically by `last_edited_at` descending.
    async fn list_all(&self) -> Result<Vec<StoredSession>>;

    /// Deletes a session from storage. No-op if the id is absent.
    async fn delete(&self, session_id: &str) -> Result<()>;
}
