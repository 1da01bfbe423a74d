//! Stored session domain model.

use crate::receipt::Receipt;
use crate::split::Assignments;
use serde::{Deserialize, Serialize};

/// One persisted receipt-splitting workflow instance.
///
/// Created on the first receipt load (demo, upload, or restored from a
/// shared reference), mutated on every assignment or person change, and
/// deleted only by explicit user action.
///
/// This is the "pure" domain model that business logic operates on,
/// independent of any specific storage format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    /// Opaque unique session identifier (UUID format)
    pub id: String,
    /// The parsed bill this session splits
    pub receipt: Receipt,
    /// Ordered list of people, possibly containing blank placeholders
    pub people: Vec<String>,
    /// Item-to-people assignment map
    pub assignments: Assignments,
    /// Last persisted write time, epoch milliseconds.
    /// Monotonically non-decreasing across writes for a given id.
    pub last_edited_at: i64,
}

impl StoredSession {
    /// Creates a session stamped with the current time.
    pub fn new(
        id: impl Into<String>,
        receipt: Receipt,
        people: Vec<String>,
        assignments: Assignments,
    ) -> Self {
        Self {
            id: id.into(),
            receipt,
            people,
            assignments,
            last_edited_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}
