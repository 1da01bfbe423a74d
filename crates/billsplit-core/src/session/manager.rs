//! Active session state.
//!
//! `SessionManager` holds the in-memory state of the one receipt-splitting
//! workflow the user is working on. It is pure state plus mutation rules;
//! the application layer owns persistence, calling [`SessionManager::snapshot`]
//! after each mutation to write the session through to storage.

use super::model::StoredSession;
use crate::error::{BillsplitError, Result};
use crate::receipt::Receipt;
use crate::split::{Assignments, SplitSummary, compute_totals};
use uuid::Uuid;

/// In-memory state of the active receipt-splitting session.
#[derive(Debug, Default)]
pub struct SessionManager {
    receipt: Option<Receipt>,
    people: Vec<String>,
    assignments: Assignments,
    session_id: Option<String>,
}

impl SessionManager {
    /// Creates a manager with no active session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the active receipt, if a session is active.
    pub fn receipt(&self) -> Option<&Receipt> {
        self.receipt.as_ref()
    }

    /// Returns the ordered people list, blank placeholders included.
    pub fn people(&self) -> &[String] {
        &self.people
    }

    /// Returns the people with non-blank names, the ones items can be
    /// assigned to.
    pub fn valid_people(&self) -> Vec<String> {
        self.people
            .iter()
            .filter(|p| !p.trim().is_empty())
            .cloned()
            .collect()
    }

    /// Returns the current assignment map.
    pub fn assignments(&self) -> &Assignments {
        &self.assignments
    }

    /// Returns the active session id, if any.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Loads a new receipt, always minting a fresh session id.
    ///
    /// A new bill is never written over an unrelated previous session. The
    /// assignment map is cleared so it cannot reference item ids from the
    /// previous receipt; the people list carries over.
    ///
    /// # Errors
    ///
    /// Returns a `Validation` error when the receipt has no items or
    /// duplicate item ids. No session state changes on failure.
    pub fn load_receipt(&mut self, receipt: Receipt) -> Result<&str> {
        receipt.validate()?;

        self.receipt = Some(receipt);
        self.assignments.clear();
        self.session_id = Some(Uuid::new_v4().to_string());

        Ok(self.session_id.as_deref().unwrap_or_default())
    }

    /// Restores a stored session as the active one.
    pub fn load_stored(&mut self, stored: StoredSession) {
        self.receipt = Some(stored.receipt);
        self.people = stored.people;
        self.assignments = stored.assignments;
        self.session_id = Some(stored.id);
    }

    /// Clears the active session entirely.
    pub fn reset(&mut self) {
        self.receipt = None;
        self.people.clear();
        self.assignments.clear();
        self.session_id = None;
    }

    /// Appends a blank person entry and returns its index, so the caller
    /// can focus the new name field.
    pub fn add_person(&mut self) -> usize {
        self.people.push(String::new());
        self.people.len() - 1
    }

    /// Renames the person at `index`, cascading the rename through the
    /// assignment map.
    ///
    /// # Errors
    ///
    /// Returns a `NotFound` error when the index is out of bounds.
    pub fn update_person_name(&mut self, index: usize, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        let old_name = self
            .people
            .get(index)
            .cloned()
            .ok_or_else(|| BillsplitError::not_found("Person", index.to_string()))?;

        self.people[index] = name.clone();

        if !old_name.is_empty() && old_name != name {
            self.assignments.rename_person(&old_name, &name);
        }

        Ok(())
    }

    /// Removes the person at `index`, cascading the removal through the
    /// assignment map. Items assigned only to that person become
    /// unassigned.
    ///
    /// # Errors
    ///
    /// Returns a `NotFound` error when the index is out of bounds.
    pub fn remove_person(&mut self, index: usize) -> Result<()> {
        if index >= self.people.len() {
            return Err(BillsplitError::not_found("Person", index.to_string()));
        }

        let person = self.people.remove(index);
        self.assignments.remove_person(&person);

        Ok(())
    }

    /// Toggles the assignment of an item to a person.
    ///
    /// Blank person names are a no-op; toggling the same pair twice
    /// restores the prior state.
    ///
    /// # Errors
    ///
    /// Returns a `NotFound` error when no receipt is active or the item id
    /// does not exist on the active receipt.
    pub fn toggle_assignment(&mut self, item_id: u32, person: &str) -> Result<()> {
        let receipt = self
            .receipt
            .as_ref()
            .ok_or_else(|| BillsplitError::not_found("Receipt", "active"))?;

        if receipt.item(item_id).is_none() {
            return Err(BillsplitError::not_found("Item", item_id.to_string()));
        }

        self.assignments.toggle(item_id, person);
        Ok(())
    }

    /// Computes the current allocation state, or `None` without a receipt.
    pub fn totals(&self) -> Option<SplitSummary> {
        self.receipt
            .as_ref()
            .map(|receipt| compute_totals(receipt, &self.people, &self.assignments))
    }

    /// Produces the persistable form of the active session.
    ///
    /// Returns `None` when no receipt is loaded (there is nothing to
    /// persist yet). Mints a session id if one does not exist, so the
    /// first write always has one.
    pub fn snapshot(&mut self) -> Option<StoredSession> {
        let receipt = self.receipt.clone()?;
        let id = self
            .session_id
            .get_or_insert_with(|| Uuid::new_v4().to_string())
            .clone();

        Some(StoredSession::new(
            id,
            receipt,
            self.people.clone(),
            self.assignments.clone(),
        ))
    }
}
