//! Item-to-people assignment map.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mapping from item id to the ordered list of people sharing that item.
///
/// An absent key and an empty list both mean "unassigned". Per-item lists
/// preserve insertion order and never contain the same name twice. Person
/// renames and removals cascade through every list so a list can never
/// reference a person that no longer exists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Assignments(BTreeMap<u32, Vec<String>>);

impl Assignments {
    /// Creates an empty assignment map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the people assigned to an item, empty when unassigned.
    pub fn assignees(&self, item_id: u32) -> &[String] {
        self.0.get(&item_id).map_or(&[], Vec::as_slice)
    }

    /// Returns true when the item has at least one assignee.
    pub fn is_assigned(&self, item_id: u32) -> bool {
        !self.assignees(item_id).is_empty()
    }

    /// Returns true when the person is assigned to the item.
    pub fn contains(&self, item_id: u32, person: &str) -> bool {
        self.assignees(item_id).iter().any(|p| p == person)
    }

    /// Toggles an assignment for a (item, person) pair.
    ///
    /// Adding appends to the end of the item's list; toggling the same pair
    /// twice returns the map to its prior state. Blank or whitespace-only
    /// person names are rejected as a no-op.
    pub fn toggle(&mut self, item_id: u32, person: &str) {
        if person.trim().is_empty() {
            return;
        }

        let list = self.0.entry(item_id).or_default();
        if let Some(pos) = list.iter().position(|p| p == person) {
            list.remove(pos);
        } else {
            list.push(person.to_string());
        }
    }

    /// Renames a person across every per-item list.
    ///
    /// Ordering within each list is preserved. When the new name is already
    /// present for an item, the stale entry is dropped rather than
    /// duplicated, so nobody is charged twice for the same item.
    pub fn rename_person(&mut self, old_name: &str, new_name: &str) {
        if old_name == new_name {
            return;
        }

        for list in self.0.values_mut() {
            let already_present = list.iter().any(|p| p == new_name);
            if already_present {
                list.retain(|p| p != old_name);
            } else {
                for entry in list.iter_mut() {
                    if entry == old_name {
                        *entry = new_name.to_string();
                    }
                }
            }
        }
    }

    /// Removes a person from every per-item list.
    ///
    /// Items assigned only to that person become unassigned; the items
    /// themselves are untouched.
    pub fn remove_person(&mut self, person: &str) {
        for list in self.0.values_mut() {
            list.retain(|p| p != person);
        }
    }

    /// Drops every assignment, leaving all items unassigned.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Returns true when no item has any assignee.
    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }
}
