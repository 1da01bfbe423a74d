//! Allocation engine.
//!
//! Pure computation of per-person totals from a receipt, a people list,
//! and the assignment map. Recomputed on every read; nothing here is
//! cached or persisted.

use super::assignments::Assignments;
use crate::receipt::{Item, Receipt};
use std::collections::HashMap;

/// Tolerance for the "fully assigned" reconciliation check.
///
/// Splitting prices across people and scaling by the tax/tip multiplier
/// leaves small floating-point residue; totals within this distance of the
/// receipt's grand total count as fully assigned. This is deliberate
/// policy, not a rounding bug.
pub const ASSIGNMENT_EPSILON: f64 = 0.02;

/// One item's share of a person's bill.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemShare {
    /// The shared item
    pub item: Item,
    /// This person's portion of the item price (price / assignee count)
    pub split_price: f64,
}

/// A person's derived totals. Never stored; recomputed on every read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonTotal {
    /// Items this person shares, with their portion of each price
    pub items: Vec<ItemShare>,
    /// Sum of split prices before tax/tip
    pub subtotal: f64,
    /// Subtotal scaled by the receipt multiplier
    pub total: f64,
}

/// The full allocation state derived from one computation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitSummary {
    /// Per-person totals, keyed by person name
    pub totals: HashMap<String, PersonTotal>,
    /// Items with no assignees
    pub unassigned_items: Vec<Item>,
    /// Sum of every person's scaled total
    pub assigned_total: f64,
    /// True when the assigned total matches the receipt total within
    /// [`ASSIGNMENT_EPSILON`]
    pub is_fully_assigned: bool,
    /// The tax/tip multiplier used for scaling
    pub multiplier: f64,
}

impl SplitSummary {
    /// Returns the people that have at least one item, for display.
    pub fn people_with_items(&self) -> impl Iterator<Item = (&String, &PersonTotal)> {
        self.totals.iter().filter(|(_, total)| !total.items.is_empty())
    }
}

/// Computes per-person totals and the reconciliation state.
///
/// Rules:
/// - Every person with a non-blank trimmed name gets an entry, keyed by the
///   raw name. Duplicate names share an entry and therefore merge.
/// - Each assigned item's price is divided evenly among all of its
///   assignees. Assignees missing from `people` (stale names) still count
///   toward the divisor but accumulate nowhere.
/// - Each subtotal is scaled by the receipt multiplier to distribute tax
///   and tip proportionally.
pub fn compute_totals(
    receipt: &Receipt,
    people: &[String],
    assignments: &Assignments,
) -> SplitSummary {
    let multiplier = receipt.multiplier();

    let mut totals: HashMap<String, PersonTotal> = HashMap::new();
    for person in people {
        if !person.trim().is_empty() {
            totals.entry(person.clone()).or_default();
        }
    }

    for item in &receipt.items {
        let assignees = assignments.assignees(item.id);
        if assignees.is_empty() {
            continue;
        }

        let split_price = item.price / assignees.len() as f64;
        for person in assignees {
            if let Some(total) = totals.get_mut(person) {
                total.items.push(ItemShare {
                    item: item.clone(),
                    split_price,
                });
                total.subtotal += split_price;
            }
        }
    }

    for total in totals.values_mut() {
        total.total = total.subtotal * multiplier;
    }

    let unassigned_items: Vec<Item> = receipt
        .items
        .iter()
        .filter(|item| !assignments.is_assigned(item.id))
        .cloned()
        .collect();

    let assigned_total: f64 = totals.values().map(|t| t.total).sum();
    let is_fully_assigned = (assigned_total - receipt.total).abs() < ASSIGNMENT_EPSILON;

    SplitSummary {
        totals,
        unassigned_items,
        assigned_total,
        is_fully_assigned,
        multiplier,
    }
}
