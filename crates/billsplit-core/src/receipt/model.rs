//! Receipt domain model.
//!
//! A `Receipt` is the structured form of a photographed bill: restaurant
//! name, the subtotal/tax/tip/total amounts, and an ordered list of items.
//! Items are immutable once a receipt is loaded into a session.

use crate::error::{BillsplitError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A single line item on a receipt.
///
/// The `id` is unique within its receipt and stable for the receipt's
/// lifetime; the assignment map references items by this id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Item identifier, unique within the receipt
    pub id: u32,
    /// Display name of the item
    pub name: String,
    /// Item price
    pub price: f64,
}

/// A parsed restaurant bill.
///
/// This is the "pure" domain model that the allocation engine operates on,
/// independent of any storage format or the extraction service's wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    /// Restaurant name as printed on the bill
    pub restaurant: String,
    /// Sum of item prices
    pub subtotal: f64,
    /// Tax amount
    pub tax: f64,
    /// Tip amount (0 if not on the receipt)
    pub tip: f64,
    /// Grand total (subtotal + tax + tip)
    pub total: f64,
    /// Ordered line items
    pub items: Vec<Item>,
}

impl Receipt {
    /// Validates that this receipt is usable as session data.
    ///
    /// A receipt must have a non-empty items list with unique item ids.
    /// Anything else coming out of the extraction service is a processing
    /// failure, not a receipt.
    ///
    /// # Errors
    ///
    /// Returns a `Validation` error when the items list is empty or when
    /// two items share an id.
    pub fn validate(&self) -> Result<()> {
        if self.items.is_empty() {
            return Err(BillsplitError::validation(
                "Invalid receipt data: missing items",
            ));
        }

        let mut seen = HashSet::new();
        for item in &self.items {
            if !seen.insert(item.id) {
                return Err(BillsplitError::validation(format!(
                    "Invalid receipt data: duplicate item id {}",
                    item.id
                )));
            }
        }

        Ok(())
    }

    /// Returns the tax/tip distribution multiplier.
    ///
    /// This is `total / subtotal` when the subtotal is positive, else `1.0`.
    /// Applied uniformly to every person's raw item subtotal so tax and tip
    /// are distributed proportionally to each person's share of the bill.
    pub fn multiplier(&self) -> f64 {
        if self.subtotal > 0.0 {
            self.total / self.subtotal
        } else {
            1.0
        }
    }

    /// Looks up an item by id.
    pub fn item(&self, item_id: u32) -> Option<&Item> {
        self.items.iter().find(|item| item.id == item_id)
    }
}
