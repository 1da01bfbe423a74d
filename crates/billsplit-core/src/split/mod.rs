//! Cost allocation module.
//!
//! The assignment map tracks which people share each item; the engine
//! turns a receipt, a people list, and the assignment map into per-person
//! totals plus a global reconciliation state. Everything here is pure
//! computation with no I/O.

mod assignments;
mod engine;

pub use assignments::Assignments;
pub use engine::{ASSIGNMENT_EPSILON, ItemShare, PersonTotal, SplitSummary, compute_totals};
